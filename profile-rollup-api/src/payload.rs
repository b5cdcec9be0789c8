//! Inbound payload extraction
//!
//! The host hands over an arbitrary JSON object. Only two fields matter:
//! `traits.smi_uid` (subject identifier) and `segments` (labels). Everything
//! else is ignored.

use profile_rollup_core::{DocumentKind, ProfileRecord, Result, RollupError};
use serde_json::Value;

/// The fields of an inbound payload the aggregation needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundPayload {
    pub subject_id: String,
    pub segments: Vec<String>,
}

impl InboundPayload {
    /// Extract and check the required fields
    pub fn from_value(payload: &Value) -> Result<Self> {
        let subject_id = match payload.get("traits").and_then(|t| t.get("smi_uid")) {
            Some(Value::String(id)) => id.clone(),
            Some(other) if !other.is_null() => {
                return Err(RollupError::input(format!(
                    "'traits.smi_uid' must be a string, found {other}"
                )))
            }
            _ => return Err(RollupError::input("payload is missing 'traits.smi_uid'")),
        };

        let segments = match payload.get("segments") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        RollupError::input(format!("'segments[{i}]' must be a string, found {item}"))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) if !other.is_null() => {
                return Err(RollupError::input(format!(
                    "'segments' must be an array, found {other}"
                )))
            }
            _ => return Err(RollupError::input("payload is missing 'segments'")),
        };

        Ok(Self {
            subject_id,
            segments,
        })
    }

    /// The record appended to the document of `kind`
    pub fn record(&self, kind: DocumentKind) -> ProfileRecord {
        match kind {
            DocumentKind::Segments => {
                ProfileRecord::segments(self.subject_id.clone(), self.segments.clone())
            }
            DocumentKind::Metadata => ProfileRecord::metadata(self.segments.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_required_fields() {
        let payload = json!({
            "traits": {"smi_uid": "u1", "email": "x@example.com"},
            "segments": ["vip", "churn"],
            "event": {"type": "page-view"}
        });
        let parsed = InboundPayload::from_value(&payload).unwrap();
        assert_eq!(parsed.subject_id, "u1");
        assert_eq!(parsed.segments, vec!["vip", "churn"]);
    }

    #[test]
    fn test_records_per_kind() {
        let parsed = InboundPayload {
            subject_id: "u1".into(),
            segments: vec!["vip".into()],
        };
        assert_eq!(
            parsed.record(DocumentKind::Segments),
            ProfileRecord::segments("u1", vec!["vip".into()])
        );
        assert_eq!(
            parsed.record(DocumentKind::Metadata),
            ProfileRecord::metadata(vec!["vip".into()])
        );
    }

    #[test]
    fn test_empty_segments_allowed() {
        let parsed =
            InboundPayload::from_value(&json!({"traits": {"smi_uid": "u1"}, "segments": []}))
                .unwrap();
        assert!(parsed.segments.is_empty());
    }

    #[test]
    fn test_missing_subject_id() {
        for payload in [
            json!({"segments": ["vip"]}),
            json!({"traits": {}, "segments": ["vip"]}),
            json!({"traits": {"smi_uid": null}, "segments": ["vip"]}),
        ] {
            let err = InboundPayload::from_value(&payload).unwrap_err();
            assert!(matches!(err, RollupError::Input(_)), "{payload}");
            assert!(err.to_string().contains("traits.smi_uid"));
        }
    }

    #[test]
    fn test_wrong_types() {
        let err = InboundPayload::from_value(&json!({"traits": {"smi_uid": 7}, "segments": []}))
            .unwrap_err();
        assert!(err.to_string().contains("must be a string"));

        let err =
            InboundPayload::from_value(&json!({"traits": {"smi_uid": "u"}, "segments": "vip"}))
                .unwrap_err();
        assert!(err.to_string().contains("must be an array"));

        let err =
            InboundPayload::from_value(&json!({"traits": {"smi_uid": "u"}, "segments": ["a", 1]}))
                .unwrap_err();
        assert!(err.to_string().contains("segments[1]"));
    }

    #[test]
    fn test_missing_segments() {
        let err = InboundPayload::from_value(&json!({"traits": {"smi_uid": "u"}})).unwrap_err();
        assert!(matches!(err, RollupError::Input(_)));
        assert!(err.to_string().contains("'segments'"));
    }
}
