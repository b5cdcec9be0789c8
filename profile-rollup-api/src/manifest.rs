//! Registration metadata for the workflow host
//!
//! Describes the action to the host's plugin registry: its ports, the init
//! defaults, and the configuration form.

use crate::outcome::{ERROR_PORT, SUCCESS_PORT};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize)]
pub struct PluginManifest {
    pub class_name: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub group: Vec<&'static str>,
    pub purpose: Vec<&'static str>,
    pub inputs: Vec<&'static str>,
    pub outputs: Vec<&'static str>,
    pub init: Value,
    pub form: Vec<FormGroup>,
    pub license: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormGroup {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Input widget, e.g. `password` or `text`
    pub component: &'static str,
}

/// Manifest for the segments/metadata uploader
pub fn register() -> PluginManifest {
    PluginManifest {
        class_name: "S3SegmentsMetadataUploader",
        name: "S3 Uploader Plugin",
        description: "Uploads user profile data to S3 as JSON.",
        group: vec!["AWS"],
        purpose: vec!["collection", "segmentation"],
        inputs: vec!["payload"],
        outputs: vec![SUCCESS_PORT, ERROR_PORT],
        init: json!({
            "aws_access_key_id": "",
            "aws_secret_access_key": "",
            "s3_bucket": ""
        }),
        form: vec![FormGroup {
            name: "S3 Upload Configuration",
            description: "Configure AWS credentials and S3 details",
            fields: vec![
                FormField {
                    id: "aws_access_key_id",
                    name: "AWS Access Key ID",
                    description: "AWS Access Key ID",
                    component: "password",
                },
                FormField {
                    id: "aws_secret_access_key",
                    name: "AWS Secret Access Key",
                    description: "AWS Secret Access Key",
                    component: "password",
                },
                FormField {
                    id: "s3_bucket",
                    name: "S3 Bucket",
                    description: "S3 Bucket to upload JSON data",
                    component: "text",
                },
            ],
        }],
        license: "MIT",
    }
}
