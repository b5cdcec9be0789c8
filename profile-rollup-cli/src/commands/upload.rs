use crate::cli::UploadArgs;
use crate::error::{CliError, CliResult};
use crate::input;
use profile_rollup_api::{ActionResult, FlowSettings, S3Uploader, UploaderConfig};

pub async fn run(args: UploadArgs) -> CliResult<()> {
    let source = input::resolve_input(args.expr.as_deref(), args.payload.as_deref())?;
    let payload = input::read_payload(&source)?;

    let uploader = S3Uploader::set_up(config_from_args(&args)).await?;
    let report = match args.date {
        Some(date) => uploader.run_for_date(&payload, date).await,
        None => uploader.run_report(&payload).await,
    };

    for (kind, status) in [("segments", &report.segments), ("metadata", &report.metadata)] {
        if let Some(write) = status.written() {
            tracing::info!(
                kind,
                key = %write.key,
                records = write.records,
                created = write.created,
                attempts = write.attempts,
                "document written"
            );
        }
    }

    let result = report.to_result();
    println!("{}", serde_json::to_string_pretty(&result)?);
    match result {
        ActionResult::Success { .. } => Ok(()),
        ActionResult::Error { error } => Err(CliError::Upload(error)),
    }
}

fn config_from_args(args: &UploadArgs) -> UploaderConfig {
    UploaderConfig {
        aws_access_key_id: args.access_key_id.clone(),
        aws_secret_access_key: args.secret_access_key.clone(),
        s3_bucket: args.bucket.clone(),
        region: args.region.clone(),
        endpoint: args.endpoint.clone(),
        prefix: args.prefix.clone(),
        timeout_ms: args.timeout_ms,
        flow: FlowSettings {
            date_basis: args.basis.into(),
            probe: args.probe.into(),
            write_policy: args.write_policy(),
        },
    }
}
