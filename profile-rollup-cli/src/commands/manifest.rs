use crate::error::CliResult;

pub fn run(compact: bool) -> CliResult<()> {
    let manifest = profile_rollup_api::register();
    let json = if compact {
        serde_json::to_string(&manifest)?
    } else {
        serde_json::to_string_pretty(&manifest)?
    };
    println!("{json}");
    Ok(())
}
