use crate::error::{CliError, CliResult};
use colored::Colorize;
use serde_json::Value;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

/// Where the payload comes from.
#[derive(Debug, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Inline(String),
    Stdin,
}

/// Resolve the payload source with priority: `-e` > `--payload` > piped stdin.
pub fn resolve_input(expr: Option<&str>, payload: Option<&Path>) -> CliResult<InputSource> {
    if let Some(e) = expr {
        return Ok(InputSource::Inline(e.to_string()));
    }
    match payload {
        Some(path) if path == Path::new("-") => return Ok(InputSource::Stdin),
        Some(path) => return Ok(InputSource::File(path.to_path_buf())),
        None => {}
    }
    if !io::stdin().is_terminal() {
        return Ok(InputSource::Stdin);
    }
    Err(CliError::Usage(format!(
        "no payload provided\n  {} use --payload <file>, -e '<json>', or pipe via stdin",
        "help:".cyan().bold()
    )))
}

/// Read and parse the payload JSON.
pub fn read_payload(source: &InputSource) -> CliResult<Value> {
    let text = match source {
        InputSource::File(path) => std::fs::read_to_string(path)
            .map_err(|e| CliError::Input(format!("failed to read {}: {e}", path.display())))?,
        InputSource::Inline(s) => s.clone(),
        InputSource::Stdin => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&text)?)
}
