//! Step output publishing
//!
//! Outputs are appended to the file named by `$GITHUB_OUTPUT` using the
//! multi-line `name<<DELIMITER` form, so values may contain newlines.

use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::IacError;
use crate::system::System;

pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

const DELIMITER_PREFIX: &str = "ghadelimiter_";

/// A delimiter line that does not occur in `value`
fn delimiter_for(value: &str) -> String {
    (0_u32..)
        .map(|n| format!("{DELIMITER_PREFIX}{n}"))
        .find(|candidate| !value.contains(candidate.as_str()))
        .unwrap_or_else(|| DELIMITER_PREFIX.to_owned())
}

/// One `name<<DELIM\nvalue\nDELIM\n` record
#[must_use]
pub fn format_output(name: &str, value: &str) -> String {
    let delimiter = delimiter_for(value);
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Write every output; logs them instead when not running under Actions
///
/// # Errors
///
/// Returns `IacError::System` if the output file cannot be appended to
pub fn publish_outputs(
    system: &dyn System,
    outputs: &IndexMap<String, String>,
) -> Result<(), IacError> {
    let Ok(path) = system.env_var(GITHUB_OUTPUT) else {
        for (name, value) in outputs {
            info!("{name}: {value}");
        }
        return Ok(());
    };

    let records: String = outputs
        .iter()
        .map(|(name, value)| format_output(name, value))
        .collect();

    system
        .append(Path::new(&path), &records)
        .map_err(|e| IacError::system(format!("Failed to write outputs to {path}: {e}")))?;
    debug!("Published {} outputs", outputs.len());
    Ok(())
}

/// `::error::` workflow command for `message`
///
/// Newlines and `%` are percent-encoded so the annotation stays on one line.
#[must_use]
pub fn error_annotation(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{escaped}")
}
