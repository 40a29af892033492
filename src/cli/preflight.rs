//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and credentials are available before
//! starting work that would otherwise fail on its first API call.

use crate::error::{Result, SubtransError};
use crate::openai::api_key_from_env;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Translation requires an API key.
    Translate,
    /// Fetching captions requires yt-dlp.
    Fetch,
    /// Indexing and search require an API key for embeddings.
    Embed,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Translate | Operation::Embed => check_api_key()?,
        Operation::Fetch => check_tool("yt-dlp")?,
    }
    Ok(())
}

fn check_api_key() -> Result<()> {
    match api_key_from_env() {
        Some(_) => Ok(()),
        None => Err(SubtransError::Config(
            "OPENAI_API_KEY not set. Add it to .env or export OPENAI_API_KEY='sk-...'"
                .to_string(),
        )),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(SubtransError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SubtransError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(SubtransError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool() {
        assert!(matches!(
            check_tool("definitely-not-a-real-tool-subtrans"),
            Err(SubtransError::ToolNotFound(_))
        ));
    }
}
