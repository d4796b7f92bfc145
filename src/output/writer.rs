// ABOUTME: Writes formatted output to stdout or a file
// ABOUTME: Creates parent directories for file destinations

use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use super::error::{OutputError, Result};

/// Write `content` to `destination`, or stdout when there is none
pub async fn write_output(content: &str, destination: Option<&Path>) -> Result<()> {
    let Some(path) = destination else {
        println!("{}", content);
        debug!("Output written to stdout ({} chars)", content.len());
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| OutputError::WriteError {
                message: format!("Failed to create directory {}: {}", parent.display(), e),
            })?;
    }

    fs::write(path, content)
        .await
        .map_err(|e| OutputError::WriteError {
            message: format!("Failed to write {}: {}", path.display(), e),
        })?;

    info!("Output written to {}", path.display());
    Ok(())
}
