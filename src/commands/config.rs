//! Configuration file editor command.
//!
//! Opens the scrubwave configuration file in the user's preferred editor,
//! creating it from the default template first if needed.

use crate::config::file::ensure_config_file;
use crate::config::get_config_path;
use std::process::Command;

/// Opens the configuration file in the user's editor.
///
/// Tries editors in this order: `$EDITOR`, nano, vi.
///
/// # Errors
/// - If the config file cannot be created
/// - If no editor can be found or executed
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    if ensure_config_file(&config_path)? {
        tracing::info!("Created default config at {}", config_path.display());
    }

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor(std::env::var("EDITOR").ok())?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Picks `$EDITOR` when set, else the first of nano/vi on the PATH.
fn find_editor(env_editor: Option<String>) -> anyhow::Result<String> {
    if let Some(editor) = env_editor.filter(|e| !e.trim().is_empty()) {
        return Ok(editor);
    }

    ["nano", "vi"]
        .into_iter()
        .find(|editor| is_editor_available(editor))
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No editor found. Please set the $EDITOR environment variable."))
}

fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_from_environment_wins() {
        assert_eq!(find_editor(Some("hx".to_string())).unwrap(), "hx");
    }

    #[test]
    fn test_blank_editor_variable_is_ignored() {
        // falls through to PATH lookup, which may or may not find nano/vi
        if let Ok(editor) = find_editor(Some("  ".to_string())) {
            assert!(editor == "nano" || editor == "vi");
        }
    }
}
