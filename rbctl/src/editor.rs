use std::io::Write;
use std::process::Command;

use anyhow::Context;

const DEFAULT_EDITOR: &str = "vi";

/// `$EDITOR`, or `vi` when unset.
pub fn editor_command() -> String {
    std::env::var("EDITOR")
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

/// Lets the user edit `text` and returns the saved contents.
pub fn edit(text: &str) -> anyhow::Result<String> {
    edit_with(&editor_command(), text)
}

pub fn edit_with(editor: &str, text: &str) -> anyhow::Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("rbctl-")
        .suffix(".yaml")
        .tempfile()
        .context("Failed to create temporary file")?;

    file.write_all(text.as_bytes())?;
    file.flush()?;

    // editors are commonly configured with arguments, e.g. "code --wait"
    let mut parts = editor.split_whitespace();
    let program = parts.next().context("Editor command is empty")?;

    tracing::debug!("Opening {} with {}", file.path().display(), editor);

    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to start editor '{}'", editor))?;

    if !status.success() {
        anyhow::bail!("Editor '{}' exited with {}", editor, status);
    }

    std::fs::read_to_string(file.path()).context("Failed to read edited document")
}
