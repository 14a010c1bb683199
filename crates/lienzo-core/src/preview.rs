use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::{Builder, NamedTempFile};

/// A client-local, revocable reference to a selected file's bytes.
///
/// The bytes are materialized into a named temporary file so a front end can
/// render them before any upload happens. Dropping the handle deletes the
/// backing file, so a replaced preview or a torn-down controller never leaks
/// the reference.
pub struct PreviewHandle {
    file: NamedTempFile,
}

impl PreviewHandle {
    /// Write `bytes` to a fresh temporary file, keeping the original
    /// extension so image viewers recognize the format.
    pub fn create(file_name: &str, bytes: &[u8]) -> Result<Self> {
        let suffix = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let mut file = Builder::new()
            .prefix("lienzo-preview-")
            .suffix(&suffix)
            .tempfile()
            .context("could not create preview file")?;
        file.as_file_mut()
            .write_all(bytes)
            .context("could not write preview bytes")?;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The reference handed to the presentation layer.
    pub fn uri(&self) -> String {
        format!("file://{}", self.file.path().display())
    }
}
