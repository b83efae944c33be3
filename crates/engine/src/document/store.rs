//! Loading and writing the configuration document
//!
//! A missing document is bootstrapped from a template. Writes replace the
//! whole file atomically, so a failed pass never leaves a half-written
//! document behind.

use super::{CommentLedger, ConfigurationDocument};
use silverhook_core::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Template used when the document does not exist yet
pub const BUNDLED_TEMPLATE: &str = include_str!("../../resources/example.pantheon.yml");

/// Reads and writes one configuration document
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
    template: Option<PathBuf>,
}

impl DocumentStore {
    /// Create a store for the document at `path`
    ///
    /// `template` replaces the bundled template for bootstrapping.
    pub fn new(path: impl Into<PathBuf>, template: Option<PathBuf>) -> Self {
        Self {
            path: path.into(),
            template,
        }
    }

    /// Document path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the document exists on disk
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the document and its comments
    ///
    /// Falls back to the template when the document does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the document or template cannot be read or parsed
    pub fn load(&self) -> Result<(ConfigurationDocument, CommentLedger)> {
        let text = if self.exists() {
            read(&self.path)?
        } else if let Some(template) = &self.template {
            tracing::info!(
                "{} not found, starting from template {}",
                self.path.display(),
                template.display()
            );
            read(template)?
        } else {
            tracing::info!(
                "{} not found, starting from the bundled template",
                self.path.display()
            );
            BUNDLED_TEMPLATE.to_string()
        };

        let document = ConfigurationDocument::parse(&text, &self.path)?;
        let ledger = CommentLedger::collect(&text);
        tracing::debug!("Loaded {}", self.path.display());
        Ok((document, ledger))
    }

    /// Produce the text that [`DocumentStore::write`] would write
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn render(&self, document: &ConfigurationDocument, ledger: &CommentLedger) -> Result<String> {
        Ok(ledger.inject(&document.to_yaml()?))
    }

    /// Serialize and atomically replace the document on disk
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails; the
    /// previous file is left untouched in that case
    pub fn write(&self, document: &ConfigurationDocument, ledger: &CommentLedger) -> Result<()> {
        let text = self.render(document, ledger)?;
        let write_error = |source: std::io::Error| Error::DocumentWrite {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(write_error)?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(write_error)?;
        temp.write_all(text.as_bytes()).map_err(write_error)?;
        temp.as_file().sync_all().map_err(write_error)?;
        self.copy_permissions(&temp).map_err(write_error)?;
        temp.persist(&self.path).map_err(|e| write_error(e.error))?;

        tracing::info!("Wrote {}", self.path.display());
        Ok(())
    }

    /// Give the replacement file the permissions of the file it replaces
    fn copy_permissions(&self, temp: &NamedTempFile) -> std::io::Result<()> {
        if let Ok(metadata) = fs::metadata(&self.path) {
            return temp.as_file().set_permissions(metadata.permissions());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))?;
        }
        Ok(())
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::DocumentRead {
        path: path.to_path_buf(),
        source,
    })
}
