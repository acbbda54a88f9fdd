//! Form-session persistence between CLI invocations.
//!
//! The original form page kept its fields alive between button presses
//! because the page stayed open. A CLI process exits after every
//! operation, so the form state is written to a small JSON file in the
//! standard configuration directory (`~/.config/suppliers/session.json`
//! on most platforms) and read back on the next invocation.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use suppliers_form::FormFields;
use thiserror::Error;
use tracing::warn;

/// Environment variable allowing callers to override the session file path.
pub const SESSION_PATH_ENV: &str = "SUPPLIERS_SESSION_PATH";

/// Default filename for the JSON payload.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Error surfaced when reading or writing the session fails.
#[derive(Debug, Error)]
pub enum SessionError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// JSON-backed store for the form fields.
#[derive(Debug)]
pub struct FormSession {
    path: PathBuf,
    form: FormFields,
    persist_to_disk: bool,
}

impl FormSession {
    /// Open the session at the default (or overridden) path. An unreadable
    /// file degrades to an in-memory session rather than aborting.
    pub fn open() -> Self {
        let path = default_session_path();
        match load_form(&path) {
            Ok(form) => Self {
                path,
                form,
                persist_to_disk: true,
            },
            Err(error) => {
                warn!(error = %error, "Failed to open form session; using an in-memory form");
                Self::ephemeral()
            }
        }
    }

    /// In-memory session used as a fallback when the config directory
    /// cannot be accessed.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            form: FormFields::default(),
            persist_to_disk: false,
        }
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The form state recorded by the previous invocation.
    pub fn form(&self) -> FormFields {
        self.form.clone()
    }

    /// Persist the latest form state.
    pub fn store(&self, form: &FormFields) -> Result<(), SessionError> {
        if !self.persist_to_disk {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(form)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn default_session_path() -> PathBuf {
    if let Ok(path) = env::var(SESSION_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("suppliers")
        .join(SESSION_FILE_NAME)
}

fn load_form(path: &Path) -> Result<FormFields, SessionError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(form) => Ok(form),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse session file; starting from an empty form"
                );
                Ok(FormFields::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(FormFields::default()),
        Err(error) => Err(SessionError::Io(error)),
    }
}
