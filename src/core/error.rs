use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire installer backend.
/// Every module returns `Result<T, InstallerError>`.
#[derive(Debug, Error)]
pub enum InstallerError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("{algorithm} mismatch for {path:?}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        algorithm: &'static str,
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Loader ──────────────────────────────────────────
    #[error("Fabric installer failed (exit status {status:?}): {stderr}")]
    LoaderInstall {
        status: Option<i32>,
        stderr: String,
    },

    // ── Environment ─────────────────────────────────────
    #[error("Could not resolve the Minecraft directory on this platform")]
    MinecraftDirUnresolved,

    // ── Batch contract ──────────────────────────────────
    // One or more mods had no acceptable build; everything downloaded in
    // the same run has already been rolled back when this is returned.
    #[error("mods unavailable for this Minecraft version: {}", .mods.join(", "))]
    ModsUnavailable { mods: Vec<String> },

    #[error("Installation cancelled")]
    Cancelled,

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type InstallerResult<T> = Result<T, InstallerError>;

impl From<std::io::Error> for InstallerError {
    fn from(source: std::io::Error) -> Self {
        InstallerError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
