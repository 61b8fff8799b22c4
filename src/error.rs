use thiserror::Error;

/// Main error type for the subtitle sync pipeline
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("External tool not available: {tool}")]
    ToolUnavailable { tool: String },

    #[error("External tool {tool} failed: {reason}")]
    ToolFailure { tool: String, reason: String },

    #[error("External tool {tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("Sync task aborted: {0}")]
    Aborted(String),

    #[error("Subtitle document contains no parseable cues")]
    EmptyDocument,

    #[error("Invalid hex input: {0}")]
    InvalidHex(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// True for failures of an external tool (missing, crashed or timed out)
    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            SyncError::ToolUnavailable { .. }
                | SyncError::ToolFailure { .. }
                | SyncError::Timeout { .. }
        )
    }
}

impl From<hex::FromHexError> for SyncError {
    fn from(err: hex::FromHexError) -> Self {
        SyncError::InvalidHex(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SyncError>;
