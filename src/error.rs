use thiserror::Error;

#[derive(Error, Debug)]
pub enum StegoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Secret too large for the cover at the requested LSB depth
    #[error(
        "Capacity exceeded: secret needs {required} bytes but the cover holds at most {available} bytes"
    )]
    CapacityExceeded { required: usize, available: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Wrong password, not a stego file, or corrupted beyond the magic marker.
    /// The cases are deliberately indistinguishable.
    #[error("Authentication failed: wrong password or no hidden payload")]
    AuthenticationFailed,

    #[error("Corrupt frame: {0}")]
    CorruptFrame(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("Buffer length mismatch: original has {original} samples, modified has {modified}")]
    LengthMismatch { original: usize, modified: usize },

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, StegoError>;
