use crate::error::{Result, StegoError};
use crate::sample::Sample;
use serde::{Deserialize, Serialize};

/// Frame magic marker, first 16 bits of every payload frame (format v1)
pub const MAGIC: u16 = 0xB17F;

/// Longest filename the 8-bit length prefix can describe
pub const MAX_FILENAME_BYTES: usize = 255;

/// magic (16) + filename length (8) + payload length (32) + LSB depth (4) + encrypted flag (1)
pub const HEADER_FIXED_BITS: usize = 16 + 8 + 32 + 4 + 1;

/// Worst-case serialized header size, assuming a filename of maximal length.
/// 61 + 255 * 8 = 2101 bits, rounded up to 263 bytes.
pub const HEADER_OVERHEAD_BYTES: usize = (HEADER_FIXED_BITS + MAX_FILENAME_BYTES * 8 + 7) / 8;

pub const MIN_LSB_DEPTH: u8 = 1;
pub const MAX_LSB_DEPTH: u8 = 8;

/// How sample positions are ordered for bit placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// Samples 0..n in order
    #[default]
    Sequential,
    /// Sequential scan from a password-derived offset, wrapping around
    RandomStart,
    /// Password-keyed pseudo-random permutation of all samples
    Scatter,
}

impl Placement {
    /// Whether this placement needs a password-derived seed
    pub fn is_keyed(&self) -> bool {
        !matches!(self, Self::Sequential)
    }
}

impl std::str::FromStr for Placement {
    type Err = StegoError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "random-start" | "randomstart" | "random" => Ok(Self::RandomStart),
            "scatter" | "permute" => Ok(Self::Scatter),
            _ => Err(StegoError::UnsupportedAlgorithm(format!(
                "placement: {}",
                s
            ))),
        }
    }
}

/// Embedding configuration
///
/// The password is never serialized, so a config file can be shared
/// without leaking the stego key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    /// Number of low-order bits used per sample (1..=8)
    pub lsb_depth: u8,
    /// Encipher the whole frame with the password-derived keystream
    pub use_encryption: bool,
    /// Start embedding at a password-derived sample instead of sample 0
    pub use_random_start: bool,
    /// With `use_random_start`, permute every position instead of only
    /// picking a start offset
    pub scatter: bool,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            lsb_depth: 2,
            use_encryption: false,
            use_random_start: false,
            scatter: false,
            password: String::new(),
        }
    }
}

impl std::fmt::Debug for StegoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StegoConfig")
            .field("lsb_depth", &self.lsb_depth)
            .field("use_encryption", &self.use_encryption)
            .field("use_random_start", &self.use_random_start)
            .field("scatter", &self.scatter)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl StegoConfig {
    pub fn new(lsb_depth: u8) -> Self {
        Self {
            lsb_depth,
            ..Default::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_encryption(mut self, enabled: bool) -> Self {
        self.use_encryption = enabled;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.use_random_start = placement.is_keyed();
        self.scatter = placement == Placement::Scatter;
        self
    }

    /// Placement implied by the random-start and scatter flags
    pub fn placement(&self) -> Placement {
        match (self.use_random_start, self.scatter) {
            (false, _) => Placement::Sequential,
            (true, false) => Placement::RandomStart,
            (true, true) => Placement::Scatter,
        }
    }

    /// Validate everything that does not depend on the sample type
    pub fn validate(&self) -> Result<()> {
        if self.lsb_depth < MIN_LSB_DEPTH || self.lsb_depth > MAX_LSB_DEPTH {
            return Err(StegoError::InvalidConfiguration(format!(
                "LSB depth {} is outside {}..={}",
                self.lsb_depth, MIN_LSB_DEPTH, MAX_LSB_DEPTH
            )));
        }
        if self.scatter && !self.use_random_start {
            return Err(StegoError::InvalidConfiguration(
                "scatter placement requires random start".into(),
            ));
        }
        if (self.use_encryption || self.use_random_start) && self.password.is_empty() {
            return Err(StegoError::InvalidConfiguration(
                "a password is required for encryption or random start".into(),
            ));
        }
        Ok(())
    }

    /// Validate against a concrete sample type
    pub fn validate_for<S: Sample>(&self) -> Result<()> {
        self.validate()?;
        if u32::from(self.lsb_depth) > S::BITS {
            return Err(StegoError::InvalidConfiguration(format!(
                "LSB depth {} exceeds the {}-bit sample width",
                self.lsb_depth,
                S::BITS
            )));
        }
        Ok(())
    }
}

/// Metadata framed in front of the secret bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadHeader {
    pub filename: String,
    pub payload_len: u32,
    pub lsb_depth: u8,
    pub encrypted: bool,
}

impl PayloadHeader {
    pub fn new(filename: &str, payload_len: usize, lsb_depth: u8, encrypted: bool) -> Result<Self> {
        validate_filename(filename)?;
        let payload_len = u32::try_from(payload_len).map_err(|_| StegoError::CapacityExceeded {
            required: payload_len,
            available: u32::MAX as usize,
        })?;
        if lsb_depth < MIN_LSB_DEPTH || lsb_depth > MAX_LSB_DEPTH {
            return Err(StegoError::InvalidConfiguration(format!(
                "LSB depth {} is outside {}..={}",
                lsb_depth, MIN_LSB_DEPTH, MAX_LSB_DEPTH
            )));
        }
        Ok(Self {
            filename: filename.to_string(),
            payload_len,
            lsb_depth,
            encrypted,
        })
    }
}

/// A filename must be non-empty UTF-8 that fits the 8-bit length prefix
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty() {
        return Err(StegoError::InvalidFileName("filename is empty".into()));
    }
    if filename.len() > MAX_FILENAME_BYTES {
        return Err(StegoError::InvalidFileName(format!(
            "filename is {} bytes, at most {} are allowed",
            filename.len(),
            MAX_FILENAME_BYTES
        )));
    }
    Ok(())
}
