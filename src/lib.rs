//! Bitify - LSB audio steganography engine
//!
//! Hides an arbitrary file in the least-significant bits of PCM audio
//! samples and recovers it with a shared password.
//!
//! ## Frame pipeline
//!
//! ```text
//! Secret → Frame (header + payload) → Cipher? → Bit planes along the position sequence → Stego samples
//! ```
//!
//! - **Frame**: magic marker, filename, length, LSB depth and cipher flag
//!   ahead of the payload, bit-packed big-endian
//! - **Cipher**: optional extended Vigenère over the whole frame with a
//!   SHA3 keystream (confidentiality only, no integrity tag)
//! - **Position sequence**: sequential, a password-derived random start,
//!   or a password-keyed permutation of every sample
//! - **Bit planes**: the `lsb_depth` lowest bits of each visited sample
//!
//! Extraction needs only the password; depth, placement and cipher are
//! discovered by probing for the magic marker.
//!
//! ## Example
//!
//! ```
//! use bitify::{embed, extract, Placement, StegoConfig};
//!
//! let cover: Vec<i16> = (0..50_000).map(|i| ((i * 31) % 2000) as i16 - 1000).collect();
//! let config = StegoConfig::new(2)
//!     .with_password("correct horse")
//!     .with_encryption(true)
//!     .with_placement(Placement::Scatter);
//!
//! let stego = embed(&cover, 1, b"meet at noon", "note.txt", &config).unwrap();
//! let secret = extract(&stego.stego_samples, 1, Some("correct horse")).unwrap();
//! assert_eq!(secret.bytes, b"meet at noon");
//! assert_eq!(secret.filename, "note.txt");
//! ```

pub mod cancel;
pub mod cli;
pub mod embed;
pub mod error;
pub mod extract;
pub mod header;
pub mod pipeline;
pub mod sample;
pub mod wav;

pub use cancel::CancelToken;
pub use embed::{embed, EmbedResult, Embedder};
pub use error::{Result, StegoError};
pub use extract::{extract, ExtractResult, Extractor};
pub use header::{PayloadHeader, Placement, StegoConfig};
pub use pipeline::capacity::estimate_capacity;
pub use pipeline::quality::{compute_psnr, QualityGrade};
pub use sample::Sample;
