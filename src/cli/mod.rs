pub mod capacity;
pub mod embed;
pub mod extract;
pub mod psnr;

pub use capacity::*;
pub use embed::*;
pub use extract::*;
pub use psnr::*;

use sha2::{Digest, Sha256};

/// Human readable byte count
pub(crate) fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// JSON has no infinity; identical audio is reported as `null`
pub(crate) fn finite(psnr_db: f64) -> Option<f64> {
    psnr_db.is_finite().then_some(psnr_db)
}

pub(crate) fn format_psnr(psnr_db: f64) -> String {
    if psnr_db.is_finite() {
        format!("{:.2} dB", psnr_db)
    } else {
        "inf (identical)".to_string()
    }
}
