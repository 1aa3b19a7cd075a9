use crate::cli::{format_size, sha256_hex};
use crate::error::Result;
use crate::extract::{ExtractResult, Extractor};
use crate::header::Placement;
use crate::wav::{read_wav, PcmSamples};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Options for the extract command
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractReport {
    pub output: String,
    pub original_file_name: String,
    pub file_size_bytes: usize,
    pub file_size: String,
    pub file_type: String,
    pub sha256: String,
    pub lsb_depth: u8,
    pub placement: Placement,
    pub encrypted: bool,
}

impl std::fmt::Display for ExtractReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Extracted {} to {}", self.original_file_name, self.output)?;
        writeln!(
            f,
            "  Size: {} ({} bytes), {}",
            self.file_size, self.file_size_bytes, self.file_type
        )?;
        writeln!(f, "  SHA-256: {}", self.sha256)?;
        writeln!(
            f,
            "  Layout: depth {}, {:?} placement, {}",
            self.lsb_depth,
            self.placement,
            if self.encrypted { "encrypted" } else { "plain" }
        )
    }
}

/// Reduce an embedded filename to a single safe path component
///
/// The name comes from the stego file and is untrusted: directory parts,
/// control characters and dot-only names are removed.
pub fn safe_file_name(name: &str) -> String {
    let base = name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or("");
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        "recovered.bin".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Recover the hidden file from `stego_path` into `out_dir`
pub fn extract_to_dir(
    stego_path: &Path,
    out_dir: &Path,
    options: &ExtractOptions,
) -> Result<ExtractReport> {
    let audio = read_wav(stego_path)?;
    let channels = audio.channels();
    let extractor = Extractor::new(options.password.as_deref());

    let result: ExtractResult = match &audio.samples {
        PcmSamples::I8(s) => extractor.extract(s, channels)?,
        PcmSamples::I16(s) => extractor.extract(s, channels)?,
        PcmSamples::I32(s) => extractor.extract(s, channels)?,
    };

    std::fs::create_dir_all(out_dir)?;
    let output: PathBuf = out_dir.join(safe_file_name(&result.filename));
    std::fs::write(&output, &result.bytes)?;

    Ok(ExtractReport {
        output: output.display().to_string(),
        original_file_name: result.filename.clone(),
        file_size_bytes: result.bytes.len(),
        file_size: format_size(result.bytes.len() as u64),
        file_type: result.file_type().to_string(),
        sha256: sha256_hex(&result.bytes),
        lsb_depth: result.lsb_depth,
        placement: result.placement,
        encrypted: result.encrypted,
    })
}
