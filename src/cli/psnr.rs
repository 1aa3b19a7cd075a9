use crate::cli::{finite, format_psnr};
use crate::error::{Result, StegoError};
use crate::pipeline::quality::{compute_psnr, quality_score, QualityGrade};
use crate::wav::{read_wav, PcmSamples};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PsnrReport {
    /// `None` when the files are sample-for-sample identical
    pub psnr: Option<f64>,
    pub quality_score: f64,
    pub quality: QualityGrade,
    pub samples: usize,
}

impl std::fmt::Display for PsnrReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let psnr = self.psnr.unwrap_or(f64::INFINITY);
        writeln!(f, "PSNR: {}", format_psnr(psnr))?;
        writeln!(f, "Quality: {} (score {:.0})", self.quality, self.quality_score)?;
        writeln!(f, "Samples compared: {}", self.samples)
    }
}

/// PSNR of `modified_path` against `original_path`
pub fn compare_files(original_path: &Path, modified_path: &Path) -> Result<PsnrReport> {
    let original = read_wav(original_path)?;
    let modified = read_wav(modified_path)?;
    if original.spec.channels != modified.spec.channels {
        return Err(StegoError::UnsupportedSampleFormat(format!(
            "channel counts differ ({} vs {})",
            original.spec.channels, modified.spec.channels
        )));
    }

    let psnr_db = match (&original.samples, &modified.samples) {
        (PcmSamples::I8(a), PcmSamples::I8(b)) => compute_psnr(a, b)?,
        (PcmSamples::I16(a), PcmSamples::I16(b)) => compute_psnr(a, b)?,
        (PcmSamples::I32(a), PcmSamples::I32(b)) => compute_psnr(a, b)?,
        (a, b) => {
            return Err(StegoError::UnsupportedSampleFormat(format!(
                "sample widths differ ({}-bit vs {}-bit)",
                a.bits(),
                b.bits()
            )))
        }
    };

    Ok(PsnrReport {
        psnr: finite(psnr_db),
        quality_score: quality_score(psnr_db),
        quality: QualityGrade::from_psnr(psnr_db),
        samples: original.samples.len(),
    })
}
