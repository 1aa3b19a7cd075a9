use crate::cli::{finite, format_psnr, format_size, sha256_hex};
use crate::embed::Embedder;
use crate::error::{Result, StegoError};
use crate::header::{Placement, StegoConfig};
use crate::sample::Sample;
use crate::wav::{read_wav, write_wav, PcmSamples};
use hound::WavSpec;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Options for the embed command
///
/// Fields left as `None` fall back to the config file, then to
/// [`StegoConfig::default`].
#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    pub password: String,
    pub lsb_depth: Option<u8>,
    pub encrypt: bool,
    pub placement: Option<Placement>,
    pub config_file: Option<PathBuf>,
}

impl EmbedOptions {
    /// Merge the config file (if any) with explicit flags
    ///
    /// An empty `password` keeps whatever the config file supplies.
    pub fn resolve(&self) -> Result<StegoConfig> {
        let mut config = match &self.config_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_json::from_str::<StegoConfig>(&text)?
            }
            None => StegoConfig::default(),
        };
        if let Some(depth) = self.lsb_depth {
            config.lsb_depth = depth;
        }
        if self.encrypt {
            config.use_encryption = true;
        }
        if let Some(placement) = self.placement {
            config = config.with_placement(placement);
        }
        if !self.password.is_empty() {
            config.password = self.password.clone();
        }
        Ok(config)
    }
}

/// What the embed command reports, field names as the web API uses them
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedReport {
    pub output: String,
    pub original_file_name: String,
    pub file_size_bytes: usize,
    pub file_size: String,
    pub sha256: String,
    pub lsb_depth: u8,
    pub placement: Placement,
    pub encrypted: bool,
    pub psnr: Option<f64>,
    pub quality_score: f64,
    pub quality: String,
    pub capacity_bytes: usize,
    pub frame_bytes: usize,
    pub samples_touched: usize,
    pub coverage: f64,
}

impl std::fmt::Display for EmbedReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Embedded {} into {}", self.original_file_name, self.output)?;
        writeln!(f, "  Secret: {} ({} bytes)", self.file_size, self.file_size_bytes)?;
        writeln!(f, "  SHA-256: {}", self.sha256)?;
        writeln!(
            f,
            "  Layout: depth {}, {:?} placement, {}",
            self.lsb_depth,
            self.placement,
            if self.encrypted { "encrypted" } else { "plain" }
        )?;
        writeln!(
            f,
            "  Capacity used: {} of {} bytes ({} samples touched, {:.2}% of the cover)",
            self.file_size_bytes,
            self.capacity_bytes,
            self.samples_touched,
            self.coverage * 100.0
        )?;
        writeln!(
            f,
            "  PSNR: {} ({}, score {:.0})",
            self.psnr.map_or_else(|| format_psnr(f64::INFINITY), format_psnr),
            self.quality,
            self.quality_score
        )
    }
}

/// `cover.wav` -> `cover.stego.wav`, next to the cover
pub fn default_output_path(cover_path: &Path) -> PathBuf {
    let stem = cover_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cover".to_string());
    cover_path.with_file_name(format!("{}.stego.wav", stem))
}

/// Hide `secret_path` in `cover_path` and write the stego WAV to `output_path`
pub fn embed_file(
    cover_path: &Path,
    secret_path: &Path,
    output_path: &Path,
    options: &EmbedOptions,
) -> Result<EmbedReport> {
    let config = options.resolve()?;
    config.validate()?;

    let secret = std::fs::read(secret_path)?;
    let filename = secret_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            StegoError::InvalidFileName(format!("{} has no file name", secret_path.display()))
        })?;

    let audio = read_wav(cover_path)?;
    let channels = audio.channels();
    let embedder = Embedder::new(config);
    let stats = match &audio.samples {
        PcmSamples::I8(s) => embed_typed(
            &embedder,
            s,
            audio.spec,
            channels,
            &secret,
            &filename,
            output_path,
        )?,
        PcmSamples::I16(s) => embed_typed(
            &embedder,
            s,
            audio.spec,
            channels,
            &secret,
            &filename,
            output_path,
        )?,
        PcmSamples::I32(s) => embed_typed(
            &embedder,
            s,
            audio.spec,
            channels,
            &secret,
            &filename,
            output_path,
        )?,
    };

    let config = embedder.config();
    Ok(EmbedReport {
        output: output_path.display().to_string(),
        original_file_name: filename,
        file_size_bytes: secret.len(),
        file_size: format_size(secret.len() as u64),
        sha256: sha256_hex(&secret),
        lsb_depth: config.lsb_depth,
        placement: config.placement(),
        encrypted: config.use_encryption,
        psnr: finite(stats.psnr_db),
        quality_score: stats.quality_score,
        quality: stats.grade,
        capacity_bytes: stats.capacity_bytes,
        frame_bytes: stats.frame_bytes,
        samples_touched: stats.samples_touched,
        coverage: stats.coverage,
    })
}

struct EmbedStats {
    psnr_db: f64,
    quality_score: f64,
    grade: String,
    capacity_bytes: usize,
    frame_bytes: usize,
    samples_touched: usize,
    coverage: f64,
}

fn embed_typed<S>(
    embedder: &Embedder,
    samples: &[S],
    spec: WavSpec,
    channels: usize,
    secret: &[u8],
    filename: &str,
    output_path: &Path,
) -> Result<EmbedStats>
where
    S: Sample + hound::Sample,
{
    let result = embedder.embed(samples, channels, secret, filename)?;
    write_wav(output_path, spec, &result.stego_samples)?;
    Ok(EmbedStats {
        psnr_db: result.psnr_db,
        quality_score: result.quality_score(),
        grade: result.grade().to_string(),
        capacity_bytes: result.capacity_bytes,
        frame_bytes: result.frame_bytes,
        samples_touched: result.samples_touched,
        coverage: result.coverage(),
    })
}
