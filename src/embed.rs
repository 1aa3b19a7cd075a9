//! Embedding state machine.
//!
//! ```text
//! Validate → ValidateCapacity → DeriveSequence → SerializeFrame → ApplyCipher? → WriteBits → ComputeQuality → Done
//! ```
//!
//! The cipher covers the packed frame, magic included, so it runs right
//! after serialization. The caller's cover is never touched: bits are
//! written into a fresh copy which is returned in [`EmbedResult`].

use crate::cancel::CancelToken;
use crate::error::{Result, StegoError};
use crate::header::{validate_filename, PayloadHeader, StegoConfig};
use crate::pipeline::capacity::{estimate_capacity, frame_len};
use crate::pipeline::cipher::encipher;
use crate::pipeline::frame::serialize_frame;
use crate::pipeline::quality::{compute_psnr, quality_score, QualityGrade};
use crate::pipeline::sequence::PositionSequence;
use crate::pipeline::bitplane::PlaneWriter;
use crate::sample::{validate_layout, Sample};
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Validate,
    ValidateCapacity,
    DeriveSequence,
    SerializeFrame,
    ApplyCipher,
    WriteBits,
    ComputeQuality,
    Done,
}

/// Outcome of a successful embed
#[derive(Debug, Clone)]
pub struct EmbedResult<S> {
    /// Cover samples with the frame written into their low bits
    pub stego_samples: Vec<S>,
    /// PSNR of the stego buffer against the cover, `+inf` if unchanged
    pub psnr_db: f64,
    /// Largest secret this cover could take at the configured depth
    pub capacity_bytes: usize,
    /// Bytes actually written, header and padding included
    pub frame_bytes: usize,
    /// Number of samples whose low bits were rewritten
    pub samples_touched: usize,
}

impl<S> EmbedResult<S> {
    pub fn grade(&self) -> QualityGrade {
        QualityGrade::from_psnr(self.psnr_db)
    }

    pub fn quality_score(&self) -> f64 {
        quality_score(self.psnr_db)
    }

    /// Share of the cover's samples that carry frame bits, 0.0..=1.0
    pub fn coverage(&self) -> f64 {
        if self.stego_samples.is_empty() {
            return 0.0;
        }
        self.samples_touched as f64 / self.stego_samples.len() as f64
    }
}

/// Hides a secret file in a PCM sample buffer
#[derive(Debug, Clone)]
pub struct Embedder {
    config: StegoConfig,
    cancel: Option<CancelToken>,
}

impl Embedder {
    pub fn new(config: StegoConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Abort between sample batches once `token` is cancelled
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &StegoConfig {
        &self.config
    }

    /// Embed `secret` under `filename` into an interleaved `cover` buffer
    pub fn embed<S: Sample>(
        &self,
        cover: &[S],
        channels: usize,
        secret: &[u8],
        filename: &str,
    ) -> Result<EmbedResult<S>> {
        let config = &self.config;
        let depth = config.lsb_depth;

        self.enter(Stage::Validate)?;
        config.validate_for::<S>()?;
        validate_filename(filename)?;
        let frames = validate_layout(cover.len(), channels)?;

        self.enter(Stage::ValidateCapacity)?;
        let capacity_bytes = estimate_capacity(frames, channels, depth);
        if secret.len() > capacity_bytes {
            warn!(
                "secret of {} bytes exceeds capacity of {} bytes at depth {}",
                secret.len(),
                capacity_bytes,
                depth
            );
            return Err(StegoError::CapacityExceeded {
                required: secret.len(),
                available: capacity_bytes,
            });
        }

        self.enter(Stage::DeriveSequence)?;
        let placement = config.placement();
        let positions =
            PositionSequence::for_password(placement, config.password.as_bytes(), cover.len());
        debug!("placement {:?} over {} samples", placement, cover.len());

        self.enter(Stage::SerializeFrame)?;
        let header = PayloadHeader::new(filename, secret.len(), depth, config.use_encryption)?;
        let mut frame = serialize_frame(&header, secret)?;
        debug_assert_eq!(frame.len(), frame_len(filename.len(), secret.len()));

        if config.use_encryption {
            self.enter(Stage::ApplyCipher)?;
            encipher(&mut frame, config.password.as_bytes());
        }

        self.enter(Stage::WriteBits)?;
        let mut stego_samples = cover.to_vec();
        let samples_touched = {
            let mut writer = PlaneWriter::new(&mut stego_samples, positions, depth)?
                .with_cancel(self.cancel.clone());
            writer.write_bytes(&frame)?;
            writer.finish()?
        };

        self.enter(Stage::ComputeQuality)?;
        let psnr_db = compute_psnr(cover, &stego_samples)?;

        self.enter(Stage::Done)?;
        info!(
            "embedded {} ({} bytes) in {} of {} samples, PSNR {:.2} dB",
            filename,
            secret.len(),
            samples_touched,
            cover.len(),
            psnr_db
        );

        Ok(EmbedResult {
            stego_samples,
            psnr_db,
            capacity_bytes,
            frame_bytes: frame.len(),
            samples_touched,
        })
    }

    fn enter(&self, stage: Stage) -> Result<()> {
        debug!("embed: {:?}", stage);
        if let Some(token) = &self.cancel {
            token.check()?;
        }
        Ok(())
    }
}

/// One-shot embed with a borrowed configuration
pub fn embed<S: Sample>(
    cover: &[S],
    channels: usize,
    secret: &[u8],
    filename: &str,
    config: &StegoConfig,
) -> Result<EmbedResult<S>> {
    Embedder::new(config.clone()).embed(cover, channels, secret, filename)
}
