//! Extraction state machine.
//!
//! ```text
//! DeriveSequence → ReadHeaderBits → ValidateMagic → ReadLengthFields → ReadPayloadBits → Done
//! ```
//!
//! The stego buffer does not say how it was written, so every stage runs
//! once per probe: each placement, cipher setting and depth the password
//! allows, keyed layouts first. A probe commits when the magic marker shows
//! up with matching depth and cipher fields, and wins once its whole frame
//! reads back. The inverse cipher is applied while bits are read.
//!
//! A committed probe whose frame turns out damaged does not end the search;
//! the cover may carry stale frames or bits that happen to spell a header.
//! Only when no probe yields a complete frame is the first such damage
//! reported as [`StegoError::CorruptFrame`]. Without any marker the result
//! is [`StegoError::AuthenticationFailed`], whatever the cause.

use crate::cancel::CancelToken;
use crate::error::{Result, StegoError};
use crate::header::{PayloadHeader, Placement, MAX_LSB_DEPTH, MIN_LSB_DEPTH};
use crate::pipeline::bitplane::PlaneReader;
use crate::pipeline::cipher::DecipherReader;
use crate::pipeline::frame::{FrameExpectation, FrameReader};
use crate::pipeline::sequence::PositionSequence;
use crate::sample::{validate_layout, Sample};
use log::{debug, info};
use serde::Serialize;
use std::io::Read;

/// A recovered secret file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResult {
    pub filename: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub lsb_depth: u8,
    pub encrypted: bool,
    pub placement: Placement,
}

impl ExtractResult {
    /// MIME type guessed from the embedded filename's extension
    pub fn file_type(&self) -> &'static str {
        mime_for(&self.filename)
    }
}

fn mime_for(filename: &str) -> &'static str {
    let ext = match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return "application/octet-stream",
    };
    match ext.as_str() {
        "txt" | "log" | "md" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}

/// One candidate layout tried against the stego buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Probe {
    placement: Placement,
    encrypted: bool,
    depth: u8,
}

/// Recovers a secret file hidden by [`crate::Embedder`]
#[derive(Clone, Default)]
pub struct Extractor {
    password: Option<String>,
    cancel: Option<CancelToken>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl Extractor {
    /// An empty password counts as no password
    pub fn new(password: Option<&str>) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()).map(str::to_string),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn extract<S: Sample>(&self, stego: &[S], channels: usize) -> Result<ExtractResult> {
        validate_layout(stego.len(), channels)?;

        let mut damaged = None;
        for probe in self.probes::<S>() {
            self.check_cancel()?;
            let found = match self.try_probe(stego, probe) {
                Ok(found) => found,
                Err(StegoError::CorruptFrame(reason)) => {
                    debug!("{:?} found a damaged frame: {}", probe, reason);
                    if damaged.is_none() {
                        damaged = Some(StegoError::CorruptFrame(reason));
                    }
                    continue;
                }
                Err(e) => return Err(e),
            };
            if let Some((header, bytes)) = found {
                info!(
                    "extracted {} ({} bytes) at depth {} with {:?} placement",
                    header.filename,
                    bytes.len(),
                    header.lsb_depth,
                    probe.placement
                );
                return Ok(ExtractResult {
                    filename: header.filename,
                    bytes,
                    lsb_depth: header.lsb_depth,
                    encrypted: header.encrypted,
                    placement: probe.placement,
                });
            }
        }
        match damaged {
            Some(err) => Err(err),
            None => {
                debug!("no probe matched the frame marker");
                Err(StegoError::AuthenticationFailed)
            }
        }
    }

    /// Candidate layouts in the order they are tried
    ///
    /// Most specific first: a frame tied to the password outranks any
    /// unkeyed frame left in the cover by an earlier embed.
    fn probes<S: Sample>(&self) -> Vec<Probe> {
        // without a password only the unkeyed layout can exist
        let (placements, ciphers) = if self.password.is_some() {
            (
                vec![Placement::Scatter, Placement::RandomStart, Placement::Sequential],
                vec![true, false],
            )
        } else {
            (vec![Placement::Sequential], vec![false])
        };
        let max_depth = MAX_LSB_DEPTH.min(u8::try_from(S::BITS).unwrap_or(u8::MAX));

        let mut probes = Vec::new();
        for &placement in &placements {
            for &encrypted in &ciphers {
                for depth in MIN_LSB_DEPTH..=max_depth {
                    probes.push(Probe {
                        placement,
                        encrypted,
                        depth,
                    });
                }
            }
        }
        probes
    }

    fn try_probe<S: Sample>(
        &self,
        stego: &[S],
        probe: Probe,
    ) -> Result<Option<(PayloadHeader, Vec<u8>)>> {
        let password = self.password.as_deref().unwrap_or("").as_bytes();

        debug!("extract: DeriveSequence {:?}", probe);
        let positions = PositionSequence::for_password(probe.placement, password, stego.len());
        let plane =
            PlaneReader::new(stego, positions, probe.depth)?.with_cancel(self.cancel.clone());
        let expect = FrameExpectation {
            lsb_depth: probe.depth,
            encrypted: probe.encrypted,
            capacity_bits: stego.len() * usize::from(probe.depth),
        };

        if probe.encrypted {
            read_frame(FrameReader::new(DecipherReader::new(plane, password)), &expect)
        } else {
            read_frame(FrameReader::new(plane), &expect)
        }
    }

    fn check_cancel(&self) -> Result<()> {
        match &self.cancel {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }
}

fn read_frame<R: Read>(
    mut reader: FrameReader<R>,
    expect: &FrameExpectation,
) -> Result<Option<(PayloadHeader, Vec<u8>)>> {
    debug!("extract: ReadHeaderBits");
    let found = reader.read_magic()?;
    debug!("extract: ValidateMagic {}", if found { "hit" } else { "miss" });
    if !found {
        return Ok(None);
    }

    debug!("extract: ReadLengthFields");
    let header = match reader.read_header(expect)? {
        Some(header) => header,
        None => {
            debug!("magic matched but header fields disagree with the probe");
            return Ok(None);
        }
    };

    debug!("extract: ReadPayloadBits ({} bytes)", header.payload_len);
    let payload = reader.read_payload(&header)?;
    debug!("extract: Done");
    Ok(Some((header, payload)))
}

/// One-shot extract; pass `None` or `""` when no password was used
pub fn extract<S: Sample>(
    stego: &[S],
    channels: usize,
    password: Option<&str>,
) -> Result<ExtractResult> {
    Extractor::new(password).extract(stego, channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::embed;
    use crate::header::StegoConfig;

    fn noise(len: usize) -> Vec<i16> {
        (0..len)
            .map(|i| ((i as i64 * 104_729 % 30_011) - 15_005) as i16)
            .collect()
    }

    #[test]
    fn test_probe_order() {
        let without = Extractor::new(None).probes::<i16>();
        assert_eq!(without.len(), 8);
        assert!(without.iter().all(|p| p.placement == Placement::Sequential && !p.encrypted));

        let with = Extractor::new(Some("pw")).probes::<i16>();
        assert_eq!(with.len(), 3 * 2 * 8);
        assert_eq!(
            with[0],
            Probe {
                placement: Placement::Scatter,
                encrypted: true,
                depth: 1
            }
        );
        assert_eq!(
            with.last().copied(),
            Some(Probe {
                placement: Placement::Sequential,
                encrypted: false,
                depth: 8
            })
        );
    }

    #[test]
    fn test_empty_password_is_none() {
        assert_eq!(Extractor::new(Some("")).probes::<i16>().len(), 8);
    }

    #[test]
    fn test_roundtrip_reports_layout() {
        let cover = noise(30_000);
        let config = StegoConfig::new(3)
            .with_password("k3y")
            .with_encryption(true)
            .with_placement(Placement::RandomStart);
        let stego = embed(&cover, 1, b"layout", "l.txt", &config).unwrap();

        let result = extract(&stego.stego_samples, 1, Some("k3y")).unwrap();
        assert_eq!(result.bytes, b"layout");
        assert_eq!(result.filename, "l.txt");
        assert_eq!(result.lsb_depth, 3);
        assert!(result.encrypted);
        assert_eq!(result.placement, Placement::RandomStart);
        assert_eq!(result.file_type(), "text/plain");
    }

    #[test]
    fn test_clean_cover_fails_authentication() {
        let cover = noise(30_000);
        assert!(matches!(
            extract(&cover, 1, Some("anything")),
            Err(StegoError::AuthenticationFailed)
        ));
        assert!(matches!(
            extract(&cover, 1, None),
            Err(StegoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_tiny_buffer_fails_authentication() {
        let tiny = vec![0i16; 3];
        assert!(matches!(
            extract(&tiny, 1, None),
            Err(StegoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_for("photo.JPG"), "image/jpeg");
        assert_eq!(mime_for("archive.tar.zip"), "application/zip");
        assert_eq!(mime_for("README"), "application/octet-stream");
    }

    #[test]
    fn test_debug_redacts_password() {
        let extractor = Extractor::new(Some("swordfish"));
        assert!(!format!("{:?}", extractor).contains("swordfish"));
    }
}
