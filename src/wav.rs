//! WAV adapter for the command line, based on `hound`.
//!
//! Only integer PCM at 8, 16 or 32 bits is accepted; the engine needs
//! exact integer samples to hide bits in. Anything else is reported as
//! [`StegoError::UnsupportedSampleFormat`].

use crate::error::{Result, StegoError};
use crate::sample::Sample;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Decoded samples, tagged by width
#[derive(Debug, Clone, PartialEq)]
pub enum PcmSamples {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
}

impl PcmSamples {
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::I8(s) => s.len(),
            Self::I16(s) => s.len(),
            Self::I32(s) => s.len(),
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            Self::I8(_) => i8::BITS,
            Self::I16(_) => i16::BITS,
            Self::I32(_) => i32::BITS,
        }
    }
}

/// A WAV file's format plus its interleaved samples
#[derive(Debug, Clone)]
pub struct PcmAudio {
    pub spec: WavSpec,
    pub samples: PcmSamples,
}

impl PcmAudio {
    pub fn channels(&self) -> usize {
        usize::from(self.spec.channels)
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        match self.channels() {
            0 => 0,
            channels => self.samples.len() / channels,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.spec.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.spec.sample_rate)
    }
}

pub fn read_wav(path: &Path) -> Result<PcmAudio> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int {
        return Err(StegoError::UnsupportedSampleFormat(format!(
            "{:?} samples in {}, only integer PCM is supported",
            spec.sample_format,
            path.display()
        )));
    }
    let samples = match spec.bits_per_sample {
        8 => PcmSamples::I8(collect_samples(&mut reader)?),
        16 => PcmSamples::I16(collect_samples(&mut reader)?),
        32 => PcmSamples::I32(collect_samples(&mut reader)?),
        bits => {
            return Err(StegoError::UnsupportedSampleFormat(format!(
                "{}-bit PCM in {}, expected 8, 16 or 32 bits",
                bits,
                path.display()
            )))
        }
    };
    log::debug!(
        "read {}: {} Hz, {} channel(s), {} samples",
        path.display(),
        spec.sample_rate,
        spec.channels,
        samples.len()
    );
    Ok(PcmAudio { spec, samples })
}

fn collect_samples<S, R>(reader: &mut WavReader<R>) -> Result<Vec<S>>
where
    S: hound::Sample,
    R: std::io::Read,
{
    let samples = reader
        .samples::<S>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(samples)
}

/// Write `samples` with the format of `spec`
pub fn write_wav<S>(path: &Path, spec: WavSpec, samples: &[S]) -> Result<()>
where
    S: Sample + hound::Sample,
{
    if u32::from(spec.bits_per_sample) != S::BITS {
        return Err(StegoError::UnsupportedSampleFormat(format!(
            "cannot write {}-bit samples into a {}-bit WAV",
            S::BITS,
            spec.bits_per_sample
        )));
    }
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
