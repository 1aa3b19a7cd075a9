use crate::error::{Result, StegoError};
use crate::header::{MAX_LSB_DEPTH, MIN_LSB_DEPTH};
use crate::pipeline::capacity::estimate_capacity;
use crate::wav::read_wav;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthCapacity {
    pub lsb_depth: u8,
    pub capacity_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityReport {
    pub file: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub frames: usize,
    pub duration_secs: f64,
    pub capacities: Vec<DepthCapacity>,
}

impl std::fmt::Display for CapacityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cover: {}", self.file)?;
        writeln!(
            f,
            "  {} Hz, {} channel(s), {}-bit, {:.2} s ({} frames)",
            self.sample_rate, self.channels, self.bits_per_sample, self.duration_secs, self.frames
        )?;
        writeln!(f, "Capacity:")?;
        for entry in &self.capacities {
            writeln!(
                f,
                "  depth {}: {} ({} bytes)",
                entry.lsb_depth,
                super::format_size(entry.capacity_bytes as u64),
                entry.capacity_bytes
            )?;
        }
        Ok(())
    }
}

/// Capacity of a cover at one depth, or at every usable depth
pub fn show_capacity(path: &Path, lsb_depth: Option<u8>) -> Result<CapacityReport> {
    let audio = read_wav(path)?;
    let max_depth = MAX_LSB_DEPTH.min(u8::try_from(audio.samples.bits()).unwrap_or(u8::MAX));

    let depths = match lsb_depth {
        Some(depth) if (MIN_LSB_DEPTH..=max_depth).contains(&depth) => depth..=depth,
        Some(depth) => {
            return Err(StegoError::InvalidConfiguration(format!(
                "LSB depth {} is outside {}..={}",
                depth, MIN_LSB_DEPTH, max_depth
            )))
        }
        None => MIN_LSB_DEPTH..=max_depth,
    };

    let frames = audio.frames();
    let channels = audio.channels();
    let capacities = depths
        .map(|depth| DepthCapacity {
            lsb_depth: depth,
            capacity_bytes: estimate_capacity(frames, channels, depth),
        })
        .collect();

    Ok(CapacityReport {
        file: path.display().to_string(),
        sample_rate: audio.spec.sample_rate,
        channels: audio.spec.channels,
        bits_per_sample: audio.spec.bits_per_sample,
        frames,
        duration_secs: audio.duration_secs(),
        capacities,
    })
}
