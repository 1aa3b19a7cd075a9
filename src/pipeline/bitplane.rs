use crate::cancel::{CancelToken, CANCEL_CHECK_INTERVAL};
use crate::error::{Result, StegoError};
use crate::header::{MAX_LSB_DEPTH, MIN_LSB_DEPTH};
use crate::sample::Sample;
use std::io::{self, Read};

fn low_mask(depth: u8) -> u32 {
    (1u32 << depth) - 1
}

/// Reject depths outside 1..=8 or wider than the sample itself
pub fn check_depth<S: Sample>(depth: u8) -> Result<()> {
    if depth < MIN_LSB_DEPTH || depth > MAX_LSB_DEPTH || u32::from(depth) > S::BITS {
        return Err(StegoError::InvalidConfiguration(format!(
            "LSB depth {} is not usable with {}-bit samples",
            depth,
            S::BITS
        )));
    }
    Ok(())
}

/// Overwrite the `depth` lowest bits of `buffer[index]` with `value`
/// All higher bits, including the sign, are preserved exactly
pub fn write_bits<S: Sample>(buffer: &mut [S], index: usize, depth: u8, value: u32) -> Result<()> {
    check_depth::<S>(depth)?;
    let mask = low_mask(depth);
    if value > mask {
        return Err(StegoError::InvalidConfiguration(format!(
            "value {:#x} does not fit in {} bits",
            value, depth
        )));
    }
    let len = buffer.len();
    let sample = buffer.get_mut(index).ok_or_else(|| {
        StegoError::InvalidConfiguration(format!(
            "sample index {} out of range for {} samples",
            index, len
        ))
    })?;
    *sample = S::from_raw((sample.to_raw() & !mask) | value);
    Ok(())
}

/// Read the `depth` lowest bits of `buffer[index]` as an unsigned value
pub fn read_bits<S: Sample>(buffer: &[S], index: usize, depth: u8) -> Result<u32> {
    check_depth::<S>(depth)?;
    let sample = buffer.get(index).ok_or_else(|| {
        StegoError::InvalidConfiguration(format!(
            "sample index {} out of range for {} samples",
            index,
            buffer.len()
        ))
    })?;
    Ok(sample.to_raw() & low_mask(depth))
}

/// Streams bytes into the bit planes of the samples named by `positions`
///
/// Bytes are consumed MSB first; each visited sample receives the next
/// `depth` bits, the earliest bit landing in the highest of those bits.
pub struct PlaneWriter<'a, S, I> {
    samples: &'a mut [S],
    positions: I,
    depth: u8,
    acc: u32,
    acc_bits: u8,
    touched: usize,
    cancel: Option<CancelToken>,
}

impl<'a, S, I> PlaneWriter<'a, S, I>
where
    S: Sample,
    I: Iterator<Item = usize>,
{
    pub fn new(samples: &'a mut [S], positions: I, depth: u8) -> Result<Self> {
        check_depth::<S>(depth)?;
        Ok(Self {
            samples,
            positions,
            depth,
            acc: 0,
            acc_bits: 0,
            touched: 0,
            cancel: None,
        })
    }

    pub fn with_cancel(mut self, token: Option<CancelToken>) -> Self {
        self.cancel = token;
        self
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            for shift in (0..8).rev() {
                self.push_bit((byte >> shift) & 1 == 1)?;
            }
        }
        Ok(())
    }

    fn push_bit(&mut self, bit: bool) -> Result<()> {
        self.acc = (self.acc << 1) | u32::from(bit);
        self.acc_bits += 1;
        if self.acc_bits == self.depth {
            self.emit()?;
        }
        Ok(())
    }

    fn emit(&mut self) -> Result<()> {
        let index = self.positions.next().ok_or(StegoError::CapacityExceeded {
            required: self.touched + 1,
            available: self.touched,
        })?;
        write_bits(self.samples, index, self.depth, self.acc)?;
        self.acc = 0;
        self.acc_bits = 0;
        self.touched += 1;
        if self.touched % CANCEL_CHECK_INTERVAL == 0 {
            if let Some(token) = &self.cancel {
                token.check()?;
            }
        }
        Ok(())
    }

    /// Flush a partially filled sample (zero padded) and return the number
    /// of samples modified
    pub fn finish(mut self) -> Result<usize> {
        if self.acc_bits > 0 {
            self.acc <<= self.depth - self.acc_bits;
            self.emit()?;
        }
        Ok(self.touched)
    }
}

/// Reads bytes back out of the bit planes, mirroring [`PlaneWriter`]
///
/// Reaching the end of the position sequence yields EOF; a trailing
/// partial byte is discarded.
pub struct PlaneReader<'a, S, I> {
    samples: &'a [S],
    positions: I,
    depth: u8,
    acc: u32,
    acc_bits: u8,
    visited: usize,
    cancel: Option<CancelToken>,
}

impl<'a, S, I> PlaneReader<'a, S, I>
where
    S: Sample,
    I: Iterator<Item = usize>,
{
    pub fn new(samples: &'a [S], positions: I, depth: u8) -> Result<Self> {
        check_depth::<S>(depth)?;
        Ok(Self {
            samples,
            positions,
            depth,
            acc: 0,
            acc_bits: 0,
            visited: 0,
            cancel: None,
        })
    }

    pub fn with_cancel(mut self, token: Option<CancelToken>) -> Self {
        self.cancel = token;
        self
    }

    /// Number of samples consumed so far
    pub fn visited(&self) -> usize {
        self.visited
    }

    fn next_bit(&mut self) -> io::Result<Option<bool>> {
        if self.acc_bits == 0 {
            let index = match self.positions.next() {
                Some(index) => index,
                None => return Ok(None),
            };
            self.acc = read_bits(self.samples, index, self.depth).map_err(into_io)?;
            self.acc_bits = self.depth;
            self.visited += 1;
            if self.visited % CANCEL_CHECK_INTERVAL == 0 {
                if let Some(token) = &self.cancel {
                    token.check().map_err(into_io)?;
                }
            }
        }
        self.acc_bits -= 1;
        Ok(Some((self.acc >> self.acc_bits) & 1 == 1))
    }
}

impl<S, I> Read for PlaneReader<'_, S, I>
where
    S: Sample,
    I: Iterator<Item = usize>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        'bytes: for slot in buf.iter_mut() {
            let mut byte = 0u8;
            for _ in 0..8 {
                match self.next_bit()? {
                    Some(bit) => byte = (byte << 1) | u8::from(bit),
                    None => break 'bytes,
                }
            }
            *slot = byte;
            filled += 1;
        }
        Ok(filled)
    }
}

/// Tunnel an engine error through `io::Read`
pub(crate) fn into_io(err: StegoError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

/// Recover an engine error that was tunnelled through `io::Read`.
/// A premature end of the carrier means the frame was truncated.
pub(crate) fn from_io(err: io::Error) -> StegoError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        return StegoError::CorruptFrame("carrier ended before the frame was complete".into());
    }
    if err.get_ref().map_or(false, |inner| inner.is::<StegoError>()) {
        if let Some(inner) = err.into_inner() {
            if let Ok(engine) = inner.downcast::<StegoError>() {
                return *engine;
            }
        }
        return StegoError::CorruptFrame("unreadable carrier".into());
    }
    StegoError::Io(err)
}
