//! Payload framing.
//!
//! Layout (format v1, big-endian, MSB-first bit packing):
//!
//! ```text
//! [magic: 16][filename_len: 8][filename: 8 * len][payload_len: 32][lsb_depth: 4][encrypted: 1][payload][pad to byte]
//! ```
//!
//! The reader validates the magic before touching any length field, and
//! checks the declared size against the carrier before allocating.

use crate::error::{Result, StegoError};
use crate::header::{PayloadHeader, MAGIC};
use crate::pipeline::bitplane::from_io;
use crate::pipeline::capacity::frame_len;
use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use std::io::{self, Read};

/// Serialize header and payload into one byte-padded frame
pub fn serialize_frame(header: &PayloadHeader, payload: &[u8]) -> Result<Vec<u8>> {
    if header.payload_len as usize != payload.len() {
        return Err(StegoError::InvalidConfiguration(format!(
            "header declares {} payload bytes but {} were supplied",
            header.payload_len,
            payload.len()
        )));
    }
    let name = header.filename.as_bytes();
    let name_len = u8::try_from(name.len())
        .map_err(|_| StegoError::InvalidFileName("filename longer than 255 bytes".into()))?;

    let mut writer = BitWriter::endian(
        Vec::with_capacity(frame_len(name.len(), payload.len())),
        BigEndian,
    );
    writer.write(16, MAGIC)?;
    writer.write(8, name_len)?;
    writer.write_bytes(name)?;
    writer.write(32, header.payload_len)?;
    writer.write(4, header.lsb_depth)?;
    writer.write_bit(header.encrypted)?;
    writer.write_bytes(payload)?;
    writer.byte_align()?;
    Ok(writer.into_writer())
}

/// What the extractor assumed when it located a candidate frame
#[derive(Debug, Clone, Copy)]
pub struct FrameExpectation {
    pub lsb_depth: u8,
    pub encrypted: bool,
    /// Bits the carrier can hold along the probed sequence
    pub capacity_bits: usize,
}

/// Field-by-field frame parser over any byte stream
pub struct FrameReader<R: Read> {
    bits: BitReader<R, BigEndian>,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bits: BitReader::endian(reader, BigEndian),
        }
    }

    /// Read the 16-bit marker. Too few bits to hold one is a plain miss.
    pub fn read_magic(&mut self) -> Result<bool> {
        match self.bits.read::<u16>(16) {
            Ok(magic) => Ok(magic == MAGIC),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(from_io(e)),
        }
    }

    /// Read the remaining header fields after a matching magic
    ///
    /// Returns `None` when the depth or encryption fields disagree with the
    /// probe that found the magic, which the caller treats as a miss.
    pub fn read_header(&mut self, expect: &FrameExpectation) -> Result<Option<PayloadHeader>> {
        let name_len: u8 = self.bits.read(8).map_err(from_io)?;
        let mut name = vec![0u8; usize::from(name_len)];
        self.bits.read_bytes(&mut name).map_err(from_io)?;
        let payload_len: u32 = self.bits.read(32).map_err(from_io)?;
        let lsb_depth: u8 = self.bits.read(4).map_err(from_io)?;
        let encrypted = self.bits.read_bit().map_err(from_io)?;

        if lsb_depth != expect.lsb_depth || encrypted != expect.encrypted {
            return Ok(None);
        }

        let filename = String::from_utf8(name)
            .map_err(|_| StegoError::CorruptFrame("filename is not valid UTF-8".into()))?;
        if filename.is_empty() {
            return Err(StegoError::CorruptFrame("filename is empty".into()));
        }

        let needed_bits = frame_len(filename.len(), payload_len as usize) * 8;
        if needed_bits > expect.capacity_bits {
            return Err(StegoError::CorruptFrame(format!(
                "declared payload of {} bytes does not fit the carrier ({} of {} bits)",
                payload_len, needed_bits, expect.capacity_bits
            )));
        }

        Ok(Some(PayloadHeader {
            filename,
            payload_len,
            lsb_depth,
            encrypted,
        }))
    }

    pub fn read_payload(&mut self, header: &PayloadHeader) -> Result<Vec<u8>> {
        let mut payload = vec![0u8; header.payload_len as usize];
        self.bits.read_bytes(&mut payload).map_err(from_io)?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expectation(depth: u8, encrypted: bool) -> FrameExpectation {
        FrameExpectation {
            lsb_depth: depth,
            encrypted,
            capacity_bits: 1 << 20,
        }
    }

    #[test]
    fn test_layout_prefix() {
        let header = PayloadHeader::new("a", 2, 3, true).unwrap();
        let frame = serialize_frame(&header, &[0xAA, 0x55]).unwrap();

        assert_eq!(frame.len(), frame_len(1, 2));
        assert_eq!(&frame[0..2], &MAGIC.to_be_bytes());
        assert_eq!(frame[2], 1);
        assert_eq!(frame[3], b'a');
        assert_eq!(&frame[4..8], &2u32.to_be_bytes());
        // depth (0011) + encrypted (1) + first 3 payload bits (101)
        assert_eq!(frame[8], 0b0011_1101);
    }

    #[test]
    fn test_parse_serialized_frame() {
        let header = PayloadHeader::new("notes.txt", 5, 2, false).unwrap();
        let frame = serialize_frame(&header, b"hello").unwrap();

        let mut reader = FrameReader::new(&frame[..]);
        assert!(reader.read_magic().unwrap());
        let parsed = reader.read_header(&expectation(2, false)).unwrap().unwrap();
        assert_eq!(parsed, header);
        assert_eq!(reader.read_payload(&parsed).unwrap(), b"hello");
    }

    #[test]
    fn test_bad_magic_is_a_miss() {
        let frame = vec![0u8; 32];
        assert!(!FrameReader::new(&frame[..]).read_magic().unwrap());
    }

    #[test]
    fn test_short_input_is_a_miss() {
        let frame = vec![0xB1u8];
        assert!(!FrameReader::new(&frame[..]).read_magic().unwrap());
    }

    #[test]
    fn test_depth_mismatch_is_not_a_header() {
        let header = PayloadHeader::new("x", 1, 4, false).unwrap();
        let frame = serialize_frame(&header, &[7]).unwrap();

        let mut reader = FrameReader::new(&frame[..]);
        assert!(reader.read_magic().unwrap());
        assert!(reader.read_header(&expectation(2, false)).unwrap().is_none());

        let mut reader = FrameReader::new(&frame[..]);
        reader.read_magic().unwrap();
        assert!(reader.read_header(&expectation(4, true)).unwrap().is_none());
    }

    #[test]
    fn test_oversized_length_is_corrupt() {
        let header = PayloadHeader::new("big.bin", 10_000, 1, false).unwrap();
        let payload = vec![0u8; 10_000];
        let frame = serialize_frame(&header, &payload).unwrap();

        let mut reader = FrameReader::new(&frame[..]);
        reader.read_magic().unwrap();
        let expect = FrameExpectation {
            lsb_depth: 1,
            encrypted: false,
            capacity_bits: 4096,
        };
        assert!(matches!(
            reader.read_header(&expect),
            Err(StegoError::CorruptFrame(_))
        ));
    }

    #[test]
    fn test_truncated_payload_is_corrupt() {
        let header = PayloadHeader::new("t", 64, 1, false).unwrap();
        let frame = serialize_frame(&header, &[1u8; 64]).unwrap();
        let truncated = &frame[..20];

        let mut reader = FrameReader::new(truncated);
        reader.read_magic().unwrap();
        let parsed = reader.read_header(&expectation(1, false)).unwrap().unwrap();
        assert!(matches!(
            reader.read_payload(&parsed),
            Err(StegoError::CorruptFrame(_))
        ));
    }

    #[test]
    fn test_payload_length_must_match_header() {
        let header = PayloadHeader::new("a", 3, 1, false).unwrap();
        assert!(serialize_frame(&header, b"ab").is_err());
    }

    #[test]
    fn test_non_utf8_filename_is_corrupt() {
        let mut frame = serialize_frame(&PayloadHeader::new("ab", 0, 1, false).unwrap(), &[])
            .unwrap();
        frame[3] = 0xFF;
        frame[4] = 0xFE;

        let mut reader = FrameReader::new(&frame[..]);
        reader.read_magic().unwrap();
        assert!(matches!(
            reader.read_header(&expectation(1, false)),
            Err(StegoError::CorruptFrame(_))
        ));
    }
}
