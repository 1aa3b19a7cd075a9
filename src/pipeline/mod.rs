pub mod bitplane;
pub mod capacity;
pub mod cipher;
pub mod frame;
pub mod quality;
pub mod sequence;

pub use bitplane::{read_bits, write_bits, PlaneReader, PlaneWriter};
pub use capacity::{estimate_capacity, frame_len, samples_needed};
pub use cipher::{decipher, encipher, keystream, DecipherReader};
pub use frame::{serialize_frame, FrameExpectation, FrameReader};
pub use quality::{compute_psnr, quality_score, QualityGrade};
pub use sequence::{derive_seed, PositionSequence};
