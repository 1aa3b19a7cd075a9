use crate::header::Placement;
use hmac::{Hmac, Mac};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::collections::HashMap;

type HmacSha256 = Hmac<Sha256>;

/// Domain separator for position seeds, keeps them unrelated to the keystream
const POSITION_DOMAIN: &[u8] = b"bitify/v1/position";

/// Derive a 32-byte PRNG seed from the password with a keyed hash
pub fn derive_seed(password: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(password).expect("HMAC can take key of any size");
    mac.update(POSITION_DOMAIN);
    mac.finalize().into_bytes().into()
}

/// Ordered walk over the sample indices `0..len`
///
/// Every variant visits each index exactly once, so no sample is ever
/// written twice. The generator is owned by the sequence; identical
/// (placement, seed, len) always yields the identical order.
pub enum PositionSequence {
    Sequential { next: usize, len: usize },
    RandomStart { offset: usize, emitted: usize, len: usize },
    Scatter(ScatterWalk),
}

impl PositionSequence {
    pub fn new(placement: Placement, seed: [u8; 32], len: usize) -> Self {
        match placement {
            Placement::Sequential => Self::Sequential { next: 0, len },
            Placement::RandomStart => {
                let offset = if len == 0 {
                    0
                } else {
                    // u64 keeps the draw identical on 32- and 64-bit targets
                    let mut rng = ChaCha20Rng::from_seed(seed);
                    rng.gen_range(0..len as u64) as usize
                };
                Self::RandomStart {
                    offset,
                    emitted: 0,
                    len,
                }
            }
            Placement::Scatter => Self::Scatter(ScatterWalk::new(seed, len)),
        }
    }

    /// Convenience: derive the seed from a password (unused for sequential)
    pub fn for_password(placement: Placement, password: &[u8], len: usize) -> Self {
        let seed = if placement.is_keyed() {
            derive_seed(password)
        } else {
            [0u8; 32]
        };
        Self::new(placement, seed, len)
    }

    fn remaining(&self) -> usize {
        match self {
            Self::Sequential { next, len } => len - next,
            Self::RandomStart { emitted, len, .. } => len - emitted,
            Self::Scatter(walk) => walk.len - walk.next,
        }
    }
}

impl Iterator for PositionSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match self {
            Self::Sequential { next, len } => {
                if *next >= *len {
                    return None;
                }
                let index = *next;
                *next += 1;
                Some(index)
            }
            Self::RandomStart {
                offset,
                emitted,
                len,
            } => {
                if *emitted >= *len {
                    return None;
                }
                let index = (*offset + *emitted) % *len;
                *emitted += 1;
                Some(index)
            }
            Self::Scatter(walk) => walk.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PositionSequence {}

/// Lazy Fisher-Yates permutation
///
/// Only displaced entries are stored, so memory grows with the number of
/// positions consumed rather than with the size of the cover.
pub struct ScatterWalk {
    rng: ChaCha20Rng,
    len: usize,
    next: usize,
    displaced: HashMap<usize, usize>,
}

impl ScatterWalk {
    pub fn new(seed: [u8; 32], len: usize) -> Self {
        Self {
            rng: ChaCha20Rng::from_seed(seed),
            len,
            next: 0,
            displaced: HashMap::new(),
        }
    }
}

impl Iterator for ScatterWalk {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next >= self.len {
            return None;
        }
        let i = self.next;
        let j = self.rng.gen_range(i as u64..self.len as u64) as usize;
        let at_i = self.displaced.remove(&i).unwrap_or(i);
        let picked = if j == i {
            at_i
        } else {
            self.displaced.insert(j, at_i).unwrap_or(j)
        };
        self.next += 1;
        Some(picked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(placement: Placement, password: &str, len: usize) -> Vec<usize> {
        PositionSequence::for_password(placement, password.as_bytes(), len).collect()
    }

    fn is_permutation(order: &[usize], len: usize) -> bool {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        sorted == (0..len).collect::<Vec<_>>()
    }

    #[test]
    fn test_sequential_ignores_password() {
        assert_eq!(collect(Placement::Sequential, "a", 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(collect(Placement::Sequential, "b", 5), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_random_start_wraps() {
        let order = collect(Placement::RandomStart, "password", 1000);
        assert!(is_permutation(&order, 1000));
        let start = order[0];
        for (k, &index) in order.iter().enumerate() {
            assert_eq!(index, (start + k) % 1000);
        }
    }

    #[test]
    fn test_scatter_is_permutation() {
        for len in [0usize, 1, 2, 17, 1000] {
            let order = collect(Placement::Scatter, "password", len);
            assert!(is_permutation(&order, len), "len {}", len);
        }
    }

    #[test]
    fn test_scatter_actually_disperses() {
        let order = collect(Placement::Scatter, "password", 1000);
        let in_place = order.iter().enumerate().filter(|&(k, &v)| k == v).count();
        assert!(in_place < 50, "{} fixed points", in_place);
    }

    #[test]
    fn test_deterministic_per_password() {
        for placement in [Placement::RandomStart, Placement::Scatter] {
            assert_eq!(
                collect(placement, "same", 4096),
                collect(placement, "same", 4096)
            );
            assert_ne!(
                collect(placement, "one", 4096),
                collect(placement, "two", 4096)
            );
        }
    }

    #[test]
    fn test_seed_depends_on_password() {
        assert_eq!(derive_seed(b"pw"), derive_seed(b"pw"));
        assert_ne!(derive_seed(b"pw"), derive_seed(b"pW"));
        assert_ne!(derive_seed(b""), [0u8; 32]);
    }

    #[test]
    fn test_exact_size() {
        let mut seq = PositionSequence::for_password(Placement::Scatter, b"k", 10);
        assert_eq!(seq.len(), 10);
        seq.next();
        assert_eq!(seq.len(), 9);
    }

    #[test]
    fn test_empty_random_start() {
        assert!(collect(Placement::RandomStart, "pw", 0).is_empty());
    }
}
