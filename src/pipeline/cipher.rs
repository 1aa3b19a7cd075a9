//! Extended Vigenère stream cipher.
//!
//! Each plaintext byte is shifted by one keystream byte modulo 256. The
//! keystream is the password stretched through a SHA3-256 hash chain in
//! counter mode, so it never repeats with the period of the password.
//!
//! Confidentiality only: there is no authentication tag. A MAC over the
//! enciphered frame would be the place to add integrity.

use sha3::{Digest, Sha3_256};
use std::io::{self, Read};

const KEYSTREAM_DOMAIN: &[u8] = b"bitify/v1/keystream";

/// Position-addressed keystream generator
pub struct Keystream {
    password: Vec<u8>,
    counter: u64,
    block: [u8; 32],
    used: usize,
}

impl Keystream {
    pub fn new(password: &[u8]) -> Self {
        Self {
            password: password.to_vec(),
            counter: 0,
            block: [0u8; 32],
            used: 32,
        }
    }

    pub fn next_byte(&mut self) -> u8 {
        if self.used == self.block.len() {
            self.block = keystream_block(&self.password, self.counter);
            self.counter += 1;
            self.used = 0;
        }
        let byte = self.block[self.used];
        self.used += 1;
        byte
    }
}

/// One 32-byte keystream block: H(domain || len(password) || password || counter)
fn keystream_block(password: &[u8], counter: u64) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(KEYSTREAM_DOMAIN);
    hasher.update((password.len() as u64).to_le_bytes());
    hasher.update(password);
    hasher.update(counter.to_le_bytes());
    hasher.finalize().into()
}

/// Generate `length` keystream bytes
pub fn keystream(password: &[u8], length: usize) -> Vec<u8> {
    let mut stream = Keystream::new(password);
    (0..length).map(|_| stream.next_byte()).collect()
}

/// Encipher in place: c = p + k (mod 256)
pub fn encipher(data: &mut [u8], password: &[u8]) {
    let mut stream = Keystream::new(password);
    for byte in data.iter_mut() {
        *byte = byte.wrapping_add(stream.next_byte());
    }
}

/// Decipher in place: p = c - k (mod 256)
pub fn decipher(data: &mut [u8], password: &[u8]) {
    let mut stream = Keystream::new(password);
    for byte in data.iter_mut() {
        *byte = byte.wrapping_sub(stream.next_byte());
    }
}

/// Deciphers everything read from `inner`, keeping keystream position
/// aligned with the byte offset of the stream
pub struct DecipherReader<R> {
    inner: R,
    stream: Keystream,
}

impl<R: Read> DecipherReader<R> {
    pub fn new(inner: R, password: &[u8]) -> Self {
        Self {
            inner,
            stream: Keystream::new(password),
        }
    }
}

impl<R: Read> Read for DecipherReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for byte in buf[..n].iter_mut() {
            *byte = byte.wrapping_sub(self.stream.next_byte());
        }
        Ok(n)
    }
}
