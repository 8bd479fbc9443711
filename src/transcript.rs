//! Domain-separated hashing of exchange data.
//!
//! The [`Transcript`] records `u64` words (residues, lengths, labels) and
//! compresses them into a 32-byte digest with BLAKE2b-256.  Session keys
//! are derived this way from the shared vector and the public context so
//! that both parties obtain identical bytes.  Words are wiped on drop.

use crate::Vector;
use blake2::digest::{consts::U32, Digest};
use zeroize::{Zeroize, ZeroizeOnDrop};

type Blake2b256 = blake2::Blake2b<U32>;

/// Append-only record of words to be hashed under a domain tag.
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct Transcript {
    #[zeroize(skip)]
    domain_tag: &'static [u8],
    words: Vec<u64>,
}

impl Transcript {
    /// Starts an empty transcript under `domain_tag`.
    pub fn new(domain_tag: &'static [u8]) -> Self {
        Self {
            domain_tag,
            words: Vec::new(),
        }
    }

    /// Records one word.
    pub fn append(&mut self, value: u64) {
        self.words.push(value);
    }

    /// Records every word of `values` in order.
    pub fn append_slice(&mut self, values: &[u64]) {
        self.words.extend_from_slice(values);
    }

    /// Appends a length-prefixed byte label, packed into big-endian words.
    pub fn append_label(&mut self, label: &[u8]) {
        self.words.push(label.len() as u64);
        for chunk in label.chunks(8) {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            self.words.push(u64::from_be_bytes(word));
        }
    }

    /// Appends a vector as its dimension followed by its coordinates.
    pub fn append_vector(&mut self, v: &Vector) {
        self.words.push(v.dim() as u64);
        self.words.extend_from_slice(v.coords());
    }

    /// Words recorded so far.
    pub fn snapshot(&self) -> &[u64] {
        &self.words
    }

    /// Hashes the domain tag and all recorded words into 32 bytes.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Blake2b256::new();
        hasher.update((self.domain_tag.len() as u64).to_be_bytes());
        hasher.update(self.domain_tag);
        hasher.update((self.words.len() as u64).to_be_bytes());
        for &word in &self.words {
            hasher.update(word.to_be_bytes());
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }
}
