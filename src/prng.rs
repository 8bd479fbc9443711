//! Deterministic BLAKE2b-256 stream generator.
//!
//! Every output chunk is the keyed hash of the seed and an invocation
//! counter under a fixed domain tag.  The generator plugs into `rand` via
//! [`RngCore`], so reproducible runs (tests, demos, audits) can drive the
//! same code paths as an operating-system RNG.  [`derive_many_mod_p`]
//! expands a label into field elements; the shipped parameter constants
//! were produced with it.

use blake2::digest::{consts::U32, Digest};
use rand::{CryptoRng, RngCore};

type Blake2b256 = blake2::Blake2b<U32>;

const PRNG_DOMAIN: &[u8] = b"POWER_ALGEBRA_PRNG";
const CHALLENGE_DOMAIN: &[u8] = b"POWER_ALGEBRA_CHALLENGE";

/// Hashes the concatenation of `parts` into one 32-byte block.
fn hash_block(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Counter-mode BLAKE2b-256 stream.
///
/// Output is unpredictable only to parties that do not know the seed.
#[derive(Debug, Clone)]
pub struct SimplePrng {
    seed: [u8; 32],
    counter: u64,
    block: [u8; 32],
    used: usize,
}

impl SimplePrng {
    /// Seeds the stream from a `u64`.
    pub fn new(seed: u64) -> Self {
        Self::from_seed_bytes(hash_block(&[PRNG_DOMAIN, &seed.to_be_bytes()]))
    }

    /// Seeds the stream from raw key bytes.
    pub fn from_seed_bytes(seed: [u8; 32]) -> Self {
        Self {
            seed,
            counter: 0,
            block: [0u8; 32],
            used: 32,
        }
    }

    /// Returns the next word of the stream.
    pub fn next_u64(&mut self) -> u64 {
        if self.used == self.block.len() {
            self.block = hash_block(&[PRNG_DOMAIN, &self.seed, &self.counter.to_be_bytes()]);
            self.counter = self.counter.wrapping_add(1);
            self.used = 0;
        }
        let word = &self.block[self.used..self.used + 8];
        self.used += 8;
        u64::from_be_bytes([
            word[0], word[1], word[2], word[3], word[4], word[5], word[6], word[7],
        ])
    }

    /// Returns the next word reduced modulo `modulus`, or `None` when
    /// `modulus` is zero.
    pub fn gen_mod(&mut self, modulus: u64) -> Option<u64> {
        (modulus != 0).then(|| self.next_u64() % modulus)
    }
}

impl RngCore for SimplePrng {
    fn next_u32(&mut self) -> u32 {
        (SimplePrng::next_u64(self) >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        SimplePrng::next_u64(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let word = SimplePrng::next_u64(self).to_be_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for SimplePrng {}

/// Derives a sequence of field elements from a labelled word list.
///
/// Given a modulus `p`, a domain tag (separating derivation contexts) and
/// a slice of `u64` words, returns `count` elements in `[0, p)`.  Returns
/// an empty vector when `p` is zero.
pub fn derive_many_mod_p(p: u64, domain_tag: &[u8], words: &[u64], count: usize) -> Vec<u64> {
    if p == 0 {
        return Vec::new();
    }
    let packed: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
    let seed = hash_block(&[
        CHALLENGE_DOMAIN,
        &(domain_tag.len() as u64).to_be_bytes(),
        domain_tag,
        &(words.len() as u64).to_be_bytes(),
        &packed,
    ]);
    let mut prng = SimplePrng::from_seed_bytes(seed);
    (0..count).map(|_| prng.next_u64() % p).collect()
}
