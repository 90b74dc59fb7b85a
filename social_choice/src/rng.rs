// Seedable randomness for the randomized resolvers.
//
// Each resolution gets its own stream. Streams are derived from a run seed and a
// key (usually the voter), so a run can be replayed and the voters can be
// processed in any order or in parallel.

use log::debug;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};

#[derive(Debug, Clone)]
pub struct InductionRng {
    rng: ChaCha20Rng,
}

impl InductionRng {
    /// The seed is written in little-endian in the first 8 bytes of the ChaCha20
    /// seed, the other bytes are zero.
    pub fn from_seed_u64(seed: u64) -> InductionRng {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        InductionRng {
            rng: ChaCha20Rng::from_seed(seed32),
        }
    }

    pub fn from_entropy() -> InductionRng {
        InductionRng::from_seed_u64(InductionRng::entropy_seed())
    }

    /// A fresh seed from the operating system.
    pub fn entropy_seed() -> u64 {
        OsRng.next_u64()
    }

    /// A stream that only depends on the run seed and the key.
    ///
    /// The key is hashed with the seed, and the first 8 bytes of the digest become
    /// the seed of the stream.
    pub fn derived(seed: u64, key: &str) -> InductionRng {
        let hex = sha256::digest(format!("{}:{}", seed, key));
        let derived_seed = hex
            .chars()
            .take(16)
            .filter_map(|c| c.to_digit(16))
            .fold(0u64, |acc, d| (acc << 4) | d as u64);
        debug!("derived: seed {} key {:?} -> {}", seed, key, derived_seed);
        InductionRng::from_seed_u64(derived_seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Unbiased integer in [0, n), by rejection sampling. Returns None if n == 0.
    pub fn gen_range(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return None;
        }
        // 2^64 mod n
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.rng.next_u64();
            if x >= threshold {
                return Some(x % n);
            }
        }
    }

    pub fn choose_index(&mut self, n: usize) -> Option<usize> {
        self.gen_range(n as u64).map(|v| v as usize)
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            if let Some(j) = self.choose_index(i + 1) {
                slice.swap(i, j);
            }
        }
    }

    /// Draws `n` elements with replacement.
    pub fn sample_with_replacement<T: Clone>(&mut self, items: &[T], n: usize) -> Vec<T> {
        if items.is_empty() {
            return vec![];
        }
        (0..n)
            .filter_map(|_| self.choose_index(items.len()))
            .map(|idx| items[idx].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streams_are_reproducible() {
        let mut a = InductionRng::from_seed_u64(42);
        let mut b = InductionRng::from_seed_u64(42);
        for _ in 0..10 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        let mut c = InductionRng::derived(42, "voter-1");
        let mut d = InductionRng::derived(42, "voter-1");
        let mut e = InductionRng::derived(42, "voter-2");
        let x = c.next_u64();
        assert_eq!(x, d.next_u64());
        assert_ne!(x, e.next_u64());
    }

    #[test]
    fn ranges() {
        let mut r = InductionRng::from_seed_u64(7);
        assert_eq!(r.gen_range(0), None);
        assert_eq!(r.gen_range(1), Some(0));
        for _ in 0..100 {
            let v = r.gen_range(6).unwrap();
            assert!(v < 6);
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut r = InductionRng::from_seed_u64(3);
        let mut v: Vec<u32> = (0..20).collect();
        r.shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<u32>>());
        let s = r.sample_with_replacement(&v, 50);
        assert_eq!(s.len(), 50);
        assert!(s.iter().all(|x| *x < 20));
        assert!(r.sample_with_replacement::<u32>(&[], 5).is_empty());
    }
}
