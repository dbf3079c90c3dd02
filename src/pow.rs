use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::difficulty::{valid_hash, Difficulty};
use crate::hash::{laboon_hash, to_hex, Hash, Nonce};

/// Receives progress from a sequential nonce search.
pub trait MiningObserver {
    fn on_attempt(&mut self, _nonce: Nonce, _candidate: &str, _hash: Hash) {}

    /// Called after every nonce has been tried without success.
    fn on_exhausted(&mut self, _difficulty: Difficulty) {}
}

pub struct SilentObserver;

impl MiningObserver for SilentObserver {}

pub struct ProofOfWork {
    difficulty: Difficulty,
    parallel: bool,
}

impl ProofOfWork {
    pub fn new(difficulty: Difficulty) -> Self {
        ProofOfWork {
            difficulty,
            parallel: false,
        }
    }

    /// Spread the search over the rayon pool. The nonce found is still the
    /// smallest one, but observers only see the final result.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Text that gets hashed for a given nonce: `prevHex + nonceHex + data`.
    pub fn candidate(prev_hash: Hash, nonce: Nonce, data: &str) -> String {
        let mut candidate = to_hex(prev_hash);
        candidate.push_str(&to_hex(nonce));
        candidate.push_str(data);
        candidate
    }

    pub fn calculate_hash(data: &str, prev_hash: Hash, nonce: Nonce) -> Hash {
        laboon_hash(&Self::candidate(prev_hash, nonce, data))
    }

    pub fn validate(&self, data: &str, prev_hash: Hash, nonce: Nonce) -> bool {
        valid_hash(self.difficulty.level(), Self::calculate_hash(data, prev_hash, nonce))
    }

    /// Blocks until a nonce is found. If the whole 32-bit space fails the
    /// search starts over, so high difficulties may never return.
    pub fn run(&self, data: &str, prev_hash: Hash, observer: &mut dyn MiningObserver) -> Nonce {
        loop {
            if let Some(nonce) = self.try_run(data, prev_hash, observer) {
                return nonce;
            }
            warn!("无法找到有效的nonce, 难度: {}", self.difficulty);
            observer.on_exhausted(self.difficulty);
        }
    }

    /// One pass over every nonce: `0..=i32::MAX` first, then the negatives.
    pub fn try_run(&self, data: &str, prev_hash: Hash, observer: &mut dyn MiningObserver) -> Option<Nonce> {
        info!("开始挖矿，难度: {}", self.difficulty);
        debug!(
            "前置哈希: {}, 预计尝试次数: {}",
            to_hex(prev_hash),
            self.difficulty.expected_attempts()
        );

        let found = if self.parallel {
            self.search_parallel(data, prev_hash)
        } else {
            self.search(data, prev_hash, all_nonces(), observer)
        };

        if let Some(nonce) = found {
            info!(
                "区块已挖出！Nonce: {}, Hash: {}",
                to_hex(nonce),
                to_hex(Self::calculate_hash(data, prev_hash, nonce))
            );
        }
        found
    }

    /// Tries `nonces` in order and returns the first one that satisfies the
    /// difficulty.
    pub fn search<I>(&self, data: &str, prev_hash: Hash, nonces: I, observer: &mut dyn MiningObserver) -> Option<Nonce>
    where
        I: IntoIterator<Item = Nonce>,
    {
        let level = self.difficulty.level();
        nonces.into_iter().find(|&nonce| {
            let candidate = Self::candidate(prev_hash, nonce, data);
            let hash = laboon_hash(&candidate);
            trace!("尝试: {}.. 哈希: {}", candidate, to_hex(hash));
            observer.on_attempt(nonce, &candidate, hash);
            valid_hash(level, hash)
        })
    }

    fn search_parallel(&self, data: &str, prev_hash: Hash) -> Option<Nonce> {
        let level = self.difficulty.level();
        let is_valid = |nonce: Nonce| valid_hash(level, Self::calculate_hash(data, prev_hash, nonce));

        // find_first 保证返回顺序上最小的 nonce
        (0..=Nonce::MAX)
            .into_par_iter()
            .find_first(|&nonce| is_valid(nonce))
            .or_else(|| (Nonce::MIN..0).into_par_iter().find_first(|&nonce| is_valid(nonce)))
    }
}

fn all_nonces() -> impl Iterator<Item = Nonce> {
    (0..=Nonce::MAX).chain(Nonce::MIN..0)
}
