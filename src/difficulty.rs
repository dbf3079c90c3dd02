//! Difficulty levels and the leading-zero check.

use std::fmt;

use serde::Deserialize;

use crate::error::{LaboonError, Result};
use crate::hash::{Hash, HEX_WIDTH};

/// Number of leading zero hex digits a block hash must show.
///
/// Always within `0..=8`: a 32-bit hash has only eight hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "i64")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MAX: u8 = HEX_WIDTH as u8;
    pub const DEFAULT: Difficulty = Difficulty(3);

    pub fn new(level: i64) -> Result<Self> {
        match u8::try_from(level) {
            Ok(level) if level <= Self::MAX => Ok(Difficulty(level)),
            _ => Err(LaboonError::InvalidDifficulty(format!(
                "难度 {} 不在 0..={} 范围内",
                level,
                Self::MAX
            ))),
        }
    }

    pub fn clamped(level: i64) -> Self {
        Difficulty(level.clamp(0, i64::from(Self::MAX)) as u8)
    }

    pub fn level(self) -> usize {
        usize::from(self.0)
    }

    /// Average number of attempts before a valid nonce turns up. Every
    /// extra level multiplies it by 16.
    pub fn expected_attempts(self) -> u64 {
        16u64.pow(u32::from(self.0))
    }

    /// Reads the operator's difficulty argument. Anything that is not a
    /// 32-bit integer in range falls back to `fallback` and reports why.
    pub fn from_arg(arg: Option<&str>, fallback: Difficulty) -> (Difficulty, Option<DifficultyFallback>) {
        let reason = match arg {
            None => DifficultyFallback::Missing { fallback },
            Some(raw) => match raw.parse::<i32>() {
                Ok(level) if level < 0 => DifficultyFallback::Negative { fallback },
                Ok(level) if level > i32::from(Self::MAX) => DifficultyFallback::TooHigh { fallback },
                Ok(level) => return (Difficulty(level as u8), None),
                Err(_) => DifficultyFallback::Unparseable { fallback },
            },
        };
        (fallback, Some(reason))
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = LaboonError;

    fn try_from(level: i64) -> Result<Self> {
        Difficulty::new(level)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why the difficulty argument was not used as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyFallback {
    Missing { fallback: Difficulty },
    Unparseable { fallback: Difficulty },
    Negative { fallback: Difficulty },
    TooHigh { fallback: Difficulty },
}

impl fmt::Display for DifficultyFallback {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DifficultyFallback::Missing { fallback } => {
                write!(f, "No argument detected, defaulting to difficulty = {}", fallback)
            }
            DifficultyFallback::Unparseable { fallback } => {
                write!(f, "Could not parse argument, defaulting to difficulty = {}", fallback)
            }
            DifficultyFallback::Negative { fallback } => {
                write!(f, "Negative numbers not allowed, defaulting to difficulty = {}", fallback)
            }
            DifficultyFallback::TooHigh { fallback } => write!(
                f,
                "Numbers above {} are not allowed, defaulting to difficulty = {}",
                Difficulty::MAX,
                fallback
            ),
        }
    }
}

/// True iff the eight-digit hex form of `hash` starts with `difficulty`
/// zeros. Levels above 8 are treated as 8.
#[inline]
pub fn valid_hash(difficulty: usize, hash: Hash) -> bool {
    // 每个十六进制位对应 4 个比特
    let zero_digits = (hash as u32).leading_zeros() as usize / 4;
    zero_digits >= difficulty.min(HEX_WIDTH)
}
