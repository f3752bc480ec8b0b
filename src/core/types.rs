use serde::{Deserialize, Serialize};

/// One read of a paired-end read pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mate {
    R1,
    R2,
}

impl Mate {
    pub const ALL: [Mate; 2] = [Mate::R1, Mate::R2];

    /// Zero-based slot used to index per-mate structures
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::R1 => 0,
            Self::R2 => 1,
        }
    }

    /// One-based read number used in report titles and file names
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::R1 => 1,
            Self::R2 => 2,
        }
    }
}

impl std::fmt::Display for Mate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Read {}", self.number())
    }
}

/// Minimum hit counts gating per-mate and combined-pair classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum k-mers a single mate needs (`threshold_read`)
    pub read: u32,

    /// Minimum k-mers across both mates of a pair (`threshold_overall`)
    pub overall: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            read: 10,
            overall: 20,
        }
    }
}
