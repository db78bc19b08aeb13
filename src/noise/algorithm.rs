use serde::{Deserialize, Serialize};

/// Noise generation algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Voss: every generator whose counter bit flipped is redrawn
    Voss,
    /// Voss-McCartney: one generator per step, picked by trailing zeros
    #[serde(alias = "mccartney")]
    VossMcCartney,
    /// Plain uniform white noise
    #[serde(alias = "white-noise")]
    White,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::VossMcCartney
    }
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Voss, Algorithm::VossMcCartney, Algorithm::White];

    /// 1-based index used on the command line
    pub fn index(self) -> u8 {
        match self {
            Algorithm::Voss => 1,
            Algorithm::VossMcCartney => 2,
            Algorithm::White => 3,
        }
    }

    /// Convert from the 1-based command line index
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Algorithm::Voss),
            2 => Some(Algorithm::VossMcCartney),
            3 => Some(Algorithm::White),
            _ => None,
        }
    }

    /// Human readable description
    pub fn description(self) -> &'static str {
        match self {
            Algorithm::Voss => "Voss algorithm : Pink noise",
            Algorithm::VossMcCartney => "Voss McCartney algorithm : Pink noise",
            Algorithm::White => "Simple random white noise",
        }
    }

    /// Whether this algorithm drives the generator bank and counter
    pub fn uses_generators(self) -> bool {
        !matches!(self, Algorithm::White)
    }

    /// Bitmask of generator slots to redraw when the counter moves from
    /// `previous` to `next`.
    ///
    /// Voss redraws every slot whose bit flipped. Voss-McCartney redraws the
    /// single slot at the trailing-zero count of `next`, or nothing when that
    /// count is past the last generator (only when the counter wrapped to 0,
    /// where `trailing_zeros` is 32). White noise never touches the bank.
    pub fn update_mask(self, previous: u32, next: u32, counter_mask: u32) -> u32 {
        match self {
            Algorithm::Voss => (previous ^ next) & counter_mask,
            Algorithm::VossMcCartney => {
                let k = next.trailing_zeros();
                // counter_mask has exactly generator_count low bits set
                if k < counter_mask.count_ones() {
                    1 << k
                } else {
                    0
                }
            }
            Algorithm::White => 0,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}
