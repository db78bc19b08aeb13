use thiserror::Error;

/// Largest sample magnitude: half the range of a 16-bit sample
pub const MAX_SAMPLE_MAGNITUDE: i32 = (u16::MAX / 2) as i32;

/// Generators are tracked one bit each in a 32-bit counter
pub const MAX_GENERATORS: u8 = 32;

pub const DEFAULT_VOLUME: u8 = 10;
pub const DEFAULT_GENERATORS: u8 = 25;

/// Errors raised while building noise parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("volume must be between 1 and 100, got {0}")]
    VolumeOutOfRange(u32),
    #[error("generator count must be between 1 and 32, got {0}")]
    GeneratorCountOutOfRange(u32),
    #[error("unknown algorithm {0}, expected 1 (Voss), 2 (Voss-McCartney) or 3 (white noise)")]
    UnknownAlgorithm(u32),
}

/// Immutable noise parameters, shared read-only for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseParameters {
    volume_percent: u8,
    amplitude: i16,
    generator_count: u8,
    counter_mask: u32,
}

impl NoiseParameters {
    /// Validate volume (1-100) and generator count (1-32)
    pub fn new(volume_percent: u32, generator_count: u32) -> Result<Self, ConfigError> {
        if !(1..=100).contains(&volume_percent) {
            return Err(ConfigError::VolumeOutOfRange(volume_percent));
        }
        if !(1..=MAX_GENERATORS as u32).contains(&generator_count) {
            return Err(ConfigError::GeneratorCountOutOfRange(generator_count));
        }

        Ok(Self {
            volume_percent: volume_percent as u8,
            amplitude: amplitude_for(volume_percent as u8),
            generator_count: generator_count as u8,
            // Shift u32::MAX down instead of computing 1 << 32
            counter_mask: u32::MAX >> (32 - generator_count),
        })
    }

    pub fn volume_percent(&self) -> u8 {
        self.volume_percent
    }

    /// Exclusive upper bound for a drawn sample magnitude
    pub fn amplitude(&self) -> i16 {
        self.amplitude
    }

    pub fn generator_count(&self) -> usize {
        self.generator_count as usize
    }

    /// Largest counter value, 2^generator_count - 1
    pub fn counter_mask(&self) -> u32 {
        self.counter_mask
    }
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            volume_percent: DEFAULT_VOLUME,
            amplitude: amplitude_for(DEFAULT_VOLUME),
            generator_count: DEFAULT_GENERATORS,
            counter_mask: u32::MAX >> (32 - DEFAULT_GENERATORS as u32),
        }
    }
}

/// floor(percent / 100 * 32767), exact in integer arithmetic
pub fn amplitude_for(volume_percent: u8) -> i16 {
    (volume_percent as i32 * MAX_SAMPLE_MAGNITUDE / 100) as i16
}
