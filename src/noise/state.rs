use super::parameters::NoiseParameters;

/// Mutable state of the generator bank
/// Owned by the audio callback, never shared between threads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorState {
    counter: u32,
    gen_vals: Box<[i16]>,
}

impl GeneratorState {
    /// Create zeroed state sized for the given parameters
    pub fn new(params: &NoiseParameters) -> Self {
        Self {
            counter: 0,
            gen_vals: vec![0; params.generator_count()].into_boxed_slice(),
        }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Most recent value of each generator
    pub fn values(&self) -> &[i16] {
        &self.gen_vals
    }

    /// Step the counter by one, wrapping past `counter_mask` to zero.
    /// Returns the (previous, next) pair.
    #[inline]
    pub fn advance(&mut self, counter_mask: u32) -> (u32, u32) {
        let previous = self.counter;
        self.counter = previous.wrapping_add(1) & counter_mask;
        (previous, self.counter)
    }

    #[inline]
    pub(super) fn set(&mut self, generator: usize, value: i16) {
        self.gen_vals[generator] = value;
    }

    /// Sum of all generator values
    /// i32 holds at most 32 * 32766 without overflow
    #[inline]
    pub fn sum(&self) -> i32 {
        self.gen_vals.iter().map(|&v| v as i32).sum()
    }

    #[cfg(test)]
    pub(crate) fn with_counter(mut self, counter: u32) -> Self {
        self.counter = counter;
        self
    }
}
