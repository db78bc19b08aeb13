use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{algorithm::Algorithm, parameters::NoiseParameters, state::GeneratorState};

/// Noise engine driven by the audio callback
/// Owns its generator state and RNG, so it must live on a single thread.
/// Rendering never allocates, locks or blocks.
pub struct NoiseEngine<R: Rng = SmallRng> {
    algorithm: Algorithm,
    params: NoiseParameters,
    state: GeneratorState,
    rng: R,
}

impl NoiseEngine<SmallRng> {
    /// Create an engine seeded from OS entropy
    pub fn new(algorithm: Algorithm, params: NoiseParameters) -> Self {
        Self::with_rng(algorithm, params, SmallRng::from_entropy())
    }

    /// Create an engine with a fixed seed, for reproducible output
    pub fn with_seed(algorithm: Algorithm, params: NoiseParameters, seed: u64) -> Self {
        Self::with_rng(algorithm, params, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> NoiseEngine<R> {
    pub fn with_rng(algorithm: Algorithm, params: NoiseParameters, rng: R) -> Self {
        Self {
            algorithm,
            params,
            state: GeneratorState::new(&params),
            rng,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn parameters(&self) -> &NoiseParameters {
        &self.params
    }

    pub fn state(&self) -> &GeneratorState {
        &self.state
    }

    /// Generate the next mono sample
    #[inline]
    pub fn next_sample(&mut self) -> i16 {
        next_sample(self.algorithm, &self.params, &mut self.state, &mut self.rng)
    }

    /// Fill a mono buffer, one sample per slot
    pub fn render(&mut self, buffer: &mut [i16]) {
        render(buffer, self.algorithm, &self.params, &mut self.state, &mut self.rng);
    }

    /// Fill an interleaved buffer, writing the same sample to every channel
    /// of a frame. Returns the peak magnitude rendered.
    pub fn render_interleaved<T>(&mut self, data: &mut [T], channels: usize) -> u16
    where
        T: cpal::Sample + cpal::FromSample<i16>,
    {
        let mut peak = 0u16;
        for frame in data.chunks_mut(channels.max(1)) {
            let sample = self.next_sample();
            peak = peak.max(sample.unsigned_abs());

            let value = T::from_sample(sample);
            for slot in frame.iter_mut() {
                *slot = value;
            }
        }
        peak
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GeneratorState {
        &mut self.state
    }
}

/// Render `buffer.len()` samples in order with the selected algorithm
pub fn render<R: Rng>(
    buffer: &mut [i16],
    algorithm: Algorithm,
    params: &NoiseParameters,
    state: &mut GeneratorState,
    rng: &mut R,
) {
    for sample in buffer.iter_mut() {
        *sample = next_sample(algorithm, params, state, rng);
    }
}

/// Compute one sample, updating generator state for the pink algorithms
#[inline]
pub fn next_sample<R: Rng>(
    algorithm: Algorithm,
    params: &NoiseParameters,
    state: &mut GeneratorState,
    rng: &mut R,
) -> i16 {
    match algorithm {
        Algorithm::Voss | Algorithm::VossMcCartney => pink_step(algorithm, params, state, rng),
        Algorithm::White => draw(rng, params.amplitude()),
    }
}

/// Advance the counter, redraw the scheduled generators, average the bank
fn pink_step<R: Rng>(
    algorithm: Algorithm,
    params: &NoiseParameters,
    state: &mut GeneratorState,
    rng: &mut R,
) -> i16 {
    let mask = params.counter_mask();
    let (previous, next) = state.advance(mask);

    let mut pending = algorithm.update_mask(previous, next, mask);
    while pending != 0 {
        let generator = pending.trailing_zeros() as usize;
        state.set(generator, draw(rng, params.amplitude()));
        pending &= pending - 1; // clear lowest set bit
    }

    // Integer division truncates toward zero
    (state.sum() / params.generator_count() as i32) as i16
}

/// Random magnitude in [0, amplitude) with a random sign
#[inline]
fn draw<R: Rng>(rng: &mut R, amplitude: i16) -> i16 {
    let magnitude = rng.gen_range(0..amplitude);
    if rng.gen_bool(0.5) { magnitude } else { -magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Never produced by `draw`, since magnitudes stay below 32767
    const SENTINEL: i16 = i16::MIN;

    fn engine(algorithm: Algorithm, volume: u32, generators: u32, seed: u64) -> NoiseEngine {
        let params = NoiseParameters::new(volume, generators).unwrap();
        NoiseEngine::with_seed(algorithm, params, seed)
    }

    /// Indices of slots that no longer hold the sentinel
    fn updated_slots(state: &GeneratorState) -> u32 {
        state
            .values()
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != SENTINEL)
            .fold(0, |acc, (g, _)| acc | (1 << g))
    }

    fn fill_sentinel(engine: &mut NoiseEngine) {
        let count = engine.parameters().generator_count();
        for g in 0..count {
            engine.state_mut().set(g, SENTINEL);
        }
    }

    #[test]
    fn test_voss_updates_exactly_changed_bits() {
        let mut engine = engine(Algorithm::Voss, 50, 5, 1);
        // Run past one full wrap of the 5-bit counter
        for _ in 0..80 {
            fill_sentinel(&mut engine);
            let previous = engine.state().counter();
            engine.next_sample();
            let next = engine.state().counter();
            assert_eq!(updated_slots(engine.state()), previous ^ next);
        }
    }

    #[test]
    fn test_voss_mccartney_updates_one_slot() {
        let mut engine = engine(Algorithm::VossMcCartney, 50, 4, 2);
        for _ in 0..40 {
            fill_sentinel(&mut engine);
            engine.next_sample();
            let next = engine.state().counter();
            let k = next.trailing_zeros();
            let expected = if k < 4 { 1 << k } else { 0 };
            assert_eq!(updated_slots(engine.state()), expected, "counter {}", next);
        }
    }

    #[test]
    fn test_voss_mccartney_skips_update_on_wrap() {
        let mut engine = engine(Algorithm::VossMcCartney, 50, 3, 3);
        for _ in 0..7 {
            engine.next_sample();
        }
        fill_sentinel(&mut engine);
        engine.next_sample();
        assert_eq!(engine.state().counter(), 0);
        assert_eq!(updated_slots(engine.state()), 0);
    }

    #[test]
    fn test_white_noise_leaves_state_alone() {
        let mut engine = engine(Algorithm::White, 50, 8, 4);
        let before = engine.state().clone();
        for _ in 0..1000 {
            engine.next_sample();
        }
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_white_noise_within_amplitude() {
        let amplitude = NoiseParameters::new(50, 1).unwrap().amplitude();
        for seed in [11, 12] {
            let mut engine = engine(Algorithm::White, 50, 1, seed);
            let mut buffer = vec![0i16; 10_000];
            engine.render(&mut buffer);
            assert!(buffer.iter().all(|s| (-amplitude..=amplitude).contains(s)));
            assert!(buffer.iter().any(|&s| s != 0), "seed {} rendered silence", seed);
        }
    }

    #[test]
    fn test_single_generator_outputs_slot_value() {
        for algorithm in [Algorithm::Voss, Algorithm::VossMcCartney] {
            let mut engine = engine(algorithm, 30, 1, 5);
            for _ in 0..100 {
                let sample = engine.next_sample();
                assert_eq!(sample, engine.state().values()[0]);
            }
        }
    }

    #[test]
    fn test_single_generator_voss_redraws_every_step() {
        // With one bit the counter toggles 0/1, so bit 0 always flips
        let mut engine = engine(Algorithm::Voss, 30, 1, 6);
        for _ in 0..20 {
            fill_sentinel(&mut engine);
            engine.next_sample();
            assert_eq!(updated_slots(engine.state()), 1);
        }
    }

    #[test]
    fn test_output_is_truncated_mean() {
        let mut engine = engine(Algorithm::VossMcCartney, 50, 3, 7);
        for _ in 0..50 {
            let sample = engine.next_sample();
            assert_eq!(sample as i32, engine.state().sum() / 3);
        }
    }

    #[test]
    fn test_one_second_voss_mccartney() {
        let amplitude = NoiseParameters::new(10, 25).unwrap().amplitude();
        let mut engine = engine(Algorithm::VossMcCartney, 10, 25, 8);
        let mut buffer = vec![0i16; 48_000];
        engine.render(&mut buffer);

        assert!(buffer.iter().all(|s| (-amplitude..=amplitude).contains(s)));
        assert_eq!(engine.state().counter(), 48_000);
    }

    #[test]
    fn test_32_generators_wrap_without_overflow() {
        let params = NoiseParameters::new(100, 32).unwrap();
        assert_eq!(params.counter_mask(), u32::MAX);

        let mut state = GeneratorState::new(&params).with_counter(u32::MAX - 1);
        let mut rng = SmallRng::seed_from_u64(9);
        let mut buffer = [0i16; 3];
        render(&mut buffer, Algorithm::Voss, &params, &mut state, &mut rng);
        assert_eq!(state.counter(), 1);

        let amplitude = params.amplitude();
        assert!(buffer.iter().all(|s| (-amplitude..=amplitude).contains(s)));
    }

    #[test]
    fn test_free_render_matches_engine() {
        let params = NoiseParameters::new(20, 12).unwrap();
        let mut engine = NoiseEngine::with_seed(Algorithm::Voss, params, 10);
        let mut from_engine = [0i16; 256];
        engine.render(&mut from_engine);

        let mut state = GeneratorState::new(&params);
        let mut rng = SmallRng::seed_from_u64(10);
        let mut from_fn = [0i16; 256];
        render(&mut from_fn, Algorithm::Voss, &params, &mut state, &mut rng);

        assert_eq!(from_engine, from_fn);
        assert_eq!(engine.state(), &state);
    }

    #[test]
    fn test_interleaved_duplicates_across_channels() {
        let mut engine = engine(Algorithm::Voss, 40, 10, 11);
        let mut data = vec![0.0f32; 2 * 512];
        let peak = engine.render_interleaved(&mut data, 2);

        for frame in data.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert_eq!(engine.state().counter(), 512);
        assert!(peak <= NoiseParameters::new(40, 10).unwrap().amplitude() as u16);
    }

    #[test]
    fn test_interleaved_i16_matches_mono() {
        let params = NoiseParameters::new(40, 6).unwrap();
        let mut mono = NoiseEngine::with_seed(Algorithm::VossMcCartney, params, 12);
        let mut stereo = NoiseEngine::with_seed(Algorithm::VossMcCartney, params, 12);

        let mut expected = [0i16; 64];
        mono.render(&mut expected);
        let mut data = [0i16; 128];
        stereo.render_interleaved(&mut data, 2);

        for (frame, sample) in data.chunks(2).zip(expected.iter()) {
            assert_eq!(frame, &[*sample, *sample]);
        }
    }

    proptest! {
        #[test]
        fn prop_counter_wrap_law(generators in 1u32..=32, steps in 0usize..2000, mccartney in any::<bool>()) {
            let algorithm = if mccartney { Algorithm::VossMcCartney } else { Algorithm::Voss };
            let mut engine = engine(algorithm, 10, generators, 13);
            for _ in 0..steps {
                engine.next_sample();
            }
            let modulus = 1u64 << generators;
            prop_assert_eq!(engine.state().counter() as u64, steps as u64 % modulus);
        }

        #[test]
        fn prop_pink_samples_within_amplitude(volume in 1u32..=100, generators in 1u32..=32, seed in any::<u64>()) {
            let amplitude = NoiseParameters::new(volume, generators).unwrap().amplitude();
            for algorithm in [Algorithm::Voss, Algorithm::VossMcCartney] {
                let mut engine = engine(algorithm, volume, generators, seed);
                let mut buffer = [0i16; 256];
                engine.render(&mut buffer);
                prop_assert!(buffer.iter().all(|s| (-amplitude..=amplitude).contains(s)));
            }
        }
    }
}
