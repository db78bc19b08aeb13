use pink_pine::audio::stream::StreamInfo;
use pink_pine::noise::{Algorithm, NoiseParameters};
use pink_pine::types::events::EngineEvent;

/// Per-frame decay applied to the displayed peak level
const PEAK_DECAY: f64 = 0.92;

/// UI application state
/// Mirrors what the audio thread reports; never touches the engine itself
pub struct App {
    /// Active algorithm
    pub algorithm: Algorithm,
    /// Engine parameters (read-only copy)
    pub params: NoiseParameters,
    /// Output stream details
    pub stream: StreamInfo,
    /// Displayed peak level (0.0 to 1.0 of full scale), with decay
    pub level: f64,
    /// Generator counter at the last level report
    pub counter: u32,
    /// Number of level reports received
    pub reports: u64,
    /// Last stream error, if any
    pub last_error: Option<String>,
    /// Whether to quit the application
    pub should_quit: bool,
    /// Whether to show help screen
    pub show_help: bool,
}

impl App {
    pub fn new(algorithm: Algorithm, params: NoiseParameters, stream: StreamInfo) -> Self {
        Self {
            algorithm,
            params,
            stream,
            level: 0.0,
            counter: 0,
            reports: 0,
            last_error: None,
            should_quit: false,
            show_help: false,
        }
    }

    /// Apply an event from the audio thread
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Level { peak, counter } => {
                let level = peak as f64 / i16::MAX as f64;
                self.level = self.level.max(level);
                self.counter = counter;
                self.reports += 1;
            }
            EngineEvent::StreamError(message) => {
                self.last_error = Some(message);
            }
        }
    }

    /// Advance one UI frame
    pub fn tick(&mut self) {
        self.level *= PEAK_DECAY;
    }

    /// Peak level relative to the configured amplitude
    pub fn level_of_amplitude(&self) -> f64 {
        let amplitude = self.params.amplitude() as f64 / i16::MAX as f64;
        (self.level / amplitude).clamp(0.0, 1.0)
    }

    /// Counter as a fixed-width bit string, most significant generator first
    pub fn counter_bits(&self) -> String {
        let width = self.params.generator_count();
        format!("{:0width$b}", self.counter, width = width)
    }

    /// Mark app for quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Toggle help screen visibility
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}
