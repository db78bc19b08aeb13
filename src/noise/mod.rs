pub mod algorithm;
pub mod engine;
pub mod parameters;
pub mod state;

pub use algorithm::Algorithm;
pub use engine::NoiseEngine;
pub use parameters::{ConfigError, NoiseParameters};
