//! Real-time colored noise generation.
//!
//! The [`noise`] module holds the sample engines (Voss, Voss-McCartney and
//! white noise) and the allocation-free render loop driven from the audio
//! callback. [`audio`] wires an engine into a `cpal` output stream and
//! [`config`] builds validated settings from YAML and command line values.

pub mod audio;
pub mod config;
pub mod noise;
pub mod types;
