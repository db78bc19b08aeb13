use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

use crate::noise::NoiseEngine;
use crate::types::events::EngineEvent;

/// Level reports sent to the UI per second of audio
const REPORTS_PER_SECOND: u32 = 30;

/// Output stream details shown on the status screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub device_name: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_format: String,
}

/// List available audio output devices
pub fn list_output_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();

    let devices: Vec<String> = host
        .output_devices()?
        .filter_map(|device| device_name(&device))
        .collect();

    if devices.is_empty() {
        return Err(anyhow!("No audio output devices found"));
    }

    Ok(devices)
}

/// Find audio device index by name or index string
pub fn find_device_index(devices: &[String], search: &str) -> Result<usize> {
    // Try to parse as index first
    if let Ok(index) = search.parse::<usize>() {
        if index < devices.len() {
            return Ok(index);
        } else {
            return Err(anyhow!(
                "Audio device index {} out of range (0-{})",
                index,
                devices.len().saturating_sub(1)
            ));
        }
    }

    // Search by name (case-insensitive substring match)
    let search_lower = search.to_lowercase();
    devices
        .iter()
        .position(|device| device.to_lowercase().contains(&search_lower))
        .ok_or_else(|| anyhow!("Audio device '{}' not found", search))
}

/// Resolve the output device: "default" picks the host default
pub fn select_device(search: &str) -> Result<cpal::Device> {
    let host = cpal::default_host();

    if search.eq_ignore_ascii_case("default") {
        return host
            .default_output_device()
            .ok_or_else(|| anyhow!("No default audio output device"));
    }

    let devices = list_output_devices()?;
    let index = find_device_index(&devices, search)?;
    host.output_devices()?
        .nth(index)
        .ok_or_else(|| anyhow!("Selected audio device not available"))
}

/// Open the device's default output config and start streaming noise
pub fn start_noise_stream(
    device: &cpal::Device,
    engine: NoiseEngine,
    event_tx: Sender<EngineEvent>,
) -> Result<(cpal::Stream, StreamInfo)> {
    let audio_config = device
        .default_output_config()
        .context("Failed to query default output config")?;

    let info = StreamInfo {
        device_name: device_name(device).unwrap_or_else(|| "Unknown".to_string()),
        sample_rate: audio_config.sample_rate() as u32,
        channels: audio_config.channels(),
        sample_format: format!("{:?}", audio_config.sample_format()),
    };

    let sample_format = audio_config.sample_format();
    let config: cpal::StreamConfig = audio_config.into();
    let algorithm = engine.algorithm();
    let generators = engine.parameters().generator_count();

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(device, &config, engine, event_tx)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(device, &config, engine, event_tx)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(device, &config, engine, event_tx)?,
        other => return Err(anyhow!("Unsupported sample format: {:?}", other)),
    };

    stream.play().context("Failed to start output stream")?;
    tracing::info!(
        device = %info.device_name,
        sample_rate = info.sample_rate,
        channels = info.channels,
        format = %info.sample_format,
        ?algorithm,
        generators,
        "output stream started"
    );

    Ok((stream, info))
}

/// Build an output stream that owns the engine
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut engine: NoiseEngine,
    event_tx: Sender<EngineEvent>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<i16>,
{
    let channels = config.channels as usize;
    let mut meter = LevelMeter::new(config.sample_rate as u32 / REPORTS_PER_SECOND);
    let error_tx = event_tx.clone();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let peak = engine.render_interleaved(data, channels);
            let frames = data.len() / channels.max(1);

            if let Some(event) = meter.record(frames, peak, engine.state().counter()) {
                // Drop the report if the UI is behind, never block here
                let _ = event_tx.try_send(event);
            }
        },
        move |err| {
            tracing::error!(?err, "audio stream error");
            let _ = error_tx.try_send(EngineEvent::StreamError(err.to_string()));
        },
        None,
    )?;

    Ok(stream)
}

fn device_name(device: &cpal::Device) -> Option<String> {
    device
        .description()
        .ok()
        .map(|desc| desc.name().to_string())
}

/// Accumulates peak level across callbacks and emits a report per interval
#[derive(Debug)]
struct LevelMeter {
    interval: usize,
    frames: usize,
    peak: u16,
}

impl LevelMeter {
    fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1) as usize,
            frames: 0,
            peak: 0,
        }
    }

    fn record(&mut self, frames: usize, peak: u16, counter: u32) -> Option<EngineEvent> {
        self.frames += frames;
        self.peak = self.peak.max(peak);

        if self.frames < self.interval {
            return None;
        }

        let event = EngineEvent::level(self.peak, counter);
        self.frames = 0;
        self.peak = 0;
        Some(event)
    }
}
