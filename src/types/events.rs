/// Events sent from the audio thread to the UI thread
/// Must be cheap to build: level reports are sent from inside the callback
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Peak magnitude over the last report window and the counter at its end
    Level { peak: u16, counter: u32 },
    /// Error reported by the output stream
    StreamError(String),
}

impl EngineEvent {
    /// Create a level report
    pub fn level(peak: u16, counter: u32) -> Self {
        EngineEvent::Level { peak, counter }
    }
}
