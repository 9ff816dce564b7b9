/// Codec identity and format parameters pulled from the session descriptor
/// at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodecDescriptor {
    /// Encoding name and clock rate, e.g. `"H264/90000"`.
    pub name: String,
    /// Format parameters from the corresponding fmtp line.
    pub format_parameters: String,
}

impl CodecDescriptor {
    pub fn new(name: impl Into<String>, format_parameters: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format_parameters: format_parameters.into(),
        }
    }
}

/// Per-source configuration.
///
/// Callers that want every source in a session to report under one identity
/// pass the same `self_id` to each; there is no process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Reporter SSRC placed in every feedback packet this source builds.
    pub self_id: u32,
    /// Seed for the FIR request sequence number, drawn at random when unset.
    pub fir_sequence_seed: Option<u8>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            self_id: rand::random::<u32>(),
            fir_sequence_seed: None,
        }
    }
}
