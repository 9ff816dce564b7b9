use bytes::Bytes;

/// One RTP packet as delivered by the transport, reduced to the metadata
/// this state machine consumes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RtpPacket {
    /// Truncated 16-bit wire sequence number.
    pub sequence_number: u16,
    /// RTP media timestamp.
    pub timestamp: u32,
    pub payload: Bytes,
}
