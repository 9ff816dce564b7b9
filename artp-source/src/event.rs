use bytes::Bytes;

/// Outbound notifications, drained by the session layer via
/// [`RtpSource::poll_event`](crate::RtpSource::poll_event). Delivery is
/// fire-and-forget; nothing here blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// A sender-clock synchronization point was recorded.
    TimeUpdate { rtp_time: u32, ntp_time: u64 },
    /// An ordered payload left the reorder queue.
    AccessUnit { rtp_time: u32, payload: Bytes },
}
