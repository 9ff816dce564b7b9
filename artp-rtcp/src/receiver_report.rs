//! RTCP Receiver Report construction.
//!
//! Encodes a single-block receiver report as specified in RFC 3550 section
//! 6.4.2, with the interval statistics already computed by the caller.

use bytes::{BufMut, BytesMut};
use log::warn;

use crate::RTCP_VERSION;

const PT_RECEIVER_REPORT: u8 = 201;
/// Packet length in 32-bit words minus one.
const LENGTH_WORDS: u16 = 7;

/// A receiver report with one reception report block.
///
/// `total_lost` is signed: abandoned buffers may push the received count
/// above the expected count and the 24-bit field carries the negative value
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReceiverReport {
    /// SSRC of the reporting receiver.
    pub sender_ssrc: u32,
    /// SSRC of the media source this block describes.
    pub ssrc: u32,
    pub fraction_lost: u8,
    pub total_lost: i32,
    /// Extended highest sequence number received.
    pub last_sequence_number: u32,
    /// Middle 32 bits of the last sender-report NTP timestamp, zero if none.
    pub last_sender_report: u32,
    /// Delay since the last sender report in Q16.16 seconds.
    pub delay: u32,
}

impl ReceiverReport {
    pub const SIZE: usize = 32;

    /// Appends the encoded report to `buf` if the remaining capacity allows,
    /// returning whether the report was written.
    pub fn marshal_to(&self, buf: &mut BytesMut) -> bool {
        if buf.len() + Self::SIZE > buf.capacity() {
            warn!("rtcp buffer too small to accommodate rr");
            return false;
        }

        buf.put_u8(RTCP_VERSION | 1); // one report block
        buf.put_u8(PT_RECEIVER_REPORT);
        buf.put_u16(LENGTH_WORDS);
        buf.put_u32(self.sender_ssrc);

        buf.put_u32(self.ssrc);
        buf.put_u8(self.fraction_lost);
        buf.put_u8((self.total_lost >> 16) as u8);
        buf.put_u8((self.total_lost >> 8) as u8);
        buf.put_u8(self.total_lost as u8);
        buf.put_u32(self.last_sequence_number);
        buf.put_u32(0); // interarrival jitter is not tracked
        buf.put_u32(self.last_sender_report);
        buf.put_u32(self.delay);

        true
    }
}
