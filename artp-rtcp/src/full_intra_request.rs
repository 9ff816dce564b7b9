//! RTCP Full Intra Request construction.

use bytes::{BufMut, BytesMut};
use log::warn;

use crate::RTCP_VERSION;

const PT_PSFB: u8 = 206;
const FMT_FIR: u8 = 4;
/// Packet length in 32-bit words minus one.
const LENGTH_WORDS: u16 = 4;

/// A full intra request, asking the sender for a fresh keyframe.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FullIntraRequest {
    /// SSRC of the requesting receiver.
    pub sender_ssrc: u32,
    /// SSRC of the media source the request targets.
    pub media_ssrc: u32,
    /// Request sequence number, wraps at 8 bits.
    pub sequence_number: u8,
}

impl FullIntraRequest {
    pub const SIZE: usize = 20;

    /// Appends the encoded request to `buf` if the remaining capacity allows,
    /// returning whether the request was written.
    pub fn marshal_to(&self, buf: &mut BytesMut) -> bool {
        if buf.len() + Self::SIZE > buf.capacity() {
            warn!("rtcp buffer too small to accommodate fir");
            return false;
        }

        buf.put_u8(RTCP_VERSION | FMT_FIR);
        buf.put_u8(PT_PSFB);
        buf.put_u16(LENGTH_WORDS);
        buf.put_u32(self.sender_ssrc);
        buf.put_u32(0); // SSRC of media source (unused)

        buf.put_u32(self.media_ssrc);
        buf.put_u8(self.sequence_number);
        buf.put_u8(0);
        buf.put_u8(0);
        buf.put_u8(0);

        true
    }
}
