//! RTCP Temporary Maximum Media Bitrate Request construction.

use bytes::{BufMut, BytesMut};
use log::{info, warn};

use crate::RTCP_VERSION;

const PT_TSFB: u8 = 205;
const FMT_TMMBR: u8 = 3;
/// Packet length in 32-bit words minus one.
const LENGTH_WORDS: u16 = 4;
/// Fixed per-packet overhead advertised alongside the bitrate, in bytes.
const MEASURED_OVERHEAD: u8 = 40;

/// A temporary maximum media bitrate request, signalling a receive-side
/// bitrate ceiling to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemporaryMaxMediaBitrate {
    /// SSRC of the requesting receiver.
    pub sender_ssrc: u32,
    /// SSRC of the media source the request targets.
    pub media_ssrc: u32,
    /// Requested ceiling in bits per second.
    pub bitrate: i32,
}

impl TemporaryMaxMediaBitrate {
    pub const SIZE: usize = 20;

    /// Appends the encoded request to `buf` if the remaining capacity allows,
    /// returning whether the request was written.
    pub fn marshal_to(&self, buf: &mut BytesMut) -> bool {
        if buf.len() + Self::SIZE > buf.capacity() {
            warn!("rtcp buffer too small to accommodate tmmbr");
            return false;
        }

        // Round off to the nearest 2^4th
        info!("requesting receive bitrate {}", self.bitrate & !0xf);
        let (exp, mantissa) = bitrate_exp_mantissa(self.bitrate);

        buf.put_u8(RTCP_VERSION | FMT_TMMBR);
        buf.put_u8(PT_TSFB);
        buf.put_u16(LENGTH_WORDS);
        buf.put_u32(self.sender_ssrc);
        buf.put_u32(0); // SSRC of media source (unused)

        buf.put_u32(self.media_ssrc);
        buf.put_u8(((exp << 2) & 0xfc) | ((mantissa & 0x18000) >> 15) as u8);
        buf.put_u8(((mantissa & 0x07f80) >> 7) as u8);
        buf.put_u8(((mantissa & 0x0007f) << 1) as u8);
        buf.put_u8(MEASURED_OVERHEAD);

        true
    }
}

/// Splits a bitrate into the wire (exponent, 17-bit mantissa) pair. The
/// exponent is the lowest set bit at position 4 or above, so the mantissa
/// keeps every significant bit the field can carry; bitrates below 16 bps
/// have no such bit and encode as a zero mantissa.
pub fn bitrate_exp_mantissa(bitrate: i32) -> (u8, u32) {
    let exp = (4..32).find(|e| (bitrate >> e) & 0x01 != 0).unwrap_or(4);
    (exp as u8, (bitrate >> exp) as u32)
}
