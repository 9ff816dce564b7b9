use std::time::Duration;

/// Offset in seconds between the unix epoch and the ntp epoch.
const NTP_EPOCH_OFFSET: u64 = 0x83AA7E80;

pub fn unix2ntp(duration_since_unix_epoch: Duration) -> u64 {
    let u = duration_since_unix_epoch.as_nanos() as u64;

    let mut s = u / 1_000_000_000;
    s += NTP_EPOCH_OFFSET;
    let mut f = u % 1_000_000_000;
    f <<= 32;
    f /= 1_000_000_000;
    s <<= 32;

    s | f
}

pub fn ntp2unix(ntp: u64) -> Duration {
    let mut s = ntp >> 32;
    let mut f = ntp & 0xFFFFFFFF;
    f *= 1_000_000_000;
    f >>= 32;
    s -= NTP_EPOCH_OFFSET;
    let u = s * 1_000_000_000 + f;

    Duration::new(u / 1_000_000_000, (u % 1_000_000_000) as u32)
}

/// Middle 32 bits of a 64-bit NTP timestamp, the compact form carried in
/// the "last sender report" field of a receiver report.
pub fn compressed_ntp(ntp: u64) -> u32 {
    (ntp >> 16) as u32
}

/// Elapsed time in Q16.16 seconds, the "delay since last SR" encoding.
pub fn delay_q16(elapsed: Duration) -> u32 {
    (elapsed.as_secs_f64() * 65536.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ntp_round_trip() {
        let unix = Duration::new(1_700_000_000, 500_000_000);
        let ntp = unix2ntp(unix);
        let back = ntp2unix(ntp);
        assert_eq!(back.as_secs(), unix.as_secs());
        // fractional part survives within one ntp tick of precision
        assert!((back.subsec_nanos() as i64 - unix.subsec_nanos() as i64).abs() < 2);
    }

    #[test]
    fn test_compressed_ntp_is_middle_bits() {
        assert_eq!(compressed_ntp(0x1234_5678_0000_0000), 0x5678_0000);
        assert_eq!(compressed_ntp(0), 0);
    }

    #[test]
    fn test_delay_q16() {
        assert_eq!(delay_q16(Duration::from_secs(1)), 65536);
        assert_eq!(delay_q16(Duration::from_millis(500)), 32768);
        assert_eq!(delay_q16(Duration::ZERO), 0);
    }
}
