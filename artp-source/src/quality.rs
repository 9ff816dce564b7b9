//! Receive-side bitrate selection from interval loss fractions.

/// Loss fractions up to this many 256ths ride out without a bitrate change.
const FRACTION_LOST_HOLD: u8 = 4;

/// Derives a target bitrate from reported loss fractions, clamped to the
/// configured `[min, max]` range. Bounds default to -1 (unset); the manager
/// stays inert until a range is supplied and leaves the computed value
/// unclamped while the minimum is unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityManager {
    min_bitrate: i32,
    max_bitrate: i32,
    target_bitrate: i32,
}

impl Default for QualityManager {
    fn default() -> Self {
        Self {
            min_bitrate: -1,
            max_bitrate: -1,
            target_bitrate: -1,
        }
    }
}

impl QualityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_bitrate(&self) -> i32 {
        self.target_bitrate
    }

    pub fn set_min_max_bitrate(&mut self, min: i32, max: i32) {
        self.min_bitrate = min;
        self.max_bitrate = max;
        if self.target_bitrate < 0 {
            self.target_bitrate = max;
        }
    }

    /// Folds one interval's loss fraction into the target: a clean interval
    /// probes upward, loss inside the hold band leaves the target alone,
    /// anything above it backs off in proportion to the fraction.
    pub fn update_target_bitrate(&mut self, fraction_lost: u8) {
        if self.target_bitrate <= 0 {
            return;
        }

        let mut target = i64::from(self.target_bitrate);
        if fraction_lost == 0 {
            target += target >> 3;
        } else if fraction_lost > FRACTION_LOST_HOLD {
            target -= (target * i64::from(fraction_lost)) >> 9;
        }

        if self.min_bitrate >= 0 && self.max_bitrate > 0 {
            target = target.clamp(i64::from(self.min_bitrate), i64::from(self.max_bitrate));
        }
        self.target_bitrate = target.min(i64::from(i32::MAX)) as i32;
    }
}
