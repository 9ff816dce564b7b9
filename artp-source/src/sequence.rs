//! Extended sequence number reconstruction.
//!
//! Only the lower 16 bits of the sequence number are transmitted; the high
//! order bits are derived by choosing the candidate closest to the highest
//! sequence number (extended to 32 bits) received so far.

/// Resolves a wire sequence number (already widened to `[0, 65535]`) against
/// the current highest extended sequence number.
pub fn extend_sequence_number(seq: u32, highest: u32) -> u32 {
    let seq1 = seq | (highest & 0xffff_0000);

    // wrap-forward candidate; bumping the high word before shifting keeps
    // the addition from overflowing
    let seq2 = seq | (((highest >> 16) + 1) << 16);

    // wrap-backward candidate; the guard bit keeps the subtraction from
    // underflowing
    let seq3 = seq | ((((highest >> 16) | 0x10000) - 1) << 16);

    let diff1 = seq1.abs_diff(highest);
    let diff2 = seq2.abs_diff(highest);
    let diff3 = seq3.abs_diff(highest);

    if diff1 < diff2 {
        if diff1 < diff3 {
            seq1
        } else {
            // diff3 <= diff1 < diff2
            seq3
        }
    } else if diff2 < diff3 {
        // diff2 <= diff1, diff2 < diff3
        seq2
    } else {
        // diff3 <= diff2 <= diff1
        seq3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_extend_within_current_cycle() {
        assert_eq!(extend_sequence_number(0x0006, 0x0001_0005), 0x0001_0006);
        assert_eq!(extend_sequence_number(0x0004, 0x0001_0005), 0x0001_0004);
    }

    #[test]
    fn test_extend_wrap_forward() {
        assert_eq!(extend_sequence_number(0x0005, 0x0001_fff0), 0x0002_0005);
    }

    #[test]
    fn test_extend_wrap_backward() {
        assert_eq!(extend_sequence_number(0xfff0, 0x0002_0005), 0x0001_fff0);
    }

    #[test]
    fn test_extend_first_cycle_has_no_backward_wrap() {
        // high word zero: the backward candidate's guard bit vanishes and it
        // collapses onto the current-cycle candidate
        assert_eq!(extend_sequence_number(0xfff0, 0x0000_0005), 0x0000_fff0);
    }

    #[test]
    fn test_extend_tie_breaks() {
        // diff1 == diff3: the backward candidate wins
        assert_eq!(extend_sequence_number(0x8000, 0x0001_0000), 0x0000_8000);
        // diff1 == diff2: the forward candidate wins over the current cycle
        assert_eq!(extend_sequence_number(0x0000, 0x0001_8000), 0x0002_0000);
    }

    #[test]
    fn test_extend_recovers_reordered_stream() {
        // a genuine monotonic 32-bit stream crossing two wrap boundaries,
        // reordered within a window well under half a cycle, must be
        // recovered exactly
        let mut rng = StdRng::seed_from_u64(0x5eed);
        const WINDOW: usize = 64;

        let start = 0x0000_ff00u32;
        let mut actual: Vec<u32> = (0..0x2_0000u32).map(|i| start + i).collect();
        for chunk in actual.chunks_mut(WINDOW) {
            for i in (1..chunk.len()).rev() {
                chunk.swap(i, rng.random_range(0..=i));
            }
        }

        let mut highest = actual[0];
        for &seq in &actual[1..] {
            let resolved = extend_sequence_number(seq & 0xffff, highest);
            assert_eq!(resolved, seq);
            if resolved > highest {
                highest = resolved;
            }
        }
    }
}
