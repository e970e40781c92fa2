use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for configuration, never in the tick.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Like [`f64_to_fixed64`], but `None` for NaN, infinities and values
/// outside the Q32.32 range instead of panicking.
pub fn checked_f64_to_fixed64(v: f64) -> Option<Fixed64> {
    if !v.is_finite() {
        return None;
    }
    Fixed64::checked_from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and timer periods.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Round half away from zero to a whole tick count, floored at `min`.
///
/// Negative values saturate to `min`.
#[inline]
pub fn round_to_ticks(v: Fixed64, min: u32) -> u32 {
    let rounded: i64 = v.round().to_num();
    rounded.clamp(min as i64, u32::MAX as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_default_is_exact_enough() {
        // 0.35 has no exact binary form; the nearest Q32.32 is within 2^-32.
        let jitter = f64_to_fixed64(0.35);
        assert!((fixed64_to_f64(jitter) - 0.35).abs() < 1e-9);
        let furnace_hi = Fixed64::from_num(4) * (Fixed64::ONE + jitter);
        assert_eq!(round_to_ticks(furnace_hi, 1), 5);
    }

    #[test]
    fn checked_conversion_rejects_unrepresentable() {
        assert_eq!(checked_f64_to_fixed64(2.5), Some(Fixed64::from_num(2.5)));
        assert_eq!(checked_f64_to_fixed64(f64::NAN), None);
        assert_eq!(checked_f64_to_fixed64(f64::INFINITY), None);
        assert_eq!(checked_f64_to_fixed64(1e12), None);
    }

    #[test]
    fn round_half_goes_up() {
        assert_eq!(round_to_ticks(f64_to_fixed64(2.5), 1), 3);
        assert_eq!(round_to_ticks(f64_to_fixed64(2.49), 1), 2);
    }

    #[test]
    fn round_respects_floor() {
        assert_eq!(round_to_ticks(f64_to_fixed64(0.2), 1), 1);
        assert_eq!(round_to_ticks(f64_to_fixed64(-4.0), 1), 1);
        assert_eq!(round_to_ticks(Fixed64::ZERO, 0), 0);
    }
}
