//! Randomized cycle times.
//!
//! Each building gets an idiosyncratic speed: a cycle time drawn once when
//! it is placed and again when it is moved. Completing a cycle never
//! re-rolls it.

use crate::fixed::{Fixed64, round_to_ticks};
use crate::item::BuildingKind;
use crate::rng::SimRng;

/// Draw a cycle time for `kind`.
///
/// Uniform in `[base * (1 - jitter), base * (1 + jitter)]`, rounded half up
/// and floored at 1.
pub fn roll_cycle_time(kind: BuildingKind, jitter: Fixed64, rng: &mut SimRng) -> u32 {
    let base = Fixed64::from_num(kind.base_ticks());
    let lo = base * (Fixed64::ONE - jitter);
    let hi = base * (Fixed64::ONE + jitter);
    let drawn = lo + rng.next_fraction() * (hi - lo);
    round_to_ticks(drawn, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    #[test]
    fn zero_jitter_yields_base() {
        let mut rng = SimRng::new(3);
        for kind in BuildingKind::ALL {
            assert_eq!(roll_cycle_time(kind, Fixed64::ZERO, &mut rng), kind.base_ticks());
        }
    }

    #[test]
    fn rolls_stay_inside_jitter_band() {
        let jitter = f64_to_fixed64(0.35);
        let mut rng = SimRng::new(11);
        for kind in BuildingKind::ALL {
            let base = kind.base_ticks() as f64;
            let lo = ((base * 0.65).round() as u32).max(1);
            let hi = (base * 1.35).round() as u32;
            for _ in 0..500 {
                let t = roll_cycle_time(kind, jitter, &mut rng);
                assert!((lo..=hi).contains(&t), "{kind}: {t} outside {lo}..={hi}");
            }
        }
    }

    #[test]
    fn full_jitter_never_reaches_zero() {
        let mut rng = SimRng::new(5);
        for _ in 0..1_000 {
            assert!(roll_cycle_time(BuildingKind::Miner, Fixed64::ONE, &mut rng) >= 1);
        }
    }

    #[test]
    fn lab_band_covers_several_speeds() {
        let jitter = f64_to_fixed64(0.35);
        let mut rng = SimRng::new(99);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..500 {
            seen.insert(roll_cycle_time(BuildingKind::Lab, jitter, &mut rng));
        }
        // Lab base 5 with ±35% spans 3.25..=6.75.
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![3, 4, 5, 6, 7]);
    }
}
