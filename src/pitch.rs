//! Maps a measured distance onto an audible pitch.
//!
//! Close obstacles sound high, far ones low. Below the near bound the pitch
//! clamps to the maximum; past the far bound the mapping cuts off entirely
//! so that "nothing detected" is audibly distinct from "very close".

pub const NEAR_BOUND_MM: u32 = 20;
pub const FAR_BOUND_MM: u32 = 4_000;
pub const NEAR_PITCH_HZ: u32 = 5_000;
pub const FAR_PITCH_HZ: u32 = 150;

/// Linear map from distance to frequency. `None` means silence.
pub fn pitch_for_distance(distance_mm: u32) -> Option<u32> {
    if distance_mm > FAR_BOUND_MM {
        return None;
    }
    let clamped = distance_mm.max(NEAR_BOUND_MM);
    let span = FAR_BOUND_MM - NEAR_BOUND_MM;
    let drop = (clamped - NEAR_BOUND_MM) * (NEAR_PITCH_HZ - FAR_PITCH_HZ) / span;
    Some(NEAR_PITCH_HZ - drop)
}

#[cfg(test)]
mod pitch_tests {
    use super::*;

    #[test]
    fn near_bound_gives_maximum_pitch() {
        assert_eq!(pitch_for_distance(NEAR_BOUND_MM), Some(NEAR_PITCH_HZ));
    }

    #[test]
    fn below_near_bound_clamps() {
        assert_eq!(pitch_for_distance(0), Some(NEAR_PITCH_HZ));
        assert_eq!(pitch_for_distance(5), pitch_for_distance(NEAR_BOUND_MM));
    }

    #[test]
    fn far_bound_gives_minimum_pitch() {
        assert_eq!(pitch_for_distance(FAR_BOUND_MM), Some(FAR_PITCH_HZ));
    }

    #[test]
    fn past_far_bound_is_silence() {
        assert_eq!(pitch_for_distance(4_500), None);
        assert_eq!(pitch_for_distance(FAR_BOUND_MM + 1), None);
        assert_eq!(pitch_for_distance(u32::MAX), None);
    }

    #[test]
    fn mapping_is_monotonically_non_increasing() {
        let mut last = NEAR_PITCH_HZ;
        for mm in NEAR_BOUND_MM..=FAR_BOUND_MM {
            let hz = pitch_for_distance(mm).unwrap();
            assert!(hz <= last);
            assert!((FAR_PITCH_HZ..=NEAR_PITCH_HZ).contains(&hz));
            last = hz;
        }
    }

    #[test]
    fn mapping_is_idempotent() {
        assert_eq!(pitch_for_distance(1_000), pitch_for_distance(1_000));
    }
}
