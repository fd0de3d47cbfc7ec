#[cfg(not(test))]
use crate::app;
#[cfg(not(test))]
use stm32l4xx_hal::prelude::*;
#[cfg(not(test))]
use systick_monotonic::*;

// Re-check cadence for a new pitch while silenced.
const SILENT_POLL_MS: u64 = 10;

/// Half the period of a square wave at `freq_hz`, in microseconds.
pub fn half_period_us(freq_hz: u32) -> u64 {
    (500_000 / freq_hz) as u64
}

// Bit-bangs the speaker square wave: toggle, then come back half a period
// later. While no pitch is published the pin is held low and the task just
// polls for the tone to come back.
#[cfg(not(test))]
pub fn tone_tick(cx: app::tone_tick::Context) {
    let speaker = cx.local.speaker;
    let high = cx.local.high;

    match *cx.shared.pitch {
        Some(hz) => {
            if *high {
                speaker.set_low().unwrap();
            } else {
                speaker.set_high().unwrap();
            }
            *high = !*high;
            app::tone_tick::spawn_after(half_period_us(hz).micros()).unwrap();
        }
        None => {
            speaker.set_low().unwrap();
            *high = false;
            app::tone_tick::spawn_after(SILENT_POLL_MS.millis()).unwrap();
        }
    }
}

#[cfg(test)]
mod tone_tests {
    use super::*;
    use crate::pitch::{FAR_PITCH_HZ, NEAR_PITCH_HZ};

    #[test]
    fn half_period_of_highest_pitch() {
        assert_eq!(half_period_us(NEAR_PITCH_HZ), 100);
    }

    #[test]
    fn half_period_of_lowest_pitch() {
        assert_eq!(half_period_us(FAR_PITCH_HZ), 3_333);
    }
}
