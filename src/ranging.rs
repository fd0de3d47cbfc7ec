//! Echo-pulse capture and pulse-width-to-distance conversion.
//!
//! Everything here is pure over integers so it can be unit tested without
//! hardware. Timestamps are raw `u32` timer ticks; pulse widths survive
//! counter wraparound via unsigned modular subtraction.

// Speed of Sound in m/s @ standard temperature/pressure, non-adjusted.
pub const SPEED_OF_SOUND_M_S: u32 = 343;

// An echo pulse longer than this means nothing bounced back in range
// (soft target, or too far away). Zero means no pulse was captured at all.
pub const ECHO_TIMEOUT_US: u32 = 10_000;

/// Distance in millimeters, or the sensor saw nothing it could range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    Distance(u32),
    OutOfRange,
}

/// Converts one echo pulse width into a distance in millimeters.
///
/// The pulse covers the round trip, so the one-way distance is half of
/// `pulse_us * 343 m/s`. Integer truncation toward zero is fine here; the
/// sensor itself is only good to a few millimeters.
pub fn distance_from_echo(pulse_us: u32) -> Option<u32> {
    if pulse_us == 0 || pulse_us > ECHO_TIMEOUT_US {
        return None;
    }
    Some(pulse_us * SPEED_OF_SOUND_M_S / 2_000)
}

/// Single-writer state cell for the echo edge interrupt.
///
/// The edge handler is the only writer: rising edges store a start
/// timestamp, falling edges store the completed pulse width. The periodic
/// trigger task takes completed pulses with [`take_pulse`](Self::take_pulse),
/// so a pulse is consumed exactly once and a tick that finds nothing knows
/// the reading has gone stale.
#[derive(Debug, PartialEq, Eq)]
pub struct EchoCapture {
    start: Option<u32>,
    pulse: Option<u32>,
}

impl EchoCapture {
    pub const fn new() -> EchoCapture {
        EchoCapture {
            start: None,
            pulse: None,
        }
    }

    /// Feed one electrical edge. `high` is the pin level after the edge,
    /// `now` the current timer tick count.
    pub fn edge(&mut self, high: bool, now: u32) {
        if high {
            self.start = Some(now);
        } else if let Some(started) = self.start.take() {
            self.pulse = Some(now.wrapping_sub(started));
        }
    }

    /// True strictly between a rising and a falling edge, i.e. while an
    /// echo is still in flight and re-triggering would corrupt it.
    pub fn in_flight(&self) -> bool {
        self.start.is_some()
    }

    /// The most recently completed pulse width in ticks, at most once.
    pub fn take_pulse(&mut self) -> Option<u32> {
        self.pulse.take()
    }
}

#[cfg(test)]
mod ranging_tests {
    use super::*;

    #[test]
    fn conversion_matches_known_pulse() {
        // 580 us round trip is roughly 10 cm.
        assert_eq!(distance_from_echo(580), Some(99));
    }

    #[test]
    fn conversion_rejects_timeout_and_zero() {
        assert_eq!(distance_from_echo(11_000), None);
        assert_eq!(distance_from_echo(ECHO_TIMEOUT_US + 1), None);
        assert_eq!(distance_from_echo(0), None);
        assert_eq!(distance_from_echo(ECHO_TIMEOUT_US), Some(1715));
    }

    #[test]
    fn conversion_is_monotonic() {
        let mut last = 0;
        for us in 1..=ECHO_TIMEOUT_US {
            let mm = distance_from_echo(us).unwrap();
            assert!(mm >= last);
            last = mm;
        }
    }

    #[test]
    fn conversion_is_idempotent() {
        assert_eq!(distance_from_echo(1234), distance_from_echo(1234));
    }

    #[test]
    fn capture_measures_pulse_between_edges() {
        let mut capture = EchoCapture::new();
        capture.edge(true, 1_000);
        capture.edge(false, 1_580);
        assert_eq!(capture.take_pulse(), Some(580));
    }

    #[test]
    fn capture_handles_counter_wraparound() {
        let mut capture = EchoCapture::new();
        capture.edge(true, u32::MAX - 100);
        capture.edge(false, 100);
        assert_eq!(capture.take_pulse(), Some(201));
    }

    #[test]
    fn capture_yields_each_pulse_once() {
        let mut capture = EchoCapture::new();
        capture.edge(true, 10);
        capture.edge(false, 30);
        assert_eq!(capture.take_pulse(), Some(20));
        assert_eq!(capture.take_pulse(), None);
    }

    #[test]
    fn capture_is_in_flight_between_edges() {
        let mut capture = EchoCapture::new();
        assert!(!capture.in_flight());
        capture.edge(true, 55);
        assert!(capture.in_flight());
        capture.edge(false, 70);
        assert!(!capture.in_flight());
    }

    #[test]
    fn falling_edge_without_rising_is_ignored() {
        let mut capture = EchoCapture::new();
        capture.edge(false, 500);
        assert_eq!(capture.take_pulse(), None);
    }
}
