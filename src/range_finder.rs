use crate::app;
use crate::pitch::pitch_for_distance;
use crate::ranging::{distance_from_echo, Reading};
use cortex_m::peripheral::DWT;
use rtic::Mutex;
use stm32l4xx_hal::{gpio::ExtiPin, prelude::*};
use systick_monotonic::*;

// HCSR04-23070007.pdf suggests >60ms measurement cycle, so tick at ~16 Hz.
pub const TRIGGER_PERIOD_MS: u64 = 62;

// How many ticks to hold the last good reading before declaring the target
// gone. Bounds the retry, so a lost echo degrades to out-of-range instead
// of spinning on the sensor forever.
pub const MAX_MISSED_TICKS: u8 = 8;

// Timestamps the echo edges: rising edge starts the measurement, falling
// edge completes it. Sole writer of the shared capture cell.
pub fn receive_echo(mut cx: app::receive_echo::Context) {
    if cx.local.echo.check_interrupt() {
        cx.local.echo.clear_interrupt_pending_bit();

        let high = cx.local.echo.is_high().unwrap();
        let now = DWT::cycle_count();
        cx.shared.capture.lock(|capture| capture.edge(high, now));
    }
}

// One ranging tick: consume the last completed echo, publish the reading
// and its pitch, then re-trigger the sensor if the line is idle.
pub fn ping(mut cx: app::ping::Context) {
    let (pulse, idle) = cx
        .shared
        .capture
        .lock(|capture| (capture.take_pulse(), !capture.in_flight()));

    let fresh = pulse
        .map(|ticks| ticks / crate::CYCLES_PER_US)
        .and_then(distance_from_echo);

    let misses = cx.local.misses;
    let update = match fresh {
        Some(mm) => {
            *misses = 0;
            Some(Reading::Distance(mm))
        }
        None if *misses < MAX_MISSED_TICKS => {
            // Hold the previous reading; one dropped echo shouldn't flicker
            // the tone.
            *misses += 1;
            None
        }
        None => Some(Reading::OutOfRange),
    };

    let current = cx.shared.range.lock(|range| {
        if let Some(reading) = update {
            *range = reading;
        }
        *range
    });

    *cx.shared.pitch = match current {
        Reading::Distance(mm) => pitch_for_distance(mm),
        Reading::OutOfRange => None,
    };

    // HCSR04-23070007.pdf suggests 10uS pulse to trigger system. Skip the
    // trigger while the previous echo is still in flight.
    if idle {
        cx.shared.ping_pong_pin.set_high().unwrap();
        app::pong::spawn_at(app::monotonics::now() + ExtU64::micros(10)).unwrap();
    }

    app::ping::spawn_after(TRIGGER_PERIOD_MS.millis()).unwrap();
}

// Only pongs if pinged. Drops the trigger line again.
pub fn pong(cx: app::pong::Context) {
    cx.shared.ping_pong_pin.set_low().unwrap();
}
