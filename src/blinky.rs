use crate::app;
use stm32l4xx_hal::prelude::*;
use systick_monotonic::*;

// Beats Periodically. Independent of ranging, so a dead sensor still
// leaves a visibly alive device.
pub fn heartbeat(cx: app::heartbeat::Context) {
    let led = cx.local.led;
    let toggle = cx.local.toggle;

    if *toggle {
        led.set_low().unwrap();
    } else {
        led.set_high().unwrap();
    }
    *toggle = !*toggle;

    app::heartbeat::spawn_after(500.millis()).unwrap();
}
