use crate::app;
use crate::ranging::Reading;
use core::fmt::Write;
use heapless::String;
use rtic::Mutex;
use systick_monotonic::*;

// Prints Periodically. The line is staged in a stack buffer so the lock on
// the shared reading stays short.
pub fn print_status(mut cx: app::print_status::Context) {
    let reading = cx.shared.range.lock(|range| *range);

    let mut line: String<32> = String::new();
    match reading {
        Reading::Distance(mm) => write!(line, "range: {} mm\r", mm).unwrap(),
        Reading::OutOfRange => write!(line, "range: out of range\r").unwrap(),
    }
    cx.local.tx.write_str(line.as_str()).unwrap();

    // print every 1 second
    app::print_status::spawn_after(1.secs()).unwrap();
}
