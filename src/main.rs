#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

#[cfg(not(test))]
use panic_halt as _;

#[cfg(not(test))]
mod blinky;
mod pitch;
#[cfg(not(test))]
mod range_finder;
mod ranging;
#[cfg(not(test))]
mod status_reporter;
mod tone;

pub const SYSTEM_CLOCK: u32 = 80_000_000;
pub const CYCLES_PER_US: u32 = SYSTEM_CLOCK / 1_000_000;

#[cfg(not(test))]
#[rtic::app(device = stm32l4xx_hal::pac, peripherals = true, dispatchers = [EXTI0, EXTI1, EXTI2])]
mod app {
    use crate::blinky::heartbeat;
    use crate::range_finder::{ping, pong, receive_echo};
    use crate::ranging::{EchoCapture, Reading};
    use crate::status_reporter::print_status;
    use crate::tone::tone_tick;
    use crate::SYSTEM_CLOCK;
    use cortex_m::peripheral::DWT;
    use stm32l4xx_hal::{
        gpio::{Edge, Input, Output, PullDown, PushPull},
        gpio::{PA8, PB1, PB13, PB6},
        pac::USART2,
        prelude::*,
        serial,
        serial::{Config, Serial},
    };
    use systick_monotonic::Systick;

    // 10us granularity, fine enough for the trigger pulse and the shortest
    // tone half-period.
    #[monotonic(binds = SysTick, default = true)]
    type Mono = Systick<100_000>;

    #[shared]
    struct Shared {
        capture: EchoCapture,
        range: Reading,
        #[lock_free]
        pitch: Option<u32>,
        #[lock_free]
        ping_pong_pin: PB1<Output<PushPull>>,
    }

    #[local]
    struct Local {
        tx: serial::Tx<USART2>,
        led: PB13<Output<PushPull>>,
        echo: PB6<Input<PullDown>>,
        speaker: PA8<Output<PushPull>>,
    }

    #[init]
    fn init(mut cx: init::Context) -> (Shared, Local, init::Monotonics) {
        let mut dp = cx.device;

        // Prevent instibility on sleep with Probe-run
        dp.DBGMCU.cr.modify(|_, w| {
            w.dbg_sleep().set_bit();
            w.dbg_standby().set_bit();
            w.dbg_stop().set_bit()
        });

        // Cycle counter timestamps the echo edges.
        cx.core.DCB.enable_trace();
        DWT::unlock();
        cx.core.DWT.enable_cycle_counter();

        let mut rcc = dp.RCC.constrain();
        let mut flash = dp.FLASH.constrain();
        let mut pwr = dp.PWR.constrain(&mut rcc.apb1r1);
        let clocks = rcc
            .cfgr
            .sysclk(SYSTEM_CLOCK.hz())
            .hclk(SYSTEM_CLOCK.hz())
            .freeze(&mut flash.acr, &mut pwr);

        let mono = Systick::new(cx.core.SYST, clocks.sysclk().0);

        // GPIO Bank Initialization
        let mut gpioa = dp.GPIOA.split(&mut rcc.ahb2);
        let mut gpiob = dp.GPIOB.split(&mut rcc.ahb2);

        // General Purpose/Heart-beat LED
        let led = gpiob
            .pb13
            .into_push_pull_output(&mut gpiob.moder, &mut gpiob.otyper);

        // Serial diagnostics on the Virtual Comm Port, USART 2
        let baudrate = 38_400.bps();

        let tx_pin = gpioa.pa2.into_af7(&mut gpioa.moder, &mut gpioa.afrl);
        let rx_pin = gpioa.pa3.into_af7(&mut gpioa.moder, &mut gpioa.afrl);

        let (tx, _rx) = Serial::usart2(
            dp.USART2,
            (tx_pin, rx_pin),
            Config::default().baudrate(baudrate),
            clocks,
            &mut rcc.apb1r1,
        )
        .split();

        // Speaker. The square wave is bit-banged from the tone task, so this
        // is a plain push-pull output held low for silence.
        let mut speaker = gpioa
            .pa8
            .into_push_pull_output(&mut gpioa.moder, &mut gpioa.otyper);
        speaker.set_low().unwrap();

        // Range Finder

        // we need an edge-triggered interrupt that measures how long the
        // echo line was held high.
        let mut echo = gpiob
            .pb6
            .into_pull_down_input(&mut gpiob.moder, &mut gpiob.pupdr);
        echo.make_interrupt_source(&mut dp.SYSCFG, &mut rcc.apb2);
        echo.trigger_on_edge(&mut dp.EXTI, Edge::RISING_FALLING);
        echo.enable_interrupt(&mut dp.EXTI);

        // and we need a pin to trigger the ping, pulsed 10us high once per
        // ranging tick.
        let mut ping_pong_pin = gpiob
            .pb1
            .into_push_pull_output(&mut gpiob.moder, &mut gpiob.otyper);
        ping_pong_pin.set_low().unwrap();

        //
        // Scheduled Tasks
        //

        // Kick off the sonar tick, the tone generator, the heartbeat and the
        // status report.
        ping::spawn().unwrap();
        tone_tick::spawn().unwrap();
        heartbeat::spawn().unwrap();
        print_status::spawn().unwrap();

        (
            Shared {
                capture: EchoCapture::new(),
                range: Reading::OutOfRange,
                pitch: None,
                ping_pong_pin,
            },
            Local {
                tx,
                led,
                echo,
                speaker,
            },
            init::Monotonics(mono),
        )
    }

    extern "Rust" {
        #[task(binds = EXTI9_5, priority = 3, shared = [capture], local = [echo])]
        fn receive_echo(cx: receive_echo::Context);

        #[task(priority = 2, shared = [capture, range, pitch, ping_pong_pin], local = [misses: u8 = 0])]
        fn ping(cx: ping::Context);

        #[task(priority = 2, shared = [ping_pong_pin])]
        fn pong(cx: pong::Context);

        #[task(priority = 2, shared = [pitch], local = [speaker, high: bool = false])]
        fn tone_tick(cx: tone_tick::Context);

        #[task(shared = [range], local = [tx])]
        fn print_status(cx: print_status::Context);

        #[task(local = [led, toggle: bool = false])]
        fn heartbeat(cx: heartbeat::Context);
    }
}
