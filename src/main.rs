//! Light meter with operator-adjustable ADC sampling parameters.
//!
//! An LDR behind a switched input divider is sampled once per loop tick.
//! Two push buttons cycle through the resolution and input range presets;
//! their falling edges are debounced in interrupt context and handed to the
//! main loop as event flags. Two LEDs indicate low and high light levels.

#![no_std]
#![no_main]

use panic_halt as _;

mod attenuator;
mod config;
mod convert;
mod debounce;
mod errors;
mod light_levels;
mod serial;

#[rtic::app(device = stm32f4xx_hal::pac, peripherals = true)]
mod app {
    use cortex_m::peripheral::DWT;
    use embedded_hal::blocking::delay::DelayMs;
    use heapless::spsc::Queue;
    use rtt_target::{rprintln, rtt_init_print};
    use stm32f4xx_hal::{
        adc::{
            config::{AdcConfig, Resolution, SampleTime},
            Adc,
        },
        gpio::{gpioa, gpiob, Analog, Edge, ErasedPin, Input, Output, PinState, PushPull},
        otg_fs::{UsbBus, UsbBusType, USB},
        pac,
        prelude::*,
        timer::SysDelay,
    };
    use usb_device::bus::UsbBusAllocator;
    use usb_device::device::{UsbDevice, UsbDeviceBuilder, UsbVidPid};
    use usbd_serial::{SerialPort, USB_CLASS_CDC};

    use crate::attenuator::Attenuator;
    use crate::config::{
        SamplingConfig, DEFAULT_RANGE_INDEX, DEFAULT_RESOLUTION_INDEX, RANGE_PRESETS,
        RESOLUTION_PRESETS,
    };
    use crate::convert::Sample;
    use crate::debounce::Debouncer;
    use crate::errors::Error;
    use crate::light_levels::LightThresholds;
    use crate::serial::{
        self, SerialPortType, SERIAL_READ_BUFFER_BYTES, SERIAL_WRITE_BUFFER_BYTES,
    };

    /// Main loop period
    const LOOP_PERIOD_MS: u32 = 100;
    /// Status line cadence, counted in loop iterations (1 s)
    const LOG_EVERY_TICKS: u32 = 10;
    /// Button debounce window: 30 ms in DWT cycles at 48 MHz
    const DEBOUNCE_CYCLES: u32 = 30_000 * 48;

    const THRESHOLDS: LightThresholds = LightThresholds::new(0.25, 0.75);

    #[shared]
    struct Shared {
        /// Set by the resolution button interrupt, cleared by the loop
        resolution_pressed: bool,
        /// Set by the range button interrupt, cleared by the loop
        range_pressed: bool,
        usb_dev: UsbDevice<'static, UsbBusType>,
        serial: SerialPortType,
    }

    #[local]
    struct Local {
        resolution_button: gpioa::PA0<Input>,
        range_button: gpioa::PA1<Input>,
        resolution_debounce: Debouncer,
        range_debounce: Debouncer,
        adc: Adc<pac::ADC1>,
        light_pin: gpiob::PB0<Analog>,
        attenuator: Attenuator,
        low_light_led: ErasedPin<Output<PushPull>>,
        high_light_led: ErasedPin<Output<PushPull>>,
        sampling: SamplingConfig<'static>,
        delay: SysDelay,
        error_queue: Queue<Error, 8>,
    }

    #[init(local = [
        ep_memory: [u32; 1024] = [0; 1024],
        usb_bus: Option<UsbBusAllocator<UsbBusType>> = None,
    ])]
    fn init(mut ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        rtt_init_print!();

        rprintln!("Initializing");

        let mut syscfg = ctx.device.SYSCFG.constrain();

        // Clock setup. The 48 MHz PLL output is required for USB.
        let rcc = ctx.device.RCC.constrain();
        let clocks = rcc
            .cfgr
            .use_hse(25.MHz())
            .sysclk(48.MHz())
            .require_pll48clk()
            .freeze();

        // Cycle counter, used as the debounce timebase
        ctx.core.DCB.enable_trace();
        ctx.core.DWT.enable_cycle_counter();

        rprintln!("Clock setup done");

        // GPIO setup
        let gpioa = ctx.device.GPIOA.split();
        let gpiob = ctx.device.GPIOB.split();
        let gpioc = ctx.device.GPIOC.split();

        // Indicator LEDs, wired active-low, off until the first sample
        let low_light_led = gpioc
            .pc13
            .into_push_pull_output_in_state(PinState::High)
            .erase();
        let high_light_led = gpioa
            .pa8
            .into_push_pull_output_in_state(PinState::High)
            .erase();

        // Input divider select lines
        let mut attenuator = Attenuator::new(
            gpiob.pb4.into_push_pull_output().erase(),
            gpiob.pb5.into_push_pull_output().erase(),
        );

        // Push buttons, falling edge on press
        let mut resolution_button = gpioa.pa0.into_pull_up_input();
        resolution_button.make_interrupt_source(&mut syscfg);
        resolution_button.trigger_on_edge(&mut ctx.device.EXTI, Edge::Falling);
        resolution_button.enable_interrupt(&mut ctx.device.EXTI);

        let mut range_button = gpioa.pa1.into_pull_up_input();
        range_button.make_interrupt_source(&mut syscfg);
        range_button.trigger_on_edge(&mut ctx.device.EXTI, Edge::Falling);
        range_button.enable_interrupt(&mut ctx.device.EXTI);

        rprintln!("GPIO setup done");

        // Sampling configuration. An empty preset table is the only fatal
        // error; halt before entering the loop.
        let sampling = SamplingConfig::new(
            &RESOLUTION_PRESETS,
            &RANGE_PRESETS,
            DEFAULT_RESOLUTION_INDEX,
            DEFAULT_RANGE_INDEX,
        )
        .unwrap_or_else(|e| {
            rprintln!("{}", e.message());
            panic!("startup configuration error");
        });

        // ADC setup, applying the default presets before the first sample
        let light_pin = gpiob.pb0.into_analog();
        let adc_config =
            AdcConfig::default().resolution(resolution_from_bits(sampling.resolution().bits));
        let adc = Adc::adc1(ctx.device.ADC1, true, adc_config);
        attenuator.select(sampling.range().code);

        rprintln!(
            "ADC setup done: {} bits, {} ({} mV max)",
            sampling.resolution().bits,
            sampling.range().code.label(),
            sampling.max_millivolts()
        );

        // USB serial port for status output
        let usb = USB {
            usb_global: ctx.device.OTG_FS_GLOBAL,
            usb_device: ctx.device.OTG_FS_DEVICE,
            usb_pwrclk: ctx.device.OTG_FS_PWRCLK,
            pin_dm: gpioa.pa11.into_alternate(),
            pin_dp: gpioa.pa12.into_alternate(),
            hclk: clocks.hclk(),
        };
        let usb_bus = &*ctx
            .local
            .usb_bus
            .insert(UsbBus::new(usb, ctx.local.ep_memory));
        let serial = SerialPort::new_with_store(
            usb_bus,
            [0u8; SERIAL_READ_BUFFER_BYTES],
            [0u8; SERIAL_WRITE_BUFFER_BYTES],
        );
        let usb_dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(0x16c0, 0x27dd))
            .manufacturer("lightmeter")
            .product("Adjustable-range light meter")
            .serial_number("0001")
            .device_class(USB_CLASS_CDC)
            .build();

        let delay = ctx.core.SYST.delay(&clocks);

        rprintln!("Done initializing");

        (
            Shared {
                resolution_pressed: false,
                range_pressed: false,
                usb_dev,
                serial,
            },
            Local {
                resolution_button,
                range_button,
                resolution_debounce: Debouncer::new(DEBOUNCE_CYCLES),
                range_debounce: Debouncer::new(DEBOUNCE_CYCLES),
                adc,
                light_pin,
                attenuator,
                low_light_led,
                high_light_led,
                sampling,
                delay,
                error_queue: Queue::new(),
            },
            init::Monotonics(),
        )
    }

    /// Resolution button press. Runs in interrupt context: debounce and set
    /// the event flag, nothing else.
    #[task(binds = EXTI0, local = [resolution_button, resolution_debounce], shared = [resolution_pressed])]
    fn resolution_button_pressed(mut ctx: resolution_button_pressed::Context) {
        ctx.local.resolution_button.clear_interrupt_pending_bit();
        if ctx.local.resolution_debounce.accept(DWT::cycle_count()) {
            ctx.shared.resolution_pressed.lock(|flag| *flag = true);
        }
    }

    /// Range button press. Same contract as the resolution button.
    #[task(binds = EXTI1, local = [range_button, range_debounce], shared = [range_pressed])]
    fn range_button_pressed(mut ctx: range_button_pressed::Context) {
        ctx.local.range_button.clear_interrupt_pending_bit();
        if ctx.local.range_debounce.accept(DWT::cycle_count()) {
            ctx.shared.range_pressed.lock(|flag| *flag = true);
        }
    }

    #[task(binds = OTG_FS, shared = [usb_dev, serial])]
    fn usb_poll(ctx: usb_poll::Context) {
        (ctx.shared.usb_dev, ctx.shared.serial).lock(|usb_dev, serial| {
            usb_dev.poll(&mut [serial]);
        });
    }

    #[idle(
        shared = [resolution_pressed, range_pressed, serial],
        local = [
            adc, light_pin, attenuator, low_light_led, high_light_led,
            sampling, delay, error_queue,
        ]
    )]
    fn idle(mut ctx: idle::Context) -> ! {
        let mut ticks_since_log: u32 = 0;

        loop {
            // Drain pending button events. Each lock masks the button
            // interrupt only for the test-and-clear itself; the
            // configuration change runs outside the critical section.
            if ctx
                .shared
                .resolution_pressed
                .lock(|flag| core::mem::take(flag))
            {
                let preset = *ctx.local.sampling.advance_resolution();
                ctx.local
                    .adc
                    .set_resolution(resolution_from_bits(preset.bits));
                rprintln!("Resolution button pressed: {} bits", preset.bits);
                ctx.shared
                    .serial
                    .lock(|serial| serial::report_resolution(serial, &preset))
                    .unwrap_or_else(|e| e.log(ctx.local.error_queue));
            }

            if ctx.shared.range_pressed.lock(|flag| core::mem::take(flag)) {
                let preset = *ctx.local.sampling.advance_range();
                ctx.local.attenuator.select(preset.code);
                rprintln!("Range button pressed: {}", preset.code.label());
                ctx.shared
                    .serial
                    .lock(|serial| serial::report_range(serial, &preset))
                    .unwrap_or_else(|e| e.log(ctx.local.error_queue));
            }

            // One sample under the current configuration. A bad reading is
            // used as-is; the next tick self-corrects.
            let raw = ctx
                .local
                .adc
                .convert(ctx.local.light_pin, SampleTime::Cycles_480);
            let adc_millivolts = ctx.local.adc.sample_to_millivolts(raw);
            let sample = Sample::new(
                raw,
                adc_millivolts,
                ctx.local.sampling.full_scale(),
                ctx.local.sampling.max_millivolts(),
            );

            let levels = THRESHOLDS.classify(sample.raw, ctx.local.sampling.full_scale());
            drive_active_low(ctx.local.low_light_led, levels.low_light);
            drive_active_low(ctx.local.high_light_led, levels.high_light);

            // Status output runs at a slower cadence than sampling
            ticks_since_log += 1;
            if ticks_since_log >= LOG_EVERY_TICKS {
                ticks_since_log = 0;
                ctx.shared
                    .serial
                    .lock(|serial| serial::report_sample(serial, &sample))
                    .unwrap_or_else(|e| e.log(ctx.local.error_queue));
                while let Some(error) = ctx.local.error_queue.dequeue() {
                    rprintln!("{}", error.message());
                }
            }

            ctx.local.delay.delay_ms(LOOP_PERIOD_MS);
        }
    }

    /// Translate a semantic indicator state to the LED's active-low drive.
    fn drive_active_low(led: &mut ErasedPin<Output<PushPull>>, active: bool) {
        if active {
            led.set_low();
        } else {
            led.set_high();
        }
    }

    fn resolution_from_bits(bits: u8) -> Resolution {
        match bits {
            6 => Resolution::Six,
            8 => Resolution::Eight,
            10 => Resolution::Ten,
            _ => Resolution::Twelve,
        }
    }
}
