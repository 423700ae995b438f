//! LoRa Link Main Application
//!
//! Entry point for the STM32G474 + SX127x link firmware.
//! Brings up the USB console and the radio, then runs the cooperative
//! main loop.

#![no_std]
#![no_main]

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::flash::Flash;
use embassy_stm32::gpio::{Level, Output, Pull, Speed};
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::usb::{self, Driver};
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Delay;
use embassy_usb::class::cdc_acm::{CdcAcmClass, Receiver, Sender, State};
use embassy_usb::{Builder, UsbDevice};
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use lora_link::drivers::sx127x::Sx127x;
use lora_link::hal::flash::FlashStore;
use lora_link::prelude::*;
use lora_link::radio::state::post;
use lora_link::usb::cdc::{self, ConsoleInput, ConsoleOutput};

// Bind interrupt handlers
bind_interrupts!(struct Irqs {
    USB_LP => usb::InterruptHandler<peripherals::USB>;
});

type UsbDriver = Driver<'static, peripherals::USB>;

static CONSOLE_IN: ConsoleInput = ConsoleInput::new();
static CONSOLE_OUT: ConsoleOutput = ConsoleOutput::new();
static CONSOLE_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static DIO0: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static EVENTS: StaticCell<EventQueue> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("LoRa link firmware v{}", env!("CARGO_PKG_VERSION"));

    // USB needs the 48 MHz HSI, trimmed from USB SOF
    let mut config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::{mux, Hsi48Config};
        config.rcc.hsi48 = Some(Hsi48Config { sync_from_usb: true });
        config.rcc.mux.clk48sel = mux::Clk48sel::HSI48;
    }
    let p = embassy_stm32::init(config);

    info!("Peripherals initialized");

    // USB CDC console
    static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    static CDC_STATE: StaticCell<State<'static>> = StaticCell::new();

    let driver = Driver::new(p.USB, Irqs, p.PA12, p.PA11);
    let mut builder = Builder::new(
        driver,
        cdc::usb_config(),
        CONFIG_DESC.init([0; 256]),
        BOS_DESC.init([0; 256]),
        &mut [],
        CONTROL_BUF.init([0; 64]),
    );
    let class = CdcAcmClass::new(&mut builder, CDC_STATE.init(State::new()), USB_CDC_PACKET_SIZE);
    let (sender, receiver) = class.split();
    let usb = builder.build();

    spawner.must_spawn(usb_task(usb));
    spawner.must_spawn(console_rx_task(receiver));
    spawner.must_spawn(console_tx_task(sender));

    // SX127x on SPI1, DIO0 on EXTI1
    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(SPI_FREQUENCY_HZ);
    let bus = Spi::new_blocking(p.SPI1, p.PA5, p.PA7, p.PA6, spi_config);
    let nss = Output::new(p.PA4, Level::High, Speed::VeryHigh);
    let device = match ExclusiveDevice::new_no_delay(bus, nss) {
        Ok(device) => device,
        Err(never) => match never {},
    };
    let reset = Output::new(p.PB0, Level::High, Speed::Low);
    let radio = Sx127x::new(device, reset, Delay);
    spawner.must_spawn(dio0_task(ExtiInput::new(p.PB1, p.EXTI1, Pull::Down)));

    let store = FlashStore::new(Flash::new_blocking(p.FLASH));
    let (mut irq_events, loop_events) = EVENTS.init(EventQueue::new()).split();

    info!("waiting for console");
    CONSOLE_READY.wait().await;

    let mut out = ConsoleBuffer::<CONSOLE_BUFFER_SIZE>::new();
    let booted = Scheduler::boot(radio, store, DEFAULT_ROLE, loop_events, &mut out);
    flush(&mut out).await;
    let Ok(mut scheduler) = booted else {
        error!("radio init failed, halting");
        loop {
            Timer::after(Duration::from_secs(60)).await;
        }
    };

    info!("entering main loop");

    let mut last = Instant::now();
    loop {
        if DIO0.try_take().is_some() {
            if let Some(event) = scheduler.link_mut().radio_mut().take_irq() {
                post(&mut irq_events, event);
            }
        }

        let now = Instant::now();
        let elapsed_ms = u32::try_from((now - last).as_millis()).unwrap_or(u32::MAX);
        last = now;

        let step = scheduler.step(read_byte(), elapsed_ms, &mut out);
        flush(&mut out).await;

        if step == LoopStep::Idle {
            // Wake early for the radio; the edge is re-raised for the next pass
            if let Either::Second(()) = select(Timer::after_millis(IDLE_DELAY_MS), DIO0.wait()).await {
                DIO0.signal(());
            }
        }
    }
}

/// Next console byte, if any
fn read_byte() -> Option<u8> {
    let mut byte = [0u8];
    match CONSOLE_IN.try_read(&mut byte) {
        Ok(1) => Some(byte[0]),
        _ => None,
    }
}

/// Move buffered output into the USB pipe
///
/// Waits for the host to drain the pipe, so bursts of input never outrun
/// the console.
async fn flush(out: &mut ConsoleBuffer<CONSOLE_BUFFER_SIZE>) {
    if !out.is_empty() {
        CONSOLE_OUT.write_all(out.as_bytes()).await;
    }
    if out.dropped() > 0 {
        warn!("console buffer overflow, {} bytes dropped", out.dropped());
    }
    out.clear();
}

/// USB device task
#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

/// Console input task
#[embassy_executor::task]
async fn console_rx_task(mut receiver: Receiver<'static, UsbDriver>) {
    cdc::forward_input(&mut receiver, &CONSOLE_IN).await;
}

/// Console output task; releases the main loop once a host is attached
#[embassy_executor::task]
async fn console_tx_task(mut sender: Sender<'static, UsbDriver>) {
    sender.wait_connection().await;
    CONSOLE_READY.signal(());
    cdc::forward_output(&mut sender, &CONSOLE_OUT).await;
}

/// Radio DIO0 task - flags RX done / TX done edges for the main loop
#[embassy_executor::task]
async fn dio0_task(mut dio0: ExtiInput<'static>) {
    loop {
        dio0.wait_for_rising_edge().await;
        DIO0.signal(());
    }
}
