#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Ticker};
use encoder_firmware::config::{
    ENCODER_PIN_A, ENCODER_PIN_B, ENCODER_PULL, PULSES_PER_REVOLUTION, REPORT_INTERVAL_MS,
};
use encoder_firmware::{HalGpioBackend, SharedDecoder};

#[cfg(not(feature = "polled"))]
use embassy_futures::select::{select, Either};
#[cfg(not(feature = "polled"))]
use encoder_firmware::{watch_edges, Channel};

#[cfg(feature = "polled")]
use encoder_firmware::config::SAMPLE_INTERVAL_US;
#[cfg(feature = "polled")]
use encoder_firmware::RpGpioBackend;

#[cfg(feature = "home-button")]
use embassy_rp::gpio::Pull;
#[cfg(feature = "home-button")]
use embassy_time::Timer;
#[cfg(feature = "home-button")]
use encoder_firmware::config::HOME_DEBOUNCE_MS;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

/// Decoder shared by the edge, report and home tasks.
static DECODER: SharedDecoder = SharedDecoder::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Encoder firmware starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Encoder Setup ---
    let pin_a = Input::new(p.PIN_2, ENCODER_PULL);
    let pin_b = Input::new(p.PIN_3, ENCODER_PULL);
    let mut backend = HalGpioBackend::new(ENCODER_PIN_A, pin_a, ENCODER_PIN_B, pin_b);

    if let Err(e) = DECODER.initialize(
        &mut backend,
        ENCODER_PIN_A,
        ENCODER_PIN_B,
        PULSES_PER_REVOLUTION,
    ) {
        error!("Decoder initialization failed: {:?}", e);
        return;
    }

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    #[cfg(not(feature = "polled"))]
    {
        let (pin_a, pin_b) = backend.into_parts();
        spawner.spawn(edge_task(pin_a, pin_b, &DECODER).unwrap());
    }
    #[cfg(feature = "polled")]
    spawner.spawn(sample_task(backend, &DECODER).unwrap());

    #[cfg(feature = "home-button")]
    spawner.spawn(home_task(Input::new(p.PIN_4, Pull::Up), &DECODER).unwrap());

    spawner.spawn(report_task(&DECODER).unwrap());

    info!(
        "Encoder initialized, {} counts per revolution",
        DECODER.counts_per_revolution()
    );
}

/// Edge task - waits on both channels and forwards each edge to the decoder.
#[cfg(not(feature = "polled"))]
#[embassy_executor::task]
async fn edge_task(
    mut pin_a: Input<'static>,
    mut pin_b: Input<'static>,
    decoder: &'static SharedDecoder,
) {
    let result = select(
        watch_edges(&mut pin_a, Channel::A, decoder),
        watch_edges(&mut pin_b, Channel::B, decoder),
    )
    .await;

    let (Either::First(stopped) | Either::Second(stopped)) = result;
    match stopped {
        Ok(never) => match never {},
        Err(e) => error!("Edge watcher stopped: {:?}", e),
    }
}

/// Sample task - reads both channels at a fixed rate (polled mode).
#[cfg(feature = "polled")]
#[embassy_executor::task]
async fn sample_task(mut backend: RpGpioBackend, decoder: &'static SharedDecoder) {
    let mut ticker = Ticker::every(Duration::from_micros(SAMPLE_INTERVAL_US));

    loop {
        ticker.next().await;
        if let Err(e) = decoder.sample(&mut backend) {
            error!("Sampling failed: {:?}", e);
            return;
        }
    }
}

/// Home task - zeroes the position when the button is pressed.
#[cfg(feature = "home-button")]
#[embassy_executor::task]
async fn home_task(mut button: Input<'static>, decoder: &'static SharedDecoder) {
    loop {
        button.wait_for_falling_edge().await;
        let radians = decoder.get_position(true);
        info!("Homed at {} rad", radians);
        Timer::after(Duration::from_millis(HOME_DEBOUNCE_MS)).await;
    }
}

/// Report task - logs position and missed pulses periodically.
#[embassy_executor::task]
async fn report_task(decoder: &'static SharedDecoder) {
    let counts_per_revolution = decoder.counts_per_revolution();
    let mut ticker = Ticker::every(Duration::from_millis(REPORT_INTERVAL_MS));
    let mut last_missed = 0;

    loop {
        ticker.next().await;

        let snapshot = decoder.snapshot();
        info!(
            "Position: {} counts ({} rad)",
            snapshot.position,
            snapshot.radians(counts_per_revolution)
        );

        let new_missed = snapshot.missed_pulses.saturating_sub(last_missed);
        if new_missed > 0 {
            warn!(
                "{} pulses missed since last report ({} since home)",
                new_missed, snapshot.missed_pulses
            );
        }
        last_missed = snapshot.missed_pulses;
    }
}
