//! Two tasks wired back to back over in-memory pipes: a sensor head that
//! samples wind and emits MWV sentences, and a cockpit unit that decodes
//! them. Exercises the whole path from pulse timestamps to a parsed event.

use std::convert::Infallible;

use critical_section as _;
use embassy_executor::Executor;
use embassy_futures::block_on;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, pipe::Pipe, signal::Signal};
use embassy_time::TICK_HZ;
use nmea0183_wind::client::{
    DirectionSensor, Event, Instrument, NmeaInputPort, NmeaOutputPort, Serial,
};
use nmea0183_wind::{Correction, PulseRing, SentenceEvent, TalkerId, WindSampler};
use static_cell::StaticCell;

static SENSOR_TO_COCKPIT: Pipe<CriticalSectionRawMutex, 256> = Pipe::new();
static COCKPIT_TO_SENSOR: Pipe<CriticalSectionRawMutex, 256> = Pipe::new();

static RECEIVED_WIND: Signal<CriticalSectionRawMutex, (i32, f32)> = Signal::new();

/// A fake UART: reads from one pipe, writes to the other.
struct PipeSerial {
    rx: &'static Pipe<CriticalSectionRawMutex, 256>,
    tx: &'static Pipe<CriticalSectionRawMutex, 256>,
}

impl Serial for PipeSerial {
    type Error = Infallible;

    async fn write(&mut self, mut buf: &[u8]) -> Result<(), Infallible> {
        while !buf.is_empty() {
            let n = self.tx.write(buf).await;
            buf = &buf[n..];
        }
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        Ok(self.rx.read(buf).await)
    }
}

/// The vane sits a quarter turn off the bow.
struct FixedVane;

impl DirectionSensor for FixedVane {
    fn read(&mut self) -> f32 {
        0.25
    }
}

/// Cup rotation rate fed into the pulse ring, in pulses per second.
const PULSE_HZ: u64 = 20;

#[embassy_executor::task]
async fn sensor_head() {
    static PULSES: PulseRing<CriticalSectionRawMutex> = PulseRing::new();
    static CORRECTION: Correction = Correction::new(0);

    // pretend the cups have been spinning at a steady rate
    for i in 0..10 {
        PULSES.record(TICK_HZ + i * (TICK_HZ / PULSE_HZ));
    }

    let sampler = WindSampler::new(&PULSES, &CORRECTION, TICK_HZ);
    let input = NmeaInputPort::new(PipeSerial {
        rx: &COCKPIT_TO_SENSOR,
        tx: &SENSOR_TO_COCKPIT,
    });
    let output: NmeaOutputPort<CriticalSectionRawMutex, _> = NmeaOutputPort::new(
        PipeSerial {
            rx: &COCKPIT_TO_SENSOR,
            tx: &SENSOR_TO_COCKPIT,
        },
        TalkerId::INTEGRATED_INSTRUMENTATION,
    );

    let mut instrument = Instrument::new(sampler, FixedVane, input);

    loop {
        if let Event::Wind(reading) = instrument.poll().await.unwrap() {
            output.send_wind(&reading).await.unwrap();
        }
    }
}

#[embassy_executor::task]
async fn cockpit() {
    let mut input = NmeaInputPort::new(PipeSerial {
        rx: &SENSOR_TO_COCKPIT,
        tx: &COCKPIT_TO_SENSOR,
    });

    loop {
        if let Ok(SentenceEvent::Wind(wind)) = input.next_event().await {
            RECEIVED_WIND.signal((wind.relative_heading, wind.knots));
        }
    }
}

#[test]
fn wind_reading_crosses_the_wire() {
    static EXECUTOR: StaticCell<Executor> = StaticCell::new();

    std::thread::spawn(|| {
        EXECUTOR.init_with(Executor::new).run(|spawner| {
            spawner.must_spawn(sensor_head());
            spawner.must_spawn(cockpit());
        });
    });

    let (heading, knots) = block_on(RECEIVED_WIND.wait());

    // a quarter turn, encoded as 90.0 and truncated back to 90
    assert_eq!(heading, 90);

    // 20 Hz of pulses, formatted to one decimal on the wire
    let expected = 20.0 * nmea0183_wind::HZ_TO_KNOTS;
    assert!(
        (knots - expected).abs() < 0.05,
        "got {knots} knots, expected about {expected}"
    );
}
