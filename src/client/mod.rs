//! Serial plumbing around the codec and the sampler: a mutex-guarded NMEA
//! output port, an input port that reassembles the byte stream, and an
//! event loop that serves the sampling cadence and the serial input
//! concurrently.

use core::fmt;

#[cfg(feature = "defmt")]
use defmt::debug;
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Ticker};

use crate::decoder::{Decoder, SentenceEvent};
use crate::encoder::{self, EncodeError};
use crate::sampler::{WindReading, WindSampler};
use crate::sentence::TalkerId;

mod serial;

pub use serial::Serial;

/// How often the direction sensor is sampled. One wind reading is reported
/// per [`crate::DIRECTION_SAMPLES`] ticks, i.e. once per second.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

pub enum Error<S: Serial> {
    Serial(S::Error),
    Encode(EncodeError),
}

impl<S: Serial> fmt::Debug for Error<S>
where
    S::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial(e) => f.debug_tuple("Serial").field(e).finish(),
            Self::Encode(e) => f.debug_tuple("Encode").field(e).finish(),
        }
    }
}

/// Writes NMEA sentences to a serial port. The port is behind a mutex so
/// that sentence producers contend rather than interleave: formatting and
/// writing one sentence is a single atomic operation as far as other
/// producers can tell.
pub struct NmeaOutputPort<M: RawMutex, S: Serial> {
    serial: Mutex<M, S>,
    talker: TalkerId,
}

impl<M: RawMutex, S: Serial> NmeaOutputPort<M, S> {
    pub fn new(serial: S, talker: TalkerId) -> Self {
        Self {
            serial: Mutex::new(serial),
            talker,
        }
    }

    /// Send `$IIMWV,<heading>,R,<knots>,N,A`.
    pub async fn send_wind(&self, reading: &WindReading) -> Result<(), Error<S>> {
        let mut serial = self.serial.lock().await;
        let bytes = encoder::wind(self.talker, reading.relative_heading, reading.knots)
            .map_err(Error::Encode)?;
        #[cfg(feature = "defmt")]
        debug!("sending MWV, {} bytes", bytes.len());
        serial.write(&bytes).await.map_err(Error::Serial)
    }

    /// Send `$IIHDM,<heading>,M`.
    pub async fn send_heading_magnetic(&self, degrees: f32) -> Result<(), Error<S>> {
        let mut serial = self.serial.lock().await;
        let bytes = encoder::heading_magnetic(self.talker, degrees).map_err(Error::Encode)?;
        #[cfg(feature = "defmt")]
        debug!("sending HDM, {} bytes", bytes.len());
        serial.write(&bytes).await.map_err(Error::Serial)
    }

    /// Write pre-formed bytes, for repeating sentences received on another
    /// port out to this one.
    pub async fn send_raw(&self, bytes: &[u8]) -> Result<(), Error<S>> {
        let mut serial = self.serial.lock().await;
        serial.write(bytes).await.map_err(Error::Serial)
    }
}

/// Reads a serial port and yields validated sentence events. Rejected
/// sentences are logged and skipped; a transport error is the only thing
/// that surfaces to the caller.
pub struct NmeaInputPort<S: Serial> {
    serial: S,
    decoder: Decoder,
}

impl<S: Serial> NmeaInputPort<S> {
    pub fn new(serial: S) -> Self {
        Self {
            serial,
            decoder: Decoder::new(),
        }
    }

    pub async fn next_event(&mut self) -> Result<SentenceEvent, Error<S>> {
        loop {
            while let Some(result) = self.decoder.poll() {
                match result {
                    Ok(event) => return Ok(event),
                    Err(_rejected) => {
                        #[cfg(feature = "defmt")]
                        debug!("dropped sentence: {}", _rejected);
                    }
                }
            }

            let mut chunk = [0u8; 64];
            let n = self.serial.read(&mut chunk).await.map_err(Error::Serial)?;
            self.decoder.feed(&chunk[..n]);
        }
    }
}

/// Reads the wind vane, a fraction of a full turn in `[0,1)`.
pub trait DirectionSensor {
    fn read(&mut self) -> f32;
}

/// Something the instrument loop produced: either our own sensor completed
/// a reporting interval, or a sentence arrived on the input port.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Wind(WindReading),
    Sentence(SentenceEvent),
}

/// The instrument event loop: a fixed 100 ms ticker drives the wind
/// sampler while the input port is drained concurrently. Neither side
/// blocks the other; the tick handler only reads one analog sample.
pub struct Instrument<'a, M: RawMutex, S: Serial, D: DirectionSensor> {
    sampler: WindSampler<'a, M>,
    sensor: D,
    input: NmeaInputPort<S>,
    ticker: Ticker,
}

impl<'a, M: RawMutex, S: Serial, D: DirectionSensor> Instrument<'a, M, S, D> {
    pub fn new(sampler: WindSampler<'a, M>, sensor: D, input: NmeaInputPort<S>) -> Self {
        Self {
            sampler,
            sensor,
            input,
            ticker: Ticker::every(SAMPLE_INTERVAL),
        }
    }

    /// Wait for the next event. Ticks that do not complete a reporting
    /// interval produce nothing and the wait continues.
    pub async fn poll(&mut self) -> Result<Event, Error<S>> {
        loop {
            match select(self.ticker.next(), self.input.next_event()).await {
                Either::First(()) => {
                    let raw = self.sensor.read();
                    if let Some(reading) = self.sampler.sample(raw) {
                        return Ok(Event::Wind(reading));
                    }
                }
                Either::Second(result) => return result.map(Event::Sentence),
            }
        }
    }
}
