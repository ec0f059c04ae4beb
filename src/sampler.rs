//! Sampling and averaging for a cup-and-vane anemometer (written against
//! the Davis 6410; see <http://www.lexingtonwx.com/anemometer/>).
//!
//! The speed cups close a reed switch once per revolution, so wind speed is
//! derived from the interval spanned by the last few pulse timestamps. The
//! vane is a potentiometer read as an analog fraction of a turn. Pulses
//! arrive from an interrupt handler while a 100 ms timer does the sampling
//! and reporting, so the pulse ring lives behind a blocking mutex and the
//! critical sections copy a couple of words and nothing more.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU16, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Direction samples averaged per reported reading. At a 100 ms sampling
/// cadence this means one report per second.
pub const DIRECTION_SAMPLES: usize = 10;

/// Pulse timestamps kept for the speed average. The wall-clock span of the
/// ring varies with how fast the cups are turning.
pub const SPEED_SAMPLES: usize = 10;

/// Pulse frequency to knots: the cups produce 2.25 mph per Hz, times
/// mph-to-knots.
pub const HZ_TO_KNOTS: f32 = 2.25 * 0.868_976;

/// One calibrated wind reading, produced once per reporting interval.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindReading {
    /// Wind direction relative to the bow, 0.0-359.9 degrees in tenths.
    pub relative_heading: f32,
    /// Wind speed in knots, never negative.
    pub knots: f32,
}

struct PulseTimes {
    times: [u64; SPEED_SAMPLES],
    index: usize,
}

/// Ring of monotonic pulse timestamps shared between the speed-sensor
/// interrupt (writer) and the periodic report step (reader). A slot value
/// of 0 means the ring has never wrapped, which reads as 0 knots.
pub struct PulseRing<M: RawMutex> {
    inner: Mutex<M, RefCell<PulseTimes>>,
}

impl<M: RawMutex> PulseRing<M> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(PulseTimes {
                times: [0; SPEED_SAMPLES],
                index: 0,
            })),
        }
    }

    /// Record one revolution pulse. Safe to call from an interrupt handler:
    /// the critical section stores a timestamp and advances an index.
    pub fn record(&self, ticks: u64) {
        self.inner.lock(|state| {
            let mut state = state.borrow_mut();
            let index = state.index;
            state.times[index] = ticks;
            state.index = (index + 1) % SPEED_SAMPLES;
        });
    }

    /// Copy the oldest and newest timestamps out. The oldest is the slot
    /// the next write will overwrite; the newest is the one just behind the
    /// write index.
    fn span(&self) -> (u64, u64) {
        self.inner.lock(|state| {
            let state = state.borrow();
            let oldest = state.times[state.index];
            let newest = state.times[(state.index + SPEED_SAMPLES - 1) % SPEED_SAMPLES];
            (oldest, newest)
        })
    }
}

impl<M: RawMutex> Default for PulseRing<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mounting-orientation offset added to raw direction readings. Stored as
/// 0-359, so a negative offset is represented as `360 - n` (mount the
/// sensor facing aft and set 180). Plain word-sized atomics; a torn read
/// is impossible and the configuration path needs no lock.
pub struct Correction(AtomicU16);

impl Correction {
    #[must_use]
    pub const fn new(degrees: u16) -> Self {
        Self(AtomicU16::new(degrees % 360))
    }

    #[must_use]
    pub fn degrees(&self) -> u16 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, degrees: i16) {
        self.0.store(degrees.rem_euclid(360) as u16, Ordering::Relaxed);
    }
}

/// Runs the direction-averaging and speed-averaging algorithm.
///
/// Call [`WindSampler::sample`] with one raw vane reading every 100 ms;
/// every [`DIRECTION_SAMPLES`]th call averages the accumulated samples,
/// applies the correction, computes the speed from the pulse ring, and
/// yields a [`WindReading`].
pub struct WindSampler<'a, M: RawMutex> {
    pulses: &'a PulseRing<M>,
    correction: &'a Correction,
    direction: [f32; DIRECTION_SAMPLES],
    index: usize,
    ticks_per_second: u64,
}

impl<'a, M: RawMutex> WindSampler<'a, M> {
    /// `ticks_per_second` is the rate of the clock used to timestamp
    /// pulses fed to [`PulseRing::record`].
    pub fn new(pulses: &'a PulseRing<M>, correction: &'a Correction, ticks_per_second: u64) -> Self {
        Self {
            pulses,
            correction,
            direction: [0.0; DIRECTION_SAMPLES],
            index: 0,
            ticks_per_second,
        }
    }

    /// Store one vane sample, a fraction of a full turn in `[0,1)` where
    /// 0 points at the bow and 0.5 at the stern. Sensor noise outside that
    /// range is clamped; exactly 1.0 aliases to dead ahead.
    pub fn sample(&mut self, direction: f32) -> Option<WindReading> {
        self.direction[self.index] = direction.clamp(0.0, 1.0);
        self.index = (self.index + 1) % DIRECTION_SAMPLES;

        if self.index != 0 {
            return None;
        }
        Some(self.report())
    }

    fn report(&self) -> WindReading {
        let mean = self.direction.iter().sum::<f32>() / DIRECTION_SAMPLES as f32;

        // tenths of a degree, so the correction stays in integer math
        let mut tenths = (mean * 3600.0) as i32;
        tenths = (tenths + i32::from(self.correction.degrees()) * 10) % 3600;

        let (oldest, newest) = self.pulses.span();
        let knots = if oldest == 0 || newest <= oldest {
            // the cups have not yet filled the ring; report calm rather
            // than dividing by a sentinel
            0.0
        } else {
            // mean pulse period over the ring, converted to Hz, converted
            // to knots
            let delta = (newest - oldest) as f32;
            let period = delta / (SPEED_SAMPLES - 1) as f32 / self.ticks_per_second as f32;
            HZ_TO_KNOTS / period
        };

        WindReading {
            relative_heading: tenths as f32 / 10.0,
            knots,
        }
    }
}
