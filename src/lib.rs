//! Sentence framing, checksum validation and encoding for NMEA 0183, plus
//! the sampling logic that turns a cup anemometer's pulses and vane voltage
//! into calibrated wind readings. No heap allocation is used anywhere, so
//! the crate fits on small microcontroller boards; the board it was written
//! for is a masthead sensor computer feeding a chartplotter at 38400 baud.
//!
//! The codec and the sampler are plain synchronous code. The `client`
//! feature (enabled by default) adds the serial plumbing on top, built on
//! `embassy`: a mutex-guarded output port, an input port that reassembles
//! the byte stream, and an event loop that drives the 100 ms sampling
//! cadence and the decoder concurrently.

#![no_std]

mod decoder;
mod display;
mod encoder;
mod sampler;
mod sentence;

#[cfg(feature = "client")]
pub mod client;

pub use decoder::{
    decode_line, CourseSpeedEvent, DecodeError, Decoder, DepthEvent, SentenceEvent, WindEvent,
    BUFFER_CAPACITY, KPH_TO_KNOTS, MPH_TO_KNOTS,
};
pub use display::{DisplaySink, StatusView, DISPLAY_LINES};
pub use encoder::{encode, heading_magnetic, wind, EncodeError};
pub use sampler::{
    Correction, PulseRing, WindReading, WindSampler, DIRECTION_SAMPLES, HZ_TO_KNOTS, SPEED_SAMPLES,
};
pub use sentence::{checksum, TalkerId, Verb, MAX_SENTENCE_LEN, MIN_SENTENCE_LEN};
