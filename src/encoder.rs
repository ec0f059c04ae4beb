//! Serializes structured readings into checksummed NMEA 0183 sentences,
//! ready to hand to a serial port.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::sentence::{checksum, TalkerId, Verb, MAX_SENTENCE_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// The sentence would exceed the 82-byte NMEA limit.
    TooLong,
}

/// Build a full sentence from a talker ID, a verb and its fields:
/// `$<talker><verb>,f1,f2,...*hh\r\n`. The checksum is the XOR of every
/// byte between `$` and `*`, rendered as two lowercase hex digits.
pub fn encode(
    talker: TalkerId,
    verb: Verb,
    fields: &[&str],
) -> Result<Vec<u8, MAX_SENTENCE_LEN>, EncodeError> {
    let mut body: String<MAX_SENTENCE_LEN> = String::new();
    write!(body, "{talker}{verb}").map_err(|_| EncodeError::TooLong)?;
    for field in fields {
        write!(body, ",{field}").map_err(|_| EncodeError::TooLong)?;
    }

    let sum = checksum(body.as_bytes());

    let mut sentence: String<MAX_SENTENCE_LEN> = String::new();
    write!(sentence, "${body}*{sum:02x}\r\n").map_err(|_| EncodeError::TooLong)?;
    Ok(sentence.into_bytes())
}

/// Wind heading and velocity:
/// `MWV,x.x,R,v.v,N,A` where `x.x` is the heading of the wind relative to
/// the bow and `v.v` the wind speed in knots.
pub fn wind(
    talker: TalkerId,
    relative_heading: f32,
    knots: f32,
) -> Result<Vec<u8, MAX_SENTENCE_LEN>, EncodeError> {
    let mut heading: String<16> = String::new();
    write!(heading, "{relative_heading:.1}").map_err(|_| EncodeError::TooLong)?;
    let mut speed: String<16> = String::new();
    write!(speed, "{knots:.1}").map_err(|_| EncodeError::TooLong)?;

    encode(talker, Verb::Mwv, &[&heading, "R", &speed, "N", "A"])
}

/// Magnetic heading: `HDM,x.x,M`.
pub fn heading_magnetic(
    talker: TalkerId,
    degrees: f32,
) -> Result<Vec<u8, MAX_SENTENCE_LEN>, EncodeError> {
    let mut heading: String<16> = String::new();
    write!(heading, "{degrees:.1}").map_err(|_| EncodeError::TooLong)?;

    encode(talker, Verb::Hdm, &[&heading, "M"])
}
