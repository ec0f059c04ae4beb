//! Reassembles a raw serial byte stream into discrete NMEA 0183 sentences,
//! validates them, and turns the ones this instrument understands into
//! structured events. A malformed sentence is reported and dropped; it can
//! never disturb the sentences that follow it.

use heapless::Vec;

use crate::sentence::{checksum, TalkerId, Verb, MIN_SENTENCE_LEN};

/// Capacity of the input frame buffer. Also the longest (oversized,
/// non-conforming) line that can be accumulated before data is dropped.
pub const BUFFER_CAPACITY: usize = 1024;

/// The most comma-separated words a sentence may carry, counting the verb.
const MAX_WORDS: usize = 20;

/// Miles per hour to knots.
pub const MPH_TO_KNOTS: f32 = 0.868_976_24;
/// Kilometres per hour to knots.
pub const KPH_TO_KNOTS: f32 = 0.539_956_8;

/// Wind speed and angle from an `MWV` sentence, speed already converted to
/// knots. The heading is truncated at the decimal point, as the display
/// head has no use for tenths of a degree.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindEvent {
    pub talker: TalkerId,
    pub relative_heading: i32,
    pub knots: f32,
}

/// Course and speed over ground from a `VTG` sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CourseSpeedEvent {
    pub talker: TalkerId,
    pub course_true: f32,
    pub course_magnetic: f32,
    pub speed_knots: f32,
}

/// Depth below transducer from a `DPT` sentence.
///
/// The sentence's second field (offset from the transducer) is not read;
/// `transducer_offset` is always 0. That matches what the boat's other
/// instruments expect from this unit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DepthEvent {
    pub talker: TalkerId,
    pub meters: f32,
    pub transducer_offset: f32,
}

/// One successfully validated sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SentenceEvent {
    Wind(WindEvent),
    CourseSpeedOverGround(CourseSpeedEvent),
    Depth(DepthEvent),
    /// The checksum was fine but we have no parser for this verb. Not an
    /// error; other talkers on the bus send plenty of sentences we ignore.
    Unsupported(Verb),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Shorter than the minimal `$xxVVV.*hh` form.
    TooShort,
    /// NMEA 0183 is an ASCII protocol.
    NotAscii,
    /// Missing the leading `$`.
    NoPrefix,
    /// Missing the `*` before the checksum digits.
    NoChecksum,
    /// The two characters after `*` are not hex digits.
    BadChecksumDigits,
    ChecksumMismatch { expected: u8, computed: u8 },
    /// Wrong number of comma-separated words for the verb.
    BadFieldCount(Verb),
    TooManyFields,
    /// A numeric field failed to parse.
    BadNumber(Verb),
    /// The MWV unit field was not one of `M`, `K`, `N`.
    BadUnit,
    /// A VTG course outside 0-360 degrees.
    CourseOutOfRange,
}

/// Validate and dispatch a single sentence, without the line terminator.
pub fn decode_line(line: &str) -> Result<SentenceEvent, DecodeError> {
    if !line.is_ascii() {
        return Err(DecodeError::NotAscii);
    }
    if line.len() < MIN_SENTENCE_LEN {
        return Err(DecodeError::TooShort);
    }

    let bytes = line.as_bytes();
    if bytes[0] != b'$' {
        return Err(DecodeError::NoPrefix);
    }

    let star = line.len() - 3;
    if bytes[star] != b'*' {
        return Err(DecodeError::NoChecksum);
    }
    let expected =
        u8::from_str_radix(&line[star + 1..], 16).map_err(|_| DecodeError::BadChecksumDigits)?;
    let computed = checksum(&bytes[1..star]);
    if expected != computed {
        return Err(DecodeError::ChecksumMismatch { expected, computed });
    }

    let talker = TalkerId::new([bytes[1], bytes[2]]);
    let verb = Verb::from_bytes([bytes[3], bytes[4], bytes[5]]);

    // words[0] is the verb itself, so field numbering matches the sentence
    // definitions.
    let mut words: Vec<&str, MAX_WORDS> = Vec::new();
    for word in line[3..star].split(',') {
        words.push(word).map_err(|_| DecodeError::TooManyFields)?;
    }

    match verb {
        Verb::Mwv => parse_wind(talker, &words),
        Verb::Vtg => parse_course_and_speed(talker, &words),
        Verb::Dpt => parse_depth(talker, &words),
        other => Ok(SentenceEvent::Unsupported(other)),
    }
}

/// `MWV,x.x,R,v.v,M,A` — relative wind heading and velocity. The unit word
/// decides the conversion to knots; an unrecognized unit rejects the whole
/// sentence.
fn parse_wind(talker: TalkerId, words: &[&str]) -> Result<SentenceEvent, DecodeError> {
    if words.len() != 6 {
        return Err(DecodeError::BadFieldCount(Verb::Mwv));
    }

    // truncate at the decimal point, do not round
    let heading = words[1].split('.').next().unwrap_or("");
    let relative_heading: i32 = heading.parse().map_err(|_| DecodeError::BadNumber(Verb::Mwv))?;
    let velocity: f32 = words[3].parse().map_err(|_| DecodeError::BadNumber(Verb::Mwv))?;

    let knots = match words[4] {
        "M" => velocity * MPH_TO_KNOTS,
        "K" => velocity * KPH_TO_KNOTS,
        "N" => velocity,
        _ => return Err(DecodeError::BadUnit),
    };

    Ok(SentenceEvent::Wind(WindEvent {
        talker,
        relative_heading,
        knots,
    }))
}

/// `VTG,t.t,T,m.m,M,s.s,N,k.k,K` — course over ground (true and magnetic)
/// and speed over ground in knots.
fn parse_course_and_speed(talker: TalkerId, words: &[&str]) -> Result<SentenceEvent, DecodeError> {
    if words.len() < 6 {
        return Err(DecodeError::BadFieldCount(Verb::Vtg));
    }

    let course_true: f32 = words[1].parse().map_err(|_| DecodeError::BadNumber(Verb::Vtg))?;
    if !(0.0..=360.0).contains(&course_true) {
        return Err(DecodeError::CourseOutOfRange);
    }
    let course_magnetic: f32 = words[3].parse().map_err(|_| DecodeError::BadNumber(Verb::Vtg))?;
    if !(0.0..=360.0).contains(&course_magnetic) {
        return Err(DecodeError::CourseOutOfRange);
    }
    let speed_knots: f32 = words[5].parse().map_err(|_| DecodeError::BadNumber(Verb::Vtg))?;

    Ok(SentenceEvent::CourseSpeedOverGround(CourseSpeedEvent {
        talker,
        course_true,
        course_magnetic,
        speed_knots,
    }))
}

/// `DPT,d.d,o.o` — depth in metres.
fn parse_depth(talker: TalkerId, words: &[&str]) -> Result<SentenceEvent, DecodeError> {
    if words.len() < 2 {
        return Err(DecodeError::BadFieldCount(Verb::Dpt));
    }

    let meters: f32 = words[1].parse().map_err(|_| DecodeError::BadNumber(Verb::Dpt))?;

    Ok(SentenceEvent::Depth(DepthEvent {
        talker,
        meters,
        transducer_offset: 0.0,
    }))
}

/// Accumulates serial input and hands out one decoded line at a time.
///
/// Feed it whatever chunks the transport delivers, then drain it with
/// [`Decoder::poll`]:
///
/// ```
/// use nmea0183_wind::{Decoder, SentenceEvent};
///
/// let mut decoder = Decoder::new();
/// decoder.feed(b"$IIMWV,90.0,R,10.0,N,A*35\r\n");
/// match decoder.poll() {
///     Some(Ok(SentenceEvent::Wind(wind))) => assert_eq!(wind.relative_heading, 90),
///     other => panic!("expected a wind event, got {:?}", other),
/// }
/// ```
pub struct Decoder {
    buf: Vec<u8, BUFFER_CAPACITY>,
    /// Bytes below this index are known to contain no line terminator.
    scanned: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
        }
    }

    /// Append newly received bytes. If the buffer fills up without a line
    /// terminator in sight, everything buffered so far is discarded; an
    /// unterminated kilobyte cannot be the middle of a valid sentence.
    pub fn feed(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            let free = BUFFER_CAPACITY - self.buf.len();
            if free == 0 {
                self.buf.clear();
                self.scanned = 0;
                continue;
            }

            let n = bytes.len().min(free);
            let _ = self.buf.extend_from_slice(&bytes[..n]);
            bytes = &bytes[n..];
        }
    }

    /// Extract and decode the next complete line, or `None` if more bytes
    /// are needed. Call repeatedly; one read may have delivered several
    /// sentences.
    pub fn poll(&mut self) -> Option<Result<SentenceEvent, DecodeError>> {
        let (end, next) = self.find_line()?;

        let result = match core::str::from_utf8(&self.buf[..end]) {
            Ok(line) => decode_line(line),
            Err(_) => Err(DecodeError::NotAscii),
        };

        self.consume(next);
        Some(result)
    }

    /// Find the next `\n`, returning (line end, index past the terminator).
    /// A `\r` immediately before the `\n` is excluded from the line.
    fn find_line(&mut self) -> Option<(usize, usize)> {
        for i in self.scanned..self.buf.len() {
            if self.buf[i] == b'\n' {
                let end = if i > 0 && self.buf[i - 1] == b'\r' {
                    i - 1
                } else {
                    i
                };
                return Some((end, i + 1));
            }
        }

        self.scanned = self.buf.len();
        None
    }

    /// Shift whatever trails the consumed line down to the front of the
    /// buffer.
    fn consume(&mut self, next: usize) {
        let remaining = self.buf.len() - next;
        self.buf.copy_within(next.., 0);
        self.buf.truncate(remaining);
        self.scanned = 0;
    }
}
