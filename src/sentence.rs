//! The pieces of an NMEA 0183 sentence that both the encoder and the decoder
//! care about: the talker ID, the three-letter verb, and the XOR checksum.

/// NMEA 0183 limits a sentence to 82 bytes including the `$` and the
/// trailing `\r\n`.
pub const MAX_SENTENCE_LEN: usize = 82;

/// The shortest sentence that can possibly be valid:
/// `$` + 2-char talker + 3-char verb + body + `*` + 2 hex digits.
pub const MIN_SENTENCE_LEN: usize = 10;

/// XOR of all bytes. A sentence's checksum covers everything between the
/// `$` and the `*`, both exclusive.
#[inline]
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |sum, byte| sum ^ byte)
}

/// Two-character code identifying the device class a sentence originates
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TalkerId(pub [u8; 2]);

impl TalkerId {
    /// `II`, the talker ID used by integrated instrumentation such as this
    /// wind sensor.
    pub const INTEGRATED_INSTRUMENTATION: Self = Self(*b"II");

    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl core::fmt::Display for TalkerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sentence types this instrument knows about. The set is small and
/// fixed, so a closed enum beats a verb-to-parser table; anything else ends
/// up in [`Verb::Other`] and is passed through undecoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verb {
    /// Wind speed and angle.
    Mwv,
    /// Course over ground and ground speed.
    Vtg,
    /// Depth below transducer.
    Dpt,
    /// Heading, magnetic.
    Hdm,
    /// A verb we do not decode.
    Other([u8; 3]),
}

impl Verb {
    #[inline]
    #[must_use]
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        match &bytes {
            b"MWV" => Self::Mwv,
            b"VTG" => Self::Vtg,
            b"DPT" => Self::Dpt,
            b"HDM" => Self::Hdm,
            _ => Self::Other(bytes),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mwv => "MWV",
            Self::Vtg => "VTG",
            Self::Dpt => "DPT",
            Self::Hdm => "HDM",
            Self::Other(bytes) => core::str::from_utf8(bytes).unwrap_or("???"),
        }
    }
}

impl core::fmt::Display for Verb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
