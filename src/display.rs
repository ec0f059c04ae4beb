//! Text-only status output. The core never touches pixels; whatever OLED or
//! terminal is attached just has to draw a line of text at a row index.

use core::fmt::Write;

use heapless::String;

use crate::sampler::WindReading;

/// Rows available on the status display.
pub const DISPLAY_LINES: u8 = 8;

/// A line-oriented status renderer. Row 0 is the top of the display.
pub trait DisplaySink {
    fn draw_line(&mut self, line: u8, text: &str);
}

/// Renders the current wind state, one value per row. Trailing blanks
/// overwrite leftovers from previously longer values.
pub struct StatusView {
    version: &'static str,
}

impl StatusView {
    #[must_use]
    pub const fn new(version: &'static str) -> Self {
        Self { version }
    }

    pub fn show<D: DisplaySink>(
        &self,
        sink: &mut D,
        reading: &WindReading,
        correction_degrees: u16,
    ) {
        sink.draw_line(0, self.version);

        let mut line: String<21> = String::new();
        let _ = write!(line, " speed: {:.1}  ", reading.knots);
        sink.draw_line(1, &line);

        line.clear();
        let _ = write!(line, " heading: {:.1}  ", reading.relative_heading);
        sink.draw_line(2, &line);

        line.clear();
        let _ = write!(line, " offset: {}  ", correction_degrees);
        sink.draw_line(3, &line);
    }
}
