use std::io::{self, Write};

use nback_core::Color;

/// Terminal stand-in for the single-pixel strip: one `led>` line per
/// color change, with a truecolor block so the stimulus is visible in
/// the transcript. Only changes are printed so the protocol stream
/// stays readable.
pub struct LedStrip {
    current: Option<Color>,
}

impl LedStrip {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn show<W: Write>(&mut self, w: &mut W, color: Option<Color>) -> io::Result<()> {
        if color == self.current {
            return Ok(());
        }
        self.current = color;
        match color {
            Some(color) => {
                let (r, g, b) = color.rgb();
                writeln!(w, "led> \x1b[48;2;{r};{g};{b}m   \x1b[0m {}", color.name())
            }
            None => writeln!(w, "led> off"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_changes_are_printed() {
        let mut strip = LedStrip::new();
        let mut out = Vec::new();
        strip.show(&mut out, Some(Color::Red)).unwrap();
        strip.show(&mut out, Some(Color::Red)).unwrap();
        strip.show(&mut out, None).unwrap();
        strip.show(&mut out, None).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("led> "));
        assert!(lines[0].ends_with("red"));
        assert_eq!(lines[1], "led> off");
    }

    #[test]
    fn initial_off_state_is_silent() {
        let mut strip = LedStrip::new();
        let mut out = Vec::new();
        strip.show(&mut out, None).unwrap();
        assert!(out.is_empty());
    }
}
