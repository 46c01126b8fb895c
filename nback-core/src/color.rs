use serde::{Deserialize, Serialize};

/// Number of colors drawn on as stimuli. White and purple are reserved
/// for feedback flashes and the power-on test.
pub const STIMULUS_COLORS: usize = 4;

/// The full palette the rig can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    White,
}

pub const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Purple,
    Color::White,
];

impl Color {
    pub fn from_index(index: usize) -> Option<Self> {
        PALETTE.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Green => 1,
            Color::Blue => 2,
            Color::Yellow => 3,
            Color::Purple => 4,
            Color::White => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
            Color::White => "white",
        }
    }

    /// Case-insensitive lookup used by the custom-sequence config syntax.
    pub fn from_name(name: &str) -> Option<Self> {
        PALETTE
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Red => (255, 0, 0),
            Color::Green => (0, 255, 0),
            Color::Blue => (0, 0, 255),
            Color::Yellow => (255, 255, 0),
            Color::Purple => (255, 0, 255),
            Color::White => (255, 255, 255),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trips() {
        for color in PALETTE {
            assert_eq!(Color::from_name(color.name()), Some(color));
        }
        assert_eq!(Color::from_name("  GREEN "), Some(Color::Green));
        assert_eq!(Color::from_name("magenta"), None);
    }

    #[test]
    fn stimulus_alphabet_excludes_feedback_colors() {
        for i in 0..STIMULUS_COLORS {
            let color = Color::from_index(i).unwrap();
            assert!(!matches!(color, Color::Purple | Color::White));
        }
    }
}
