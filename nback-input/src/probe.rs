/// Derived boolean "is this channel physically active right now".
/// Implementations read whatever the hardware (or a simulator)
/// provides and hide the polarity/threshold details.
pub trait Probe {
    fn is_active(&mut self) -> bool;
}

/// Digital line level, high or low.
pub trait LineReader {
    fn level_high(&mut self) -> bool;
}

/// Mechanical button wired with a pull-up: the line idles high and a
/// press pulls it low.
pub struct ActiveLowButton<L>(pub L);

impl<L: LineReader> Probe for ActiveLowButton<L> {
    fn is_active(&mut self) -> bool {
        !self.0.level_high()
    }
}

/// Raw capacitance reading; lower values mean a finger is closer.
pub trait TouchReader {
    fn read(&mut self) -> u16;
}

/// Capacitive pad: active while the reading sits below the threshold.
pub struct TouchPad<T> {
    reader: T,
    pub threshold: u16,
    pub last_value: u16,
}

impl<T> TouchPad<T> {
    pub fn new(reader: T, threshold: u16) -> Self {
        Self {
            reader,
            threshold,
            last_value: 0,
        }
    }
}

impl<T: TouchReader> Probe for TouchPad<T> {
    fn is_active(&mut self) -> bool {
        self.last_value = self.reader.read();
        self.last_value < self.threshold
    }
}

impl<F: FnMut() -> bool> LineReader for F {
    fn level_high(&mut self) -> bool {
        self()
    }
}

impl<F: FnMut() -> u16> TouchReader for F {
    fn read(&mut self) -> u16 {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_is_active_low() {
        let mut level = true;
        {
            let mut probe = ActiveLowButton(|| level);
            assert!(!probe.is_active());
        }
        level = false;
        let mut probe = ActiveLowButton(|| level);
        assert!(probe.is_active());
    }

    #[test]
    fn touch_pad_compares_against_threshold() {
        let readings = std::cell::Cell::new(40u16);
        let mut pad = TouchPad::new(|| readings.get(), 37);
        assert!(!pad.is_active());
        readings.set(12);
        assert!(pad.is_active());
        assert_eq!(pad.last_value, 12);
    }
}
