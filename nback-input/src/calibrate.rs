/// Single-pass statistics over a batch of touch readings, used to
/// derive a detection threshold from baseline and touched samples.
#[derive(Debug, Clone, Copy)]
pub struct TouchStats {
    count: u32,
    min: u16,
    max: u16,
    sum: u64,
    sum_sq: u64,
}

impl Default for TouchStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchStats {
    pub fn new() -> Self {
        Self {
            count: 0,
            min: u16::MAX,
            max: 0,
            sum: 0,
            sum_sq: 0,
        }
    }

    pub fn push(&mut self, reading: u16) {
        self.count += 1;
        self.min = self.min.min(reading);
        self.max = self.max.max(reading);
        self.sum += u64::from(reading);
        self.sum_sq += u64::from(reading) * u64::from(reading);
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn min(&self) -> u16 {
        if self.count == 0 {
            0
        } else {
            self.min
        }
    }

    pub fn max(&self) -> u16 {
        self.max
    }

    pub fn mean(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f32 / self.count as f32
        }
    }

    /// Population standard deviation, matching the deployed
    /// calibration routine.
    pub fn std_dev(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f32;
        let mean = self.mean();
        let var = (self.sum_sq as f32 / n) - mean * mean;
        var.max(0.0).sqrt()
    }
}

/// Threshold between untouched-baseline and touched sample batches:
/// the midpoint of the two means, nudged 10% toward the touched mean
/// when the baseline is the noisier of the two. Falls back to 85% of
/// the baseline mean when the touched readings are not actually lower
/// (a wiring or sensor fault).
pub fn suggest_threshold(untouched: &TouchStats, touched: &TouchStats) -> u16 {
    let base = untouched.mean();
    let pressed = touched.mean();

    if pressed < base {
        let mut midpoint = (base + pressed) / 2.0;
        if untouched.std_dev() > touched.std_dev() {
            midpoint -= (base - pressed) * 0.1;
        }
        midpoint.round() as u16
    } else {
        (base * 0.85).round() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_of(readings: &[u16]) -> TouchStats {
        let mut stats = TouchStats::new();
        for &r in readings {
            stats.push(r);
        }
        stats
    }

    #[test]
    fn mean_and_std_dev() {
        let stats = stats_of(&[40, 42, 44, 38, 36]);
        assert!((stats.mean() - 40.0).abs() < 1e-3);
        assert!((stats.std_dev() - 2.828).abs() < 0.01);
        assert_eq!(stats.min(), 36);
        assert_eq!(stats.max(), 44);
    }

    #[test]
    fn empty_stats_are_all_zero() {
        let stats = TouchStats::new();
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.mean(), 0.0);
        assert_eq!(stats.std_dev(), 0.0);
        assert_eq!(stats.min(), 0);
    }

    #[test]
    fn threshold_sits_between_the_two_bands() {
        let untouched = stats_of(&[60, 61, 59, 60]);
        let touched = stats_of(&[20, 21, 19, 20]);
        let threshold = suggest_threshold(&untouched, &touched);
        assert!(threshold > 20 && threshold < 60);
    }

    #[test]
    fn inverted_readings_fall_back_to_baseline_fraction() {
        let untouched = stats_of(&[40, 40, 40]);
        let touched = stats_of(&[50, 50, 50]);
        assert_eq!(suggest_threshold(&untouched, &touched), 34);
    }
}
