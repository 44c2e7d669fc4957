//! Light level classification against fixed fractions of full scale.
//!
//! No hysteresis: a reading sitting exactly on a threshold may flicker the
//! indicator between ticks. The classifier reports semantic active/inactive
//! states; pin polarity is the output driver's business.

pub struct LightThresholds {
    /// Readings at or below this fraction of full scale are "low light"
    low: f32,
    /// Readings at or above this fraction of full scale are "high light"
    high: f32,
}

/// Indicator states for one sample. The two flags are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightLevels {
    pub low_light: bool,
    pub high_light: bool,
}

impl LightThresholds {
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    pub fn classify(&self, raw: u16, full_scale: f32) -> LightLevels {
        let raw = raw as f32;
        LightLevels {
            low_light: raw <= full_scale * self.low,
            high_light: raw >= full_scale * self.high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: LightThresholds = LightThresholds::new(0.25, 0.75);

    #[test]
    fn test_dark() {
        let levels = THRESHOLDS.classify(0, 1024.0);
        assert!(levels.low_light);
        assert!(!levels.high_light);
    }

    #[test]
    fn test_full_scale() {
        let levels = THRESHOLDS.classify(1024, 1024.0);
        assert!(!levels.low_light);
        assert!(levels.high_light);
    }

    #[test]
    fn test_midscale_neither() {
        let levels = THRESHOLDS.classify(512, 1024.0);
        assert!(!levels.low_light);
        assert!(!levels.high_light);
    }

    #[test]
    fn test_boundaries_inclusive() {
        assert!(THRESHOLDS.classify(256, 1024.0).low_light);
        assert!(!THRESHOLDS.classify(257, 1024.0).low_light);
        assert!(THRESHOLDS.classify(768, 1024.0).high_light);
        assert!(!THRESHOLDS.classify(767, 1024.0).high_light);
    }

    #[test]
    fn test_scales_with_resolution() {
        // Same relative brightness, different full scale
        assert!(THRESHOLDS.classify(16, 64.0).low_light);
        assert!(THRESHOLDS.classify(3072, 4096.0).high_light);
    }

    #[test]
    fn test_pure() {
        let a = THRESHOLDS.classify(300, 1024.0);
        let b = THRESHOLDS.classify(300, 1024.0);
        assert_eq!(a, b);
    }
}
