//! Raw-count-to-millivolt conversion.

/// Convert a raw ADC count to millivolts using the active presets.
///
/// The division must happen in floating point: `raw / full_scale` in
/// integer arithmetic truncates to zero for every reading below full scale.
pub fn raw_to_millivolts(raw: u16, full_scale: f32, max_millivolts: u16) -> u16 {
    (raw as f32 / full_scale * max_millivolts as f32) as u16
}

/// One measurement, valid for a single loop tick.
///
/// Carries two independent millivolt estimates: the one derived from the
/// ADC's factory calibration and the one computed from the preset tables.
/// They are cross-checks and are never reconciled; the status log reports
/// their difference.
pub struct Sample {
    pub raw: u16,
    pub adc_millivolts: u16,
    pub computed_millivolts: u16,
}

impl Sample {
    pub fn new(raw: u16, adc_millivolts: u16, full_scale: f32, max_millivolts: u16) -> Self {
        Self {
            raw,
            adc_millivolts,
            computed_millivolts: raw_to_millivolts(raw, full_scale, max_millivolts),
        }
    }

    /// Absolute difference between the two millivolt estimates.
    pub fn discrepancy(&self) -> u16 {
        self.adc_millivolts.abs_diff(self.computed_millivolts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midscale() {
        // 10 bits, 3.3 V range: half scale is half the range
        assert_eq!(raw_to_millivolts(512, 1024.0, 3300), 1650);
    }

    #[test]
    fn test_small_signal_not_truncated() {
        // Integer division would yield 0 for any raw count below full scale
        assert!(raw_to_millivolts(1, 1024.0, 3300) > 0);
        assert_eq!(raw_to_millivolts(1, 1024.0, 3300), 3);
    }

    #[test]
    fn test_zero_and_full_scale() {
        assert_eq!(raw_to_millivolts(0, 4096.0, 3300), 0);
        assert_eq!(raw_to_millivolts(4096, 4096.0, 3300), 3300);
    }

    #[test]
    fn test_discrepancy_is_symmetric() {
        let a = Sample::new(512, 1700, 1024.0, 3300);
        assert_eq!(a.computed_millivolts, 1650);
        assert_eq!(a.discrepancy(), 50);

        let b = Sample::new(512, 1600, 1024.0, 3300);
        assert_eq!(b.discrepancy(), 50);
    }
}
