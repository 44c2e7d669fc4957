//! ADC sampling presets and the active sampling configuration.
//!
//! Both preset tables are fixed at startup; the buttons only move an index
//! through them. The tables do not have to be the same length.

use crate::errors::Error;

/// One selectable ADC resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionPreset {
    /// Conversion resolution in bits
    pub bits: u8,
    /// Maximum raw count at this resolution (2^bits)
    pub full_scale: f32,
}

/// Tap of the input divider in front of the ADC pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCode {
    Range1V1,
    Range1V5,
    Range2V2,
    Range3V3,
}

impl RangeCode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Range1V1 => "0..1.1 V",
            Self::Range1V5 => "0..1.5 V",
            Self::Range2V2 => "0..2.2 V",
            Self::Range3V3 => "0..3.3 V",
        }
    }
}

/// One selectable input range of the analog front-end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangePreset {
    /// Divider tap selected for this range
    pub code: RangeCode,
    /// Maximum measurable input voltage in millivolts
    pub max_millivolts: u16,
}

/// Resolutions supported by the STM32F4 ADC.
pub static RESOLUTION_PRESETS: [ResolutionPreset; 4] = [
    ResolutionPreset { bits: 6, full_scale: 64.0 },
    ResolutionPreset { bits: 8, full_scale: 256.0 },
    ResolutionPreset { bits: 10, full_scale: 1024.0 },
    ResolutionPreset { bits: 12, full_scale: 4096.0 },
];

pub static RANGE_PRESETS: [RangePreset; 4] = [
    RangePreset { code: RangeCode::Range1V1, max_millivolts: 1100 },
    RangePreset { code: RangeCode::Range1V5, max_millivolts: 1500 },
    RangePreset { code: RangeCode::Range2V2, max_millivolts: 2200 },
    RangePreset { code: RangeCode::Range3V3, max_millivolts: 3300 },
];

/// Power-on defaults: 10 bits, 1.1 V range.
pub const DEFAULT_RESOLUTION_INDEX: usize = 2;
pub const DEFAULT_RANGE_INDEX: usize = 0;

/// The currently selected resolution and input range.
///
/// Owned by the control loop; interrupt handlers never touch it. Every index
/// change must be written out to the hardware (ADC resolution register,
/// divider select lines) before the next sample is taken.
#[derive(Debug)]
pub struct SamplingConfig<'a> {
    resolutions: &'a [ResolutionPreset],
    ranges: &'a [RangePreset],
    resolution_index: usize,
    range_index: usize,
}

impl<'a> SamplingConfig<'a> {
    /// An empty preset table is a startup configuration error and fatal.
    pub fn new(
        resolutions: &'a [ResolutionPreset],
        ranges: &'a [RangePreset],
        start_resolution: usize,
        start_range: usize,
    ) -> Result<Self, Error> {
        if resolutions.is_empty() || ranges.is_empty() {
            return Err(Error::EmptyPresetTable);
        }
        Ok(Self {
            resolutions,
            ranges,
            resolution_index: start_resolution % resolutions.len(),
            range_index: start_range % ranges.len(),
        })
    }

    pub fn resolution(&self) -> &ResolutionPreset {
        &self.resolutions[self.resolution_index]
    }

    pub fn range(&self) -> &RangePreset {
        &self.ranges[self.range_index]
    }

    pub fn full_scale(&self) -> f32 {
        self.resolution().full_scale
    }

    pub fn max_millivolts(&self) -> u16 {
        self.range().max_millivolts
    }

    /// Switch to the next resolution preset, wrapping around at the end,
    /// and return it.
    pub fn advance_resolution(&mut self) -> &ResolutionPreset {
        self.resolution_index = (self.resolution_index + 1) % self.resolutions.len();
        self.resolution()
    }

    /// Switch to the next input range preset, wrapping around at the end,
    /// and return it.
    pub fn advance_range(&mut self) -> &RangePreset {
        self.range_index = (self.range_index + 1) % self.ranges.len();
        self.range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SamplingConfig<'static> {
        SamplingConfig::new(
            &RESOLUTION_PRESETS,
            &RANGE_PRESETS,
            DEFAULT_RESOLUTION_INDEX,
            DEFAULT_RANGE_INDEX,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = config();
        assert_eq!(cfg.resolution().bits, 10);
        assert_eq!(cfg.full_scale(), 1024.0);
        assert_eq!(cfg.max_millivolts(), 1100);
    }

    #[test]
    fn test_full_scale_matches_bits() {
        for preset in &RESOLUTION_PRESETS {
            assert_eq!(preset.full_scale, (1u32 << preset.bits) as f32);
        }
    }

    #[test]
    fn test_advance_wraps() {
        let mut cfg = config();
        assert_eq!(cfg.advance_resolution().bits, 12);
        assert_eq!(cfg.advance_resolution().bits, 6);
        assert_eq!(cfg.advance_range().max_millivolts, 1500);
    }

    #[test]
    fn test_advance_is_cyclic() {
        let mut cfg = config();
        for _ in 0..RESOLUTION_PRESETS.len() {
            cfg.advance_resolution();
        }
        for _ in 0..RANGE_PRESETS.len() {
            cfg.advance_range();
        }
        assert_eq!(cfg.resolution().bits, 10);
        assert_eq!(cfg.max_millivolts(), 1100);
    }

    #[test]
    fn test_two_events_in_one_tick_both_apply() {
        // A resolution press and a range press consumed in the same loop
        // iteration must both take effect.
        let mut cfg = config();
        cfg.advance_resolution();
        cfg.advance_range();
        assert_eq!(cfg.resolution().bits, 12);
        assert_eq!(cfg.max_millivolts(), 1500);
    }

    #[test]
    fn test_empty_table_is_fatal() {
        assert_eq!(
            SamplingConfig::new(&[], &RANGE_PRESETS, 0, 0).unwrap_err(),
            Error::EmptyPresetTable
        );
        assert_eq!(
            SamplingConfig::new(&RESOLUTION_PRESETS, &[], 0, 0).unwrap_err(),
            Error::EmptyPresetTable
        );
    }
}
