//! Range-select driver for the input attenuator.
//!
//! The analog front-end divides the input signal through a resistor ladder
//! ahead of the ADC pin; two select lines pick one of four taps.

use stm32f4xx_hal::gpio::{ErasedPin, Output, PushPull};

use crate::config::RangeCode;

pub struct Attenuator {
    sel0: ErasedPin<Output<PushPull>>,
    sel1: ErasedPin<Output<PushPull>>,
}

impl Attenuator {
    pub fn new(sel0: ErasedPin<Output<PushPull>>, sel1: ErasedPin<Output<PushPull>>) -> Self {
        Self { sel0, sel1 }
    }

    /// Switch the divider to the given range tap.
    pub fn select(&mut self, code: RangeCode) {
        let (bit0, bit1) = match code {
            RangeCode::Range1V1 => (false, false),
            RangeCode::Range1V5 => (true, false),
            RangeCode::Range2V2 => (false, true),
            RangeCode::Range3V3 => (true, true),
        };
        if bit0 {
            self.sel0.set_high();
        } else {
            self.sel0.set_low();
        }
        if bit1 {
            self.sel1.set_high();
        } else {
            self.sel1.set_low();
        }
    }
}
