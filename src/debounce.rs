//! Edge debouncing for the push buttons.
//!
//! The interrupt handler feeds every raw falling edge into a [`Debouncer`]
//! together with the current tick count; edges closer together than the
//! debounce window are discarded as contact bounce. Ticks are an abstract
//! free-running u32 counter (the DWT cycle counter on the target).

pub struct Debouncer {
    /// Minimum number of ticks between two accepted edges
    window: u32,
    /// Tick count of the last accepted edge
    last_accepted: u32,
}

impl Debouncer {
    pub const fn new(window: u32) -> Self {
        Self {
            window,
            last_accepted: 0,
        }
    }

    /// Decide whether an edge at tick `now` is a real press.
    ///
    /// Wrapping subtraction keeps the elapsed time correct across a single
    /// wrap of the tick counter, so neither a press shortly after a wrap nor
    /// bounce spanning the wrap is misjudged.
    pub fn accept(&mut self, now: u32) -> bool {
        let elapsed = now.wrapping_sub(self.last_accepted);
        if elapsed > self.window {
            self.last_accepted = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u32 = 30_000;

    #[test]
    fn test_bounce_rejected() {
        let mut d = Debouncer::new(WINDOW);
        assert!(d.accept(100_000));

        // A burst of bounce edges inside the window, all discarded
        for now in (100_500..130_000).step_by(500) {
            assert!(!d.accept(now));
        }
    }

    #[test]
    fn test_at_most_one_event_per_window() {
        let mut d = Debouncer::new(WINDOW);

        // Edges every 1ms for 300ms: no more than one acceptance per
        // window-length interval, however many edges arrive.
        let mut accepted = 0;
        for now in (100_000..400_000).step_by(1_000) {
            if d.accept(now) {
                accepted += 1;
            }
        }
        assert!(accepted <= 300_000 / WINDOW);
        assert!(accepted > 0);
    }

    #[test]
    fn test_slow_presses_all_accepted() {
        let mut d = Debouncer::new(WINDOW);
        for i in 1..20 {
            assert!(d.accept(i * (WINDOW + 1)));
        }
    }

    #[test]
    fn test_edge_exactly_at_window_rejected() {
        let mut d = Debouncer::new(WINDOW);
        assert!(d.accept(100_000));
        assert!(!d.accept(100_000 + WINDOW));
        assert!(d.accept(100_000 + WINDOW + 1));
    }

    #[test]
    fn test_counter_wrap_press() {
        let mut d = Debouncer::new(WINDOW);
        assert!(d.accept(u32::MAX - 1_000));

        // Counter has wrapped; a press well past the window is accepted
        assert!(d.accept(500_000));
    }

    #[test]
    fn test_counter_wrap_bounce() {
        let mut d = Debouncer::new(WINDOW);
        assert!(d.accept(u32::MAX - 1_000));

        // Bounce straddling the wrap is still inside the window
        assert!(!d.accept(10_000));
    }
}
