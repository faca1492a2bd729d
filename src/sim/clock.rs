/// A simulation clock that tracks contiguous step windows.
///
/// The `SimClock` owns the bench's notion of time: where the next step
/// starts, how long it lasts, and whether the emulator must perform a
/// full initialization before integrating.
///
/// # Examples
///
/// ```
/// use emu_bench::sim::clock::SimClock;
///
/// let mut clock = SimClock::new(300.0);
/// assert_eq!(clock.window(), (0.0, 300.0));
/// assert!(clock.initializing());
///
/// clock.advance();
/// assert_eq!(clock.window(), (300.0, 600.0));
/// assert!(!clock.initializing());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    /// Start of the next step window, in seconds.
    start_time: f64,
    /// Length of each step window, in seconds.
    step: f64,
    /// True until the first window has been committed.
    initialize: bool,
}

impl SimClock {
    /// Creates a clock at time zero with the given step length.
    ///
    /// # Arguments
    ///
    /// * `step` - Step window length in seconds
    pub fn new(step: f64) -> Self {
        Self {
            start_time: 0.0,
            step,
            initialize: true,
        }
    }

    /// Start of the next step window, in seconds.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Current step window length, in seconds.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Replaces the step length used by subsequent windows.
    ///
    /// History already committed is unaffected.
    pub fn set_step(&mut self, step: f64) {
        self.step = step;
    }

    /// True when the next window is the first after construction.
    pub fn initializing(&self) -> bool {
        self.initialize
    }

    /// Returns the next step window as `(start, end)` in seconds.
    pub fn window(&self) -> (f64, f64) {
        (self.start_time, self.start_time + self.step)
    }

    /// Commits the current window: its end becomes the next start and
    /// the initialization phase is over.
    pub fn advance(&mut self) {
        self.start_time += self.step;
        self.initialize = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock() {
        let clock = SimClock::new(300.0);
        assert_eq!(clock.start_time(), 0.0);
        assert_eq!(clock.step(), 300.0);
        assert!(clock.initializing());
    }

    #[test]
    fn test_windows_are_contiguous() {
        let mut clock = SimClock::new(300.0);
        assert_eq!(clock.window(), (0.0, 300.0));

        clock.advance();
        assert_eq!(clock.window(), (300.0, 600.0));

        clock.advance();
        assert_eq!(clock.window(), (600.0, 900.0));
    }

    #[test]
    fn test_initialize_cleared_after_first_advance() {
        let mut clock = SimClock::new(300.0);
        assert!(clock.initializing());

        clock.advance();
        assert!(!clock.initializing());

        clock.advance();
        assert!(!clock.initializing());
    }

    #[test]
    fn test_set_step_applies_from_next_window() {
        let mut clock = SimClock::new(300.0);
        clock.advance();

        clock.set_step(60.0);
        assert_eq!(clock.window(), (300.0, 360.0));

        clock.advance();
        assert_eq!(clock.window(), (360.0, 420.0));
    }
}
