/// Search counters shared by the control loop and the spin search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    /// Duration (seconds) of the next spiral forward drive. Only grows.
    pub spiral_length: u32,
    /// Full rotations completed since the last spiral step. Rotations made
    /// while delivering also count, so it can exceed the threshold then.
    pub spin_count: u32,
}

impl SearchState {
    pub fn new(initial_spiral_length: u32) -> Self {
        Self {
            spiral_length: initial_spiral_length,
            spin_count: 0,
        }
    }

    pub fn record_rotation(&mut self) {
        self.spin_count += 1;
    }

    pub fn should_escalate(&self, threshold: u32) -> bool {
        self.spin_count >= threshold
    }

    /// Widens the spiral and returns the length the forward drive uses.
    pub fn escalate(&mut self) -> u32 {
        let length = self.spiral_length;
        self.spiral_length += 1;
        self.spin_count = 0;
        length
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(crate::robot::config::INITIAL_SPIRAL_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_unit_spiral_and_no_spins() {
        let state = SearchState::default();
        assert_eq!(state.spiral_length, 1);
        assert_eq!(state.spin_count, 0);
    }

    #[test]
    fn escalate_returns_current_length_then_grows() {
        let mut state = SearchState::default();
        for _ in 0..5 {
            state.record_rotation();
        }
        assert!(state.should_escalate(5));
        assert_eq!(state.escalate(), 1);
        assert_eq!(state.spiral_length, 2);
        assert_eq!(state.spin_count, 0);
        assert!(!state.should_escalate(5));
    }
}
