use noise::{NoiseFn, Perlin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    Left,
    Right,
}

impl Wheel {
    fn lane(self) -> f64 {
        match self {
            Wheel::Left => 0.5,
            Wheel::Right => 7.5,
        }
    }
}

/// Slowly varying traction loss per wheel, drawn from Perlin noise so the
/// robot drifts smoothly rather than jittering.
pub struct WheelSlip {
    perlin: Perlin,
    amplitude: f64,
}

impl WheelSlip {
    pub fn new(seed: u32, amplitude: f64) -> Self {
        Self {
            perlin: Perlin::new(seed),
            amplitude,
        }
    }

    /// Fraction of commanded speed that reaches the floor, in
    /// `[1 - amplitude, 1]`.
    pub fn traction(&self, wheel: Wheel, time_ms: u64) -> f64 {
        if self.amplitude == 0.0 {
            return 1.0;
        }
        let t = time_ms as f64 / 4000.0;
        let value = self.perlin.get([t, wheel.lane()]).clamp(-1.0, 1.0);
        1.0 - self.amplitude * (value + 1.0) / 2.0
    }
}
