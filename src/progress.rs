use serde::Serialize;

/// Where the animation sits between a train's origin and destination.
///
/// Advances by a fixed step per clock tick and snaps back to zero once it
/// passes one, so it always stays in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct AnimationProgress(f64);

impl AnimationProgress {
    pub const ZERO: Self = Self(0.0);
    pub const STEP: f64 = 0.01;

    pub fn advance(self) -> Self {
        let next = self.0 + Self::STEP;
        if next > 1.0 { Self::ZERO } else { Self(next) }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}
