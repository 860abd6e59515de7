use rand::Rng;

use crate::foundation::core::{Rgba8, Vec2};

/// Re-triggerable intensity that decays to zero over a fixed duration.
///
/// The intensity ramps down linearly, `peak * remaining / duration`, and is exactly zero once the
/// duration has elapsed. Uneven update steps land on the same ramp.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DecayEffect {
    intensity: f64,
    remaining_ms: f64,
}

impl DecayEffect {
    /// Start (or strengthen) the effect. Never weakens an ongoing stronger or longer effect.
    pub fn trigger(&mut self, intensity: f64, duration_ms: f64) {
        if !(intensity > 0.0 && duration_ms > 0.0) {
            return;
        }
        self.intensity = self.intensity.max(intensity);
        self.remaining_ms = self.remaining_ms.max(duration_ms);
    }

    /// Age the effect by `dt_ms`.
    pub fn update(&mut self, dt_ms: f64) {
        if self.remaining_ms <= 0.0 {
            self.intensity = 0.0;
            return;
        }
        let next = (self.remaining_ms - dt_ms.max(0.0)).max(0.0);
        self.intensity *= next / self.remaining_ms;
        self.remaining_ms = next;
        if next == 0.0 {
            self.intensity = 0.0;
        }
    }

    /// Current intensity.
    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Milliseconds until the effect dies out.
    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    /// Whether the effect still has a visible contribution.
    pub fn is_active(&self) -> bool {
        self.intensity > 0.0 && self.remaining_ms > 0.0
    }

    /// Stop immediately.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Camera shake: intensity is the maximum offset in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenShake {
    /// Underlying decay state.
    pub decay: DecayEffect,
}

impl ScreenShake {
    /// Random offset within `[-intensity, intensity]` on both axes.
    pub fn offset(&self, rng: &mut impl Rng) -> Vec2 {
        let i = self.decay.intensity();
        if i <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(rng.gen_range(-i..=i), rng.gen_range(-i..=i))
    }
}

/// Full-surface flash: intensity is the overlay alpha in `[0,1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flash {
    /// Underlying decay state.
    pub decay: DecayEffect,
    /// Overlay color.
    pub color: Rgba8,
}

impl Default for Flash {
    fn default() -> Self {
        Self {
            decay: DecayEffect::default(),
            color: Rgba8::WHITE,
        }
    }
}

impl Flash {
    /// Overlay color with the current alpha applied, if visible.
    pub fn overlay(&self) -> Option<Rgba8> {
        let a = self.decay.intensity().clamp(0.0, 1.0);
        (a > 0.0).then(|| self.color.with_alpha(a))
    }
}
