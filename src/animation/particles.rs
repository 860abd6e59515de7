use crate::foundation::core::{Point, Rgba8, Vec2};

/// Visual flavour of a particle; strategies pick how each kind is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Small bright dot.
    Spark,
    /// Rotating rectangle.
    Confetti,
    /// Golden disc.
    Coin,
    /// Slow rising ember.
    Ember,
    /// Soft additive glow.
    Glow,
}

/// Short-lived visual-effect unit. Units are pixels, pixels/second and milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position in surface space.
    pub pos: Point,
    /// Velocity in px/s.
    pub vel: Vec2,
    /// Remaining life in ms.
    pub life: f64,
    /// Life at spawn in ms.
    pub max_life: f64,
    /// Base color.
    pub color: Rgba8,
    /// Radius or half-extent in px.
    pub size: f64,
    /// Orientation, radians.
    pub rotation: f64,
    /// Angular velocity, radians/s.
    pub spin: f64,
    /// Kind.
    pub kind: ParticleKind,
}

impl Particle {
    /// Particle at rest with the given life.
    pub fn new(
        kind: ParticleKind,
        pos: Point,
        vel: Vec2,
        life_ms: f64,
        color: Rgba8,
        size: f64,
    ) -> Self {
        Self {
            pos,
            vel,
            life: life_ms,
            max_life: life_ms,
            color,
            size,
            rotation: 0.0,
            spin: 0.0,
            kind,
        }
    }

    /// Remaining life fraction in `[0,1]`, used as fade-out alpha.
    pub fn life_fraction(&self) -> f64 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Per-strategy force model applied to every particle every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceModel {
    /// Constant acceleration in px/s².
    pub gravity: Vec2,
    /// Fraction of velocity lost per second.
    pub drag: f64,
    /// Upward acceleration in px/s² (opposes positive y).
    pub buoyancy: f64,
}

impl ForceModel {
    /// No forces at all.
    pub const NONE: Self = Self {
        gravity: Vec2::ZERO,
        drag: 0.0,
        buoyancy: 0.0,
    };

    /// Downward gravity with light air drag.
    pub const fn falling(gravity: f64, drag: f64) -> Self {
        Self {
            gravity: Vec2::new(0.0, gravity),
            drag,
            buoyancy: 0.0,
        }
    }

    fn apply(&self, p: &mut Particle, dt_s: f64) {
        p.vel += self.gravity * dt_s;
        p.vel.y -= self.buoyancy * dt_s;
        let keep = (1.0 - self.drag * dt_s).max(0.0);
        p.vel *= keep;
    }
}

/// Owned particle collection with a soft cap on concurrent particles.
#[derive(Clone, Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    cap: usize,
    spawned_total: u64,
    rejected_total: u64,
}

impl ParticleSystem {
    /// Empty system holding at most `cap` particles at once.
    pub fn new(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap.min(1024)),
            cap,
            spawned_total: 0,
            rejected_total: 0,
        }
    }

    /// Soft cap.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Live particle count.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether no particle is alive.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Whether spawning is paused until attrition frees capacity.
    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.cap
    }

    /// Free slots under the cap.
    pub fn headroom(&self) -> usize {
        self.cap.saturating_sub(self.particles.len())
    }

    /// Live particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Particles accepted since construction or the last [`ParticleSystem::clear`].
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Spawn requests refused because the system was at cap.
    pub fn rejected_total(&self) -> u64 {
        self.rejected_total
    }

    /// Add one particle; refused (returns `false`) at cap or when it is already dead.
    pub fn spawn(&mut self, particle: Particle) -> bool {
        if self.is_full() || particle.life <= 0.0 {
            self.rejected_total += 1;
            return false;
        }
        self.particles.push(particle);
        self.spawned_total += 1;
        true
    }

    /// Spawn up to `count` particles built by `make(i)`; stops at cap. Returns how many were added.
    pub fn burst(&mut self, count: usize, mut make: impl FnMut(usize) -> Particle) -> usize {
        let n = count.min(self.headroom());
        for i in 0..n {
            self.spawn(make(i));
        }
        if n < count {
            self.rejected_total += (count - n) as u64;
        }
        n
    }

    /// Apply forces, integrate, age by `dt_ms`, and drop particles with `life <= 0`.
    pub fn update(&mut self, dt_ms: f64, forces: &ForceModel) {
        let dt_ms = dt_ms.max(0.0);
        let dt_s = dt_ms / 1000.0;
        for p in &mut self.particles {
            forces.apply(p, dt_s);
            p.pos += p.vel * dt_s;
            p.rotation += p.spin * dt_s;
            p.life -= dt_ms;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    /// Remove every particle and reset counters.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.spawned_total = 0;
        self.rejected_total = 0;
    }

    /// Approximate heap bytes held.
    pub fn footprint_bytes(&self) -> usize {
        self.particles.capacity() * std::mem::size_of::<Particle>()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/particles.rs"]
mod tests;
