//! Participant orbs gather into an orbit, charge up, burst apart, and the winner grows out of
//! the blast.

use std::f64::consts::TAU;

use rand::{Rng, rngs::StdRng};

use crate::{
    animation::{
        ease::Ease,
        effects::{Flash, ScreenShake},
        particles::{ForceModel, ParticleKind, ParticleSystem},
        phase::{Phase, PhaseTable, PhaseTracker},
    },
    config::{AnimationEngineConfig, AnimationStyle, Participant},
    engine::strategy::{AnimationStrategy, FrameInput},
    foundation::{
        core::{Point, Rect, Rgba8, Vec2},
        error::RaffleResult,
        math::{lerp, remap_clamped},
    },
    render::{context::Paint, surface::RenderSurface},
    styles::{
        common::{
            BurstSpec, DEFAULT_BACKGROUND, GOLD, burst, draw_backdrop, draw_flash,
            draw_particles, draw_winner_banner, items_footprint, model_rng, winner_of,
        },
        layout::{
            DisplayItem, build_sequence, choose_winner_occurrence, mark_winner, plant_winner,
            share_participants,
        },
        rarity::{RarityColors, RarityFn, assign_rarity},
    },
};

pub const MIN_ORBS: usize = 12;
pub const MAX_ORBS: usize = 36;
/// Winner zoom reached at the end of the reveal.
pub const FINAL_ZOOM: f64 = 2.5;

const DEFAULT_PARTICLE_CAP: usize = 500;
const MIN_ORB_RADIUS: f64 = 8.0;
const EXPLODE_START: f64 = 0.6;
const REVEAL_START: f64 = 0.75;

static PHASES: [Phase; 4] = [
    Phase::new("gather", 0.3, Ease::InQuad),
    Phase::new("charge", EXPLODE_START, Ease::InOutSine),
    Phase::new("explode", REVEAL_START, Ease::OutExpo),
    Phase::new("reveal", 1.0, Ease::OutBack),
];

static TABLE: PhaseTable = PhaseTable::from_static(&PHASES);
const EXPLODE_PHASE: usize = 2;

const BLAST_FORCES: ForceModel = ForceModel {
    gravity: Vec2::new(0.0, 60.0),
    drag: 1.6,
    buoyancy: 0.0,
};

#[derive(Clone, Debug)]
pub struct ParticleExplosion {
    rarity: RarityFn,
}

impl Default for ParticleExplosion {
    fn default() -> Self {
        Self {
            rarity: assign_rarity,
        }
    }
}

impl ParticleExplosion {
    pub fn with_rarity_fn(rarity: RarityFn) -> Self {
        Self { rarity }
    }
}

#[derive(Debug)]
pub struct ParticleExplosionModel {
    pub orbs: Vec<DisplayItem>,
    pub winner_index: usize,
    pub zoom: f64,
    /// Scattered spawn points the orbs gather from.
    origins: Vec<Point>,
    angles: Vec<f64>,
    center: Point,
    orbit: f64,
    orb_radius: f64,
    colors: RarityColors,
    background: Rgba8,
    burst_size: usize,
    particles: ParticleSystem,
    shake: ScreenShake,
    flash: Flash,
    tracker: PhaseTracker,
    rng: StdRng,
}

impl ParticleExplosionModel {
    /// Orb drawn largest; ties go to the lower index.
    pub fn largest(&self) -> Option<usize> {
        self.orbs
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, orb)| match best {
                Some((_, s)) if s >= orb.scale.x => best,
                _ => Some((i, orb.scale.x)),
            })
            .map(|(i, _)| i)
    }

    fn place_orbs(&mut self, ge: f64) {
        let gather = remap_clamped(ge, 0.0, PHASES[0].end);
        let charge = remap_clamped(ge, PHASES[0].end, EXPLODE_START);
        let blast = remap_clamped(ge, EXPLODE_START, REVEAL_START);
        let reveal = remap_clamped(ge, REVEAL_START, 1.0);
        let spin = charge * charge * TAU * 1.5;
        let orbit = self.orbit * (1.0 - 0.35 * charge) * (1.0 + 1.6 * blast);

        for (i, orb) in self.orbs.iter_mut().enumerate() {
            let angle = self.angles[i] + spin;
            let ring = self.center + Vec2::from_angle(angle) * orbit;
            let mut pos = self.origins[i].lerp(ring, gather);
            if orb.is_winner {
                pos = pos.lerp(self.center, reveal);
            }
            orb.pos = pos;
            let s = if orb.is_winner {
                1.0 + self.zoom
            } else {
                1.0 - 0.5 * self.zoom / FINAL_ZOOM
            };
            orb.scale = Vec2::new(s, s);
            orb.alpha = if orb.is_winner {
                1.0
            } else {
                lerp(1.0, 0.25, reveal)
            };
        }
    }
}

impl AnimationStrategy for ParticleExplosion {
    type Model = ParticleExplosionModel;

    fn style(&self) -> AnimationStyle {
        AnimationStyle::ParticleExplosion
    }

    fn phases(&self) -> &PhaseTable {
        &TABLE
    }

    fn initialize_animation(
        &self,
        config: &AnimationEngineConfig,
        surface: &RenderSurface,
        rng: &mut StdRng,
    ) -> RaffleResult<ParticleExplosionModel> {
        let opts = &config.playback.style_options;
        let winner = winner_of(config)?;
        let participants = share_participants(&config.participants);

        let count = opts
            .item_count
            .unwrap_or(participants.len())
            .clamp(MIN_ORBS, MAX_ORBS);
        let ideal = count / 2;
        let mut orbs = build_sequence(&participants, count, rng, self.rarity);
        plant_winner(&mut orbs, &winner, ideal, count, rng, self.rarity);
        let winner_index = choose_winner_occurrence(&orbs, &winner.id, ideal)?;
        mark_winner(&mut orbs, winner_index);

        let bounds = surface.bounds();
        let origins: Vec<Point> = (0..count)
            .map(|_| {
                Point::new(
                    rng.gen_range(bounds.x0..=bounds.x1),
                    rng.gen_range(bounds.y0..=bounds.y1),
                )
            })
            .collect();
        let angles = (0..count).map(|i| i as f64 / count as f64 * TAU).collect();
        let short = bounds.width().min(bounds.height());
        let max_radius = (short * 0.06).max(MIN_ORB_RADIUS);
        let orb_radius =
            (short * 0.5 * TAU / count as f64 * 0.3).clamp(MIN_ORB_RADIUS, max_radius);
        for (orb, origin) in orbs.iter_mut().zip(&origins) {
            orb.pos = *origin;
        }
        tracing::debug!(count, winner_index, "orbs scattered");

        Ok(ParticleExplosionModel {
            orbs,
            winner_index,
            zoom: 0.0,
            origins,
            angles,
            center: surface.center(),
            orbit: short * 0.32,
            orb_radius,
            colors: RarityColors::with_overrides(&opts.rarity_colors)?,
            background: opts.background_or(DEFAULT_BACKGROUND),
            burst_size: opts.particle_count,
            particles: ParticleSystem::new(opts.particle_cap_or(DEFAULT_PARTICLE_CAP)),
            shake: ScreenShake::default(),
            flash: Flash::default(),
            tracker: PhaseTracker::default(),
            rng: model_rng(rng),
        })
    }

    fn render_frame(
        &self,
        input: &FrameInput,
        surface: &mut RenderSurface,
        model: &mut ParticleExplosionModel,
    ) -> RaffleResult<()> {
        let ge = input.phase.global_eased;
        model.zoom = FINAL_ZOOM * remap_clamped(ge, REVEAL_START, 1.0);
        model.place_orbs(ge);

        if model.tracker.advance(input.phase.index).contains(&EXPLODE_PHASE) {
            let palette: Vec<Rgba8> = model
                .orbs
                .iter()
                .map(|o| model.colors.get(o.rarity))
                .chain([GOLD, Rgba8::WHITE])
                .collect();
            let count = model.burst_size.max(model.particles.cap() / 2);
            burst(
                &mut model.particles,
                &mut model.rng,
                BurstSpec {
                    origin: model.center,
                    count,
                    kind: ParticleKind::Spark,
                    palette: &palette,
                    speed: (200.0, 800.0),
                    life_ms: (600.0, 1400.0),
                },
            );
            model.shake.decay.trigger(12.0, 500.0);
            model.flash.decay.trigger(0.8, 300.0);
        }
        model.particles.update(input.delta_ms, &BLAST_FORCES);
        model.shake.decay.update(input.delta_ms);
        model.flash.decay.update(input.delta_ms);

        draw_backdrop(surface, model.background);
        let shake = model.shake.offset(&mut model.rng);
        let charge = remap_clamped(ge, PHASES[0].end, EXPLODE_START);
        let reveal = remap_clamped(ge, REVEAL_START, 1.0);
        {
            let mut scene = surface.scoped();
            scene.translate(shake);
            if charge > 0.0 && ge < REVEAL_START {
                let r = model.orbit * (0.2 + 0.3 * charge);
                let core = GOLD.with_alpha(0.3 + 0.6 * charge);
                scene.fill_circle(model.center, r, Paint::glow(model.center, r, core));
            }
            // Winner last so it lands on top.
            let order = (0..model.orbs.len())
                .filter(|&i| i != model.winner_index)
                .chain([model.winner_index]);
            for i in order {
                let orb = &model.orbs[i];
                let tint = model.colors.get(orb.rarity);
                let mut o = scene.scoped();
                o.transform(orb.affine()).alpha(orb.alpha);
                let r = model.orb_radius;
                o.fill_circle(Point::ZERO, r * 1.25, Paint::glow(Point::ZERO, r * 1.25, tint));
                o.image_or_placeholder(
                    orb.image_ref(),
                    orb.name(),
                    Rect::from_center_size(Point::ZERO, (r * 1.4, r * 1.4)),
                    tint,
                );
                if orb.is_winner && reveal > 0.0 {
                    o.stroke_circle(Point::ZERO, r * 1.1, 2.0, GOLD.with_alpha(reveal));
                }
            }
            draw_particles(&mut scene, &model.particles);
        }
        draw_flash(surface, &model.flash);
        if let Some(orb) = model.orbs.get(model.winner_index) {
            draw_winner_banner(surface, orb.name(), reveal);
        }
        Ok(())
    }

    fn reset(&self, model: &mut ParticleExplosionModel) {
        model.zoom = 0.0;
        for (orb, origin) in model.orbs.iter_mut().zip(&model.origins) {
            orb.pos = *origin;
            orb.scale = Vec2::new(1.0, 1.0);
            orb.alpha = 1.0;
        }
        model.particles.clear();
        model.shake.decay.reset();
        model.flash.decay.reset();
        model.tracker.reset();
    }

    fn revealed<'m>(&self, model: &'m ParticleExplosionModel) -> Option<&'m Participant> {
        model
            .largest()
            .and_then(|i| model.orbs.get(i))
            .map(|it| it.participant.as_ref())
    }

    fn particle_count(&self, model: &ParticleExplosionModel) -> usize {
        model.particles.len()
    }

    fn footprint_bytes(&self, model: &ParticleExplosionModel) -> usize {
        items_footprint(&model.orbs)
            + std::mem::size_of_val(model.origins.as_slice())
            + std::mem::size_of_val(model.angles.as_slice())
            + model.particles.footprint_bytes()
    }

    fn motion_value(&self, model: &ParticleExplosionModel) -> f64 {
        model.zoom
    }

    fn final_target(&self, _model: &ParticleExplosionModel) -> f64 {
        FINAL_ZOOM
    }
}

#[cfg(test)]
#[path = "../../tests/unit/styles/particle_explosion.rs"]
mod tests;
