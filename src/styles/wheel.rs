//! Fortune wheel spinning under a fixed pointer at twelve o'clock.

use std::f64::consts::{FRAC_PI_2, TAU};

use rand::rngs::StdRng;

use crate::{
    animation::{
        ease::Ease,
        particles::{ForceModel, ParticleKind, ParticleSystem},
        phase::{Phase, PhaseTable, PhaseTracker},
    },
    config::{AnimationEngineConfig, AnimationStyle, Participant},
    engine::strategy::{AnimationStrategy, FrameInput},
    foundation::{
        core::{Point, Rect, Rgba8, Vec2},
        error::RaffleResult,
        math::{remap_clamped, wrap_angle},
    },
    render::{
        context::{TextAlign, TextStyle},
        surface::RenderSurface,
    },
    styles::{
        common::{
            BurstSpec, DEFAULT_BACKGROUND, GOLD, burst, draw_backdrop, draw_particles,
            draw_winner_banner, items_footprint, model_rng, winner_of,
        },
        layout::{
            DisplayItem, build_sequence, choose_winner_occurrence, mark_winner, padded_items,
            plant_winner, share_participants,
        },
        rarity::{RarityColors, RarityFn, assign_rarity},
    },
};

pub const MIN_SEGMENTS: usize = 8;
pub const MAX_SEGMENTS: usize = 48;
pub const DEFAULT_SPINS: u32 = 5;
pub const MAX_SPINS: u32 = 20;

/// Screen angle of the pointer (kurbo angles grow clockwise with y pointing down).
const POINTER_ANGLE: f64 = -FRAC_PI_2;
const DEFAULT_PARTICLE_CAP: usize = 400;
const ARTWORK_SEGMENT_LIMIT: usize = 16;

const SEGMENT_PALETTE: [Rgba8; 6] = [
    Rgba8::rgb(0xe6, 0x4b, 0x5c),
    Rgba8::rgb(0x3f, 0x88, 0xe8),
    Rgba8::rgb(0x4c, 0xc2, 0x7a),
    Rgba8::rgb(0xf2, 0x9a, 0x38),
    Rgba8::rgb(0x9b, 0x5d, 0xe5),
    Rgba8::rgb(0x2b, 0xb8, 0xc4),
];

static PHASES: [Phase; 4] = [
    Phase::new("wind-up", 0.08, Ease::InBack),
    Phase::new("spin", 0.55, Ease::Linear),
    Phase::new("slowdown", 0.92, Ease::OutCubic),
    Phase::new("settle", 1.0, Ease::OutBack),
];

static TABLE: PhaseTable = PhaseTable::from_static(&PHASES);
const SETTLE_PHASE: usize = 3;

const CONFETTI_FORCES: ForceModel = ForceModel::falling(380.0, 1.8);

/// Segment index under the pointer for a wheel rotated by `rotation` radians.
pub fn segment_at_pointer(rotation: f64, segments: usize) -> usize {
    if segments == 0 {
        return 0;
    }
    let a = TAU / segments as f64;
    ((wrap_angle(POINTER_ANGLE - rotation) / a).floor() as usize).min(segments - 1)
}

/// Rotation that leaves the middle of segment `index` under the pointer after `spins` turns.
pub fn landing_rotation(index: usize, segments: usize, spins: u32) -> f64 {
    let a = TAU / segments.max(1) as f64;
    f64::from(spins) * TAU + wrap_angle(POINTER_ANGLE - (index as f64 + 0.5) * a)
}

#[derive(Clone, Debug)]
pub struct Wheel {
    rarity: RarityFn,
}

impl Default for Wheel {
    fn default() -> Self {
        Self {
            rarity: assign_rarity,
        }
    }
}

impl Wheel {
    pub fn with_rarity_fn(rarity: RarityFn) -> Self {
        Self { rarity }
    }
}

#[derive(Debug)]
pub struct WheelModel {
    pub segments: Vec<DisplayItem>,
    pub winner_index: usize,
    pub final_rotation: f64,
    pub rotation: f64,
    colors: RarityColors,
    background: Rgba8,
    burst_size: usize,
    particles: ParticleSystem,
    tracker: PhaseTracker,
    rng: StdRng,
}

impl WheelModel {
    pub fn segment_under_pointer(&self) -> usize {
        segment_at_pointer(self.rotation, self.segments.len())
    }

    fn segment_color(&self, index: usize) -> Rgba8 {
        let base = SEGMENT_PALETTE[index % SEGMENT_PALETTE.len()];
        base.mix(self.colors.get(self.segments[index].rarity), 0.35)
    }
}

impl AnimationStrategy for Wheel {
    type Model = WheelModel;

    fn style(&self) -> AnimationStyle {
        AnimationStyle::Wheel
    }

    fn phases(&self) -> &PhaseTable {
        &TABLE
    }

    fn initialize_animation(
        &self,
        config: &AnimationEngineConfig,
        _surface: &RenderSurface,
        rng: &mut StdRng,
    ) -> RaffleResult<WheelModel> {
        let opts = &config.playback.style_options;
        let winner = winner_of(config)?;
        let participants = share_participants(&config.participants);

        let (mut segments, ideal) = if participants.len() > MAX_SEGMENTS {
            let mut segs = build_sequence(&participants, MAX_SEGMENTS, rng, self.rarity);
            let ideal = MAX_SEGMENTS / 2;
            plant_winner(&mut segs, &winner, ideal, MAX_SEGMENTS / 2, rng, self.rarity);
            (segs, ideal)
        } else {
            let ideal = config.winner_index().unwrap_or(0);
            (
                padded_items(&participants, MIN_SEGMENTS, rng, self.rarity),
                ideal,
            )
        };
        let winner_index = choose_winner_occurrence(&segments, &winner.id, ideal)?;
        mark_winner(&mut segments, winner_index);

        let spins = opts.spins.unwrap_or(DEFAULT_SPINS).clamp(1, MAX_SPINS);
        let final_rotation = landing_rotation(winner_index, segments.len(), spins);
        tracing::debug!(
            segments = segments.len(),
            winner_index,
            spins,
            final_rotation,
            "wheel laid out"
        );

        Ok(WheelModel {
            segments,
            winner_index,
            final_rotation,
            rotation: 0.0,
            colors: RarityColors::with_overrides(&opts.rarity_colors)?,
            background: opts.background_or(DEFAULT_BACKGROUND),
            burst_size: opts.particle_count,
            particles: ParticleSystem::new(opts.particle_cap_or(DEFAULT_PARTICLE_CAP)),
            tracker: PhaseTracker::default(),
            rng: model_rng(rng),
        })
    }

    fn render_frame(
        &self,
        input: &FrameInput,
        surface: &mut RenderSurface,
        model: &mut WheelModel,
    ) -> RaffleResult<()> {
        model.rotation = model.final_rotation * input.phase.global_eased;

        let center = surface.center();
        let radius = surface.width().min(surface.height()) * 0.42;
        let pointer_tip = center + Vec2::new(0.0, -radius * 0.92);

        if model.tracker.advance(input.phase.index).contains(&SETTLE_PHASE) {
            let palette = [GOLD, SEGMENT_PALETTE[0], SEGMENT_PALETTE[1], SEGMENT_PALETTE[2]];
            burst(
                &mut model.particles,
                &mut model.rng,
                BurstSpec {
                    origin: pointer_tip,
                    count: model.burst_size,
                    kind: ParticleKind::Confetti,
                    palette: &palette,
                    speed: (150.0, 450.0),
                    life_ms: (900.0, 1600.0),
                },
            );
        }
        model.particles.update(input.delta_ms, &CONFETTI_FORCES);

        draw_backdrop(surface, model.background);
        let n = model.segments.len();
        let a = TAU / n.max(1) as f64;
        let settle_t = remap_clamped(input.phase.global_eased, PHASES[2].end, 1.0);
        let label = TextStyle::sized((radius * 0.07).clamp(9.0, 22.0) as f32, Rgba8::WHITE)
            .with_align(TextAlign::Right);

        surface.fill_circle(center, radius + 10.0, Rgba8::rgb(0x30, 0x26, 0x1a));
        surface.stroke_circle(center, radius + 10.0, 3.0, GOLD);
        {
            let mut wheel = surface.scoped();
            wheel.translate(center.to_vec2()).rotate(model.rotation);
            for i in 0..n {
                let start = i as f64 * a;
                let color = model.segment_color(i);
                wheel.fill_wedge(Point::ZERO, radius, start, a, color);
                let item = &model.segments[i];
                if item.is_winner && settle_t > 0.0 {
                    let glow = Rgba8::WHITE.with_alpha(0.25 * settle_t);
                    wheel.fill_wedge(Point::ZERO, radius, start, a, glow);
                }
                let edge = Point::new(radius * start.cos(), radius * start.sin());
                wheel.line(Point::ZERO, edge, 1.5, Rgba8::BLACK.with_alpha(0.4));

                let mut seg = wheel.scoped();
                seg.rotate(start + a / 2.0);
                seg.text(item.name(), Point::new(radius * 0.9, 0.0), &label);
                if n <= ARTWORK_SEGMENT_LIMIT {
                    let r = (radius * a * 0.18).min(radius * 0.12);
                    let at = Point::new(radius * 0.3, 0.0);
                    seg.image_or_placeholder(
                        item.image_ref(),
                        item.name(),
                        Rect::from_center_size(at, (2.0 * r, 2.0 * r)),
                        color,
                    );
                }
            }
        }
        surface.fill_circle(center, radius * 0.12, GOLD);
        surface.fill_star(center, radius * 0.1, radius * 0.05, 5, Rgba8::WHITE);
        surface.fill_polygon(
            &[
                center + Vec2::new(-16.0, -radius - 22.0),
                center + Vec2::new(16.0, -radius - 22.0),
                pointer_tip,
            ],
            GOLD,
        );
        draw_particles(surface, &model.particles);
        if let Some(item) = model.segments.get(model.winner_index) {
            draw_winner_banner(surface, item.name(), settle_t);
        }
        Ok(())
    }

    fn reset(&self, model: &mut WheelModel) {
        model.rotation = 0.0;
        model.particles.clear();
        model.tracker.reset();
    }

    fn revealed<'m>(&self, model: &'m WheelModel) -> Option<&'m Participant> {
        model
            .segments
            .get(model.segment_under_pointer())
            .map(|it| it.participant.as_ref())
    }

    fn particle_count(&self, model: &WheelModel) -> usize {
        model.particles.len()
    }

    fn footprint_bytes(&self, model: &WheelModel) -> usize {
        items_footprint(&model.segments) + model.particles.footprint_bytes()
    }

    fn motion_value(&self, model: &WheelModel) -> f64 {
        model.rotation
    }

    fn final_target(&self, model: &WheelModel) -> f64 {
        model.final_rotation
    }
}

#[cfg(test)]
#[path = "../../tests/unit/styles/wheel.rs"]
mod tests;
