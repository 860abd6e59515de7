//! Horizontal strip of cards scrolling under a fixed centre marker.

use rand::rngs::StdRng;

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
        math::remap_clamped,
    },
    render::surface::RenderSurface,
    styles::{
        common::{
            BurstSpec, DEFAULT_BACKGROUND, GOLD, burst, draw_backdrop, draw_card, draw_flash,
            draw_particles, draw_winner_banner, items_footprint, model_rng, winner_of,
        },
        layout::{
            DisplayItem, build_sequence, choose_winner_occurrence, mark_winner, plant_winner,
            share_participants,
        },
        rarity::{RarityColors, RarityFn, assign_rarity},
    },
};

pub const ITEM_WIDTH: f64 = 150.0;
pub const ITEM_GAP: f64 = 8.0;
pub const ITEM_SPACING: f64 = ITEM_WIDTH + ITEM_GAP;

const BASE_STRIP_LEN: f64 = 100.0;
const MIN_STRIP_LEN: usize = 30;
const MAX_STRIP_LEN: usize = 1000;
const IDEAL_FRACTION: f64 = 0.7;
const DEFAULT_PARTICLE_CAP: usize = 300;

static PHASES: [Phase; 4] = [
    Phase::new("acceleration", 0.15, Ease::InQuad),
    Phase::new("cruise", 0.6, Ease::Linear),
    Phase::new("deceleration", 0.9, Ease::OutCubic),
    Phase::new("reveal", 1.0, Ease::OutBack),
];

static TABLE: PhaseTable = PhaseTable::from_static(&PHASES);
const REVEAL_PHASE: usize = 3;

const SPARK_FORCES: ForceModel = ForceModel::falling(520.0, 1.2);

/// Case-opening scroll.
#[derive(Clone, Debug)]
pub struct CaseOpening {
    rarity: RarityFn,
}

impl Default for CaseOpening {
    fn default() -> Self {
        Self {
            rarity: assign_rarity,
        }
    }
}

impl CaseOpening {
    pub fn with_rarity_fn(rarity: RarityFn) -> Self {
        Self { rarity }
    }
}

#[derive(Debug)]
pub struct CaseOpeningModel {
    pub items: Vec<DisplayItem>,
    pub winner_index: usize,
    pub final_offset: f64,
    pub offset: f64,
    center_x: f64,
    card_height: f64,
    colors: RarityColors,
    background: Rgba8,
    burst_size: usize,
    particles: ParticleSystem,
    shake: ScreenShake,
    flash: Flash,
    tracker: PhaseTracker,
    rng: StdRng,
}

impl CaseOpeningModel {
    /// Index of the card under the centre marker at the current offset.
    pub fn index_under_marker(&self) -> usize {
        let x = (self.offset + self.center_x) / ITEM_SPACING;
        x.max(0.0).floor() as usize
    }
}

impl AnimationStrategy for CaseOpening {
    type Model = CaseOpeningModel;

    fn style(&self) -> AnimationStyle {
        AnimationStyle::CaseOpening
    }

    fn phases(&self) -> &PhaseTable {
        &TABLE
    }

    fn initialize_animation(
        &self,
        config: &AnimationEngineConfig,
        surface: &RenderSurface,
        rng: &mut StdRng,
    ) -> RaffleResult<CaseOpeningModel> {
        let opts = &config.playback.style_options;
        let winner = winner_of(config)?;
        let participants = share_participants(&config.participants);

        let len = opts.item_count.unwrap_or_else(|| {
            (BASE_STRIP_LEN * opts.scroll_speed.clamp(0.1, 10.0)).round() as usize
        });
        let len = len.clamp(MIN_STRIP_LEN, MAX_STRIP_LEN);
        let ideal = (len as f64 * IDEAL_FRACTION) as usize;

        let mut items = build_sequence(&participants, len, rng, self.rarity);
        plant_winner(&mut items, &winner, ideal, 3, rng, self.rarity);
        let winner_index = choose_winner_occurrence(&items, &winner.id, ideal)?;
        mark_winner(&mut items, winner_index);

        let center_x = surface.width() / 2.0;
        let final_offset = winner_index as f64 * ITEM_SPACING + ITEM_WIDTH / 2.0 - center_x;
        tracing::debug!(len, winner_index, final_offset, "case strip laid out");

        Ok(CaseOpeningModel {
            items,
            winner_index,
            final_offset,
            offset: 0.0,
            center_x,
            card_height: (ITEM_WIDTH * 1.2).min(surface.height() * 0.7),
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
        model: &mut CaseOpeningModel,
    ) -> RaffleResult<()> {
        model.offset = model.final_offset * input.phase.global_eased;

        let center_y = surface.height() / 2.0;
        if model.tracker.advance(input.phase.index).contains(&REVEAL_PHASE) {
            let winner_color = model.colors.get(model.items[model.winner_index].rarity);
            let colors = [GOLD, winner_color, Rgba8::WHITE];
            burst(
                &mut model.particles,
                &mut model.rng,
                BurstSpec {
                    origin: Point::new(model.center_x, center_y),
                    count: model.burst_size,
                    kind: ParticleKind::Spark,
                    palette: &colors,
                    speed: (180.0, 520.0),
                    life_ms: (500.0, 1100.0),
                },
            );
            model.shake.decay.trigger(8.0, 400.0);
            model.flash.decay.trigger(0.6, 250.0);
        }
        model.particles.update(input.delta_ms, &SPARK_FORCES);
        model.shake.decay.update(input.delta_ms);
        model.flash.decay.update(input.delta_ms);

        draw_backdrop(surface, model.background);
        let shake = model.shake.offset(&mut model.rng);
        let reveal_t = remap_clamped(input.phase.global_eased, PHASES[2].end, 1.0);
        {
            let mut scene = surface.scoped();
            scene.translate(shake);

            let track = Rect::new(
                0.0,
                center_y - model.card_height / 2.0 - 12.0,
                scene.width(),
                center_y + model.card_height / 2.0 + 12.0,
            );
            scene.fill_rect(track, Rgba8::BLACK.with_alpha(0.35));

            let first = ((model.offset - ITEM_WIDTH) / ITEM_SPACING).floor().max(0.0) as usize;
            let last = (((model.offset + scene.width()) / ITEM_SPACING).ceil().max(0.0) as usize)
                .min(model.items.len().saturating_sub(1));
            for (i, item) in model.items.iter().enumerate().take(last + 1).skip(first) {
                let x = i as f64 * ITEM_SPACING - model.offset + ITEM_WIDTH / 2.0;
                let highlight = if item.is_winner { reveal_t } else { 0.0 };
                let mut card = scene.scoped();
                card.translate(Vec2::new(x, center_y));
                if item.is_winner && reveal_t > 0.0 {
                    card.scale(1.0 + 0.08 * reveal_t, 1.0 + 0.08 * reveal_t);
                } else if reveal_t > 0.0 {
                    card.alpha(1.0 - 0.5 * reveal_t);
                }
                draw_card(
                    &mut card,
                    item,
                    (ITEM_WIDTH, model.card_height),
                    model.colors.get(item.rarity),
                    highlight,
                );
            }

            let marker_top = Point::new(model.center_x, track.y0 - 6.0);
            let marker_bottom = Point::new(model.center_x, track.y1 + 6.0);
            scene.line(marker_top, marker_bottom, 3.0, GOLD);
            scene.fill_polygon(
                &[
                    marker_top + Vec2::new(-10.0, -12.0),
                    marker_top + Vec2::new(10.0, -12.0),
                    marker_top,
                ],
                GOLD,
            );
            draw_particles(&mut scene, &model.particles);
        }
        draw_flash(surface, &model.flash);
        if let Some(item) = model.items.get(model.winner_index) {
            draw_winner_banner(surface, item.name(), reveal_t);
        }
        Ok(())
    }

    fn reset(&self, model: &mut CaseOpeningModel) {
        model.offset = 0.0;
        model.particles.clear();
        model.shake.decay.reset();
        model.flash.decay.reset();
        model.tracker.reset();
    }

    fn revealed<'m>(&self, model: &'m CaseOpeningModel) -> Option<&'m Participant> {
        model
            .items
            .get(model.index_under_marker())
            .map(|it| it.participant.as_ref())
    }

    fn particle_count(&self, model: &CaseOpeningModel) -> usize {
        model.particles.len()
    }

    fn footprint_bytes(&self, model: &CaseOpeningModel) -> usize {
        items_footprint(&model.items) + model.particles.footprint_bytes()
    }

    fn motion_value(&self, model: &CaseOpeningModel) -> f64 {
        model.offset
    }

    fn final_target(&self, model: &CaseOpeningModel) -> f64 {
        model.final_offset
    }
}

#[cfg(test)]
#[path = "../../tests/unit/styles/case_opening.rs"]
mod tests;
