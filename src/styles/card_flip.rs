//! Grid of face-down cards: deal, shuffle, a hopping highlight, then the winner flips over.

use std::f64::consts::{PI, TAU};

use rand::{Rng, rngs::StdRng};

use crate::{
    animation::{
        ease::Ease,
        effects::Flash,
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

pub const MIN_CARDS: usize = 6;
pub const MAX_CARDS: usize = 24;
pub const DEFAULT_LAPS: u32 = 3;

const CARD_ASPECT: f64 = 0.72;
const DEFAULT_PARTICLE_CAP: usize = 250;

static PHASES: [Phase; 4] = [
    Phase::new("deal", 0.25, Ease::OutQuad),
    Phase::new("shuffle", 0.55, Ease::InOutSine),
    Phase::new("highlight", 0.8, Ease::OutCubic),
    Phase::new("flip", 1.0, Ease::OutBack),
];

static TABLE: PhaseTable = PhaseTable::from_static(&PHASES);
const FLIP_PHASE: usize = 3;

const SPARK_FORCES: ForceModel = ForceModel::falling(300.0, 2.0);

/// Columns of the card grid, biased towards landscape layouts.
pub fn grid_columns(count: usize) -> usize {
    ((count as f64 * 1.5).sqrt().ceil() as usize).max(1)
}

#[derive(Clone, Debug)]
pub struct CardFlip {
    rarity: RarityFn,
}

impl Default for CardFlip {
    fn default() -> Self {
        Self {
            rarity: assign_rarity,
        }
    }
}

impl CardFlip {
    pub fn with_rarity_fn(rarity: RarityFn) -> Self {
        Self { rarity }
    }
}

#[derive(Debug)]
pub struct CardFlipModel {
    pub cards: Vec<DisplayItem>,
    pub winner_index: usize,
    /// Highlight position in card steps, `laps * count + winner_index` at the end.
    pub final_steps: f64,
    pub steps: f64,
    homes: Vec<Point>,
    /// Per-card phase offset of the shuffle wobble.
    jitter: Vec<f64>,
    card_size: (f64, f64),
    deck: Point,
    colors: RarityColors,
    background: Rgba8,
    burst_size: usize,
    particles: ParticleSystem,
    flash: Flash,
    tracker: PhaseTracker,
    rng: StdRng,
}

impl CardFlipModel {
    pub fn highlighted(&self) -> usize {
        let n = self.cards.len().max(1);
        (self.steps.max(0.0).floor() as usize) % n
    }

    pub fn home(&self, index: usize) -> Option<Point> {
        self.homes.get(index).copied()
    }
}

fn grid_homes(count: usize, bounds: Rect) -> (Vec<Point>, (f64, f64)) {
    let cols = grid_columns(count);
    let rows = count.div_ceil(cols).max(1);
    let margin = bounds.width().min(bounds.height()) * 0.08;
    let area = bounds.inset(-margin);
    let cell_w = area.width() / cols as f64;
    let cell_h = area.height() / rows as f64;
    let card_h = (cell_h * 0.86).min(cell_w * 0.86 / CARD_ASPECT);
    let size = (card_h * CARD_ASPECT, card_h);
    let homes = (0..count)
        .map(|i| {
            let (c, r) = (i % cols, i / cols);
            Point::new(
                area.x0 + (c as f64 + 0.5) * cell_w,
                area.y0 + (r as f64 + 0.5) * cell_h,
            )
        })
        .collect();
    (homes, size)
}

fn draw_card_back(surface: &mut RenderSurface, size: (f64, f64), highlight: f64) {
    let (w, h) = size;
    let card = Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0);
    let radius = w.min(h) * 0.08;
    let top = Rgba8::rgb(0x5b, 0x2a, 0x86);
    surface.fill_rounded_rect(card, radius, Paint::vertical(card, top, top.shade(-0.45)));
    surface.stroke_rounded_rect(card.inset(-w * 0.06), radius * 0.6, 1.5, GOLD.with_alpha(0.7));
    surface.fill_star(Point::ZERO, w * 0.2, w * 0.09, 5, GOLD.with_alpha(0.85));
    if highlight > 0.0 {
        surface.stroke_rounded_rect(
            card,
            radius,
            3.0 + 3.0 * highlight,
            GOLD.with_alpha(highlight),
        );
    }
}

impl AnimationStrategy for CardFlip {
    type Model = CardFlipModel;

    fn style(&self) -> AnimationStyle {
        AnimationStyle::CardFlip
    }

    fn phases(&self) -> &PhaseTable {
        &TABLE
    }

    fn initialize_animation(
        &self,
        config: &AnimationEngineConfig,
        surface: &RenderSurface,
        rng: &mut StdRng,
    ) -> RaffleResult<CardFlipModel> {
        let opts = &config.playback.style_options;
        let winner = winner_of(config)?;
        let participants = share_participants(&config.participants);

        let count = opts
            .item_count
            .unwrap_or(participants.len())
            .clamp(MIN_CARDS, MAX_CARDS);
        let ideal = count / 2;
        let mut cards = build_sequence(&participants, count, rng, self.rarity);
        plant_winner(&mut cards, &winner, ideal, count, rng, self.rarity);
        let winner_index = choose_winner_occurrence(&cards, &winner.id, ideal)?;
        mark_winner(&mut cards, winner_index);

        let (homes, card_size) = grid_homes(count, surface.bounds());
        let jitter = (0..count).map(|_| rng.gen_range(0.0..TAU)).collect();
        let laps = opts.spins.unwrap_or(DEFAULT_LAPS).min(12);
        let final_steps = f64::from(laps) * count as f64 + winner_index as f64;
        tracing::debug!(count, winner_index, final_steps, "card grid laid out");

        Ok(CardFlipModel {
            cards,
            winner_index,
            final_steps,
            steps: 0.0,
            homes,
            jitter,
            card_size,
            deck: Point::new(surface.width() / 2.0, surface.height() + card_size.1),
            colors: RarityColors::with_overrides(&opts.rarity_colors)?,
            background: opts.background_or(DEFAULT_BACKGROUND),
            burst_size: opts.particle_count,
            particles: ParticleSystem::new(opts.particle_cap_or(DEFAULT_PARTICLE_CAP)),
            flash: Flash::default(),
            tracker: PhaseTracker::default(),
            rng: model_rng(rng),
        })
    }

    fn render_frame(
        &self,
        input: &FrameInput,
        surface: &mut RenderSurface,
        model: &mut CardFlipModel,
    ) -> RaffleResult<()> {
        let ge = input.phase.global_eased;
        model.steps = model.final_steps * ge;

        let deal_t = remap_clamped(ge, 0.0, PHASES[0].end);
        let shuffle_t = remap_clamped(ge, PHASES[0].end, PHASES[1].end);
        let flip_t = remap_clamped(ge, PHASES[2].end, 1.0);
        let highlight_on = ge >= PHASES[0].end;
        let highlighted = model.highlighted();
        let count = model.cards.len();

        for (i, card) in model.cards.iter_mut().enumerate() {
            let home = model.homes[i];
            // Cards leave the deck one after another.
            let stagger = i as f64 / count.max(1) as f64 * 0.5;
            let arrive = remap_clamped(deal_t, stagger, stagger + 0.5);
            let wobble = (shuffle_t * PI).sin() * model.card_size.0 * 0.35;
            let phase = model.jitter[i] + shuffle_t * PI * 4.0;
            card.pos = Point::new(
                lerp(model.deck.x, home.x, arrive) + wobble * phase.cos(),
                lerp(model.deck.y, home.y, arrive) + wobble * phase.sin(),
            );
            card.rotation = (1.0 - arrive) * 0.6 + wobble * 0.002 * phase.sin();
            card.scale = Vec2::new(1.0, 1.0);
            card.alpha = 1.0;
            if card.is_winner && flip_t > 0.0 {
                let squash = (flip_t * PI).cos().abs().max(0.02);
                card.scale = Vec2::new(squash, 1.0) * (1.0 + 0.15 * flip_t);
            } else if flip_t > 0.0 {
                card.alpha = 1.0 - 0.55 * flip_t;
            }
        }

        if model.tracker.advance(input.phase.index).contains(&FLIP_PHASE) {
            let origin = model.homes[model.winner_index];
            let colors = [GOLD, model.colors.get(model.cards[model.winner_index].rarity)];
            burst(
                &mut model.particles,
                &mut model.rng,
                BurstSpec {
                    origin,
                    count: model.burst_size,
                    kind: ParticleKind::Spark,
                    palette: &colors,
                    speed: (120.0, 360.0),
                    life_ms: (400.0, 900.0),
                },
            );
            model.flash.decay.trigger(0.35, 200.0);
        }
        model.particles.update(input.delta_ms, &SPARK_FORCES);
        model.flash.decay.update(input.delta_ms);

        draw_backdrop(surface, model.background);
        for (i, card) in model.cards.iter().enumerate() {
            let glow = if highlight_on && i == highlighted && flip_t == 0.0 {
                1.0
            } else {
                0.0
            };
            let mut scope = surface.scoped();
            scope.transform(card.affine()).alpha(card.alpha);
            // Second half of the flip shows the face.
            let face_up = card.is_winner && flip_t >= 0.5;
            if face_up {
                draw_card(
                    &mut scope,
                    card,
                    model.card_size,
                    model.colors.get(card.rarity),
                    flip_t,
                );
            } else {
                draw_card_back(&mut scope, model.card_size, glow);
            }
        }
        draw_particles(surface, &model.particles);
        draw_flash(surface, &model.flash);
        if let Some(card) = model.cards.get(model.winner_index) {
            draw_winner_banner(surface, card.name(), remap_clamped(flip_t, 0.5, 1.0));
        }
        Ok(())
    }

    fn reset(&self, model: &mut CardFlipModel) {
        model.steps = 0.0;
        for (card, home) in model.cards.iter_mut().zip(&model.homes) {
            card.pos = *home;
            card.rotation = 0.0;
            card.scale = Vec2::new(1.0, 1.0);
            card.alpha = 1.0;
        }
        model.particles.clear();
        model.flash.decay.reset();
        model.tracker.reset();
    }

    fn revealed<'m>(&self, model: &'m CardFlipModel) -> Option<&'m Participant> {
        model
            .cards
            .get(model.highlighted())
            .map(|it| it.participant.as_ref())
    }

    fn particle_count(&self, model: &CardFlipModel) -> usize {
        model.particles.len()
    }

    fn footprint_bytes(&self, model: &CardFlipModel) -> usize {
        items_footprint(&model.cards)
            + std::mem::size_of_val(model.homes.as_slice())
            + std::mem::size_of_val(model.jitter.as_slice())
            + model.particles.footprint_bytes()
    }

    fn motion_value(&self, model: &CardFlipModel) -> f64 {
        model.steps
    }

    fn final_target(&self, model: &CardFlipModel) -> f64 {
        model.final_steps
    }
}

#[cfg(test)]
#[path = "../../tests/unit/styles/card_flip.rs"]
mod tests;
