//! Slot machine: vertical reels that stop left to right on a shared payline.

use rand::rngs::StdRng;

use crate::{
    animation::{
        ease::Ease,
        effects::ScreenShake,
        particles::{ForceModel, ParticleKind, ParticleSystem},
        phase::{Phase, PhaseTable, PhaseTracker},
    },
    config::{AnimationEngineConfig, AnimationStyle, Participant},
    engine::strategy::{AnimationStrategy, FrameInput},
    foundation::{
        core::{Affine, Point, Rect, Rgba8},
        error::RaffleResult,
        math::remap_clamped,
    },
    render::{
        context::{Paint, TextStyle},
        surface::RenderSurface,
    },
    styles::{
        common::{
            BurstSpec, DEFAULT_BACKGROUND, GOLD, burst, draw_backdrop, draw_particles,
            draw_winner_banner, items_footprint, model_rng, winner_of,
        },
        layout::{
            DisplayItem, build_sequence, choose_winner_occurrence, mark_winner, plant_winner,
            share_participants,
        },
        rarity::{RarityColors, RarityFn, assign_rarity},
    },
};

pub const DEFAULT_REELS: usize = 3;
pub const MAX_REELS: usize = 7;

const BASE_STRIP_LEN: f64 = 40.0;
const MIN_STRIP_LEN: usize = 30;
const MAX_STRIP_LEN: usize = 400;
/// Rows visible through each reel window.
const VISIBLE_ROWS: f64 = 3.0;
const DEFAULT_PARTICLE_CAP: usize = 300;

static PHASES: [Phase; 4] = [
    Phase::new("spin-up", 0.12, Ease::InQuad),
    Phase::new("spin", 0.6, Ease::Linear),
    Phase::new("brake", 0.9, Ease::OutCubic),
    Phase::new("lock", 1.0, Ease::OutBack),
];

static TABLE: PhaseTable = PhaseTable::from_static(&PHASES);
const LOCK_PHASE: usize = 3;

const COIN_FORCES: ForceModel = ForceModel::falling(900.0, 0.4);

/// Progress at which reel `k` of `reels` comes to rest.
pub fn reel_stop(k: usize, reels: usize) -> f64 {
    0.7 + 0.3 * (k + 1) as f64 / reels.max(1) as f64
}

#[derive(Clone, Debug)]
pub struct SlotMachine {
    rarity: RarityFn,
}

impl Default for SlotMachine {
    fn default() -> Self {
        Self {
            rarity: assign_rarity,
        }
    }
}

impl SlotMachine {
    pub fn with_rarity_fn(rarity: RarityFn) -> Self {
        Self { rarity }
    }
}

#[derive(Debug)]
pub struct Reel {
    pub items: Vec<DisplayItem>,
    pub winner_index: usize,
    pub final_offset: f64,
    pub offset: f64,
    pub stop_at: f64,
    locked: bool,
}

impl Reel {
    fn index_at(&self, offset: f64, item_h: f64, center_y: f64) -> usize {
        ((offset + center_y) / item_h).max(0.0).floor() as usize
    }
}

#[derive(Debug)]
pub struct SlotMachineModel {
    pub reels: Vec<Reel>,
    item_h: f64,
    reel_w: f64,
    center_y: f64,
    colors: RarityColors,
    background: Rgba8,
    burst_size: usize,
    particles: ParticleSystem,
    shake: ScreenShake,
    tracker: PhaseTracker,
    rng: StdRng,
}

impl SlotMachineModel {
    /// Reel whose motion is reported to the engine.
    pub fn middle(&self) -> &Reel {
        &self.reels[self.reels.len() / 2]
    }

    /// Item index on the payline of reel `k`.
    pub fn payline_index(&self, k: usize) -> Option<usize> {
        let reel = self.reels.get(k)?;
        Some(reel.index_at(reel.offset, self.item_h, self.center_y))
    }

    pub fn item_height(&self) -> f64 {
        self.item_h
    }
}

impl AnimationStrategy for SlotMachine {
    type Model = SlotMachineModel;

    fn style(&self) -> AnimationStyle {
        AnimationStyle::SlotMachine
    }

    fn phases(&self) -> &PhaseTable {
        &TABLE
    }

    fn initialize_animation(
        &self,
        config: &AnimationEngineConfig,
        surface: &RenderSurface,
        rng: &mut StdRng,
    ) -> RaffleResult<SlotMachineModel> {
        let opts = &config.playback.style_options;
        let winner = winner_of(config)?;
        let participants = share_participants(&config.participants);

        let reel_count = opts.reel_count.unwrap_or(DEFAULT_REELS).clamp(1, MAX_REELS);
        let len = opts
            .item_count
            .unwrap_or_else(|| {
                (BASE_STRIP_LEN * opts.scroll_speed.clamp(0.1, 10.0)).round() as usize
            })
            .clamp(MIN_STRIP_LEN, MAX_STRIP_LEN);
        let ideal = len - 1 - (VISIBLE_ROWS as usize + 2);
        let item_h = surface.height() * 0.6 / VISIBLE_ROWS;
        let reel_w = (surface.width() * 0.8 / reel_count as f64).min(item_h * 1.4);
        let center_y = surface.height() / 2.0;

        let mut reels = Vec::with_capacity(reel_count);
        for k in 0..reel_count {
            let mut items = build_sequence(&participants, len, rng, self.rarity);
            plant_winner(&mut items, &winner, ideal, 3, rng, self.rarity);
            let winner_index = choose_winner_occurrence(&items, &winner.id, ideal)?;
            mark_winner(&mut items, winner_index);
            reels.push(Reel {
                items,
                winner_index,
                final_offset: winner_index as f64 * item_h + item_h / 2.0 - center_y,
                offset: 0.0,
                stop_at: reel_stop(k, reel_count),
                locked: false,
            });
        }
        tracing::debug!(reel_count, len, "slot reels laid out");

        Ok(SlotMachineModel {
            reels,
            item_h,
            reel_w,
            center_y,
            colors: RarityColors::with_overrides(&opts.rarity_colors)?,
            background: opts.background_or(DEFAULT_BACKGROUND),
            burst_size: opts.particle_count,
            particles: ParticleSystem::new(opts.particle_cap_or(DEFAULT_PARTICLE_CAP)),
            shake: ScreenShake::default(),
            tracker: PhaseTracker::default(),
            rng: model_rng(rng),
        })
    }

    fn render_frame(
        &self,
        input: &FrameInput,
        surface: &mut RenderSurface,
        model: &mut SlotMachineModel,
    ) -> RaffleResult<()> {
        let mut newly_locked = 0;
        for reel in &mut model.reels {
            let p = (input.eased_progress / reel.stop_at).min(1.0);
            reel.offset = reel.final_offset * TABLE.sample(p).global_eased;
            if p >= 1.0 && !reel.locked {
                reel.locked = true;
                newly_locked += 1;
            }
        }
        if newly_locked > 0 {
            model.shake.decay.trigger(3.0 + 2.0 * newly_locked as f64, 180.0);
        }

        let w = surface.width();
        let total_w = model.reel_w * model.reels.len() as f64;
        let left = (w - total_w) / 2.0;

        if model.tracker.advance(input.phase.index).contains(&LOCK_PHASE) {
            let palette = [GOLD, GOLD.shade(0.3), GOLD.shade(-0.2)];
            burst(
                &mut model.particles,
                &mut model.rng,
                BurstSpec {
                    origin: Point::new(w / 2.0, model.center_y - model.item_h),
                    count: model.burst_size,
                    kind: ParticleKind::Coin,
                    palette: &palette,
                    speed: (250.0, 650.0),
                    life_ms: (800.0, 1500.0),
                },
            );
        }
        model.particles.update(input.delta_ms, &COIN_FORCES);
        model.shake.decay.update(input.delta_ms);

        draw_backdrop(surface, model.background);
        let shake = model.shake.offset(&mut model.rng);
        let lock_t = remap_clamped(input.phase.global_eased, PHASES[2].end, 1.0);
        let window_h = model.item_h * VISIBLE_ROWS;
        let window_top = model.center_y - window_h / 2.0;
        let cabinet = Rect::new(
            left - 24.0,
            window_top - 40.0,
            left + total_w + 24.0,
            window_top + window_h + 40.0,
        );
        let label = TextStyle::sized(
            (model.item_h * 0.16).max(8.0) as f32,
            Rgba8::rgb(0x20, 0x20, 0x28),
        );
        {
            let mut scene = surface.scoped();
            scene.translate(shake);
            let red = Rgba8::rgb(0xa8, 0x1c, 0x2c);
            let body = Paint::vertical(cabinet, red, red.shade(-0.5));
            scene.fill_rounded_rect(cabinet, 24.0, body);
            scene.stroke_rounded_rect(cabinet, 24.0, 4.0, GOLD);

            for (k, reel) in model.reels.iter().enumerate() {
                let x0 = left + k as f64 * model.reel_w;
                let window = Rect::new(
                    x0 + 4.0,
                    window_top,
                    x0 + model.reel_w - 4.0,
                    window_top + window_h,
                );
                let glass = Paint::vertical(window, Rgba8::WHITE, Rgba8::rgb(0xd8, 0xd8, 0xe0));
                scene.fill_rect(window, glass);

                let first = (reel.offset / model.item_h).floor().max(0.0) as usize;
                let last = first + VISIBLE_ROWS as usize + 1;
                for (j, item) in reel.items.iter().enumerate().take(last + 1).skip(first) {
                    let cy = j as f64 * model.item_h - reel.offset + model.item_h / 2.0;
                    let margin = model.item_h / 2.0;
                    if cy < window_top - margin || cy > window_top + window_h + margin {
                        continue;
                    }
                    let cell = Rect::from_center_size(
                        Point::new(window.center().x, cy),
                        (window.width() * 0.8, model.item_h * 0.8),
                    );
                    let mut cell_scope = scene.scoped();
                    if !reel.locked {
                        cell_scope.alpha(0.75);
                    } else if item.is_winner && lock_t > 0.0 {
                        let pop = Affine::scale_about(1.0 + 0.1 * lock_t, cell.center());
                        cell_scope.transform(pop);
                    }
                    let tint = model.colors.get(item.rarity);
                    let art = Rect::new(cell.x0, cell.y0, cell.x1, cell.y1 - cell.height() * 0.25);
                    cell_scope.image_or_placeholder(item.image_ref(), item.name(), art, tint);
                    let name_at = Point::new(cell.center().x, cell.y1 - cell.height() * 0.1);
                    cell_scope.text(item.name(), name_at, &label);
                }
                scene.stroke_rect(window, 2.0, Rgba8::BLACK.with_alpha(0.5));
            }

            // Masks hide rows scrolled past the window edges.
            let mask = Paint::from(red.shade(-0.2));
            scene.fill_rect(
                Rect::new(cabinet.x0 + 8.0, cabinet.y0 + 8.0, cabinet.x1 - 8.0, window_top),
                mask.clone(),
            );
            scene.fill_rect(
                Rect::new(
                    cabinet.x0 + 8.0,
                    window_top + window_h,
                    cabinet.x1 - 8.0,
                    cabinet.y1 - 8.0,
                ),
                mask,
            );

            let payline = Rgba8::rgb(0xff, 0x40, 0x40).with_alpha(0.5 + 0.5 * lock_t);
            scene.line(
                Point::new(left - 16.0, model.center_y),
                Point::new(left + total_w + 16.0, model.center_y),
                2.0 + 2.0 * lock_t,
                payline,
            );
            scene.fill_polygon(
                &[
                    Point::new(left - 20.0, model.center_y - 10.0),
                    Point::new(left - 4.0, model.center_y),
                    Point::new(left - 20.0, model.center_y + 10.0),
                ],
                GOLD,
            );
        }
        draw_particles(surface, &model.particles);
        let winner = &model.middle().items[model.middle().winner_index];
        draw_winner_banner(surface, winner.name(), lock_t);
        Ok(())
    }

    fn reset(&self, model: &mut SlotMachineModel) {
        for reel in &mut model.reels {
            reel.offset = 0.0;
            reel.locked = false;
        }
        model.particles.clear();
        model.shake.decay.reset();
        model.tracker.reset();
    }

    fn revealed<'m>(&self, model: &'m SlotMachineModel) -> Option<&'m Participant> {
        let idx = model.payline_index(model.reels.len() / 2)?;
        model
            .middle()
            .items
            .get(idx)
            .map(|it| it.participant.as_ref())
    }

    fn particle_count(&self, model: &SlotMachineModel) -> usize {
        model.particles.len()
    }

    fn footprint_bytes(&self, model: &SlotMachineModel) -> usize {
        model
            .reels
            .iter()
            .map(|r| items_footprint(&r.items))
            .sum::<usize>()
            + model.particles.footprint_bytes()
    }

    fn motion_value(&self, model: &SlotMachineModel) -> f64 {
        model.middle().offset
    }

    fn final_target(&self, model: &SlotMachineModel) -> f64 {
        model.middle().final_offset
    }
}

#[cfg(test)]
#[path = "../../tests/unit/styles/slot_machine.rs"]
mod tests;
