//! Mosaic of every entrant; the camera dives into the winner while the rest fade out.

use rand::{Rng, rngs::StdRng};

use crate::{
    animation::{
        ease::Ease,
        particles::{ForceModel, Particle, ParticleKind, ParticleSystem},
        phase::{Phase, PhaseTable},
    },
    config::{AnimationEngineConfig, AnimationStyle, Participant},
    engine::strategy::{AnimationStrategy, FrameInput},
    foundation::{
        core::{Affine, Point, Rect, Rgba8, Vec2},
        error::RaffleResult,
        math::remap_clamped,
    },
    render::surface::RenderSurface,
    styles::{
        common::{
            DEFAULT_BACKGROUND, GOLD, draw_backdrop, draw_particles, draw_winner_banner,
            items_footprint, model_rng, winner_of,
        },
        layout::{
            DisplayItem, build_sequence, choose_winner_occurrence, mark_winner, plant_winner,
            share_participants,
        },
        rarity::{RarityColors, RarityFn, assign_rarity},
    },
};

pub const MIN_CELLS: usize = 9;
pub const MAX_CELLS: usize = 64;
/// Camera zoom reached at the end of playback.
pub const FINAL_ZOOM: f64 = 4.0;

const DEFAULT_PARTICLE_CAP: usize = 200;
/// Glow motes emitted per second during the reveal.
const GLOW_RATE: f64 = 60.0;

static PHASES: [Phase; 4] = [
    Phase::new("overview", 0.2, Ease::Linear),
    Phase::new("zoom", 0.7, Ease::InOutCubic),
    Phase::new("focus", 0.9, Ease::OutQuad),
    Phase::new("reveal", 1.0, Ease::OutBack),
];

static TABLE: PhaseTable = PhaseTable::from_static(&PHASES);

const GLOW_FORCES: ForceModel = ForceModel {
    gravity: Vec2::ZERO,
    drag: 0.8,
    buoyancy: 90.0,
};

#[derive(Clone, Debug)]
pub struct ZoomFade {
    rarity: RarityFn,
}

impl Default for ZoomFade {
    fn default() -> Self {
        Self {
            rarity: assign_rarity,
        }
    }
}

impl ZoomFade {
    pub fn with_rarity_fn(rarity: RarityFn) -> Self {
        Self { rarity }
    }
}

#[derive(Debug)]
pub struct ZoomFadeModel {
    pub cells: Vec<DisplayItem>,
    pub winner_index: usize,
    pub zoom: f64,
    /// World point under the screen centre.
    pub focus: Point,
    cols: usize,
    grid: Rect,
    cell: f64,
    center: Point,
    colors: RarityColors,
    background: Rgba8,
    particles: ParticleSystem,
    /// Fractional glow motes carried between frames.
    emit_debt: f64,
    rng: StdRng,
}

impl ZoomFadeModel {
    pub fn columns(&self) -> usize {
        self.cols
    }

    /// Centre of cell `index` in world space.
    pub fn cell_center(&self, index: usize) -> Point {
        let (c, r) = (index % self.cols, index / self.cols);
        Point::new(
            self.grid.x0 + (c as f64 + 0.5) * self.cell,
            self.grid.y0 + (r as f64 + 0.5) * self.cell,
        )
    }

    /// Cell containing the world point `p`.
    pub fn cell_at(&self, p: Point) -> Option<usize> {
        if !self.grid.contains(p) {
            return None;
        }
        let c = ((p.x - self.grid.x0) / self.cell).floor() as usize;
        let r = ((p.y - self.grid.y0) / self.cell).floor() as usize;
        let i = r * self.cols + c.min(self.cols - 1);
        (i < self.cells.len()).then_some(i)
    }

    fn camera(&self) -> Affine {
        Affine::translate(self.center.to_vec2())
            * Affine::scale(self.zoom)
            * Affine::translate(-self.focus.to_vec2())
    }
}

impl AnimationStrategy for ZoomFade {
    type Model = ZoomFadeModel;

    fn style(&self) -> AnimationStyle {
        AnimationStyle::ZoomFade
    }

    fn phases(&self) -> &PhaseTable {
        &TABLE
    }

    fn initialize_animation(
        &self,
        config: &AnimationEngineConfig,
        surface: &RenderSurface,
        rng: &mut StdRng,
    ) -> RaffleResult<ZoomFadeModel> {
        let opts = &config.playback.style_options;
        let winner = winner_of(config)?;
        let participants = share_participants(&config.participants);

        let count = opts
            .item_count
            .unwrap_or(participants.len())
            .clamp(MIN_CELLS, MAX_CELLS);
        let ideal = count / 2;
        let mut cells = build_sequence(&participants, count, rng, self.rarity);
        plant_winner(&mut cells, &winner, ideal, count, rng, self.rarity);
        let winner_index = choose_winner_occurrence(&cells, &winner.id, ideal)?;
        mark_winner(&mut cells, winner_index);

        let cols = ((count as f64).sqrt().ceil() as usize).max(1);
        let rows = count.div_ceil(cols);
        let bounds = surface.bounds();
        let cell = (bounds.width() * 0.9 / cols as f64).min(bounds.height() * 0.9 / rows as f64);
        let grid =
            Rect::from_center_size(bounds.center(), (cell * cols as f64, cell * rows as f64));
        tracing::debug!(count, cols, rows, winner_index, "mosaic laid out");

        let mut model = ZoomFadeModel {
            cells,
            winner_index,
            zoom: 1.0,
            focus: bounds.center(),
            cols,
            grid,
            cell,
            center: bounds.center(),
            colors: RarityColors::with_overrides(&opts.rarity_colors)?,
            background: opts.background_or(DEFAULT_BACKGROUND),
            particles: ParticleSystem::new(opts.particle_cap_or(DEFAULT_PARTICLE_CAP)),
            emit_debt: 0.0,
            rng: model_rng(rng),
        };
        for i in 0..model.cells.len() {
            model.cells[i].pos = model.cell_center(i);
        }
        Ok(model)
    }

    fn render_frame(
        &self,
        input: &FrameInput,
        surface: &mut RenderSurface,
        model: &mut ZoomFadeModel,
    ) -> RaffleResult<()> {
        let ge = input.phase.global_eased;
        model.zoom = 1.0 + (FINAL_ZOOM - 1.0) * ge;
        let t = ((model.zoom - 1.0) / (FINAL_ZOOM - 1.0)).clamp(0.0, 1.0);
        let target = model.cell_center(model.winner_index);
        model.focus = model.center.lerp(target, t);
        for cell in &mut model.cells {
            cell.alpha = if cell.is_winner { 1.0 } else { 1.0 - 0.85 * t };
        }

        let reveal = remap_clamped(ge, PHASES[2].end, 1.0);
        if input.phase.name == "reveal" {
            model.emit_debt += GLOW_RATE * input.delta_ms / 1000.0;
            let due = model.emit_debt.floor();
            model.emit_debt -= due;
            let half = model.cell * model.zoom * 0.5;
            let tint = model.colors.get(model.cells[model.winner_index].rarity);
            let (center, rng) = (model.center, &mut model.rng);
            model.particles.burst(due as usize, |_| {
                let at = center
                    + Vec2::new(rng.gen_range(-half..=half), rng.gen_range(-half..=half));
                let vel = Vec2::new(rng.gen_range(-20.0..20.0), rng.gen_range(-40.0..0.0));
                let color = if rng.gen_bool(0.5) { GOLD } else { tint };
                let life = rng.gen_range(600.0..1200.0);
                Particle::new(ParticleKind::Glow, at, vel, life, color, rng.gen_range(6.0..14.0))
            });
        }
        model.particles.update(input.delta_ms, &GLOW_FORCES);

        draw_backdrop(surface, model.background);
        {
            let mut world = surface.scoped();
            world.transform(model.camera());
            let pad = model.cell * 0.06;
            for cell in &model.cells {
                let rect = Rect::from_center_size(cell.pos, (model.cell, model.cell)).inset(-pad);
                let tint = model.colors.get(cell.rarity);
                let mut tile = world.scoped();
                tile.alpha(cell.alpha);
                tile.image_or_placeholder(cell.image_ref(), cell.name(), rect, tint);
                if cell.is_winner && reveal > 0.0 {
                    tile.stroke_rounded_rect(rect, pad * 2.0, pad * 0.8, GOLD.with_alpha(reveal));
                }
            }
        }
        draw_particles(surface, &model.particles);
        if let Some(cell) = model.cells.get(model.winner_index) {
            draw_winner_banner(surface, cell.name(), reveal);
        }
        Ok(())
    }

    fn reset(&self, model: &mut ZoomFadeModel) {
        model.zoom = 1.0;
        model.focus = model.center;
        for cell in &mut model.cells {
            cell.alpha = 1.0;
        }
        model.particles.clear();
        model.emit_debt = 0.0;
    }

    fn revealed<'m>(&self, model: &'m ZoomFadeModel) -> Option<&'m Participant> {
        model
            .cell_at(model.focus)
            .and_then(|i| model.cells.get(i))
            .map(|it| it.participant.as_ref())
    }

    fn particle_count(&self, model: &ZoomFadeModel) -> usize {
        model.particles.len()
    }

    fn footprint_bytes(&self, model: &ZoomFadeModel) -> usize {
        items_footprint(&model.cells) + model.particles.footprint_bytes()
    }

    fn motion_value(&self, model: &ZoomFadeModel) -> f64 {
        model.zoom
    }

    fn final_target(&self, _model: &ZoomFadeModel) -> f64 {
        FINAL_ZOOM
    }
}

#[cfg(test)]
#[path = "../../tests/unit/styles/zoom_fade.rs"]
mod tests;
