use std::{f64::consts::TAU, sync::Arc};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    animation::{
        effects::Flash,
        particles::{Particle, ParticleKind, ParticleSystem},
    },
    config::{AnimationEngineConfig, Participant},
    foundation::{
        core::{Point, Rect, Rgba8, Vec2},
        error::{RaffleError, RaffleResult},
    },
    render::{
        context::{Paint, TextStyle},
        surface::RenderSurface,
    },
    styles::layout::DisplayItem,
};

pub(crate) const DEFAULT_BACKGROUND: Rgba8 = Rgba8::rgb(0x12, 0x14, 0x1c);
pub(crate) const GOLD: Rgba8 = Rgba8::rgb(0xff, 0xc8, 0x3d);

/// Shared handle to the winning participant of a validated config.
pub(crate) fn winner_of(config: &AnimationEngineConfig) -> RaffleResult<Arc<Participant>> {
    config
        .winner_participant()
        .cloned()
        .map(Arc::new)
        .ok_or_else(|| RaffleError::config("winner not found in participants"))
}

/// Independent generator for a model, derived from the engine RNG.
pub(crate) fn model_rng(rng: &mut StdRng) -> StdRng {
    StdRng::seed_from_u64(rng.r#gen())
}

pub(crate) fn items_footprint(items: &[DisplayItem]) -> usize {
    std::mem::size_of_val(items)
}

/// Background gradient.
pub(crate) fn draw_backdrop(surface: &mut RenderSurface, background: Rgba8) {
    surface.clear(background);
    let bounds = surface.bounds();
    surface.fill_rect(
        bounds,
        Paint::vertical(bounds, background.shade(0.08), background.shade(-0.3)),
    );
}

pub(crate) fn draw_particles(surface: &mut RenderSurface, particles: &ParticleSystem) {
    for p in particles.particles() {
        let fade = p.life_fraction();
        let color = p.color.with_alpha(fade);
        match p.kind {
            ParticleKind::Spark | ParticleKind::Ember => {
                surface.fill_circle(p.pos, p.size * (0.5 + 0.5 * fade), color);
            }
            ParticleKind::Confetti => {
                let mut scope = surface.scoped();
                scope.translate(p.pos.to_vec2()).rotate(p.rotation);
                scope.fill_rect(
                    Rect::new(-p.size, -p.size * 0.5, p.size, p.size * 0.5),
                    color,
                );
            }
            ParticleKind::Coin => {
                let squash = p.rotation.cos().abs().max(0.15);
                let mut scope = surface.scoped();
                scope.translate(p.pos.to_vec2()).scale(squash, 1.0);
                scope.fill_circle(Point::ZERO, p.size, color);
                scope.stroke_circle(Point::ZERO, p.size * 0.7, 1.5, color.shade(-0.3));
            }
            ParticleKind::Glow => {
                surface.fill_circle(p.pos, p.size, Paint::glow(p.pos, p.size, color));
            }
        }
    }
}

/// Parameters of a radial particle burst.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BurstSpec<'a> {
    pub origin: Point,
    pub count: usize,
    pub kind: ParticleKind,
    pub palette: &'a [Rgba8],
    /// Speed range in px/s.
    pub speed: (f64, f64),
    pub life_ms: (f64, f64),
}

/// Spawn a radial burst; returns how many particles the cap let through.
pub(crate) fn burst(
    particles: &mut ParticleSystem,
    rng: &mut StdRng,
    spec: BurstSpec<'_>,
) -> usize {
    particles.burst(spec.count, |_| {
        let angle = rng.gen_range(0.0..TAU);
        let v = Vec2::from_angle(angle) * rng.gen_range(spec.speed.0..=spec.speed.1);
        let color = spec
            .palette
            .get(rng.gen_range(0..spec.palette.len().max(1)))
            .copied()
            .unwrap_or(Rgba8::WHITE);
        let size = match spec.kind {
            ParticleKind::Confetti => rng.gen_range(4.0..8.0),
            ParticleKind::Coin => rng.gen_range(6.0..10.0),
            ParticleKind::Glow => rng.gen_range(12.0..28.0),
            ParticleKind::Spark | ParticleKind::Ember => rng.gen_range(1.5..4.0),
        };
        let life = rng.gen_range(spec.life_ms.0..=spec.life_ms.1);
        let mut p = Particle::new(spec.kind, spec.origin, v, life, color, size);
        p.rotation = rng.gen_range(0.0..TAU);
        p.spin = rng.gen_range(-8.0..8.0);
        p
    })
}

pub(crate) fn draw_flash(surface: &mut RenderSurface, flash: &Flash) {
    if let Some(color) = flash.overlay() {
        let bounds = surface.bounds();
        surface.fill_rect(bounds, color);
    }
}

/// Winner name banner near the bottom edge, faded in by `alpha`.
pub(crate) fn draw_winner_banner(surface: &mut RenderSurface, name: &str, alpha: f64) {
    if alpha <= 0.0 {
        return;
    }
    let (w, h) = (surface.width(), surface.height());
    let band = Rect::new(w * 0.2, h * 0.84, w * 0.8, h * 0.96);
    let mut scope = surface.scoped();
    scope.alpha(alpha);
    scope.fill_rounded_rect(band, band.height() * 0.3, Rgba8::BLACK.with_alpha(0.6));
    scope.stroke_rounded_rect(band, band.height() * 0.3, 2.0, GOLD);
    let style = TextStyle::sized((band.height() * 0.5) as f32, GOLD).with_shadow(
        Rgba8::BLACK,
        Vec2::new(0.0, 2.0),
        4.0,
    );
    scope.text(name, band.center(), &style);
}

/// Card with artwork and a rarity stripe, centred on the origin of the current scope.
pub(crate) fn draw_card(
    surface: &mut RenderSurface,
    item: &DisplayItem,
    size: (f64, f64),
    rarity_color: Rgba8,
    highlight: f64,
) {
    let (w, h) = size;
    let card = Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0);
    let radius = w.min(h) * 0.08;
    surface.fill_rounded_rect(
        card,
        radius,
        Paint::vertical(card, Rgba8::rgb(0x2a, 0x2e, 0x3a), Rgba8::rgb(0x1a, 0x1c, 0x24)),
    );
    let art = Rect::new(
        card.x0 + w * 0.1,
        card.y0 + h * 0.08,
        card.x1 - w * 0.1,
        card.y0 + h * 0.68,
    );
    surface.image_or_placeholder(item.image_ref(), item.name(), art, rarity_color);
    let stripe = Rect::new(card.x0, card.y1 - h * 0.08, card.x1, card.y1);
    surface.fill_rect(stripe, rarity_color);
    surface.text(
        item.name(),
        Point::new(0.0, card.y0 + h * 0.8),
        &TextStyle::sized((h * 0.09).max(8.0) as f32, Rgba8::WHITE),
    );
    if highlight > 0.0 {
        surface.stroke_rounded_rect(
            card,
            radius,
            2.0 + 3.0 * highlight,
            GOLD.with_alpha(highlight),
        );
    }
}
