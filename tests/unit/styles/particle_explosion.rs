use rand::SeedableRng;

use super::*;
use crate::styles::support::{config, recording_surface, sweep};

fn init(cfg: &AnimationEngineConfig) -> (ParticleExplosion, ParticleExplosionModel, RenderSurface) {
    init_on(cfg, 640, 480)
}

fn init_on(
    cfg: &AnimationEngineConfig,
    width: u32,
    height: u32,
) -> (ParticleExplosion, ParticleExplosionModel, RenderSurface) {
    let (surface, _) = recording_surface(width, height);
    let strategy = ParticleExplosion::default();
    let mut rng = StdRng::seed_from_u64(8);
    let model = strategy.initialize_animation(cfg, &surface, &mut rng).unwrap();
    (strategy, model, surface)
}

#[test]
fn orb_count_is_clamped_and_holds_the_winner() {
    let (_, model, _) = init(&config(AnimationStyle::ParticleExplosion, 4, 3));
    assert_eq!(model.orbs.len(), MIN_ORBS);
    assert_eq!(model.orbs[model.winner_index].id(), "p3");

    let (_, model, _) = init(&config(AnimationStyle::ParticleExplosion, 100, 64));
    assert_eq!(model.orbs.len(), MAX_ORBS);
    assert_eq!(model.orbs[model.winner_index].id(), "p64");
}

#[test]
fn zoom_stays_flat_until_the_reveal() {
    let (strategy, mut model, mut surface) = init(&config(AnimationStyle::ParticleExplosion, 20, 2));
    let motions = sweep(&strategy, &mut model, &mut surface, 100);
    assert!(motions[..=75].iter().all(|&z| z == 0.0));
    assert!(motions[80] > 0.0);
    assert_eq!(*motions.last().unwrap(), FINAL_ZOOM);
}

#[test]
fn winner_ends_largest_and_centred() {
    let (strategy, mut model, mut surface) = init(&config(AnimationStyle::ParticleExplosion, 20, 2));
    let center = surface.center();
    sweep(&strategy, &mut model, &mut surface, 120);
    assert_eq!(model.largest(), Some(model.winner_index));
    assert_eq!(strategy.revealed(&model).unwrap().id, "p2");
    let winner = &model.orbs[model.winner_index];
    assert!((winner.pos - center).hypot() < 1e-6);
    assert_eq!(winner.scale.x, 1.0 + FINAL_ZOOM);
    assert!(model.orbs.iter().filter(|o| !o.is_winner).all(|o| o.scale.x == 0.5));
}

#[test]
fn blast_respects_the_particle_cap() {
    let mut cfg = config(AnimationStyle::ParticleExplosion, 20, 2);
    cfg.playback.style_options.particle_count = 5_000;
    cfg.playback.style_options.particle_cap = Some(120);
    let (strategy, mut model, mut surface) = init(&cfg);
    let mut peak = 0;
    for frame in 0..=60u32 {
        let progress = f64::from(frame) / 60.0;
        let input = FrameInput {
            progress,
            eased_progress: progress,
            phase: strategy.phases().sample(progress),
            delta_ms: 50.0,
            elapsed_ms: 50.0 * f64::from(frame),
            frame: u64::from(frame),
        };
        strategy.render_frame(&input, &mut surface, &mut model).unwrap();
        peak = peak.max(strategy.particle_count(&model));
    }
    assert_eq!(peak, 120);
}

#[test]
fn largest_prefers_the_lower_index_on_ties() {
    let (strategy, mut model, _) = init(&config(AnimationStyle::ParticleExplosion, 12, 7));
    strategy.reset(&mut model);
    assert_eq!(model.largest(), Some(0));
}

#[test]
fn small_surfaces_still_reveal_the_winner() {
    for (w, h) in [(320, 120), (4000, 100), (50, 2000), (8, 8)] {
        let (strategy, mut model, mut surface) =
            init_on(&config(AnimationStyle::ParticleExplosion, 20, 2), w, h);
        assert!(model.orb_radius >= MIN_ORB_RADIUS);
        sweep(&strategy, &mut model, &mut surface, 60);
        assert_eq!(strategy.revealed(&model).unwrap().id, "p2", "{w}x{h}");
    }
}

#[test]
fn blast_fires_when_a_long_frame_skips_the_explode_phase() {
    let (strategy, mut model, mut surface) = init(&config(AnimationStyle::ParticleExplosion, 20, 2));
    for progress in [0.1, 0.5, 0.9] {
        let input = FrameInput {
            progress,
            eased_progress: progress,
            phase: strategy.phases().sample(progress),
            delta_ms: 16.0,
            elapsed_ms: 3000.0 * progress,
            frame: (progress * 10.0) as u64,
        };
        strategy.render_frame(&input, &mut surface, &mut model).unwrap();
    }
    assert_eq!(strategy.phases().sample(0.9).name, "reveal");
    assert!(strategy.particle_count(&model) > 0);
    assert!(model.shake.decay.intensity() > 0.0);
}
