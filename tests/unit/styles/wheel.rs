use rand::SeedableRng;

use super::*;
use crate::styles::support::{config, recording_surface, sweep};

fn init(cfg: &AnimationEngineConfig) -> (Wheel, WheelModel, RenderSurface) {
    let (surface, _) = recording_surface(600, 600);
    let strategy = Wheel::default();
    let mut rng = StdRng::seed_from_u64(11);
    let model = strategy.initialize_animation(cfg, &surface, &mut rng).unwrap();
    (strategy, model, surface)
}

#[test]
fn pointer_math_matches_landing_rotation() {
    for segments in [8, 12, 48] {
        for index in 0..segments {
            let rot = landing_rotation(index, segments, 5);
            assert_eq!(segment_at_pointer(rot, segments), index);
            assert!(rot >= 5.0 * TAU && rot < 6.0 * TAU);
        }
    }
    assert_eq!(segment_at_pointer(0.0, 0), 0);
}

#[test]
fn small_fields_are_padded_to_eight_segments() {
    let (_, model, _) = init(&config(AnimationStyle::Wheel, 3, 1));
    assert_eq!(model.segments.len(), MIN_SEGMENTS);
    assert_eq!(model.segments[model.winner_index].id(), "p1");
    assert_eq!(model.segments[3].id(), "p0");
}

#[test]
fn large_fields_are_sampled_down_with_the_winner_kept() {
    let (_, model, _) = init(&config(AnimationStyle::Wheel, 120, 97));
    assert_eq!(model.segments.len(), MAX_SEGMENTS);
    assert_eq!(model.segments[model.winner_index].id(), "p97");
}

#[test]
fn spin_count_is_configurable_and_clamped() {
    let mut cfg = config(AnimationStyle::Wheel, 10, 4);
    cfg.playback.style_options.spins = Some(2);
    let (_, model, _) = init(&cfg);
    assert!(model.final_rotation >= 2.0 * TAU && model.final_rotation < 3.0 * TAU);

    cfg.playback.style_options.spins = Some(500);
    let (_, model, _) = init(&cfg);
    assert!(model.final_rotation < f64::from(MAX_SPINS + 1) * TAU);
}

#[test]
fn wheel_stops_on_the_winner() {
    let (strategy, mut model, mut surface) = init(&config(AnimationStyle::Wheel, 10, 5));
    let motions = sweep(&strategy, &mut model, &mut surface, 180);
    assert_eq!(*motions.last().unwrap(), model.final_rotation);
    assert_eq!(strategy.revealed(&model).unwrap().id, "p5");
    assert!(strategy.particle_count(&model) > 0);
}

#[test]
fn wind_up_turns_backwards_first() {
    let (strategy, mut model, mut surface) = init(&config(AnimationStyle::Wheel, 10, 5));
    let motions = sweep(&strategy, &mut model, &mut surface, 100);
    assert!(motions[1..8].iter().any(|&m| m < 0.0));
}
