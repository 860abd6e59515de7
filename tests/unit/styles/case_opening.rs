use rand::{RngCore, SeedableRng};

use super::*;
use crate::{
    render::recording::DrawCommand,
    styles::{
        rarity::Rarity,
        support::{config, recording_surface, sweep},
    },
};

fn model_for(n: usize, winner: usize) -> (CaseOpening, CaseOpeningModel, RenderSurface) {
    let (surface, _) = recording_surface(800, 400);
    let strategy = CaseOpening::default();
    let mut rng = StdRng::seed_from_u64(3);
    let model = strategy
        .initialize_animation(&config(AnimationStyle::CaseOpening, n, winner), &surface, &mut rng)
        .unwrap();
    (strategy, model, surface)
}

#[test]
fn strip_is_long_enough_and_winner_sits_near_seventy_percent() {
    let (_, model, _) = model_for(10, 5);
    assert_eq!(model.items.len(), 100);
    assert!(model.items[model.winner_index].is_winner);
    assert_eq!(model.items.iter().filter(|it| it.is_winner).count(), 1);
    assert_eq!(model.items[model.winner_index].id(), "p5");
    assert!(model.winner_index.abs_diff(70) <= 3);
    let expected = model.winner_index as f64 * ITEM_SPACING + ITEM_WIDTH / 2.0 - 400.0;
    assert_eq!(model.final_offset, expected);
}

#[test]
fn single_participant_still_builds_a_full_strip() {
    let (strategy, mut model, mut surface) = model_for(1, 0);
    assert_eq!(model.items.len(), 100);
    sweep(&strategy, &mut model, &mut surface, 30);
    assert_eq!(strategy.revealed(&model).unwrap().id, "p0");
}

#[test]
fn scroll_lands_exactly_on_the_winner() {
    let (strategy, mut model, mut surface) = model_for(10, 5);
    let motions = sweep(&strategy, &mut model, &mut surface, 180);
    assert_eq!(*motions.first().unwrap(), 0.0);
    assert_eq!(*motions.last().unwrap(), model.final_offset);
    assert_eq!(model.index_under_marker(), model.winner_index);
    assert_eq!(strategy.revealed(&model).unwrap().id, "p5");
}

#[test]
fn reveal_spawns_sparks_and_reset_clears_them() {
    let (strategy, mut model, mut surface) = model_for(10, 5);
    sweep(&strategy, &mut model, &mut surface, 60);
    assert!(strategy.particle_count(&model) > 0);
    assert!(strategy.particle_count(&model) <= 300);

    strategy.reset(&mut model);
    assert_eq!(strategy.particle_count(&model), 0);
    assert_eq!(strategy.motion_value(&model), 0.0);
    assert_eq!(strategy.final_target(&model), model.final_offset);
}

#[test]
fn frames_draw_only_visible_cards() {
    let (log_surface, log) = recording_surface(800, 400);
    let strategy = CaseOpening::default();
    let mut rng = StdRng::seed_from_u64(3);
    let mut model = strategy
        .initialize_animation(&config(AnimationStyle::CaseOpening, 10, 5), &log_surface, &mut rng)
        .unwrap();
    let mut surface = log_surface;
    sweep(&strategy, &mut model, &mut surface, 1);
    let names = log.texts();
    assert!(!names.is_empty());
    assert!(names.len() < 2 * model.items.len());
    assert_eq!(log.count(|c| matches!(c, DrawCommand::Present)), 2);
}

#[test]
fn injected_rarity_is_used_for_every_card() {
    fn legendary(_: &mut dyn RngCore) -> Rarity {
        Rarity::Legendary
    }
    let (surface, _) = recording_surface(800, 400);
    let strategy = CaseOpening::with_rarity_fn(legendary);
    let mut rng = StdRng::seed_from_u64(1);
    let model = strategy
        .initialize_animation(&config(AnimationStyle::CaseOpening, 4, 2), &surface, &mut rng)
        .unwrap();
    assert!(model.items.iter().all(|it| it.rarity == Rarity::Legendary));
}
