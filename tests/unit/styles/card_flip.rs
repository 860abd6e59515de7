use rand::SeedableRng;

use super::*;
use crate::styles::support::{config, recording_surface, sweep};

fn init(cfg: &AnimationEngineConfig) -> (CardFlip, CardFlipModel, RenderSurface) {
    let (surface, _) = recording_surface(800, 600);
    let strategy = CardFlip::default();
    let mut rng = StdRng::seed_from_u64(5);
    let model = strategy.initialize_animation(cfg, &surface, &mut rng).unwrap();
    (strategy, model, surface)
}

#[test]
fn grid_columns_lean_landscape() {
    assert_eq!(grid_columns(6), 3);
    assert_eq!(grid_columns(10), 4);
    assert_eq!(grid_columns(24), 6);
}

#[test]
fn card_count_is_clamped() {
    let (_, model, _) = init(&config(AnimationStyle::CardFlip, 2, 1));
    assert_eq!(model.cards.len(), MIN_CARDS);
    assert_eq!(model.cards[model.winner_index].id(), "p1");

    let (_, model, _) = init(&config(AnimationStyle::CardFlip, 40, 33));
    assert_eq!(model.cards.len(), MAX_CARDS);
    assert_eq!(model.cards[model.winner_index].id(), "p33");

    let mut cfg = config(AnimationStyle::CardFlip, 10, 3);
    cfg.playback.style_options.item_count = Some(12);
    let (_, model, _) = init(&cfg);
    assert_eq!(model.cards.len(), 12);
}

#[test]
fn homes_stay_inside_the_surface() {
    let (_, model, surface) = init(&config(AnimationStyle::CardFlip, 24, 0));
    let bounds = surface.bounds();
    for i in 0..model.cards.len() {
        assert!(bounds.contains(model.home(i).unwrap()));
    }
    assert!(model.home(model.cards.len()).is_none());
}

#[test]
fn highlight_lands_on_the_winner_after_full_laps() {
    let (strategy, mut model, mut surface) = init(&config(AnimationStyle::CardFlip, 10, 5));
    assert_eq!(
        model.final_steps,
        3.0 * model.cards.len() as f64 + model.winner_index as f64
    );
    let motions = sweep(&strategy, &mut model, &mut surface, 120);
    assert_eq!(*motions.last().unwrap(), model.final_steps);
    assert_eq!(model.highlighted(), model.winner_index);
    assert_eq!(strategy.revealed(&model).unwrap().id, "p5");

    let winner = &model.cards[model.winner_index];
    assert!((winner.scale.x - 1.15).abs() < 1e-9);
    assert!(model.cards.iter().filter(|c| !c.is_winner).all(|c| c.alpha < 0.5));
}

#[test]
fn reset_puts_cards_back_home() {
    let (strategy, mut model, mut surface) = init(&config(AnimationStyle::CardFlip, 10, 5));
    sweep(&strategy, &mut model, &mut surface, 30);
    strategy.reset(&mut model);
    assert_eq!(model.steps, 0.0);
    assert_eq!(strategy.particle_count(&model), 0);
    for (i, card) in model.cards.iter().enumerate() {
        assert_eq!(Some(card.pos), model.home(i));
        assert_eq!(card.alpha, 1.0);
    }
}
