use rand::SeedableRng;

use super::*;
use crate::styles::support::{config, recording_surface, sweep};

fn init(cfg: &AnimationEngineConfig) -> (ZoomFade, ZoomFadeModel, RenderSurface) {
    let (surface, _) = recording_surface(800, 600);
    let strategy = ZoomFade::default();
    let mut rng = StdRng::seed_from_u64(13);
    let model = strategy.initialize_animation(cfg, &surface, &mut rng).unwrap();
    (strategy, model, surface)
}

#[test]
fn mosaic_is_square_ish_and_clamped() {
    let (_, model, _) = init(&config(AnimationStyle::ZoomFade, 4, 0));
    assert_eq!(model.cells.len(), MIN_CELLS);
    assert_eq!(model.columns(), 3);

    let (_, model, _) = init(&config(AnimationStyle::ZoomFade, 200, 150));
    assert_eq!(model.cells.len(), MAX_CELLS);
    assert_eq!(model.columns(), 8);
    assert_eq!(model.cells[model.winner_index].id(), "p150");
}

#[test]
fn cell_lookup_inverts_cell_centres() {
    let (_, model, surface) = init(&config(AnimationStyle::ZoomFade, 20, 3));
    for i in 0..model.cells.len() {
        assert_eq!(model.cell_at(model.cell_center(i)), Some(i));
    }
    assert_eq!(model.cell_at(Point::new(-5.0, -5.0)), None);
    assert!(surface.bounds().contains(model.cell_center(model.cells.len() - 1)));
}

#[test]
fn camera_ends_zoomed_on_the_winner() {
    let (strategy, mut model, mut surface) = init(&config(AnimationStyle::ZoomFade, 10, 5));
    let motions = sweep(&strategy, &mut model, &mut surface, 150);
    assert_eq!(motions[0], 1.0);
    assert_eq!(*motions.last().unwrap(), FINAL_ZOOM);
    assert_eq!(strategy.revealed(&model).unwrap().id, "p5");
    assert!(
        model
            .cells
            .iter()
            .filter(|c| !c.is_winner)
            .all(|c| (c.alpha - 0.15).abs() < 1e-9)
    );
    assert!(strategy.particle_count(&model) > 0);
}

#[test]
fn reset_returns_to_the_overview() {
    let (strategy, mut model, mut surface) = init(&config(AnimationStyle::ZoomFade, 10, 5));
    sweep(&strategy, &mut model, &mut surface, 40);
    strategy.reset(&mut model);
    assert_eq!(model.zoom, 1.0);
    assert_eq!(model.focus, surface.center());
    assert!(model.cells.iter().all(|c| c.alpha == 1.0));
    assert_eq!(strategy.particle_count(&model), 0);
}
