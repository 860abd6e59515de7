use std::sync::Arc;

use crate::{
    assets::cache::ImageCache,
    config::{AnimationEngineConfig, AnimationStyle, Participant, PlaybackConfig},
    engine::strategy::{AnimationStrategy, FrameInput},
    render::{
        recording::{RecordingContext, RecordingLog},
        surface::RenderSurface,
    },
};

pub(crate) fn recording_surface(width: u32, height: u32) -> (RenderSurface, RecordingLog) {
    let log = RecordingLog::default();
    let ctx = RecordingContext::new(width, height, log.clone());
    let surface = RenderSurface::new(
        Box::new(ctx),
        Arc::new(ImageCache::new()),
        std::env::temp_dir(),
    );
    (surface, log)
}

pub(crate) fn config(style: AnimationStyle, n: usize, winner: usize) -> AnimationEngineConfig {
    let participants = (0..n)
        .map(|i| Participant::new(format!("p{i}"), format!("Person {i}")))
        .collect();
    let mut playback = PlaybackConfig::new(3000.0, 60.0);
    playback.style_options.seed = Some(42);
    AnimationEngineConfig::new(participants, format!("p{winner}"), style, playback)
}

/// Render `frames + 1` frames at evenly spaced progress values from 0 to 1 inclusive and
/// return the motion value seen after each one.
pub(crate) fn sweep<S: AnimationStrategy>(
    strategy: &S,
    model: &mut S::Model,
    surface: &mut RenderSurface,
    frames: u64,
) -> Vec<f64> {
    let delta_ms = 3000.0 / frames as f64;
    (0..=frames)
        .map(|frame| {
            let progress = frame as f64 / frames as f64;
            let input = FrameInput {
                progress,
                eased_progress: progress,
                phase: strategy.phases().sample(progress),
                delta_ms,
                elapsed_ms: delta_ms * frame as f64,
                frame,
            };
            strategy
                .render_frame(&input, surface, model)
                .expect("render frame");
            surface.present();
            strategy.motion_value(model)
        })
        .collect()
}
