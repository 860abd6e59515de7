use rand::rngs::StdRng;

use crate::{
    animation::phase::{PhaseSample, PhaseTable},
    config::{AnimationEngineConfig, AnimationStyle, Participant},
    foundation::error::RaffleResult,
    render::surface::RenderSurface,
};

/// Timing of one frame as seen by a strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    /// Linear progress `min(elapsed / duration, 1)`.
    pub progress: f64,
    /// `progress` after the configured global easing.
    pub eased_progress: f64,
    /// Phase lookup of `eased_progress`.
    pub phase: PhaseSample,
    pub delta_ms: f64,
    pub elapsed_ms: f64,
    pub frame: u64,
}

/// Per-style visual behaviour plugged into an [`AnimationEngine`](crate::engine::core::AnimationEngine).
///
/// The strategy itself is stateless configuration; everything that changes during playback lives
/// in its `Model`, built once per `initialize` and owned by the engine.
pub trait AnimationStrategy {
    type Model;

    fn style(&self) -> AnimationStyle;

    /// Phase table driving this style. Validated by the engine before use.
    fn phases(&self) -> &PhaseTable;

    /// Build display items, pick the winner occurrence and compute the final motion target.
    fn initialize_animation(
        &self,
        config: &AnimationEngineConfig,
        surface: &RenderSurface,
        rng: &mut StdRng,
    ) -> RaffleResult<Self::Model>;

    fn render_frame(
        &self,
        input: &FrameInput,
        surface: &mut RenderSurface,
        model: &mut Self::Model,
    ) -> RaffleResult<()>;

    /// Return the model to its pre-playback state, keeping layout and final target.
    fn reset(&self, model: &mut Self::Model);

    /// Participant currently under the reveal marker, derived from the motion value.
    fn revealed<'m>(&self, model: &'m Self::Model) -> Option<&'m Participant>;

    fn particle_count(&self, _model: &Self::Model) -> usize {
        0
    }

    /// Best-effort heap bytes held by the model.
    fn footprint_bytes(&self, model: &Self::Model) -> usize;

    /// Current motion value (offset, angle, zoom, ...).
    fn motion_value(&self, model: &Self::Model) -> f64;

    /// Motion value reached at `progress = 1`.
    fn final_target(&self, model: &Self::Model) -> f64;
}
