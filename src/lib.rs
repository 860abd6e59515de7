//! Frame-accurate raffle reveal animations.
//!
//! A shared engine core owns lifecycle, timing and metrics; six visual strategies decide what a
//! frame looks like and guarantee the motion ends exactly on the winner:
//!
//! - Validate an [`AnimationEngineConfig`] and pick a style through [`EngineFactory`]
//! - [`Engine::initialize`] against a [`CanvasTarget`] (CPU pixels or a recording log)
//! - Drive frames from a [`FrameScheduler`], or headlessly with [`run_to_completion`]
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod config;
mod engine;
mod factory;
mod foundation;
mod render;
mod styles;

pub use crate::animation::ease::Ease;
pub use crate::animation::effects::{DecayEffect, Flash, ScreenShake};
pub use crate::animation::particles::{ForceModel, Particle, ParticleKind, ParticleSystem};
pub use crate::animation::phase::{MAX_PHASES, Phase, PhaseSample, PhaseTable, PhaseTracker};
pub use crate::assets::cache::{ImageCache, PreloadReport, normalize_rel_path};
pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::config::{
    AnimationEngineConfig, AnimationStyle, Participant, PlaybackConfig, SUPPORTED_STYLES,
    StyleOptions, is_style_supported, supported_styles,
};
pub use crate::engine::core::{AnimationEngine, Engine, EngineCallbacks};
pub use crate::engine::driver::{DriveReport, run_to_completion};
pub use crate::engine::metrics::{MetricsTracker, PerformanceMetrics};
pub use crate::engine::scheduler::{FrameQueue, FrameScheduler, FrameToken};
pub use crate::engine::state::{AnimationState, AnimationStatus};
pub use crate::engine::strategy::{AnimationStrategy, FrameInput};
pub use crate::factory::{EngineFactory, validate_config};
pub use crate::foundation::clock::{Clock, ManualClock, SystemClock};
pub use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Transform2D, Vec2};
pub use crate::foundation::error::{EngineError, ErrorKind, RaffleError, RaffleResult};
pub use crate::render::context::{
    CanvasTarget, DrawContext, FrameRGBA, GradientStop, Paint, Shadow, TextAlign, TextBaseline,
    TextStyle,
};
pub use crate::render::cpu::{CpuCanvas, CpuContext};
pub use crate::render::recording::{DrawCommand, RecordingCanvas, RecordingContext, RecordingLog};
pub use crate::render::surface::{RenderSurface, SurfaceScope};

/// The built-in visual strategies, for embedding one directly in an [`AnimationEngine`].
pub mod strategies {
    pub use crate::styles::card_flip::{CardFlip, CardFlipModel};
    pub use crate::styles::case_opening::{CaseOpening, CaseOpeningModel};
    pub use crate::styles::layout::DisplayItem;
    pub use crate::styles::particle_explosion::{ParticleExplosion, ParticleExplosionModel};
    pub use crate::styles::rarity::{
        RARITY_WEIGHTS, Rarity, RarityColors, RarityFn, assign_rarity,
    };
    pub use crate::styles::slot_machine::{Reel, SlotMachine, SlotMachineModel};
    pub use crate::styles::wheel::{Wheel, WheelModel};
    pub use crate::styles::zoom_fade::{ZoomFade, ZoomFadeModel};
}
