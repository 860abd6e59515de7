use std::{collections::HashSet, sync::Arc};

use crate::{
    assets::cache::ImageCache,
    config::{AnimationEngineConfig, AnimationStyle, SUPPORTED_STYLES},
    engine::{
        core::{AnimationEngine, Engine},
        scheduler::FrameScheduler,
    },
    foundation::{
        clock::{Clock, SystemClock},
        error::{RaffleError, RaffleResult},
    },
    styles::{
        card_flip::CardFlip, case_opening::CaseOpening, particle_explosion::ParticleExplosion,
        slot_machine::SlotMachine, wheel::Wheel, zoom_fade::ZoomFade,
    },
};

/// Check a configuration before any resource is touched.
///
/// Checks run in a fixed order and the first failure wins, so callers always see the same
/// message for the same config.
pub fn validate_config(config: &AnimationEngineConfig) -> RaffleResult<()> {
    if config.participants.is_empty() {
        return Err(RaffleError::config("participants must not be empty"));
    }
    let winner = match config.winner.as_deref() {
        Some(w) if !w.is_empty() => w,
        _ => return Err(RaffleError::config("winner is required")),
    };
    let mut seen = HashSet::with_capacity(config.participants.len());
    for p in &config.participants {
        if !seen.insert(p.id.as_str()) {
            return Err(RaffleError::config(format!(
                "duplicate participant id '{}'",
                p.id
            )));
        }
    }
    if !seen.contains(winner) {
        return Err(RaffleError::config(format!(
            "winner not found in participants (winner '{winner}')"
        )));
    }
    let playback = &config.playback;
    if !(playback.duration_ms.is_finite() && playback.duration_ms > 0.0) {
        return Err(RaffleError::config("duration must be positive"));
    }
    if !(playback.target_fps.is_finite() && playback.target_fps > 0.0) {
        return Err(RaffleError::config("target fps must be positive"));
    }
    if AnimationStyle::from_id(&config.style).is_none() {
        return Err(RaffleError::config(format!(
            "unsupported style '{}'",
            config.style
        )));
    }
    Ok(())
}

/// Builds engines for style ids, sharing one clock and one image cache between them.
#[derive(Clone, Debug)]
pub struct EngineFactory {
    clock: Arc<dyn Clock>,
    images: Arc<ImageCache>,
}

impl Default for EngineFactory {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock::new()), Arc::new(ImageCache::new()))
    }
}

impl EngineFactory {
    pub fn new(clock: Arc<dyn Clock>, images: Arc<ImageCache>) -> Self {
        Self { clock, images }
    }

    pub fn images(&self) -> &Arc<ImageCache> {
        &self.images
    }

    /// Engine for `style` (case-insensitive), driven by `scheduler`.
    #[tracing::instrument(skip(self, scheduler))]
    pub fn create_engine(
        &self,
        style: &str,
        scheduler: Box<dyn FrameScheduler>,
    ) -> RaffleResult<Box<dyn Engine>> {
        let style = AnimationStyle::from_id(style)
            .ok_or_else(|| RaffleError::config(format!("unsupported style '{style}'")))?;
        let clock = Arc::clone(&self.clock);
        let images = Arc::clone(&self.images);
        let engine: Box<dyn Engine> = match style {
            AnimationStyle::CaseOpening => Box::new(AnimationEngine::new(
                CaseOpening::default(),
                clock,
                scheduler,
                images,
            )),
            AnimationStyle::Wheel => {
                Box::new(AnimationEngine::new(Wheel::default(), clock, scheduler, images))
            }
            AnimationStyle::CardFlip => {
                Box::new(AnimationEngine::new(CardFlip::default(), clock, scheduler, images))
            }
            AnimationStyle::SlotMachine => Box::new(AnimationEngine::new(
                SlotMachine::default(),
                clock,
                scheduler,
                images,
            )),
            AnimationStyle::ParticleExplosion => Box::new(AnimationEngine::new(
                ParticleExplosion::default(),
                clock,
                scheduler,
                images,
            )),
            AnimationStyle::ZoomFade => {
                Box::new(AnimationEngine::new(ZoomFade::default(), clock, scheduler, images))
            }
        };
        tracing::debug!(style = %style, "engine created");
        Ok(engine)
    }

    /// Engine matching `config.style`. The config itself is validated by `initialize`.
    pub fn create_engine_for(
        &self,
        config: &AnimationEngineConfig,
        scheduler: Box<dyn FrameScheduler>,
    ) -> RaffleResult<Box<dyn Engine>> {
        self.create_engine(&config.style, scheduler)
    }

    pub fn supported_styles(&self) -> &'static [&'static str] {
        &SUPPORTED_STYLES
    }

    pub fn is_style_supported(&self, style: &str) -> bool {
        AnimationStyle::from_id(style).is_some()
    }
}

#[cfg(test)]
#[path = "../tests/unit/factory.rs"]
mod tests;
