use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    animation::phase::PhaseTable,
    assets::cache::ImageCache,
    config::{AnimationEngineConfig, AnimationStyle, Participant},
    engine::{
        metrics::{MetricsTracker, PerformanceMetrics},
        scheduler::{FrameScheduler, FrameToken},
        state::{AnimationState, AnimationStatus},
        strategy::{AnimationStrategy, FrameInput},
    },
    factory::validate_config,
    foundation::{
        clock::Clock,
        error::{EngineError, RaffleError, RaffleResult},
    },
    render::{
        context::{CanvasTarget, FrameRGBA},
        surface::RenderSurface,
    },
};

/// Optional observers of one engine.
#[derive(Default)]
pub struct EngineCallbacks {
    pub on_progress: Option<Box<dyn FnMut(f64)>>,
    pub on_complete: Option<Box<dyn FnMut()>>,
    pub on_error: Option<Box<dyn FnMut(&EngineError)>>,
}

impl EngineCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_progress(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&EngineError) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for EngineCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineCallbacks")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Lifecycle and query surface shared by every engine, whatever its style.
pub trait Engine {
    fn style(&self) -> AnimationStyle;

    fn set_callbacks(&mut self, callbacks: EngineCallbacks);

    /// Validate `config`, acquire a drawing context from `target`, preload images and build the
    /// strategy model. Any failure leaves the engine in [`AnimationStatus::Error`] with nothing
    /// allocated.
    fn initialize(
        &mut self,
        target: &mut dyn CanvasTarget,
        config: &AnimationEngineConfig,
    ) -> RaffleResult<()>;

    /// Begin playback from `Idle`, or replay from `Completed`.
    fn start(&mut self) -> RaffleResult<()>;

    fn pause(&mut self) -> RaffleResult<()>;

    fn resume(&mut self) -> RaffleResult<()>;

    /// Cancel playback and rewind to `Idle`.
    fn stop(&mut self) -> RaffleResult<()>;

    /// Release everything and return to `Idle`. Idempotent.
    fn destroy(&mut self);

    /// Frame callback for a token obtained from the engine's scheduler. Returns `false` when the
    /// token is stale and nothing was done.
    fn on_frame(&mut self, token: FrameToken) -> bool;

    fn state(&self) -> &AnimationState;

    fn is_running(&self) -> bool;

    fn progress(&self) -> f64;

    fn fps(&self) -> f64;

    fn performance_metrics(&self) -> &PerformanceMetrics;

    fn last_error(&self) -> Option<&EngineError>;

    /// Name of the phase at the current progress.
    fn phase_name(&self) -> Option<&'static str>;

    /// Participant currently under the reveal marker.
    fn revealed_winner(&self) -> Option<&Participant>;

    fn particle_count(&self) -> usize;

    /// Pixels of the last presented frame, when the backend keeps them.
    fn frame_snapshot(&self) -> Option<FrameRGBA>;
}

/// The shared lifecycle/timing core, parameterized by a visual strategy.
pub struct AnimationEngine<S: AnimationStrategy> {
    strategy: S,
    clock: Arc<dyn Clock>,
    scheduler: Box<dyn FrameScheduler>,
    images: Arc<ImageCache>,
    callbacks: EngineCallbacks,
    config: Option<AnimationEngineConfig>,
    surface: Option<RenderSurface>,
    model: Option<S::Model>,
    state: AnimationState,
    metrics: MetricsTracker,
    pending: Option<FrameToken>,
    last_frame_ms: f64,
    last_error: Option<EngineError>,
}

impl<S: AnimationStrategy> std::fmt::Debug for AnimationEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationEngine")
            .field("style", &self.strategy.style())
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl<S: AnimationStrategy> AnimationEngine<S> {
    pub fn new(
        strategy: S,
        clock: Arc<dyn Clock>,
        scheduler: Box<dyn FrameScheduler>,
        images: Arc<ImageCache>,
    ) -> Self {
        Self {
            strategy,
            clock,
            scheduler,
            images,
            callbacks: EngineCallbacks::default(),
            config: None,
            surface: None,
            model: None,
            state: AnimationState::default(),
            metrics: MetricsTracker::new(60.0),
            pending: None,
            last_frame_ms: 0.0,
            last_error: None,
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn model(&self) -> Option<&S::Model> {
        self.model.as_ref()
    }

    pub fn config(&self) -> Option<&AnimationEngineConfig> {
        self.config.as_ref()
    }

    pub fn phases(&self) -> &PhaseTable {
        self.strategy.phases()
    }

    /// Current motion value and its final target, once initialized.
    pub fn motion(&self) -> Option<(f64, f64)> {
        let model = self.model.as_ref()?;
        Some((
            self.strategy.motion_value(model),
            self.strategy.final_target(model),
        ))
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel_frame(token);
        }
    }

    fn schedule_next(&mut self) {
        self.pending = Some(self.scheduler.request_frame());
    }

    fn release(&mut self) {
        self.cancel_pending();
        self.model = None;
        if let Some(mut surface) = self.surface.take() {
            surface.release_images();
        }
        self.config = None;
        self.state = AnimationState::default();
        self.metrics.reset();
    }

    /// Rejected `initialize`: nothing stays allocated, the engine reports `Error`.
    fn reject(&mut self, err: RaffleError) -> RaffleError {
        tracing::warn!(%err, style = %self.strategy.style(), "initialize rejected");
        self.release();
        self.state.status = AnimationStatus::Error;
        self.last_error = Some(EngineError::from(&err));
        err
    }

    /// Runtime failure inside the frame loop: stop scheduling and notify `on_error`.
    fn fail(&mut self, err: RaffleError) {
        tracing::error!(
            %err,
            style = %self.strategy.style(),
            frame = self.state.current_frame,
            "frame failed"
        );
        self.cancel_pending();
        self.state.status = AnimationStatus::Error;
        let payload = EngineError::from(&err);
        if let Some(cb) = self.callbacks.on_error.as_mut() {
            cb(&payload);
        }
        self.last_error = Some(payload);
    }

    fn eased(&self, progress: f64) -> f64 {
        self.config
            .as_ref()
            .map(|c| c.playback.easing.apply(progress))
            .unwrap_or(progress)
    }

    fn build(
        &mut self,
        target: &mut dyn CanvasTarget,
        config: &AnimationEngineConfig,
    ) -> RaffleResult<()> {
        validate_config(config)?;
        let requested = AnimationStyle::from_id(&config.style)
            .ok_or_else(|| RaffleError::config(format!("unsupported style '{}'", config.style)))?;
        if requested != self.strategy.style() {
            return Err(RaffleError::config(format!(
                "style '{requested}' does not match engine style '{}'",
                self.strategy.style()
            )));
        }
        PhaseTable::validate(self.strategy.phases().phases())?;

        let ctx = target
            .create_context()
            .ok_or_else(|| RaffleError::resource("drawing context unavailable"))?;

        let opts = &config.playback.style_options;
        let root = match &opts.asset_root {
            Some(root) => root.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        let refs = config.image_refs();
        let report = self.images.preload(
            refs.iter().copied(),
            &root,
            Duration::from_millis(opts.image_timeout_ms),
        );
        tracing::debug!(
            requested = report.requested,
            loaded = report.loaded,
            missing = report.missing.len(),
            timed_out = report.timed_out.len(),
            "images preloaded"
        );

        let mut surface = RenderSurface::new(ctx, Arc::clone(&self.images), root);
        for r in &refs {
            surface.retain_image(r);
        }

        let mut rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let strategy = &self.strategy;
        let model = catch_unwind(AssertUnwindSafe(|| {
            strategy.initialize_animation(config, &surface, &mut rng)
        }))
        .unwrap_or_else(|payload| {
            Err(RaffleError::render(format!(
                "strategy panicked during initialization: {}",
                panic_message(payload.as_ref())
            )))
        })?;

        self.state = AnimationState::for_playback(&config.playback);
        self.metrics = MetricsTracker::new(config.playback.target_fps);
        self.config = Some(config.clone());
        self.surface = Some(surface);
        self.model = Some(model);
        Ok(())
    }

    fn render(&mut self, input: &FrameInput) -> RaffleResult<f64> {
        let (Some(surface), Some(model)) = (self.surface.as_mut(), self.model.as_mut()) else {
            return Err(RaffleError::lifecycle("frame delivered to an uninitialized engine"));
        };
        let strategy = &self.strategy;
        let started = Instant::now();
        catch_unwind(AssertUnwindSafe(|| {
            strategy.render_frame(input, surface, model)?;
            surface.present();
            Ok::<(), RaffleError>(())
        }))
        .unwrap_or_else(|payload| {
            Err(RaffleError::render(format!(
                "strategy panicked: {}",
                panic_message(payload.as_ref())
            )))
        })?;
        Ok(started.elapsed().as_secs_f64() * 1000.0)
    }

    fn memory_usage(&self) -> usize {
        let model = self
            .model
            .as_ref()
            .map(|m| self.strategy.footprint_bytes(m))
            .unwrap_or(0);
        let images = self.surface.as_ref().map(RenderSurface::retained_bytes).unwrap_or(0);
        model + images
    }
}

impl<S: AnimationStrategy> Engine for AnimationEngine<S> {
    fn style(&self) -> AnimationStyle {
        self.strategy.style()
    }

    fn set_callbacks(&mut self, callbacks: EngineCallbacks) {
        self.callbacks = callbacks;
    }

    #[tracing::instrument(
        skip_all,
        fields(style = %self.strategy.style(), participants = config.participants.len())
    )]
    fn initialize(
        &mut self,
        target: &mut dyn CanvasTarget,
        config: &AnimationEngineConfig,
    ) -> RaffleResult<()> {
        self.release();
        self.last_error = None;
        match self.build(target, config) {
            Ok(()) => {
                tracing::info!(
                    total_frames = self.state.total_frames,
                    duration_ms = self.state.duration_ms,
                    "engine initialized"
                );
                Ok(())
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    fn start(&mut self) -> RaffleResult<()> {
        match self.state.status {
            AnimationStatus::Running => return Ok(()),
            AnimationStatus::Idle if self.model.is_some() => {}
            AnimationStatus::Completed => {
                self.state.rewind();
                self.metrics.reset();
                if let Some(model) = self.model.as_mut() {
                    self.strategy.reset(model);
                }
            }
            AnimationStatus::Idle => {
                return Err(RaffleError::lifecycle("start called before initialize"));
            }
            status => {
                return Err(RaffleError::lifecycle(format!("cannot start from {status}")));
            }
        }
        self.state.status = AnimationStatus::Running;
        self.last_frame_ms = self.clock.now_ms();
        self.schedule_next();
        tracing::debug!(style = %self.strategy.style(), "playback started");
        Ok(())
    }

    fn pause(&mut self) -> RaffleResult<()> {
        match self.state.status {
            AnimationStatus::Paused => Ok(()),
            AnimationStatus::Running => {
                self.cancel_pending();
                self.state.status = AnimationStatus::Paused;
                tracing::debug!(elapsed_ms = self.state.elapsed_ms, "playback paused");
                Ok(())
            }
            status => Err(RaffleError::lifecycle(format!("cannot pause from {status}"))),
        }
    }

    fn resume(&mut self) -> RaffleResult<()> {
        match self.state.status {
            AnimationStatus::Running => Ok(()),
            AnimationStatus::Paused => {
                self.state.status = AnimationStatus::Running;
                self.last_frame_ms = self.clock.now_ms();
                self.schedule_next();
                tracing::debug!(elapsed_ms = self.state.elapsed_ms, "playback resumed");
                Ok(())
            }
            status => Err(RaffleError::lifecycle(format!("cannot resume from {status}"))),
        }
    }

    fn stop(&mut self) -> RaffleResult<()> {
        match self.state.status {
            AnimationStatus::Idle => Ok(()),
            AnimationStatus::Running | AnimationStatus::Paused | AnimationStatus::Completed => {
                self.cancel_pending();
                self.state.rewind();
                self.state.status = AnimationStatus::Idle;
                self.metrics.reset();
                if let Some(model) = self.model.as_mut() {
                    self.strategy.reset(model);
                }
                tracing::debug!(style = %self.strategy.style(), "playback stopped");
                Ok(())
            }
            AnimationStatus::Error => Err(RaffleError::lifecycle(
                "engine is in error state, destroy and initialize again",
            )),
        }
    }

    fn destroy(&mut self) {
        self.release();
        self.last_error = None;
    }

    fn on_frame(&mut self, token: FrameToken) -> bool {
        if self.pending != Some(token) || self.state.status != AnimationStatus::Running {
            return false;
        }
        self.pending = None;

        let now = self.clock.now_ms();
        let delta_ms = (now - self.last_frame_ms).max(0.0);
        self.last_frame_ms = now;
        self.state.advance(delta_ms);
        self.metrics.record_frame(delta_ms, now);

        let progress = self.state.progress;
        let eased_progress = self.eased(progress);
        let input = FrameInput {
            progress,
            eased_progress,
            phase: self.strategy.phases().sample(eased_progress),
            delta_ms,
            elapsed_ms: self.state.elapsed_ms,
            frame: self.state.current_frame,
        };

        match self.render(&input) {
            Ok(render_ms) => {
                let memory = self.memory_usage();
                self.metrics.record_render(render_ms, memory);
            }
            Err(err) => {
                self.fail(err);
                return true;
            }
        }

        if let Some(cb) = self.callbacks.on_progress.as_mut() {
            cb(progress);
        }

        if self.state.is_finished() {
            self.state.status = AnimationStatus::Completed;
            tracing::info!(
                frames = self.state.current_frame,
                frame_drops = self.metrics.metrics().frame_drops,
                "playback completed"
            );
            if let Some(cb) = self.callbacks.on_complete.as_mut() {
                cb();
            }
        } else {
            self.schedule_next();
        }
        true
    }

    fn state(&self) -> &AnimationState {
        &self.state
    }

    fn is_running(&self) -> bool {
        self.state.status == AnimationStatus::Running
    }

    fn progress(&self) -> f64 {
        self.state.progress
    }

    fn fps(&self) -> f64 {
        self.metrics.metrics().current_fps
    }

    fn performance_metrics(&self) -> &PerformanceMetrics {
        self.metrics.metrics()
    }

    fn last_error(&self) -> Option<&EngineError> {
        self.last_error.as_ref()
    }

    fn phase_name(&self) -> Option<&'static str> {
        self.model.as_ref()?;
        let sample = self.strategy.phases().sample(self.eased(self.state.progress));
        Some(sample.name)
    }

    fn revealed_winner(&self) -> Option<&Participant> {
        self.strategy.revealed(self.model.as_ref()?)
    }

    fn particle_count(&self) -> usize {
        self.model
            .as_ref()
            .map(|m| self.strategy.particle_count(m))
            .unwrap_or(0)
    }

    fn frame_snapshot(&self) -> Option<FrameRGBA> {
        self.surface.as_ref()?.snapshot()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/core.rs"]
mod tests;
