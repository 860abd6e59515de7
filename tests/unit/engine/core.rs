use std::{cell::RefCell, rc::Rc};

use super::*;
use crate::{
    animation::{
        ease::Ease,
        phase::{Phase, PhaseTable},
    },
    config::PlaybackConfig,
    engine::scheduler::FrameQueue,
    foundation::{clock::ManualClock, error::ErrorKind},
    render::recording::RecordingCanvas,
};

static STUB_PHASES: [Phase; 2] = [
    Phase::new("warm", 0.5, Ease::InQuad),
    Phase::new("land", 1.0, Ease::OutCubic),
];

#[derive(Default)]
struct Stub {
    fail_at: Option<u64>,
    panic_at: Option<u64>,
}

struct StubModel {
    participants: Vec<Participant>,
    winner: usize,
    motion: f64,
    frames: u64,
    resets: u32,
}

impl AnimationStrategy for Stub {
    type Model = StubModel;

    fn style(&self) -> AnimationStyle {
        AnimationStyle::Wheel
    }

    fn phases(&self) -> &PhaseTable {
        static TABLE: PhaseTable = PhaseTable::from_static(&STUB_PHASES);
        &TABLE
    }

    fn initialize_animation(
        &self,
        config: &AnimationEngineConfig,
        _surface: &RenderSurface,
        _rng: &mut StdRng,
    ) -> RaffleResult<StubModel> {
        Ok(StubModel {
            participants: config.participants.clone(),
            winner: config.winner_index().unwrap_or(0),
            motion: 0.0,
            frames: 0,
            resets: 0,
        })
    }

    fn render_frame(
        &self,
        input: &FrameInput,
        surface: &mut RenderSurface,
        model: &mut StubModel,
    ) -> RaffleResult<()> {
        if self.fail_at == Some(input.frame) {
            return Err(RaffleError::render("stub failure"));
        }
        if self.panic_at == Some(input.frame) {
            panic!("stub panic");
        }
        model.frames += 1;
        model.motion = 100.0 * input.phase.global_eased;
        surface.clear(crate::foundation::core::Rgba8::BLACK);
        Ok(())
    }

    fn reset(&self, model: &mut StubModel) {
        model.motion = 0.0;
        model.frames = 0;
        model.resets += 1;
    }

    fn revealed<'m>(&self, model: &'m StubModel) -> Option<&'m Participant> {
        let idx = if model.motion >= 100.0 { model.winner } else { 0 };
        model.participants.get(idx)
    }

    fn footprint_bytes(&self, model: &StubModel) -> usize {
        model.participants.len() * 64
    }

    fn motion_value(&self, model: &StubModel) -> f64 {
        model.motion
    }

    fn final_target(&self, _model: &StubModel) -> f64 {
        100.0
    }
}

struct Rig {
    engine: AnimationEngine<Stub>,
    clock: ManualClock,
    queue: FrameQueue,
    canvas: RecordingCanvas,
}

fn rig(stub: Stub) -> Rig {
    let clock = ManualClock::new();
    let queue = FrameQueue::new();
    let engine = AnimationEngine::new(
        stub,
        Arc::new(clock.clone()),
        Box::new(queue.clone()),
        Arc::new(ImageCache::new()),
    );
    Rig {
        engine,
        clock,
        queue,
        canvas: RecordingCanvas::new(320, 180),
    }
}

fn config(n: usize, winner: usize, duration_ms: f64, fps: f64) -> AnimationEngineConfig {
    let participants = (0..n)
        .map(|i| Participant::new(format!("p{i}"), format!("Person {i}")))
        .collect();
    let mut playback = PlaybackConfig::new(duration_ms, fps);
    playback.style_options.seed = Some(9);
    AnimationEngineConfig::new(
        participants,
        format!("p{winner}"),
        AnimationStyle::Wheel,
        playback,
    )
}

impl Rig {
    fn init(&mut self, cfg: &AnimationEngineConfig) -> RaffleResult<()> {
        self.engine.initialize(&mut self.canvas, cfg)
    }

    /// Advance the clock and deliver due frames; returns frames accepted.
    fn tick(&mut self, step_ms: f64) -> usize {
        self.clock.advance_ms(step_ms);
        self.queue
            .take_due()
            .into_iter()
            .filter(|t| self.engine.on_frame(*t))
            .count()
    }
}

#[test]
fn destroy_before_initialize_is_idle_and_idempotent() {
    let mut r = rig(Stub::default());
    r.engine.destroy();
    r.engine.destroy();
    assert_eq!(r.engine.state().status, AnimationStatus::Idle);
    assert!(r.engine.start().is_err());
}

#[test]
fn invalid_config_rejects_without_on_error() {
    let mut r = rig(Stub::default());
    let errors = Rc::new(RefCell::new(0));
    let seen = Rc::clone(&errors);
    r.engine
        .set_callbacks(EngineCallbacks::new().on_error(move |_| *seen.borrow_mut() += 1));

    let mut cfg = config(3, 1, 1000.0, 60.0);
    cfg.playback.duration_ms = 0.0;
    let err = r.init(&cfg).unwrap_err();
    assert!(err.to_string().contains("duration must be positive"));
    assert_eq!(r.engine.state().status, AnimationStatus::Error);
    assert_eq!(r.engine.last_error().unwrap().kind, ErrorKind::Config);
    assert_eq!(*errors.borrow(), 0);
    assert!(r.engine.model().is_none());

    r.init(&config(3, 1, 1000.0, 60.0)).unwrap();
    assert_eq!(r.engine.state().status, AnimationStatus::Idle);
    assert!(r.engine.last_error().is_none());
}

#[test]
fn style_mismatch_is_a_config_error() {
    let mut r = rig(Stub::default());
    let mut cfg = config(3, 1, 1000.0, 60.0);
    cfg.style = "zoom-fade".to_string();
    let err = r.init(&cfg).unwrap_err();
    assert!(err.to_string().contains("does not match engine style"));
}

#[test]
fn missing_context_is_a_resource_error() {
    let mut r = rig(Stub::default());
    let mut canvas = RecordingCanvas::unavailable();
    let err = r
        .engine
        .initialize(&mut canvas, &config(3, 1, 1000.0, 60.0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    assert_eq!(r.engine.state().status, AnimationStatus::Error);
}

#[test]
fn plays_to_completion_with_monotonic_progress() {
    let mut r = rig(Stub::default());
    let progress = Rc::new(RefCell::new(Vec::new()));
    let completions = Rc::new(RefCell::new(0));
    let (p, c) = (Rc::clone(&progress), Rc::clone(&completions));
    r.engine.set_callbacks(
        EngineCallbacks::new()
            .on_progress(move |v| p.borrow_mut().push(v))
            .on_complete(move || *c.borrow_mut() += 1),
    );
    r.init(&config(10, 5, 1000.0, 60.0)).unwrap();
    assert_eq!(r.engine.state().total_frames, 60);
    r.engine.start().unwrap();
    assert!(r.engine.is_running());

    for _ in 0..200 {
        r.tick(1000.0 / 60.0);
    }

    let progress = progress.borrow();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.iter().filter(|&&v| v >= 1.0).count(), 1);
    assert_eq!(*progress.last().unwrap(), 1.0);
    assert_eq!(*completions.borrow(), 1);
    assert_eq!(r.engine.state().status, AnimationStatus::Completed);
    assert!(r.queue.is_idle());
    assert_eq!(r.engine.revealed_winner().unwrap().id, "p5");
    assert_eq!(r.engine.motion(), Some((100.0, 100.0)));
    assert_eq!(r.engine.phase_name(), Some("land"));
    assert_eq!(r.canvas.log().presents(), progress.len());
    assert!(r.engine.performance_metrics().memory_usage_bytes >= 640);
}

#[test]
fn pause_resume_excludes_paused_time() {
    let mut r = rig(Stub::default());
    r.init(&config(4, 2, 1000.0, 60.0)).unwrap();
    r.engine.start().unwrap();
    r.tick(100.0);
    r.tick(100.0);
    let elapsed = r.engine.state().elapsed_ms;
    assert_eq!(elapsed, 200.0);

    r.engine.pause().unwrap();
    assert_eq!(r.engine.state().status, AnimationStatus::Paused);
    assert_eq!(r.tick(5_000.0), 0);
    r.engine.resume().unwrap();
    assert_eq!(r.engine.state().elapsed_ms, elapsed);

    r.tick(50.0);
    assert_eq!(r.engine.state().elapsed_ms, 250.0);
    assert_eq!(r.engine.progress(), 0.25);
}

#[test]
fn stale_tokens_are_ignored() {
    let mut r = rig(Stub::default());
    r.init(&config(4, 2, 1000.0, 60.0)).unwrap();
    r.engine.start().unwrap();
    let stale = r.queue.take_due();
    assert_eq!(stale.len(), 1);
    r.engine.pause().unwrap();
    r.engine.resume().unwrap();
    r.clock.advance_ms(16.0);
    assert!(!r.engine.on_frame(stale[0]));
    assert_eq!(r.tick(0.0), 1);
}

#[test]
fn render_error_moves_to_error_and_notifies_once() {
    let mut r = rig(Stub {
        fail_at: Some(3),
        ..Stub::default()
    });
    let errors = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&errors);
    r.engine.set_callbacks(
        EngineCallbacks::new().on_error(move |e| seen.borrow_mut().push(e.clone())),
    );
    r.init(&config(4, 2, 1000.0, 60.0)).unwrap();
    r.engine.start().unwrap();
    for _ in 0..10 {
        r.tick(16.0);
    }
    assert_eq!(r.engine.state().status, AnimationStatus::Error);
    assert_eq!(r.engine.state().current_frame, 3);
    let errors = errors.borrow();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Render);
    assert!(errors[0].message.contains("stub failure"));
    assert!(r.queue.is_idle());
    assert!(r.engine.stop().is_err());
    assert!(r.engine.start().is_err());

    r.engine.destroy();
    assert_eq!(r.engine.state().status, AnimationStatus::Idle);
}

#[test]
fn panicking_render_is_contained() {
    let mut r = rig(Stub {
        panic_at: Some(2),
        ..Stub::default()
    });
    r.init(&config(4, 2, 1000.0, 60.0)).unwrap();
    r.engine.start().unwrap();
    for _ in 0..5 {
        r.tick(16.0);
    }
    assert_eq!(r.engine.state().status, AnimationStatus::Error);
    let err = r.engine.last_error().unwrap();
    assert!(err.message.contains("stub panic"));
}

#[test]
fn stop_rewinds_and_start_replays() {
    let mut r = rig(Stub::default());
    r.init(&config(4, 2, 100.0, 60.0)).unwrap();
    r.engine.start().unwrap();
    r.tick(30.0);
    r.engine.stop().unwrap();
    assert_eq!(r.engine.state().status, AnimationStatus::Idle);
    assert_eq!(r.engine.progress(), 0.0);
    assert_eq!(r.engine.model().unwrap().resets, 1);
    assert!(r.queue.is_idle());

    r.engine.start().unwrap();
    for _ in 0..10 {
        r.tick(30.0);
    }
    assert_eq!(r.engine.state().status, AnimationStatus::Completed);

    r.engine.start().unwrap();
    assert_eq!(r.engine.progress(), 0.0);
    assert_eq!(r.engine.model().unwrap().resets, 2);
    r.tick(30.0);
    assert!(r.engine.progress() > 0.0);
}

#[test]
fn slow_frames_register_drops() {
    let mut r = rig(Stub::default());
    r.init(&config(4, 2, 10_000.0, 60.0)).unwrap();
    r.engine.start().unwrap();
    for _ in 0..10 {
        r.tick(50.0);
    }
    let m = r.engine.performance_metrics();
    assert!(m.frame_drops > 0);
    assert!((r.engine.fps() - 20.0).abs() < 1e-9);
}

#[test]
fn slow_images_do_not_hold_up_initialize() {
    use crate::{assets::cache::ImageSource, render::recording::DrawCommand};

    let mut r = rig(Stub::default());
    let root = std::env::temp_dir();
    let key = ImageSource::resolve("slow-avatar.png", &root)
        .unwrap()
        .cache_key();
    let slot = r.engine.images.slot(&key);
    let (release, wait) = std::sync::mpsc::channel::<()>();
    let (entered_tx, entered) = std::sync::mpsc::channel::<()>();
    let holder = std::thread::spawn(move || {
        slot.get_or_init(|| {
            entered_tx.send(()).ok();
            wait.recv().ok();
            None
        });
    });
    entered.recv().unwrap();

    let mut cfg = config(3, 1, 1000.0, 60.0);
    cfg.participants[1] = cfg.participants[1].clone().with_image("slow-avatar.png");
    cfg.playback.style_options.asset_root = Some(root);
    cfg.playback.style_options.image_timeout_ms = 30;
    r.init(&cfg).unwrap();
    assert_eq!(r.engine.state().status, AnimationStatus::Idle);

    let surface = r.engine.surface.as_mut().unwrap();
    assert!(!surface.has_image("slow-avatar.png"));
    let before = r.canvas.log().len();
    surface.image_or_placeholder(
        Some("slow-avatar.png"),
        "Person 1",
        crate::foundation::core::Rect::new(0.0, 0.0, 40.0, 40.0),
        crate::foundation::core::Rgba8::BLACK,
    );
    let drawn = r.canvas.log().commands()[before..].to_vec();
    assert!(!drawn.is_empty());
    assert!(!drawn.iter().any(|c| matches!(c, DrawCommand::Image { .. })));

    release.send(()).unwrap();
    holder.join().unwrap();
}
