use super::*;
use crate::{
    config::{Participant, PlaybackConfig},
    engine::{scheduler::FrameQueue, state::AnimationStatus},
    foundation::{clock::ManualClock, error::ErrorKind},
    render::recording::RecordingCanvas,
};

fn valid() -> AnimationEngineConfig {
    let participants = (0..5)
        .map(|i| Participant::new(format!("p{i}"), format!("Person {i}")))
        .collect();
    AnimationEngineConfig::new(
        participants,
        "p2",
        AnimationStyle::CardFlip,
        PlaybackConfig::new(2000.0, 60.0),
    )
}

fn message(cfg: &AnimationEngineConfig) -> String {
    let err = validate_config(cfg).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    err.to_string()
}

#[test]
fn accepts_a_valid_config() {
    validate_config(&valid()).unwrap();
}

#[test]
fn rejections_name_the_first_problem() {
    let mut cfg = valid();
    cfg.participants.clear();
    cfg.playback.duration_ms = -1.0;
    assert!(message(&cfg).contains("participants must not be empty"));

    let mut cfg = valid();
    cfg.winner = None;
    assert!(message(&cfg).contains("winner is required"));
    cfg.winner = Some(String::new());
    assert!(message(&cfg).contains("winner is required"));

    let mut cfg = valid();
    cfg.participants.push(Participant::new("p1", "Again"));
    assert!(message(&cfg).contains("duplicate participant id 'p1'"));

    let mut cfg = valid();
    cfg.winner = Some("ghost".into());
    assert!(message(&cfg).contains("winner not found in participants"));

    let mut cfg = valid();
    cfg.playback.duration_ms = -1000.0;
    assert!(message(&cfg).contains("duration must be positive"));
    cfg.playback.duration_ms = f64::NAN;
    assert!(message(&cfg).contains("duration must be positive"));

    let mut cfg = valid();
    cfg.playback.target_fps = 0.0;
    assert!(message(&cfg).contains("target fps must be positive"));

    let mut cfg = valid();
    cfg.style = "fireworks".into();
    assert!(message(&cfg).contains("unsupported style 'fireworks'"));
}

#[test]
fn creates_one_engine_per_style() {
    let factory = EngineFactory::new(Arc::new(ManualClock::new()), Arc::new(ImageCache::new()));
    for id in factory.supported_styles() {
        let engine = factory
            .create_engine(id, Box::new(FrameQueue::new()))
            .unwrap();
        assert_eq!(engine.style().id(), *id);
        assert_eq!(engine.state().status, AnimationStatus::Idle);
    }
    let upper = factory
        .create_engine("SLOT-MACHINE", Box::new(FrameQueue::new()))
        .unwrap();
    assert_eq!(upper.style(), AnimationStyle::SlotMachine);
}

#[test]
fn unknown_styles_are_rejected() {
    let factory = EngineFactory::default();
    assert!(!factory.is_style_supported("fireworks"));
    assert!(factory.is_style_supported("Zoom-Fade"));
    let err = factory
        .create_engine("fireworks", Box::new(FrameQueue::new()))
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "configuration error: unsupported style 'fireworks'");
}

#[test]
fn engine_for_config_initializes() {
    let factory = EngineFactory::new(Arc::new(ManualClock::new()), Arc::new(ImageCache::new()));
    let cfg = valid();
    let mut engine = factory
        .create_engine_for(&cfg, Box::new(FrameQueue::new()))
        .unwrap();
    let mut canvas = RecordingCanvas::new(320, 240);
    engine.initialize(&mut canvas, &cfg).unwrap();
    assert_eq!(engine.style(), AnimationStyle::CardFlip);
    assert_eq!(engine.state().total_frames, 120);
}
