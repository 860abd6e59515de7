use super::*;

const SAMPLE: &str = r##"{
  "participants": [
    {"id": "p1", "displayName": "Ada Lovelace", "imageRef": "avatars/ada.png"},
    {"id": "p2", "displayName": "Alan Turing"},
    {"id": "p3", "displayName": "Grace Hopper", "imageRef": "avatars/ada.png"}
  ],
  "winner": "p2",
  "style": "wheel",
  "playback": {
    "durationMs": 4000,
    "targetFPS": 30,
    "easing": "inOutCubic",
    "styleOptions": {"particleCount": 12, "seed": 7, "rarityColors": {"rare": "#3366ff"}}
  }
}"##;

#[test]
fn parses_camel_case_schema() {
    let cfg = AnimationEngineConfig::from_json_str(SAMPLE).unwrap();
    assert_eq!(cfg.participants.len(), 3);
    assert_eq!(cfg.participants[0].display_name, "Ada Lovelace");
    assert_eq!(cfg.participants[1].image_ref, None);
    assert_eq!(cfg.winner.as_deref(), Some("p2"));
    assert_eq!(cfg.winner_index(), Some(1));
    assert_eq!(cfg.playback.duration_ms, 4000.0);
    assert_eq!(cfg.playback.target_fps, 30.0);
    assert_eq!(cfg.playback.easing, Ease::InOutCubic);
    let opts = &cfg.playback.style_options;
    assert_eq!(opts.particle_count, 12);
    assert_eq!(opts.seed, Some(7));
    assert_eq!(opts.scroll_speed, 1.0);
    assert_eq!(opts.image_timeout_ms, 2000);
    assert_eq!(opts.rarity_colors["rare"], Rgba8::rgb(0x33, 0x66, 0xff));
}

#[test]
fn defaults_fill_optional_playback_fields() {
    let cfg = AnimationEngineConfig::from_json_str(
        r#"{"participants": [], "style": "zoom-fade", "playback": {"durationMs": 1000}}"#,
    )
    .unwrap();
    assert_eq!(cfg.winner, None);
    assert_eq!(cfg.playback.target_fps, 60.0);
    assert_eq!(cfg.playback.easing, Ease::Linear);
    assert_eq!(cfg.playback.style_options, StyleOptions::default());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = AnimationEngineConfig::from_json_str("{ nope").unwrap_err();
    assert!(err.to_string().starts_with("serialization error: "));
}

#[test]
fn json_round_trip_keeps_schema_names() {
    let cfg = AnimationEngineConfig::from_json_str(SAMPLE).unwrap();
    let json = cfg.to_json_string().unwrap();
    assert!(json.contains("\"targetFPS\""));
    assert!(json.contains("\"displayName\""));
    assert_eq!(AnimationEngineConfig::from_json_str(&json).unwrap(), cfg);
}

#[test]
fn image_refs_are_distinct() {
    let cfg = AnimationEngineConfig::from_json_str(SAMPLE).unwrap();
    assert_eq!(cfg.image_refs(), vec!["avatars/ada.png"]);
}

#[test]
fn total_frames_rounds_up() {
    assert_eq!(PlaybackConfig::new(3000.0, 60.0).total_frames(), 180);
    assert_eq!(PlaybackConfig::new(1010.0, 60.0).total_frames(), 61);
    assert_eq!(PlaybackConfig::new(1.0, 60.0).total_frames(), 1);
}

#[test]
fn style_ids() {
    for style in AnimationStyle::ALL {
        assert_eq!(AnimationStyle::from_id(style.id()), Some(style));
        assert_eq!(style.to_string(), style.id());
    }
    assert!(is_style_supported("Slot-Machine"));
    assert!(!is_style_supported("fireworks"));
    assert_eq!(supported_styles().len(), 6);
    let err = "fireworks".parse::<AnimationStyle>().unwrap_err();
    assert!(err.to_string().contains("unsupported style"));
}
