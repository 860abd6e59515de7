use std::{collections::BTreeMap, io::Read, path::PathBuf};

use crate::{
    animation::ease::Ease,
    foundation::{
        core::Rgba8,
        error::{RaffleError, RaffleResult},
    },
};

/// One raffle entrant.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            image_ref: None,
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

/// Immutable input of one raffle animation.
///
/// `winner` is a participant id. `style` stays a string so that unknown styles are reported by
/// validation rather than by the JSON parser.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationEngineConfig {
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub winner: Option<String>,
    pub style: String,
    pub playback: PlaybackConfig,
}

impl AnimationEngineConfig {
    pub fn new(
        participants: Vec<Participant>,
        winner: impl Into<String>,
        style: AnimationStyle,
        playback: PlaybackConfig,
    ) -> Self {
        Self {
            participants,
            winner: Some(winner.into()),
            style: style.id().to_string(),
            playback,
        }
    }

    pub fn from_json_str(json: &str) -> RaffleResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_reader(reader: impl Read) -> RaffleResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json_string(&self) -> RaffleResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The winning participant, if `winner` names one.
    pub fn winner_participant(&self) -> Option<&Participant> {
        let id = self.winner.as_deref()?;
        self.participants.iter().find(|p| p.id == id)
    }

    /// Position of the winner in `participants`.
    pub fn winner_index(&self) -> Option<usize> {
        let id = self.winner.as_deref()?;
        self.participants.iter().position(|p| p.id == id)
    }

    /// Distinct image references, in participant order.
    pub fn image_refs(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in self.participants.iter().filter_map(|p| p.image_ref.as_deref()) {
            if !r.trim().is_empty() && !out.contains(&r) {
                out.push(r);
            }
        }
        out
    }
}

/// Timing and per-style knobs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackConfig {
    pub duration_ms: f64,
    #[serde(rename = "targetFPS", default = "default_target_fps")]
    pub target_fps: f64,
    /// Global time warp applied to linear progress before phase lookup.
    #[serde(default)]
    pub easing: Ease,
    #[serde(default)]
    pub style_options: StyleOptions,
}

fn default_target_fps() -> f64 {
    60.0
}

impl PlaybackConfig {
    pub fn new(duration_ms: f64, target_fps: f64) -> Self {
        Self {
            duration_ms,
            target_fps,
            easing: Ease::Linear,
            style_options: StyleOptions::default(),
        }
    }

    /// Target inter-frame interval in milliseconds.
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.target_fps
    }

    /// `ceil(duration × fps)`, at least one frame.
    pub fn total_frames(&self) -> u64 {
        let frames = (self.duration_ms / 1000.0 * self.target_fps).ceil();
        if frames.is_finite() && frames >= 1.0 {
            frames as u64
        } else {
            1
        }
    }
}

/// Style-specific knobs. Every field has a default; strategies ignore knobs they do not use.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOptions {
    /// Particles per burst.
    pub particle_count: usize,
    /// Concurrent particle cap; strategies pick their own when unset.
    pub particle_cap: Option<usize>,
    /// Scroll speed multiplier (case opening strip length, slot strip length).
    pub scroll_speed: f64,
    /// Rarity name (`common`, `uncommon`, `rare`, `epic`, `legendary`) to color overrides.
    pub rarity_colors: BTreeMap<String, Rgba8>,
    /// RNG seed; random when unset.
    pub seed: Option<u64>,
    /// Number of display items, when the style lets it vary.
    pub item_count: Option<usize>,
    /// Full wheel turns before settling.
    pub spins: Option<u32>,
    /// Slot machine reels.
    pub reel_count: Option<usize>,
    /// Upper bound on the image preload wait.
    pub image_timeout_ms: u64,
    /// Directory relative image references resolve against (current directory when unset).
    pub asset_root: Option<PathBuf>,
    pub background: Option<Rgba8>,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            particle_count: 80,
            particle_cap: None,
            scroll_speed: 1.0,
            rarity_colors: BTreeMap::new(),
            seed: None,
            item_count: None,
            spins: None,
            reel_count: None,
            image_timeout_ms: 2000,
            asset_root: None,
            background: None,
        }
    }
}

impl StyleOptions {
    /// Effective particle cap: the configured one, otherwise `fallback`, clamped to `[1, 5000]`.
    pub fn particle_cap_or(&self, fallback: usize) -> usize {
        self.particle_cap.unwrap_or(fallback).clamp(1, 5000)
    }

    pub fn background_or(&self, fallback: Rgba8) -> Rgba8 {
        self.background.unwrap_or(fallback)
    }
}

/// Every built-in visual style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationStyle {
    CaseOpening,
    Wheel,
    CardFlip,
    SlotMachine,
    ParticleExplosion,
    ZoomFade,
}

/// Ids accepted in `AnimationEngineConfig::style`.
pub const SUPPORTED_STYLES: [&str; 6] = [
    "case-opening",
    "wheel",
    "card-flip",
    "slot-machine",
    "particle-explosion",
    "zoom-fade",
];

impl AnimationStyle {
    pub const ALL: [Self; 6] = [
        Self::CaseOpening,
        Self::Wheel,
        Self::CardFlip,
        Self::SlotMachine,
        Self::ParticleExplosion,
        Self::ZoomFade,
    ];

    /// Kebab-case id.
    pub fn id(self) -> &'static str {
        match self {
            Self::CaseOpening => SUPPORTED_STYLES[0],
            Self::Wheel => SUPPORTED_STYLES[1],
            Self::CardFlip => SUPPORTED_STYLES[2],
            Self::SlotMachine => SUPPORTED_STYLES[3],
            Self::ParticleExplosion => SUPPORTED_STYLES[4],
            Self::ZoomFade => SUPPORTED_STYLES[5],
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL.into_iter().find(|s| s.id().eq_ignore_ascii_case(id))
    }
}

impl std::str::FromStr for AnimationStyle {
    type Err = RaffleError;

    fn from_str(s: &str) -> RaffleResult<Self> {
        Self::from_id(s).ok_or_else(|| RaffleError::config(format!("unsupported style '{s}'")))
    }
}

impl std::fmt::Display for AnimationStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

pub fn supported_styles() -> &'static [&'static str] {
    &SUPPORTED_STYLES
}

pub fn is_style_supported(style: &str) -> bool {
    AnimationStyle::from_id(style).is_some()
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
