use crate::config::PlaybackConfig;

/// Lifecycle status of one engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Error,
}

impl AnimationStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for AnimationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutable playback state exclusively owned by one engine.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationState {
    pub status: AnimationStatus,
    /// Linear progress in `[0,1]`, never decreasing between `start` and `stop`.
    pub progress: f64,
    pub current_frame: u64,
    pub total_frames: u64,
    pub elapsed_ms: f64,
    pub remaining_ms: f64,
    pub duration_ms: f64,
}

impl AnimationState {
    /// Fresh idle state for `playback`.
    pub fn for_playback(playback: &PlaybackConfig) -> Self {
        Self {
            status: AnimationStatus::Idle,
            progress: 0.0,
            current_frame: 0,
            total_frames: playback.total_frames(),
            elapsed_ms: 0.0,
            remaining_ms: playback.duration_ms,
            duration_ms: playback.duration_ms,
        }
    }

    /// Back to the start, keeping the derived totals.
    pub fn rewind(&mut self) {
        self.progress = 0.0;
        self.current_frame = 0;
        self.elapsed_ms = 0.0;
        self.remaining_ms = self.duration_ms;
    }

    /// Add `delta_ms` of playback and recompute `progress = min(elapsed / duration, 1)`.
    pub fn advance(&mut self, delta_ms: f64) {
        self.elapsed_ms += delta_ms.max(0.0);
        self.progress = if self.duration_ms > 0.0 {
            (self.elapsed_ms / self.duration_ms).min(1.0)
        } else {
            1.0
        };
        self.remaining_ms = (self.duration_ms - self.elapsed_ms).max(0.0);
        self.current_frame += 1;
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }
}
