use std::collections::VecDeque;

/// Frames in the rolling FPS window.
pub const FPS_WINDOW: usize = 60;

/// A frame counts as dropped when its delta exceeds this multiple of the target interval.
pub const FRAME_DROP_FACTOR: f64 = 1.5;

/// Rolling telemetry snapshot.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    #[serde(rename = "currentFPS")]
    pub current_fps: f64,
    #[serde(rename = "averageFPS")]
    pub average_fps: f64,
    #[serde(rename = "minFPS")]
    pub min_fps: f64,
    #[serde(rename = "maxFPS")]
    pub max_fps: f64,
    pub frame_drops: u64,
    /// Best-effort: strategy model footprint plus retained image bytes.
    pub memory_usage_bytes: usize,
    /// Wall-clock cost of the last strategy render.
    pub render_time_ms: f64,
    /// Clock reading of the last frame.
    pub last_update_ms: f64,
}

/// Maintains [`PerformanceMetrics`] from per-frame deltas.
#[derive(Clone, Debug)]
pub struct MetricsTracker {
    metrics: PerformanceMetrics,
    window: VecDeque<f64>,
    target_interval_ms: f64,
}

impl MetricsTracker {
    pub fn new(target_fps: f64) -> Self {
        let target_interval_ms = if target_fps > 0.0 {
            1000.0 / target_fps
        } else {
            f64::INFINITY
        };
        Self {
            metrics: PerformanceMetrics::default(),
            window: VecDeque::with_capacity(FPS_WINDOW),
            target_interval_ms,
        }
    }

    /// Account one frame that arrived `delta_ms` after the previous one.
    ///
    /// Non-positive deltas (first frame, or clock not advanced) are not counted as FPS samples.
    pub fn record_frame(&mut self, delta_ms: f64, now_ms: f64) {
        self.metrics.last_update_ms = now_ms;
        if !(delta_ms > 0.0) || !delta_ms.is_finite() {
            return;
        }
        if delta_ms > self.target_interval_ms * FRAME_DROP_FACTOR {
            self.metrics.frame_drops += 1;
            tracing::trace!(delta_ms, "frame drop");
        }

        let fps = 1000.0 / delta_ms;
        if self.window.len() == FPS_WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(fps);

        let m = &mut self.metrics;
        m.current_fps = fps;
        m.average_fps = self.window.iter().sum::<f64>() / self.window.len() as f64;
        m.min_fps = self.window.iter().copied().fold(f64::INFINITY, f64::min);
        m.max_fps = self.window.iter().copied().fold(0.0, f64::max);
    }

    pub fn record_render(&mut self, render_time_ms: f64, memory_usage_bytes: usize) {
        self.metrics.render_time_ms = render_time_ms;
        self.metrics.memory_usage_bytes = memory_usage_bytes;
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn reset(&mut self) {
        self.metrics = PerformanceMetrics::default();
        self.window.clear();
    }
}
