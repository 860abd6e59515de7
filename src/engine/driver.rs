use crate::{
    engine::{core::Engine, scheduler::FrameQueue, state::AnimationStatus},
    foundation::clock::{Clock, ManualClock},
};

/// Summary of a headless playback run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveReport {
    /// Frames the engine accepted.
    pub frames: u64,
    pub final_status: AnimationStatus,
    pub final_progress: f64,
    /// Simulated time at the end of the run.
    pub clock_ms: f64,
}

/// Drive `engine` without a display: advance `clock` by `step_ms`, deliver every due frame,
/// and repeat until nothing is scheduled or `max_frames` steps have run.
///
/// `on_frame` sees the engine after each delivered frame, e.g. to grab snapshots.
pub fn run_to_completion(
    engine: &mut dyn Engine,
    clock: &ManualClock,
    queue: &FrameQueue,
    step_ms: f64,
    max_frames: u64,
    mut on_frame: impl FnMut(&dyn Engine),
) -> DriveReport {
    let mut frames = 0;
    for _ in 0..max_frames {
        if queue.is_idle() {
            break;
        }
        clock.advance_ms(step_ms);
        for token in queue.take_due() {
            if engine.on_frame(token) {
                frames += 1;
                on_frame(&*engine);
            }
        }
    }
    DriveReport {
        frames,
        final_status: engine.state().status,
        final_progress: engine.progress(),
        clock_ms: clock.now_ms(),
    }
}
