use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, PoisonError},
};

/// Handle of one requested frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameToken(pub u64);

/// Host "call me on the next frame" primitive.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameToken;

    /// Cancel a pending request. Unknown or already delivered tokens are ignored.
    fn cancel_frame(&mut self, token: FrameToken);
}

#[derive(Debug, Default)]
struct QueueInner {
    next: u64,
    pending: BTreeSet<FrameToken>,
}

/// In-process [`FrameScheduler`]: requests queue up until the host drains them with
/// [`take_due`](Self::take_due) and hands each token back to the engine.
///
/// Clones share the same queue.
#[derive(Clone, Debug, Default)]
pub struct FrameQueue {
    inner: Arc<Mutex<QueueInner>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every pending token, oldest first.
    pub fn take_due(&self) -> Vec<FrameToken> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut inner.pending).into_iter().collect()
    }

    pub fn pending_len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending_len() == 0
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameToken {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.next += 1;
        let token = FrameToken(inner.next);
        inner.pending.insert(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .remove(&token);
    }
}
