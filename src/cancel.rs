// Mon Oct 19 2026 - Alex

//! One-shot cancellation shared between the pipeline driver and the sequencer.
//!
//! A [`CancelSource`] owns the trigger, a [`CancelToken`] observes it. The
//! trigger is the only `Sender` of a rendezvous channel that never carries a
//! message, so cancelling is just dropping that sender: every token sees the
//! channel disconnect, which makes the token usable inside `select!`.

use crossbeam_channel::{at, bounded, never, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

pub struct CancelSource {
    trigger: Mutex<Option<Sender<()>>>,
    token: CancelToken,
}

impl CancelSource {
    pub fn new() -> Self {
        Self::with_deadline(None)
    }

    /// Cancels on its own once `timeout` has elapsed from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now().checked_add(timeout))
    }

    fn with_deadline(deadline: Option<Instant>) -> Self {
        let (trigger, signal) = bounded(0);

        Self {
            trigger: Mutex::new(Some(trigger)),
            token: CancelToken { signal, deadline },
        }
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Idempotent.
    pub fn cancel(&self) {
        if self.trigger.lock().take().is_some() {
            log::debug!("Cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    signal: Receiver<()>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token nothing can cancel.
    pub fn never() -> Self {
        Self {
            signal: never(),
            deadline: None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        matches!(self.signal.try_recv(), Err(TryRecvError::Disconnected))
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Becomes ready (disconnected) on explicit cancellation.
    pub(crate) fn signal(&self) -> &Receiver<()> {
        &self.signal
    }

    /// Fires once at the deadline. Build one per select loop: the single
    /// message is consumed by whoever receives it.
    pub(crate) fn deadline_timer(&self) -> Receiver<Instant> {
        match self.deadline {
            Some(deadline) => at(deadline),
            None => never(),
        }
    }
}
