// Mon Oct 19 2026 - Alex

use crate::cancel::CancelToken;
use crate::Item;
use crossbeam_channel::{select, Sender};
use serde::Serialize;
use std::io;
use std::thread::{Builder, JoinHandle};

pub const FIRST_ITEM: Item = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SequencerReport {
    pub produced: u64,
    pub last_value: Option<Item>,
    pub cancelled: bool,
}

/// Notified as the sequencer shuts down, from the sequencer thread.
pub trait ShutdownHook {
    /// Production has stopped; the output is still open.
    fn stopped(&self, _report: &SequencerReport) {}

    /// The output has been closed.
    fn closed(&self) {}
}

impl ShutdownHook for () {}

/// Emits 1, 2, 3, ... until cancelled.
pub struct Sequencer;

impl Sequencer {
    /// Sends the sequence into `output` without closing it. `on_produced` sees
    /// each value only after its send has completed.
    ///
    /// Cancellation is checked before every send and then raced against the
    /// send itself; when both are ready either may win, so one extra value can
    /// slip through after the deadline.
    pub fn produce<F>(token: &CancelToken, output: &Sender<Item>, mut on_produced: F) -> SequencerReport
    where
        F: FnMut(Item),
    {
        let timer = token.deadline_timer();
        let mut report = SequencerReport::default();
        let mut current = FIRST_ITEM;

        loop {
            if token.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let sent = select! {
                recv(token.signal()) -> _ => {
                    report.cancelled = true;
                    false
                }
                recv(timer) -> _ => {
                    report.cancelled = true;
                    false
                }
                send(output, current) -> res => match res {
                    Ok(()) => true,
                    Err(_) => {
                        log::warn!("Sequencer output has no receivers left, stopping at {}", current);
                        false
                    }
                },
            };

            if !sent {
                break;
            }

            on_produced(current);
            report.produced += 1;
            report.last_value = Some(current);
            log::trace!("Produced {}", current);

            current = match current.checked_add(1) {
                Some(next) => next,
                None => {
                    log::warn!("Sequence exhausted at {}", current);
                    break;
                }
            };
        }

        if report.cancelled {
            log::info!("Sequencer cancelled after {} items", report.produced);
        }

        report
    }

    /// Like [`Sequencer::produce`], then closes `output` by dropping it.
    pub fn run<F, H>(token: &CancelToken, output: Sender<Item>, on_produced: F, hook: &H) -> SequencerReport
    where
        F: FnMut(Item),
        H: ShutdownHook,
    {
        let report = Self::produce(token, &output, on_produced);
        hook.stopped(&report);
        drop(output);
        hook.closed();
        report
    }

    pub fn spawn<F, H>(
        token: CancelToken,
        output: Sender<Item>,
        on_produced: F,
        hook: H,
    ) -> io::Result<JoinHandle<SequencerReport>>
    where
        F: FnMut(Item) + Send + 'static,
        H: ShutdownHook + Send + 'static,
    {
        Builder::new()
            .name("sequencer".to_string())
            .spawn(move || Self::run(&token, output, on_produced, &hook))
    }
}
