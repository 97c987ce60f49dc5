// Mon Oct 19 2026 - Alex

use crate::Item;
use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;
use std::io;
use std::thread::{self, Builder, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelayReport {
    pub id: usize,
    pub forwarded: u64,
}

/// Copies values 1:1 from its input to its own output, pausing `delay` after
/// each one.
#[derive(Debug, Clone, Copy)]
pub struct Relay {
    id: usize,
    delay: Duration,
}

impl Relay {
    pub fn new(id: usize, delay: Duration) -> Self {
        Self { id, delay }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns once `input` is closed and drained. `output` is dropped on
    /// return, which closes it; `input` is only ever read.
    pub fn run(&self, input: Receiver<Item>, output: Sender<Item>) -> RelayReport {
        log::debug!("Relay {} started", self.id);

        let mut forwarded = 0u64;

        for value in input.iter() {
            if output.send(value).is_err() {
                log::warn!("Relay {} output has no receiver, dropping {}", self.id, value);
                break;
            }
            forwarded += 1;
            log::trace!("Relay {} forwarded {}", self.id, value);

            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }

        drop(output);
        log::debug!("Relay {} finished after {} items", self.id, forwarded);

        RelayReport {
            id: self.id,
            forwarded,
        }
    }

    pub fn spawn(self, input: Receiver<Item>, output: Sender<Item>) -> io::Result<JoinHandle<RelayReport>> {
        Builder::new()
            .name(format!("relay-{}", self.id))
            .spawn(move || self.run(input, output))
    }
}
