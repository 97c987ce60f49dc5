// Mon Oct 19 2026 - Alex

//! Fan-out. Every relay reads the same input receiver, so each value goes to
//! whichever relay is ready first; nothing is broadcast or round-robined.

use crate::stages::relay::{Relay, RelayReport};
use crate::Item;
use crossbeam_channel::{bounded, Receiver};
use std::io;
use std::thread::JoinHandle;
use std::time::Duration;

pub struct RelayPool {
    /// One dedicated output per relay, indexed by relay id.
    pub outputs: Vec<Receiver<Item>>,
    pub handles: Vec<JoinHandle<RelayReport>>,
}

impl RelayPool {
    pub fn size(&self) -> usize {
        self.handles.len()
    }
}

pub struct Distributor;

impl Distributor {
    /// Starts `workers` relays over `input`. `capacity` sizes each relay's
    /// output channel.
    pub fn spawn(
        input: Receiver<Item>,
        workers: usize,
        delay: Duration,
        capacity: usize,
    ) -> io::Result<RelayPool> {
        let mut outputs = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for id in 0..workers {
            let (tx, rx) = bounded(capacity);
            handles.push(Relay::new(id, delay).spawn(input.clone(), tx)?);
            outputs.push(rx);
        }

        log::debug!("Distributor started {} relays", workers);

        Ok(RelayPool { outputs, handles })
    }
}
