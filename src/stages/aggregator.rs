// Mon Oct 19 2026 - Alex

//! Fan-in. One collector per relay output forwards into a shared merged
//! channel and counts what it forwarded. The merge closer owns the first
//! merged sender and drops it only after every collector has been joined, so
//! the merged channel cannot close while a collector still holds items.

use crate::error::PipelineResult;
use crate::stages::join_stage;
use crate::Item;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io;
use std::thread::{Builder, JoinHandle};

pub struct MergeHandle {
    closer: JoinHandle<PipelineResult<Vec<u64>>>,
}

impl MergeHandle {
    /// Per-relay amounts, indexed like the sources passed to
    /// [`Aggregator::spawn`]. Blocks until the merged channel has closed.
    pub fn join(self) -> PipelineResult<Vec<u64>> {
        join_stage(self.closer)?
    }
}

pub struct Aggregator;

impl Aggregator {
    pub fn spawn(sources: Vec<Receiver<Item>>, capacity: usize) -> io::Result<(Receiver<Item>, MergeHandle)> {
        let (merged_tx, merged_rx) = bounded(capacity);
        let mut collectors = Vec::with_capacity(sources.len());

        for (id, source) in sources.into_iter().enumerate() {
            let merged = merged_tx.clone();
            let handle = Builder::new()
                .name(format!("collector-{}", id))
                .spawn(move || collect(id, source, merged))?;
            collectors.push(handle);
        }

        let closer = Builder::new()
            .name("merge-closer".to_string())
            .spawn(move || close_after_join(collectors, merged_tx))?;

        Ok((merged_rx, MergeHandle { closer }))
    }
}

fn collect(id: usize, source: Receiver<Item>, merged: Sender<Item>) -> u64 {
    let mut amount = 0u64;

    for value in source.iter() {
        if merged.send(value).is_err() {
            log::warn!("Collector {} lost the merged reader, dropping {}", id, value);
            break;
        }
        amount += 1;
    }

    log::debug!("Collector {} drained its relay: {} items", id, amount);
    amount
}

fn close_after_join(collectors: Vec<JoinHandle<u64>>, merged: Sender<Item>) -> PipelineResult<Vec<u64>> {
    let mut amounts = Vec::with_capacity(collectors.len());
    let mut failure = None;

    for handle in collectors {
        match join_stage(handle) {
            Ok(amount) => amounts.push(amount),
            Err(e) => {
                failure.get_or_insert(e);
            }
        }
    }

    drop(merged);
    log::debug!("Merged channel closed after {} collectors", amounts.len());

    match failure {
        Some(e) => Err(e),
        None => Ok(amounts),
    }
}
