//! Run statistics: per-processor instruction/hit/miss counters and the final
//! summary table printed when a run ends (§6, §12).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::processor::TickOutcome;

/// Counters accumulated for one processor over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessorCounts {
    /// `CALC` instructions issued.
    pub calc: u64,
    /// `READ` instructions that hit in the local cache.
    pub read_hits: u64,
    /// `READ` instructions serviced by the coherence engine.
    pub read_misses: u64,
    /// `WRITE` instructions serviced locally.
    pub write_hits: u64,
    /// `WRITE` instructions serviced by the coherence engine.
    pub write_misses: u64,
}

impl ProcessorCounts {
    /// Total instructions this processor has issued.
    pub fn total(&self) -> u64 {
        self.calc + self.read_hits + self.read_misses + self.write_hits + self.write_misses
    }

    fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Calc => self.calc += 1,
            TickOutcome::ReadHit => self.read_hits += 1,
            TickOutcome::ReadMiss => self.read_misses += 1,
            TickOutcome::WriteHit => self.write_hits += 1,
            TickOutcome::WriteMiss => self.write_misses += 1,
        }
    }
}

/// Accumulates [`ProcessorCounts`] across every processor in a run, plus the
/// run-wide counters that don't belong to any one processor: ticks elapsed,
/// bus transactions granted, and invalidations sent by the coherence engine.
/// Cheap to share: one `Mutex` guards the small per-processor map, and the
/// run-wide counters are lock-free atomics since every processor thread bumps
/// them on its own hot path.
#[derive(Default)]
pub struct Stats {
    counts: Mutex<BTreeMap<usize, ProcessorCounts>>,
    ticks: AtomicU64,
    bus_transactions: AtomicU64,
    invalidations: AtomicU64,
}

impl Stats {
    /// An empty counter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one tick's outcome for processor `display_id`.
    pub fn record(&self, display_id: usize, outcome: TickOutcome) {
        self.counts
            .lock()
            .expect("stats lock poisoned")
            .entry(display_id)
            .or_default()
            .record(outcome);
    }

    /// Counts one call to `Processor::tick`, regardless of whether it
    /// completed an instruction.
    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one bus transaction (a `try_acquire` that was granted).
    pub fn record_bus_transaction(&self) {
        self.bus_transactions.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts `count` invalidations sent by a single write miss/upgrade.
    pub fn record_invalidations(&self, count: u64) {
        if count > 0 {
            self.invalidations.fetch_add(count, Ordering::Relaxed);
        }
    }

    /// Total ticks observed across every processor this run.
    pub fn ticks_elapsed(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Total bus transactions granted this run.
    pub fn bus_transactions(&self) -> u64 {
        self.bus_transactions.load(Ordering::Relaxed)
    }

    /// Total invalidations sent to peer caches this run.
    pub fn invalidations(&self) -> u64 {
        self.invalidations.load(Ordering::Relaxed)
    }

    /// A frozen snapshot of every processor's counters, in display-id order.
    pub fn snapshot(&self) -> Vec<(usize, ProcessorCounts)> {
        self.counts
            .lock()
            .expect("stats lock poisoned")
            .iter()
            .map(|(&id, &counts)| (id, counts))
            .collect()
    }

    /// Discards every counter, including the run-wide ones (§7: system reset).
    pub fn reset(&self) {
        self.counts.lock().expect("stats lock poisoned").clear();
        self.ticks.store(0, Ordering::Relaxed);
        self.bus_transactions.store(0, Ordering::Relaxed);
        self.invalidations.store(0, Ordering::Relaxed);
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<10}{:>8}{:>10}{:>10}{:>10}{:>10}{:>10}",
            "proc", "calc", "rd_hit", "rd_miss", "wr_hit", "wr_miss", "total"
        )?;
        for (id, counts) in self.snapshot() {
            writeln!(
                f,
                "{:<10}{:>8}{:>10}{:>10}{:>10}{:>10}{:>10}",
                format!("P{id}"),
                counts.calc,
                counts.read_hits,
                counts.read_misses,
                counts.write_hits,
                counts.write_misses,
                counts.total(),
            )?;
        }
        writeln!(
            f,
            "ticks={} bus_transactions={} invalidations={}",
            self.ticks_elapsed(),
            self.bus_transactions(),
            self.invalidations(),
        )
    }
}
