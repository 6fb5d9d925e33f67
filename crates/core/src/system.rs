//! The whole simulated machine: processors, caches, memory, and the bus that
//! ties them together, plus the thread-per-processor driver loop that free-runs
//! them at a configurable frequency (§4.1, §4.6, §7).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bus::Bus;
use crate::cache::Cache;
use crate::coherence::CoherenceEngine;
use crate::common::SimError;
use crate::config::{self, SystemConfig};
use crate::memory::Memory;
use crate::processor::Processor;
use crate::snapshot::{processor_snapshot, SystemSnapshot};
use crate::stats::Stats;

/// The simulated multiprocessor: owns every processor's cache, the shared
/// memory, the bus, and (while free-running) the OS threads that drive ticks.
pub struct System {
    config: SystemConfig,
    addr_width: u32,
    processors: Vec<Processor>,
    caches: Vec<Cache>,
    memory: Memory,
    bus: Bus,
    stats: Stats,
    frequency_hz: Mutex<f64>,
    running: Arc<AtomicBool>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl System {
    /// Builds a system from `config`, or fails if the configuration is invalid.
    pub fn new(config: SystemConfig) -> Result<Self, SimError> {
        let addr_width = config.validate()?;
        let processors = (0..config.n_processors).map(Processor::new).collect();
        let caches = (0..config.n_processors)
            .map(|_| Cache::new(config.cache_capacity, config.associativity, addr_width))
            .collect();

        Ok(Self {
            frequency_hz: Mutex::new(config.frequency_hz),
            memory: Memory::new(config.memory_size),
            bus: Bus::new(),
            stats: Stats::new(),
            processors,
            caches,
            addr_width,
            config,
            running: Arc::new(AtomicBool::new(false)),
            threads: Mutex::new(Vec::new()),
        })
    }

    /// The configuration this system was built from.
    pub fn config(&self) -> SystemConfig {
        self.config
    }

    /// The derived address bit width.
    pub fn addr_width(&self) -> u32 {
        self.addr_width
    }

    /// Number of processors in this system.
    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    /// `true` if processor threads are currently free-running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// The current free-run clock frequency in Hz.
    pub fn frequency_hz(&self) -> f64 {
        *self.frequency_hz.lock().expect("frequency lock poisoned")
    }

    /// This run's accumulated instruction statistics.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Changes the free-run clock frequency. Takes effect on the next tick of
    /// each processor thread; does not require stopping the system (§4.6).
    pub fn set_frequency(&self, hz: f64) -> Result<(), SimError> {
        if !(0.0 < hz && hz < config::defaults::MAX_FREQUENCY_HZ) {
            log::warn!("rejected frequency {hz} Hz, outside (0, {})", config::defaults::MAX_FREQUENCY_HZ);
            return Err(SimError::InvalidFrequency(hz));
        }
        *self.frequency_hz.lock().expect("frequency lock poisoned") = hz;
        Ok(())
    }

    /// Spawns one OS thread per processor, started in a randomized order
    /// (§4.6). `wait=true` free-runs each thread at the configured frequency
    /// until `turn_off` is called; `wait=false` drives each thread through
    /// exactly one tick and has it clear the running flag itself, halting
    /// every other driver at its next tick boundary. No-op if already running.
    pub fn turn_on(self: &Arc<Self>, wait: bool) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        log::info!("turning on ({} processors, wait={wait})", self.processors.len());

        let mut order: Vec<usize> = (0..self.processors.len()).collect();
        order.shuffle(&mut rand::thread_rng());

        let mut threads = self.threads.lock().expect("threads lock poisoned");
        for index in order {
            let system = Arc::clone(self);
            threads.push(thread::spawn(move || system.run_processor_loop(index, wait)));
        }
    }

    /// Signals every processor thread to stop and joins them. Always clears
    /// the running flag and drains any driver threads still recorded, even
    /// ones spawned by `turn_on(false)` that already halted themselves — so a
    /// one-shot run is always fully joined by the time this returns.
    pub fn turn_off(&self) {
        self.running.store(false, Ordering::Release);
        let mut threads = self.threads.lock().expect("threads lock poisoned");
        if threads.is_empty() {
            return;
        }
        log::info!("turning off");
        for handle in threads.drain(..) {
            let _ = handle.join();
        }
    }

    fn run_processor_loop(self: Arc<Self>, index: usize, wait: bool) {
        let mut rng = StdRng::from_entropy();
        while self.running.load(Ordering::Acquire) {
            self.tick_processor(index, &mut rng);
            if !wait {
                self.running.store(false, Ordering::Release);
                log::debug!(
                    "P{} ran its one-shot tick and cleared the running flag",
                    self.processors[index].display_id()
                );
                break;
            }
            if !self.running.load(Ordering::Acquire) {
                break;
            }
            let period = Duration::from_secs_f64(1.0 / self.frequency_hz());
            thread::sleep(period);
        }
    }

    fn tick_processor(&self, index: usize, rng: &mut impl Rng) {
        let engine = CoherenceEngine::new(&self.caches, &self.memory);
        let outcome = self.processors[index].tick(
            &self.caches[index],
            &engine,
            &self.bus,
            self.addr_width,
            rng,
            &self.stats,
        );
        if let Some(outcome) = outcome {
            self.stats.record(self.processors[index].display_id(), outcome);
        }
    }

    /// Stops any running threads and discards all cached/memory/statistics
    /// state, restoring the frequency to the system's original configuration (§7).
    pub fn reset(&self) {
        self.turn_off();
        for cache in &self.caches {
            cache.reset();
        }
        for processor in &self.processors {
            processor.reset();
        }
        self.memory.reset();
        self.stats.reset();
        *self.frequency_hz.lock().expect("frequency lock poisoned") = self.config.frequency_hz;
    }

    /// A consistent snapshot of the whole system for the observation surface (§6).
    pub fn snapshot(&self) -> SystemSnapshot {
        let processors = self
            .processors
            .iter()
            .zip(self.caches.iter())
            .map(|(processor, cache)| {
                processor_snapshot(
                    processor.display_id(),
                    processor.state_label(),
                    processor.current_instruction(),
                    processor.last_instruction(),
                    cache.snapshot(),
                    cache.associativity(),
                )
            })
            .collect();

        SystemSnapshot {
            processors,
            memory: self.memory.snapshot(),
            bus_free: self.bus.is_free(),
            frequency_hz: self.frequency_hz(),
        }
    }

    /// A snapshot of a single processor, for observers that only care about one
    /// of them. Fails with `ProcessorIndexOutOfRange` rather than panicking.
    pub fn processor_snapshot(
        &self,
        index: usize,
    ) -> Result<crate::snapshot::ProcessorSnapshot, SimError> {
        let processor = self
            .processors
            .get(index)
            .ok_or(SimError::ProcessorIndexOutOfRange {
                index,
                count: self.processors.len(),
            })?;
        let cache = &self.caches[index];
        Ok(processor_snapshot(
            processor.display_id(),
            processor.state_label(),
            processor.current_instruction(),
            processor.last_instruction(),
            cache.snapshot(),
            cache.associativity(),
        ))
    }
}

impl Drop for System {
    fn drop(&mut self) {
        self.turn_off();
    }
}
