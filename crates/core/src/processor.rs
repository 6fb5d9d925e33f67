//! A single processor: its identity, its execution state, and the tick-by-tick
//! logic that turns one generated instruction into cache/bus/memory effects
//! (§3, §4.3, §4.5).
//!
//! A processor does not own its cache directly — [`crate::system::System`] owns
//! the whole array of caches so that the [`CoherenceEngine`] can borrow all of
//! them, including the requester's own, as one slice. Each call to [`Processor::tick`]
//! advances the execution state machine by exactly one step, so that
//! [`ExecutionState::WaitingBus`]/[`ExecutionState::ReadingMemory`]/
//! [`ExecutionState::WritingMemory`] are each visible for a full tick to an
//! observer, the way real bus contention is (§8, scenario 6).

use std::fmt;
use std::sync::Mutex;

use rand::Rng;

use crate::bus::{Bus, BusTicket};
use crate::cache::Cache;
use crate::coherence::CoherenceEngine;
use crate::common::{Address, CacheLineState};
use crate::instruction::{Instruction, InstructionKind};
use crate::stats::Stats;

/// Where a processor is in servicing its current instruction (§4.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionState {
    /// No instruction in flight; the next tick generates one.
    Idle,
    /// An instruction was just generated; this tick dispatches it.
    Executing,
    /// A `READ` hit; the next tick completes it.
    ReadingCache,
    /// A `WRITE` hit already owned `Modified`/`Exclusive`; the next tick commits it.
    WritingCache,
    /// A miss (or a hit needing an upgrade) is waiting to probe the bus.
    Miss,
    /// The bus was busy on the last probe; retrying every tick.
    WaitingBus,
    /// The bus was acquired for a `READ`; this tick runs the coherence engine.
    ReadingMemory,
    /// The bus was acquired for a `WRITE`; this tick runs the coherence engine.
    WritingMemory,
}

impl ExecutionState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Executing => "EXECUTING",
            Self::ReadingCache => "READING_CACHE",
            Self::WritingCache => "WRITING_CACHE",
            Self::Miss => "MISS",
            Self::WaitingBus => "WAITING_BUS",
            Self::ReadingMemory => "READING_MEMORY",
            Self::WritingMemory => "WRITING_MEMORY",
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable per-tick state, behind one lock so a snapshot never observes a
/// torn mix of state/instruction/ticket.
struct Activity {
    state: ExecutionState,
    current: Option<Instruction>,
    previous: Option<Instruction>,
    ticket: Option<BusTicket>,
}

impl Default for Activity {
    fn default() -> Self {
        Self {
            state: ExecutionState::Idle,
            current: None,
            previous: None,
            ticket: None,
        }
    }
}

/// One processor sharing the bus with its peers. Tracks only its identity and
/// execution state; its cache lives in the owning `System`'s cache array,
/// indexed by [`Processor::index`].
pub struct Processor {
    index: usize,
    activity: Mutex<Activity>,
}

impl Processor {
    /// Builds processor `index` (0-based).
    pub fn new(index: usize) -> Self {
        Self {
            index,
            activity: Mutex::new(Activity::default()),
        }
    }

    /// This processor's position in the system's processor/cache arrays.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The 1-based identifier instructions and the observation surface use (§3).
    pub fn display_id(&self) -> usize {
        self.index + 1
    }

    /// The most recently *completed* instruction, or `None` if this processor
    /// has never completed one (§6: rendered as `NOP`).
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.activity.lock().expect("processor lock poisoned").previous
    }

    /// The instruction currently in flight, if any (§6: the "current instruction").
    pub fn current_instruction(&self) -> Option<Instruction> {
        self.activity.lock().expect("processor lock poisoned").current
    }

    /// This processor's execution state, with the address suffixed for `MISS`
    /// (§6: `processor_state(i)` renders e.g. `"MISS 0010"`).
    pub fn state_label(&self) -> String {
        let activity = self.activity.lock().expect("processor lock poisoned");
        let address = activity.current.and_then(|instruction| instruction.address);
        match (activity.state, address) {
            (ExecutionState::Miss, Some(address)) => format!("{} {address}", ExecutionState::Miss),
            (state, _) => state.to_string(),
        }
    }

    /// Clears all in-flight/last-completed state (§7: system reset).
    pub fn reset(&self) {
        *self.activity.lock().expect("processor lock poisoned") = Activity::default();
    }

    /// Advances this processor's execution state machine by exactly one step.
    /// Returns the outcome of an instruction only on the tick it completes;
    /// every other tick returns `None`. Every call counts toward `stats`'
    /// run-wide tick counter, regardless of outcome.
    pub fn tick(
        &self,
        cache: &Cache,
        engine: &CoherenceEngine<'_>,
        bus: &Bus,
        addr_width: u32,
        rng: &mut impl Rng,
        stats: &Stats,
    ) -> Option<TickOutcome> {
        stats.record_tick();
        let mut activity = self.activity.lock().expect("processor lock poisoned");
        let previous_state = activity.state;
        let outcome = match activity.state {
            ExecutionState::Idle => {
                activity.current = Some(Instruction::generate(self.display_id(), addr_width, rng));
                activity.state = ExecutionState::Executing;
                None
            }
            ExecutionState::Executing => self.dispatch(&mut activity, cache),
            ExecutionState::ReadingCache => {
                activity.previous = activity.current.take();
                activity.state = ExecutionState::Idle;
                Some(TickOutcome::ReadHit)
            }
            ExecutionState::WritingCache => {
                let instruction = activity
                    .current
                    .expect("WRITING_CACHE always has a current instruction");
                let address = instruction.address.expect("WRITE always carries an address");
                let data = instruction.data.expect("WRITE always carries data");
                cache.write_local(address, data, CacheLineState::Modified);
                activity.previous = activity.current.take();
                activity.state = ExecutionState::Idle;
                Some(TickOutcome::WriteHit)
            }
            ExecutionState::Miss | ExecutionState::WaitingBus => {
                match bus.try_acquire(self.index) {
                    None => {
                        activity.state = ExecutionState::WaitingBus;
                        None
                    }
                    Some(ticket) => {
                        stats.record_bus_transaction();
                        log::info!("P{} acquired the bus", self.display_id());
                        let instruction = activity
                            .current
                            .expect("MISS/WAITING_BUS always has a current instruction");
                        activity.ticket = Some(ticket);
                        activity.state = match instruction.kind {
                            InstructionKind::Read => ExecutionState::ReadingMemory,
                            InstructionKind::Write => ExecutionState::WritingMemory,
                            InstructionKind::Calc => {
                                unreachable!("CALC never reaches MISS/WAITING_BUS")
                            }
                        };
                        None
                    }
                }
            }
            ExecutionState::ReadingMemory => {
                let instruction = activity
                    .current
                    .expect("READING_MEMORY always has a current instruction");
                let address = instruction.address.expect("READ always carries an address");
                let ticket = activity
                    .ticket
                    .take()
                    .expect("READING_MEMORY always holds the bus");
                engine.read_miss(self.index, address, rng);
                drop(ticket);
                log::info!("P{} released the bus", self.display_id());
                activity.previous = activity.current.take();
                activity.state = ExecutionState::Idle;
                Some(TickOutcome::ReadMiss)
            }
            ExecutionState::WritingMemory => {
                let instruction = activity
                    .current
                    .expect("WRITING_MEMORY always has a current instruction");
                let address = instruction.address.expect("WRITE always carries an address");
                let data = instruction.data.expect("WRITE always carries data");
                let ticket = activity
                    .ticket
                    .take()
                    .expect("WRITING_MEMORY always holds the bus");
                let outcome = if cache.lookup(address).is_some() {
                    let invalidated = engine.write_upgrade(self.index, address, data);
                    stats.record_invalidations(invalidated as u64);
                    cache.write_local(address, data, CacheLineState::Modified);
                    TickOutcome::WriteHit
                } else {
                    let invalidated = engine.write_miss(self.index, address, data, rng);
                    stats.record_invalidations(invalidated as u64);
                    TickOutcome::WriteMiss
                };
                drop(ticket);
                log::info!("P{} released the bus", self.display_id());
                activity.previous = activity.current.take();
                activity.state = ExecutionState::Idle;
                Some(outcome)
            }
        };
        if activity.state != previous_state {
            log::debug!(
                "P{} {:?} -> {:?}",
                self.display_id(),
                previous_state,
                activity.state
            );
        }
        outcome
    }

    /// Routes a freshly generated instruction out of `EXECUTING`: `CALC`
    /// completes immediately; `READ`/`WRITE` move to the cache-hit path or to
    /// `MISS` depending on what's already in `cache`.
    fn dispatch(&self, activity: &mut Activity, cache: &Cache) -> Option<TickOutcome> {
        let instruction = activity
            .current
            .expect("EXECUTING always has a current instruction");
        match instruction.kind {
            InstructionKind::Calc => {
                activity.previous = activity.current.take();
                activity.state = ExecutionState::Idle;
                Some(TickOutcome::Calc)
            }
            InstructionKind::Read => {
                let address = instruction.address.expect("READ always carries an address");
                activity.state = if cache.lookup(address).is_some() {
                    ExecutionState::ReadingCache
                } else {
                    ExecutionState::Miss
                };
                None
            }
            InstructionKind::Write => {
                let address = instruction.address.expect("WRITE always carries an address");
                let local = cache.lookup(address);
                activity.state = match local {
                    Some(view)
                        if matches!(view.state, CacheLineState::Modified | CacheLineState::Exclusive) =>
                    {
                        ExecutionState::WritingCache
                    }
                    _ => ExecutionState::Miss,
                };
                None
            }
        }
    }
}

/// What a single completed instruction actually did, for [`crate::stats::Stats`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A `CALC` instruction; no memory effect.
    Calc,
    /// A `READ` that hit in the local cache.
    ReadHit,
    /// A `READ` serviced by the coherence engine.
    ReadMiss,
    /// A `WRITE` serviced locally, or via a bus upgrade of an owned line.
    WriteHit,
    /// A `WRITE` serviced by the coherence engine as a full miss.
    WriteMiss,
}
