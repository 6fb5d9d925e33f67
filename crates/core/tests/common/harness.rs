use std::sync::Arc;

use moesi_core::config::SystemConfig;
use moesi_core::system::System;

/// Wraps a [`System`] with deterministic defaults for the test suite, the way
/// the hardware crate's own `TestContext` wraps a `Cpu`. `system` is an `Arc`
/// because `System::turn_on` requires one, for the one-shot step driver below.
pub struct TestSystem {
    pub system: Arc<System>,
}

impl TestSystem {
    /// Builds a system from the library's default configuration (2 processors,
    /// 16-word memory, 4-block caches).
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self::with_config(SystemConfig::default())
    }

    /// The canonical scenario configuration used by the end-to-end coherence
    /// scenarios: 2 processors, 4-word memory (2-bit addresses).
    pub fn scenario() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self::with_config(SystemConfig {
            n_processors: 2,
            memory_size: 4,
            cache_capacity: 4,
            associativity: 1,
            frequency_hz: 1.0,
        })
    }

    /// Builds a system from an arbitrary configuration.
    pub fn with_config(config: SystemConfig) -> Self {
        let system = System::new(config).expect("test configuration must be valid");
        Self {
            system: Arc::new(system),
        }
    }

    /// Advances every processor thread by one one-shot tick: `turn_on(false)`
    /// spawns a self-halting driver per processor, `turn_off` joins them
    /// before this returns, so the next call never races the last.
    pub fn step(&mut self) {
        self.system.turn_on(false);
        self.system.turn_off();
    }

    /// Advances by `count` one-shot ticks.
    pub fn step_many(&mut self, count: usize) {
        for _ in 0..count {
            self.step();
        }
    }

    /// Steps until every processor reports `IDLE`, or `budget` ticks have
    /// elapsed (whichever comes first). Returns whether the system went idle.
    pub fn run_to_idle(&mut self, budget: usize) -> bool {
        for _ in 0..budget {
            if (0..self.system.processor_count())
                .all(|i| self.system.processor_snapshot(i).unwrap().state == "IDLE")
            {
                return true;
            }
            self.step();
        }
        (0..self.system.processor_count())
            .all(|i| self.system.processor_snapshot(i).unwrap().state == "IDLE")
    }
}

impl Default for TestSystem {
    fn default() -> Self {
        Self::new()
    }
}
