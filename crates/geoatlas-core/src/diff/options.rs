use geoatlas_core_types::RequestContext;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::DiffConfig;

/// Cooperative cancellation handle for long diffs.
///
/// Clones share one flag: trigger it from any thread and the diff holding
/// another clone stops at its next check.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Knobs for [`compute_diff_with`](super::engine::compute_diff_with)
#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub interrupt: Option<Interrupt>,
    /// Identifiers processed between interrupt checks; 0 is treated as 1
    pub check_interval: u64,
    /// Correlation ids attached to the diff's log events
    pub context: RequestContext,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            interrupt: None,
            check_interval: 1,
            context: RequestContext::new(),
        }
    }
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DiffConfig) -> Self {
        Self {
            check_interval: config.interrupt_check_interval,
            ..Self::default()
        }
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn with_check_interval(mut self, interval: u64) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// True when an interrupt is due after `processed` identifiers
    pub(crate) fn should_stop(&self, processed: u64) -> bool {
        let interval = self.check_interval.max(1);
        processed % interval == 0
            && self
                .interrupt
                .as_ref()
                .is_some_and(Interrupt::is_triggered)
    }
}
