//! CPU starvation fault.
//!
//! `start` occupies the calling thread with floating-point work until the
//! requested duration elapses or `stop` raises the run's cancellation flag.
//! The flag is only checked between batches.

use std::hint::black_box;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::CpuFaultConfig;
use crate::fault::{Fault, FaultName, FaultParams, FaultResult};

/// Iterations of transcendental math between elapsed/cancel checks.
const BATCH_ITERATIONS: u32 = 20_000;

/// State of the current burn, if any.
#[derive(Debug, Default)]
struct CpuState {
    /// Cancellation flag of the running burn.
    run: Option<Arc<AtomicBool>>,
}

/// Burns CPU on the calling thread.
#[derive(Debug)]
pub struct CpuBurnFault {
    state: Mutex<CpuState>,
    default_duration_ms: u64,
}

impl CpuBurnFault {
    pub fn new(config: &CpuFaultConfig) -> Self {
        Self {
            state: Mutex::new(CpuState::default()),
            default_duration_ms: config.default_duration_ms,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CpuState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Fault for CpuBurnFault {
    fn name(&self) -> FaultName {
        FaultName::Cpu
    }

    fn start(&self, params: FaultParams) -> FaultResult<()> {
        let cancel = {
            let mut state = self.lock();
            if state.run.is_some() {
                debug!("CPU fault already active");
                return Ok(());
            }
            let cancel = Arc::new(AtomicBool::new(false));
            state.run = Some(cancel.clone());
            cancel
        };

        let target = Duration::from_millis(params.duration_or(self.default_duration_ms));
        info!(duration_ms = target.as_millis() as u64, "CPU fault started");

        let started = Instant::now();
        let mut batches: u64 = 0;
        while started.elapsed() < target && !cancel.load(Ordering::Acquire) {
            black_box(burn_batch());
            batches += 1;
        }

        {
            let mut state = self.lock();
            // A stop followed by a new start replaces the run; leave that one alone.
            if state.run.as_ref().is_some_and(|run| Arc::ptr_eq(run, &cancel)) {
                state.run = None;
            }
        }

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            batches,
            cancelled = cancel.load(Ordering::Acquire),
            "CPU fault finished"
        );
        Ok(())
    }

    fn stop(&self) -> FaultResult<()> {
        let mut state = self.lock();
        if let Some(cancel) = state.run.take() {
            cancel.store(true, Ordering::Release);
            info!("CPU fault cancellation requested");
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.lock().run.is_some()
    }
}

fn burn_batch() -> f64 {
    let mut acc = 0.0f64;
    for i in 1..=BATCH_ITERATIONS {
        let x = black_box(i as f64);
        acc += (x * std::f64::consts::PI).sqrt() * x.sin() + x.cos() * (x + 1.0).ln();
    }
    acc
}
