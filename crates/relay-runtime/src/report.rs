//! User-visible reporting of dispatch outcomes.
//!
//! Reports are the dispatcher's output channel: every step produces exactly
//! one report, and a batch rejected at routing produces one rejection.
//! They are distinct from `tracing` logs, which are diagnostics.

use relay_core::{DispatchError, Service};
use serde::Serialize;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded { lines: Vec<String> },
    Failed { kind: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub batch_id: String,
    pub service: Service,
    /// Zero-based position of the step in the batch.
    pub index: usize,
    pub action: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportEvent {
    Step(StepReport),
    /// The batch never ran: unknown service or missing capability.
    Rejected {
        batch_id: String,
        service: Option<String>,
        kind: &'static str,
        message: String,
    },
}

impl ReportEvent {
    pub fn rejected(batch_id: &str, service: Option<&str>, error: &DispatchError) -> Self {
        ReportEvent::Rejected {
            batch_id: batch_id.to_string(),
            service: service.map(str::to_string),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Sink for dispatch reports.
pub trait Reporter: Send + Sync {
    fn report(&self, event: &ReportEvent);
}

/// Writes reports to stdout for the interactive loop.
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn report(&self, event: &ReportEvent) {
        let mut out = std::io::stdout().lock();
        // A closed stdout is ignored.
        let _ = write_event(&mut out, event);
    }
}

fn write_event(out: &mut impl Write, event: &ReportEvent) -> std::io::Result<()> {
    match event {
        ReportEvent::Step(step) => match &step.status {
            StepStatus::Succeeded { lines } => {
                for line in lines {
                    writeln!(out, "{}", line)?;
                }
            }
            StepStatus::Failed { message, .. } => {
                writeln!(
                    out,
                    "✗ {} action '{}' failed: {}",
                    step.service, step.action, message
                )?;
            }
        },
        ReportEvent::Rejected { message, .. } => {
            writeln!(out, "✗ {}", message)?;
        }
    }
    Ok(())
}

/// Captures reports in memory.
#[derive(Clone, Default)]
pub struct MemoryReporter {
    inner: Arc<Mutex<Vec<ReportEvent>>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every captured event, leaving the reporter empty.
    pub fn drain(&self) -> Vec<ReportEvent> {
        let mut g = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *g)
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Captured step reports, in order.
    pub fn steps(&self) -> Vec<StepReport> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReportEvent::Step(s) => Some(s),
                ReportEvent::Rejected { .. } => None,
            })
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, event: &ReportEvent) {
        let mut g = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        g.push(event.clone());
    }
}
