use crate::calendar::{CalendarAction, CalendarExecutor};
use crate::capability::{CalendarCapability, DriveCapability, MailCapability, Summarizer};
use crate::context::{ContextUpdate, ExecutionContext};
use crate::drive::{DriveAction, DriveExecutor};
use crate::mail::{MailAction, MailExecutor};
use crate::report::{ReportEvent, Reporter, StepReport, StepStatus};
use crate::resolver::{NameResolver, ResolverCache};
use chrono::{DateTime, Utc};
use relay_core::{ActionStep, CalendarConfig, DispatchError, DriveConfig, Intent, Service};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Source of the current time for relative dates.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Backend capabilities available to the dispatcher. Any may be absent.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub mail: Option<Arc<dyn MailCapability>>,
    pub calendar: Option<Arc<dyn CalendarCapability>>,
    pub drive: Option<Arc<dyn DriveCapability>>,
    pub summarizer: Option<Arc<dyn Summarizer>>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mail(mut self, mail: Arc<dyn MailCapability>) -> Self {
        self.mail = Some(mail);
        self
    }

    pub fn with_calendar(mut self, calendar: Arc<dyn CalendarCapability>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn with_drive(mut self, drive: Arc<dyn DriveCapability>) -> Self {
        self.drive = Some(drive);
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn supports(&self, service: Service) -> bool {
        match service {
            Service::Mail => self.mail.is_some(),
            Service::Calendar => self.calendar.is_some(),
            Service::Drive => self.drive.is_some(),
            Service::Chat => false,
        }
    }
}

/// What one step produced: lines for the user and its effect on the context.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub lines: Vec<String>,
    pub update: ContextUpdate,
}

impl StepOutcome {
    pub fn new(update: ContextUpdate) -> Self {
        Self {
            lines: Vec::new(),
            update,
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn lines(mut self, lines: impl IntoIterator<Item = String>) -> Self {
        self.lines.extend(lines);
        self
    }
}

/// Result of a dispatched batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub batch_id: String,
    pub service: Service,
    pub succeeded: usize,
    pub failed: usize,
    /// Context left after the last step.
    pub context: ExecutionContext,
}

/// Executes intents step by step against the configured capabilities.
///
/// One dispatcher serves one session: it owns the folder cache, which
/// persists across batches. The execution context does not; every batch
/// starts empty.
pub struct Dispatcher {
    capabilities: Capabilities,
    reporter: Arc<dyn Reporter>,
    resolver: NameResolver,
    clock: Arc<dyn Clock>,
    calendar: CalendarConfig,
    drive: DriveConfig,
}

impl Dispatcher {
    pub fn new(capabilities: Capabilities, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            capabilities,
            reporter,
            resolver: NameResolver::new(),
            clock: Arc::new(SystemClock),
            calendar: CalendarConfig::default(),
            drive: DriveConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cache(mut self, cache: ResolverCache) -> Self {
        self.resolver = NameResolver::with_cache(cache);
        self
    }

    pub fn with_calendar_config(mut self, config: CalendarConfig) -> Self {
        self.calendar = config;
        self
    }

    pub fn with_drive_config(mut self, config: DriveConfig) -> Self {
        self.drive = config;
        self
    }

    pub fn cache(&self) -> &ResolverCache {
        self.resolver.cache()
    }

    /// Run every step of `intent` in order.
    ///
    /// Routing failures are reported and returned without running any step.
    /// Step failures are reported and counted; the batch carries on.
    pub async fn dispatch(&mut self, intent: &Intent) -> Result<BatchSummary, DispatchError> {
        let batch_id = uuid::Uuid::new_v4().to_string();

        let service = match self.route(intent) {
            Ok(service) => service,
            Err(e) => {
                warn!(batch_id = %batch_id, error = %e, "intent rejected");
                self.reporter.report(&ReportEvent::rejected(
                    &batch_id,
                    intent.service.as_deref(),
                    &e,
                ));
                return Err(e);
            }
        };

        info!(
            batch_id = %batch_id,
            service = %service,
            steps = intent.actions.len(),
            "dispatching intent"
        );

        let mut context = ExecutionContext::new();
        let mut succeeded = 0;
        let mut failed = 0;

        for (index, step) in intent.actions.iter().enumerate() {
            debug!(batch_id = %batch_id, index, action = %step.action, "executing step");

            let status = match self.execute_step(service, step, &context).await {
                Ok(outcome) => {
                    succeeded += 1;
                    context = context.apply(outcome.update);
                    debug!(index, context_len = context.len(), "step succeeded");
                    StepStatus::Succeeded {
                        lines: outcome.lines,
                    }
                }
                Err(e) => {
                    failed += 1;
                    warn!(
                        batch_id = %batch_id,
                        index,
                        action = %step.action,
                        kind = e.kind(),
                        error = %e,
                        "step failed"
                    );
                    StepStatus::Failed {
                        kind: e.kind(),
                        message: e.to_string(),
                    }
                }
            };

            self.reporter.report(&ReportEvent::Step(StepReport {
                batch_id: batch_id.clone(),
                service,
                index,
                action: step.action.clone(),
                status,
            }));
        }

        info!(batch_id = %batch_id, succeeded, failed, "intent dispatched");

        Ok(BatchSummary {
            batch_id,
            service,
            succeeded,
            failed,
            context,
        })
    }

    fn route(&self, intent: &Intent) -> Result<Service, DispatchError> {
        let service = intent.route()?;
        if service == Service::Chat {
            return Err(DispatchError::UnroutableIntent {
                service: service.to_string(),
            });
        }
        if !self.capabilities.supports(service) {
            return Err(DispatchError::ServiceUnavailable { service });
        }
        Ok(service)
    }

    async fn execute_step(
        &mut self,
        service: Service,
        step: &ActionStep,
        context: &ExecutionContext,
    ) -> Result<StepOutcome, DispatchError> {
        let unavailable = || DispatchError::ServiceUnavailable { service };

        match service {
            Service::Mail => {
                let action = MailAction::parse(step)?;
                let mail = self.capabilities.mail.as_deref().ok_or_else(unavailable)?;
                MailExecutor {
                    mail,
                    summarizer: self.capabilities.summarizer.as_deref(),
                    resolver: &self.resolver,
                }
                .run(action, context)
                .await
            }
            Service::Calendar => {
                let action = CalendarAction::parse(step, &self.calendar)?;
                let calendar = self
                    .capabilities
                    .calendar
                    .as_deref()
                    .ok_or_else(unavailable)?;
                CalendarExecutor {
                    calendar,
                    config: &self.calendar,
                    now: self.clock.now(),
                }
                .run(action)
                .await
            }
            Service::Drive => {
                let action = DriveAction::parse(step, &self.drive)?;
                let drive = self.capabilities.drive.as_deref().ok_or_else(unavailable)?;
                DriveExecutor {
                    drive,
                    resolver: &mut self.resolver,
                    config: &self.drive,
                }
                .run(action)
                .await
            }
            Service::Chat => Err(DispatchError::UnroutableIntent {
                service: service.to_string(),
            }),
        }
    }
}
