//! Calendar actions and event time computation.

use crate::capability::{CalendarCapability, NewEvent};
use crate::context::{ContextUpdate, ResultItem};
use crate::dispatcher::StepOutcome;
use chrono::{
    DateTime, Days, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeDelta, Utc,
};
use regex::Regex;
use relay_core::{ActionStep, CalendarActionKind, CalendarConfig, DispatchError, Service};
use std::sync::LazyLock;

const ACTION_CREATE: &str = "create";

/// "3pm", "3 PM", "10:30am", "9 a.m."
static MERIDIEM_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?\s*([ap])\.?\s*m\.?$").expect("valid time regex")
});

/// "14:00", "9:05"
static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid time regex"));

/// Day an event falls on, before resolution against the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDay {
    Today,
    Tomorrow,
    On(NaiveDate),
}

impl EventDay {
    pub fn parse(value: &str) -> Result<Self, DispatchError> {
        match value.trim().to_lowercase().as_str() {
            "today" => Ok(EventDay::Today),
            "tomorrow" => Ok(EventDay::Tomorrow),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map(EventDay::On)
                .map_err(|_| {
                    DispatchError::invalid_parameter(
                        ACTION_CREATE,
                        "date",
                        format!("expected YYYY-MM-DD, 'today' or 'tomorrow', got '{}'", value),
                    )
                }),
        }
    }

    fn resolve(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            EventDay::Today => Some(today),
            EventDay::Tomorrow => today.checked_add_days(Days::new(1)),
            EventDay::On(date) => Some(*date),
        }
    }
}

/// When an event happens: an explicit window or a day with an optional time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventWhen {
    Explicit { start: String, end: String },
    Day { day: EventDay, time: Option<NaiveTime> },
}

/// Parse a wall-clock time such as "3pm", "10:30 am" or "14:00".
pub fn parse_time(value: &str) -> Result<NaiveTime, DispatchError> {
    let value = value.trim();
    let invalid = || {
        DispatchError::invalid_parameter(
            ACTION_CREATE,
            "time",
            format!("expected a time like '3pm' or '15:00', got '{}'", value),
        )
    };

    let (hour, minute) = if let Some(caps) = MERIDIEM_TIME.captures(value) {
        let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
        let minute: u32 = caps.get(2).map_or(Ok(0), |m| m.as_str().parse()).map_err(|_| invalid())?;
        if !(1..=12).contains(&hour) {
            return Err(invalid());
        }
        let pm = caps[3].eq_ignore_ascii_case("p");
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        };
        (hour, minute)
    } else if let Some(caps) = CLOCK_TIME.captures(value) {
        let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
        let minute: u32 = caps[2].parse().map_err(|_| invalid())?;
        (hour, minute)
    } else {
        return Err(invalid());
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Compute the RFC3339 start and end of an event.
///
/// A day without a time yields a one-hour slot at `default_start_hour`. A
/// given time yields a one-hour slot starting at that time. Both are local to
/// `offset`, and relative days are taken relative to `now` at that offset.
pub fn event_window(
    when: &EventWhen,
    now: DateTime<Utc>,
    offset: FixedOffset,
    default_start_hour: u32,
) -> Result<(String, String), DispatchError> {
    let (day, time) = match when {
        EventWhen::Explicit { start, end } => return Ok((start.clone(), end.clone())),
        EventWhen::Day { day, time } => (day, time),
    };

    let today = now.with_timezone(&offset).date_naive();
    let date = day.resolve(today).ok_or_else(|| {
        DispatchError::invalid_parameter(ACTION_CREATE, "date", "date out of range")
    })?;
    let time = match time {
        Some(t) => *t,
        None => NaiveTime::from_hms_opt(default_start_hour, 0, 0).ok_or_else(|| {
            DispatchError::invalid_parameter(
                ACTION_CREATE,
                "time",
                format!("default start hour {} is not a valid hour", default_start_hour),
            )
        })?,
    };

    let start = date
        .and_time(time)
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| DispatchError::invalid_parameter(ACTION_CREATE, "date", "ambiguous local time"))?;
    let end = start + TimeDelta::hours(1);

    Ok((
        start.to_rfc3339_opts(SecondsFormat::Secs, false),
        end.to_rfc3339_opts(SecondsFormat::Secs, false),
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalendarAction {
    List {
        count: usize,
    },
    Create {
        summary: String,
        description: Option<String>,
        when: EventWhen,
    },
}

impl CalendarAction {
    pub fn parse(step: &ActionStep, config: &CalendarConfig) -> Result<Self, DispatchError> {
        let kind = CalendarActionKind::parse(&step.action).ok_or_else(|| {
            DispatchError::UnsupportedAction {
                service: Service::Calendar,
                action: step.action.clone(),
            }
        })?;
        let name = kind.name();
        let p = &step.parameters;

        match kind {
            CalendarActionKind::List => Ok(CalendarAction::List {
                count: p
                    .count(name, &["count", "maxResults", "max_results"])?
                    .unwrap_or(config.default_list_count),
            }),
            CalendarActionKind::Create => {
                let when = match (p.string("start"), p.string("end"), p.string("date")) {
                    (Some(start), Some(end), _) => {
                        for (key, value) in [("start", &start), ("end", &end)] {
                            DateTime::parse_from_rfc3339(value).map_err(|e| {
                                DispatchError::invalid_parameter(name, key, e.to_string())
                            })?;
                        }
                        EventWhen::Explicit { start, end }
                    }
                    (_, _, Some(date)) => EventWhen::Day {
                        day: EventDay::parse(&date)?,
                        time: p.string("time").map(|t| parse_time(&t)).transpose()?,
                    },
                    (Some(_), None, None) => return Err(DispatchError::missing_parameter(name, "end")),
                    (None, Some(_), None) => {
                        return Err(DispatchError::missing_parameter(name, "start"));
                    }
                    (None, None, None) => return Err(DispatchError::missing_parameter(name, "date")),
                };

                Ok(CalendarAction::Create {
                    summary: p
                        .string_any(&["summary", "title"])
                        .unwrap_or_else(|| config.default_title.clone()),
                    description: p.string("description"),
                    when,
                })
            }
        }
    }
}

/// Runs calendar actions against one capability.
pub struct CalendarExecutor<'a> {
    pub calendar: &'a dyn CalendarCapability,
    pub config: &'a CalendarConfig,
    pub now: DateTime<Utc>,
}

impl CalendarExecutor<'_> {
    pub async fn run(&self, action: CalendarAction) -> Result<StepOutcome, DispatchError> {
        match action {
            CalendarAction::List { count } => {
                let events = self.calendar.list_upcoming(count).await?;
                let lines: Vec<String> = std::iter::once(format!("{} upcoming events", events.len()))
                    .chain(events.iter().map(|e| format!("- {} {} ({})", e.start, e.summary, e.id)))
                    .collect();
                let items = events
                    .into_iter()
                    .map(|e| {
                        ResultItem::new(e.id)
                            .with("start", e.start)
                            .with("summary", e.summary)
                    })
                    .collect();
                Ok(StepOutcome::new(ContextUpdate::Replace(items)).lines(lines))
            }
            CalendarAction::Create {
                summary,
                description,
                when,
            } => {
                let (start, end) = event_window(
                    &when,
                    self.now,
                    self.config.offset(),
                    self.config.default_start_hour,
                )?;
                let event = NewEvent {
                    summary,
                    start,
                    end,
                    description,
                    time_zone: Some(self.config.time_zone.clone()),
                };
                let created = self.calendar.insert_event(&event).await?;

                let mut outcome = StepOutcome::new(ContextUpdate::Replace(vec![ResultItem::new(
                    created.id.clone(),
                )]))
                .line(format!("Event '{}' created for {}", event.summary, event.start));
                if let Some(link) = created.link {
                    outcome = outcome.line(link);
                }
                Ok(outcome)
            }
        }
    }
}
