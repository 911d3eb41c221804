//! Prompt text sent to the model.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use relay_core::{ActionSpec, Service};
use relay_runtime::MessageSummary;
use std::fmt::Write;

pub const CHAT_INSTRUCTION: &str =
    "You are a helpful assistant for general queries. Respond clearly and concisely.";

/// System prompt for intent parsing: the current local time, the output
/// shape and every action in `catalog`.
pub fn system_prompt(now: DateTime<FixedOffset>, zone_name: &str, catalog: &[ActionSpec]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "You are an AI assistant for a Google Workspace CLI.");
    let _ = writeln!(
        out,
        "Current date/time ({}): {}",
        zone_name,
        now.to_rfc3339_opts(SecondsFormat::Secs, false)
    );
    out.push('\n');
    out.push_str("Parse the user's request into one JSON object with:\n");
    out.push_str("  - \"service\": \"gmail\" | \"calendar\" | \"drive\" | \"chat\"\n");
    out.push_str("  - \"actions\": [ { \"action\": \"<name>\", \"parameters\": { ... } }, ... ]\n");

    for service in [Service::Mail, Service::Calendar, Service::Drive] {
        let _ = writeln!(out, "\nSupported {} actions:", heading(service));
        for spec in catalog.iter().filter(|s| s.service == service) {
            let _ = writeln!(out, "  - {:<16} -> {}", spec.name, spec.parameters);
        }
    }

    out.push_str(
        "\nIf only a calendar date is given, default to a one-hour slot starting at 09:00 local time.\n",
    );
    out.push_str(
        "\nMulti-action sequencing: if the user asks for several tasks, list them in order in \"actions\". \
         Later actions may omit ids; they act on the results of the previous action.\n",
    );
    out.push_str(
        "\nChat fallback: if the request is not about mail, calendar or drive, return \
         {\"service\":\"chat\",\"actions\":[]}.\n",
    );
    out.push_str("\nOutput only the JSON, no extra text.\n");
    out
}

fn heading(service: Service) -> &'static str {
    match service {
        Service::Mail => "Gmail",
        Service::Calendar => "Calendar",
        Service::Drive => "Drive",
        Service::Chat => "Chat",
    }
}

/// Remove a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Prompt asking for a summary of `messages` with likely spam flagged.
pub fn summary_prompt(messages: &[MessageSummary]) -> String {
    let mut out =
        String::from("Summarize the following emails and indicate which ones look like spam:\n\n");
    for (idx, msg) in messages.iter().enumerate() {
        let _ = write!(
            out,
            "{}. From: {}\nSubject: {}\nSnippet: {}\n\n",
            idx + 1,
            msg.from,
            msg.subject,
            msg.snippet
        );
    }
    out
}
