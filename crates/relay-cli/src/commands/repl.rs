//! Interactive prompt loop.

use anyhow::Result;
use relay_core::{RelayConfig, Service};
use relay_planner::{IntentParser, ParsedPrompt, Planner};
use relay_runtime::{Dispatcher, Summarizer};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

pub const QUIT: &str = "q";
const PROMPT: &str = "📝 What would you like to do? (q to quit) > ";

pub async fn run(config: &RelayConfig) -> Result<()> {
    let planner = super::planner(config)?;
    let mut dispatcher = super::dispatcher(config, Some(planner.clone() as Arc<dyn Summarizer>))?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_loop(stdin, &mut stdout, &planner, &mut dispatcher).await?;
    Ok(())
}

/// Read prompts until `q` or end of input. Returns the number of prompts
/// handled.
pub async fn run_loop<R, W>(
    input: R,
    out: &mut W,
    planner: &Planner,
    dispatcher: &mut Dispatcher,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut handled = 0;

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();
        if line == QUIT {
            break;
        }
        if line.is_empty() {
            continue;
        }

        handled += 1;
        handle(line, out, planner, dispatcher).await?;
    }

    writeln!(out, "👋 Goodbye!")?;
    Ok(handled)
}

async fn handle<W: Write>(
    line: &str,
    out: &mut W,
    planner: &Planner,
    dispatcher: &mut Dispatcher,
) -> Result<()> {
    let parsed = match planner.parse(line).await {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "intent parsing failed");
            writeln!(out, "❌ {}", e)?;
            return Ok(());
        }
    };

    match parsed {
        ParsedPrompt::Chat(reply) => writeln!(out, "🤖 {}", reply.trim_end())?,
        ParsedPrompt::Intent(intent) if matches!(intent.route(), Ok(Service::Chat)) => {
            match planner.chat(line).await {
                Ok(reply) => writeln!(out, "🤖 {}", reply.trim_end())?,
                Err(e) => writeln!(out, "❌ Chat error: {}", e)?,
            }
        }
        ParsedPrompt::Intent(intent) => {
            // Rejections are already reported by the dispatcher.
            if let Err(e) = dispatcher.dispatch(&intent).await {
                debug!(error = %e, "intent not dispatched");
            }
        }
    }
    Ok(())
}
