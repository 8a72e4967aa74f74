//! console-replay CLI: feed a capture through a console session and print it.
//!
//! Logging: set `RUST_LOG=console_session=debug,console_store=trace` to see
//! store and batch events on stderr.

mod cli;

use std::collections::HashSet;

use anyhow::{Context, Result};
use clap::Parser;
use console_session::{ConsoleSession, load_console_settings, set_config_home_override};
use console_types::{InboundEvent, Message};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    // RUST_LOG overrides; --verbose => debug; else warn
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "console_session=debug,console_store=debug"
        } else {
            "console_session=warn,console_store=warn"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let settings = load_console_settings();
    let session = ConsoleSession::create(settings);

    let raw = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let mut skipped = 0_usize;
    for (line_no, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let outcome = InboundEvent::from_json(line)
            .map_err(anyhow::Error::from)
            .and_then(|event| session.ingest(event).map_err(anyhow::Error::from));
        if let Err(error) = outcome {
            skipped += 1;
            tracing::warn!(line = line_no + 1, error = %error, "skipping input line");
        }
    }
    session.flush();

    let mut matches = HashSet::new();
    let mut selected = None;
    if let Some(query) = cli.search.as_deref() {
        session.search(query).context("search failed")?;
        let search = session.search_settled().await;
        matches.extend(search.view.results.iter().copied());
        selected = search
            .view
            .index
            .and_then(|index| search.view.results.get(index).copied());
        println!(
            "search {:?}: {} result(s)",
            search.view.query,
            search.view.results.len()
        );
    }

    let state = session.snapshot();
    for message in state.visible_messages() {
        let marker = if selected == Some(message.id) {
            '>'
        } else if matches.contains(&message.id) {
            '*'
        } else {
            ' '
        };
        println!(
            "{marker} {:>5}  {:<24} {:<7} {}",
            message.id,
            point_label(message),
            message.level.as_str(),
            message.message_text
        );
    }

    let counts = state.filtered_counts();
    println!(
        "visible={} hidden={} (error={} warn={} info={} debug={} log={} nodemodules={} text={})",
        state.visible_ids().len(),
        counts.global,
        counts.error,
        counts.warn,
        counts.info,
        counts.debug,
        counts.log,
        counts.nodemodules,
        counts.text
    );
    println!(
        "overflow={} messages_loaded={} skipped_lines={skipped}",
        state.overflow(),
        state.messages_loaded()
    );
    Ok(())
}

fn point_label(message: &Message) -> String {
    match (&message.execution_point, &message.last_execution_point) {
        (Some(point), _) => point.to_string(),
        (None, Some(anchor)) => format!("~{}#{}", anchor.point, anchor.message_count),
        (None, None) => "-".to_string(),
    }
}
