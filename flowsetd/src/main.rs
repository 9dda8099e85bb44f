// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use flowset::sets::SetNames;
use flowset::sets_ipset::SetStoreIpset;
use flowset::sm::Reconciler;
use slog::{info, Drain, Logger};
use std::fs::File;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None, styles = get_styles())]
struct Cli {
    /// Write diagnostics to this file instead of standard error.
    #[arg(long)]
    log_file: Option<String>,

    /// Name of the IPv4 address set.
    #[arg(long, default_value = flowset::DEFAULT_IP4_SET)]
    ip4_set: String,

    /// Name of the IPv6 address set.
    #[arg(long, default_value = flowset::DEFAULT_IP6_SET)]
    ip6_set: String,

    /// Diagnostic verbosity.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[value(rename_all = "UPPER")]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        write!(f, "{}", name)
    }
}

impl From<LogLevel> for slog::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => slog::Level::Debug,
            LogLevel::Info => slog::Level::Info,
            LogLevel::Warning => slog::Level::Warning,
            LogLevel::Error => slog::Level::Error,
            LogLevel::Critical => slog::Level::Critical,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log = init_logger(&cli)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    termination_handler(shutdown.clone(), log.clone());

    let names = SetNames {
        v4: cli.ip4_set,
        v6: cli.ip6_set,
    };
    info!(
        log,
        "reconciling sets {} (v4) and {} (v6) from standard input",
        names.v4,
        names.v6
    );

    let store = SetStoreIpset::new(log.clone());
    let mut reconciler = Reconciler::new(names, store, log.clone());

    flowset::run(std::io::stdin().lock(), &mut reconciler, &shutdown, &log)?;
    Ok(())
}

/// On SIGINT or SIGTERM, ask the feed loop to stop at its next line
/// boundary. Sets are left as last reconciled.
fn termination_handler(shutdown: Arc<AtomicBool>, log: Logger) {
    ctrlc::set_handler(move || {
        info!(log, "termination signal, stopping at next line");
        shutdown.store(true, Ordering::Relaxed);
    })
    .expect("error setting termination handler");
}

/// Oxide themed CLI ;)
pub fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .header(anstyle::Style::new().bold().underline().fg_color(Some(
            anstyle::Color::Rgb(anstyle::RgbColor(245, 207, 101)),
        )))
        .literal(anstyle::Style::new().bold().fg_color(Some(
            anstyle::Color::Rgb(anstyle::RgbColor(72, 213, 151)),
        )))
        .invalid(anstyle::Style::new().bold().fg_color(Some(
            anstyle::Color::Rgb(anstyle::RgbColor(72, 213, 151)),
        )))
        .valid(anstyle::Style::new().bold().fg_color(Some(
            anstyle::Color::Rgb(anstyle::RgbColor(72, 213, 151)),
        )))
        .usage(anstyle::Style::new().bold().fg_color(Some(
            anstyle::Color::Rgb(anstyle::RgbColor(245, 207, 101)),
        )))
        .error(anstyle::Style::new().bold().fg_color(Some(
            anstyle::Color::Rgb(anstyle::RgbColor(232, 104, 134)),
        )))
}

/// Level-filtered logging to standard error, or to a file in bunyan
/// format when one is configured. Standard output is the speaker's
/// command channel and never carries diagnostics.
fn init_logger(cli: &Cli) -> Result<Logger> {
    let level = slog::Level::from(cli.log_level);
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)?;
            let drain = slog_bunyan::new(file).build().fuse();
            let drain = slog::LevelFilter::new(drain, level).fuse();
            let drain = slog_async::Async::new(drain)
                .chan_size(0x8000)
                .build()
                .fuse();
            Ok(Logger::root(drain, slog::o!()))
        }
        None => {
            let decorator = slog_term::TermDecorator::new().stderr().build();
            let drain = slog_term::FullFormat::new(decorator).build().fuse();
            let drain = slog::LevelFilter::new(drain, level).fuse();
            let drain = slog_async::Async::new(drain).build().fuse();
            Ok(Logger::root(drain, slog::o!()))
        }
    }
}
