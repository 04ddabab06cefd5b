/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Command-line interface.
//!
//! The command decomposes an Erdös-Rényi random graph into strongly
//! connected components, logging the statistics of the run.

use crate::algo::{scc, Convergence, SccConfig};
use crate::codec::{Field, EDGE_LAYOUT, FLAGGED_EDGE_LAYOUT};
use crate::engine::{EngineConfig, InMemoryEngine};
use crate::graphs::random::ErdosRenyi;
use anyhow::{anyhow, bail, ensure, Context, Result};
use clap::{Parser, ValueEnum};
use dsi_progress_logger::{progress_logger, ProgressLog};
use jiff::fmt::friendly::{Designator, Spacing, SpanPrinter};
use std::io::Write;
use std::time::{Duration, SystemTime};

/// The layout of edge records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// Labels and endpoints; tombstones are stored as sentinel labels.
    Full,
    /// Labels, endpoints and an explicit state word.
    Flagged,
}

impl Layout {
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Layout::Full => EDGE_LAYOUT,
            Layout::Flagged => FLAGGED_EDGE_LAYOUT,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "fwbw-scc", version)]
/// Computes the strongly connected components of an Erdös-Rényi random
/// graph by forward/backward label propagation.
pub struct Cli {
    #[arg(short, long, default_value_t = 1000)]
    /// The number of nodes.
    pub nodes: usize,

    #[arg(short, long, default_value_t = 0.001)]
    /// The probability of an arc between two distinct nodes.
    pub prob: f64,

    #[arg(short, long, default_value_t = 0)]
    /// The seed of the pseudorandom number generator.
    pub seed: u64,

    #[arg(long, value_enum, default_value_t = Layout::Full)]
    /// The layout of edge records.
    pub layout: Layout,

    #[arg(long, default_value_t = SccConfig::default().max_iterations)]
    /// The maximum number of iterations, over all phases.
    pub max_iterations: usize,

    #[arg(short = 'j', long, default_value_t = rayon::current_num_threads().max(1), value_parser = num_threads_parser)]
    /// The number of threads to use.
    pub num_threads: usize,

    #[arg(long, value_parser = parse_duration)]
    /// How often to log progress. Default is 10s. You can use the suffixes "s"
    /// for seconds, "m" for minutes, "h" for hours, and "d" for days. If no
    /// suffix is provided it is assumed to be in milliseconds.
    pub log_interval: Option<Duration>,
}

pub fn num_threads_parser(arg: &str) -> Result<usize> {
    let num_threads = arg.parse::<usize>()?;
    ensure!(num_threads > 0, "Number of threads must be greater than 0");
    Ok(num_threads)
}

fn parse_duration(value: &str) -> Result<Duration> {
    if value.is_empty() {
        bail!("Empty duration string, if you want every 0 milliseconds use `0`.");
    }
    let mut duration = Duration::from_secs(0);
    let mut acc = String::new();
    for c in value.chars() {
        if c.is_ascii_digit() {
            acc.push(c);
        } else if c.is_whitespace() {
            continue;
        } else {
            let dur = acc.parse::<u64>()?;
            match c {
                's' => duration += Duration::from_secs(dur),
                'm' => duration += Duration::from_secs(dur * 60),
                'h' => duration += Duration::from_secs(dur * 60 * 60),
                'd' => duration += Duration::from_secs(dur * 60 * 60 * 24),
                _ => return Err(anyhow!("Invalid duration suffix: {}", c)),
            }
            acc.clear();
        }
    }
    if !acc.is_empty() {
        let dur = acc.parse::<u64>()?;
        duration += Duration::from_millis(dur);
    }
    Ok(duration)
}

/// Pretty-prints a duration in a human-readable format.
fn pretty_print_elapsed(elapsed: Duration) -> String {
    let span = jiff::Span::new()
        .seconds(elapsed.as_secs() as i64)
        .milliseconds(elapsed.subsec_millis() as i64);
    let printer = SpanPrinter::new()
        .spacing(Spacing::BetweenUnitsAndDesignators)
        .designator(Designator::Verbose);
    format!(
        "{} ({:.3}s)",
        printer.span_to_string(&span),
        elapsed.as_secs_f64()
    )
}

/// Installs an [`env_logger`] logger for the command.
///
/// Records are prefixed by a timestamp and by the time elapsed since the
/// logger was installed. The default level, unless `RUST_LOG` says
/// otherwise, is `info`.
pub fn init_env_logger() -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    let start = std::time::Instant::now();
    let printer = SpanPrinter::new()
        .spacing(Spacing::None)
        .designator(Designator::Compact);
    builder.format(move |buf, record| {
        let ts = jiff::Timestamp::try_from(SystemTime::now()).map_err(std::io::Error::other)?;
        let elapsed = start.elapsed();
        let span = jiff::Span::new()
            .seconds(elapsed.as_secs() as i64)
            .milliseconds(elapsed.subsec_millis() as i64);
        let style = buf.default_level_style(record.level());
        writeln!(
            buf,
            "{} {:>8} {style}{:5}{style:#} {}",
            ts.strftime("%F %T%.3f"),
            printer.span_to_string(&span),
            record.level(),
            record.args()
        )
    });
    builder.try_init().context("Could not install the logger")
}

pub fn cli_main<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let start = std::time::Instant::now();
    let cli = Cli::parse_from(args);
    main(cli)?;

    log::info!("The command took {}", pretty_print_elapsed(start.elapsed()));

    Ok(())
}

pub fn main(args: Cli) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&args.prob),
        "The arc probability must be in [0..1], not {}",
        args.prob
    );

    log::info!(
        "Generating an Erdös-Rényi graph with {} nodes, p = {} and seed {}",
        args.nodes,
        args.prob,
        args.seed
    );
    let topology = ErdosRenyi::new(args.nodes, args.prob, args.seed).topology()?;
    log::info!(
        "The graph has {} nodes and {} arcs",
        topology.num_nodes(),
        topology.num_arcs()
    );

    let config = EngineConfig::default()
        .edge_layout(args.layout.fields())
        .num_threads(Some(args.num_threads));
    let mut engine = InMemoryEngine::new(topology, config)?;
    log::debug!("{:?}", engine);

    let mut pl = progress_logger![];
    if let Some(log_interval) = args.log_interval {
        pl.log_interval(log_interval);
    }

    let mut outcome = scc(
        &mut engine,
        &SccConfig::default().max_iterations(args.max_iterations),
        &mut pl,
    )?;

    let sizes = outcome.sccs.sort_by_size();
    log::info!(
        "Found {} strongly connected components in {} rounds and {} iterations",
        outcome.sccs.num_components(),
        outcome.rounds,
        outcome.iterations
    );
    log::info!("Largest components: {:?}", &sizes[..sizes.len().min(10)]);
    if outcome.convergence == Convergence::DidNotConverge {
        log::warn!(
            "The decomposition is partial: {} vertices are unconfirmed",
            outcome.unconfirmed
        );
    }

    Ok(())
}
