use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use rand::Rng;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use shortcode_oracle::{Oracle, Runner, Verdict};

/// Fuzzes an external shortcode grammar until it disagrees with the oracle
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for the run's random source; omit to draw a fresh one
    #[arg(long)]
    seed: Option<u64>,

    /// Bytes of entropy per generated instance; bounds instance depth
    #[arg(long, default_value_t = 4096)]
    entropy: usize,

    /// Parser command; must read source on stdin and print a range-free
    /// parenthesized tree on stdout
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        num_args = 1..,
        default_values_t = ["tree-sitter", "parse", "--no-ranges"].map(String::from)
    )]
    parser_cmd: Vec<String>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    // Resolve the seed up front so every run, seeded or not, is
    // reproducible from the log line.
    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    tracing::info!(seed, parser = ?args.parser_cmd, "starting fuzz run");

    let oracle = Oracle::new(args.parser_cmd)?;
    let mut runner = Runner::new(oracle, Some(seed), args.entropy);

    let verdict = runner.run(|| {
        let mut err = io::stderr();
        let _ = err.write_all(b".");
        let _ = err.flush();
    })?;

    eprintln!();
    match verdict {
        Verdict::Mismatch {
            input,
            expected,
            actual,
        } => {
            tracing::error!(seed, "parser tree disagrees with the oracle");
            eprintln!("input:    {input}");
            eprintln!("expected: {expected}");
            eprintln!("actual:   {actual}");
        }
        Verdict::ProcessFailure {
            input,
            status,
            stderr,
        } => {
            tracing::error!(seed, ?status, "external parser failed");
            eprintln!("input:  {input}");
            eprintln!("stderr: {stderr}");
        }
        // `run` only returns halting verdicts
        Verdict::Match => return Ok(()),
    }
    anyhow::bail!("grammar conformance failure (seed {seed})")
}
