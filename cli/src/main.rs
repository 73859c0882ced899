//! cfrbot CLI - Command-line interface for the cfrbot engine
//!
//! Plays heads-up matches between a CFR player and a random player, solves
//! single decisions given on the command line, and benchmarks the hand
//! evaluator.

mod logging;
mod table;

use anyhow::{bail, Context, Result};
use cfrbot_agent::{CfrPlayer, DecisionLog, DecisionRequest, Player, RandomPlayer};
use cfrbot_engine::evaluator::benchmark_throughput;
use cfrbot_engine::{Card, Chips, LegalAction, Seat, SolverConfig};
use clap::{Args, Parser, Subcommand};
use log::info;
use rayon::prelude::*;
use std::path::PathBuf;
use table::{Table, TableConfig, TableSummary};

#[derive(Parser)]
#[command(name = "cfrbot", version, about = "Single-decision CFR poker bot")]
struct Cli {
    /// More terminal output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write DEBUG logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play CFR against a random player
    Play(PlayArgs),
    /// Solve one decision and print the root strategy
    Decide(DecideArgs),
    /// Benchmarks
    Bench {
        #[command(subcommand)]
        target: BenchTarget,
    },
}

#[derive(Subcommand)]
enum BenchTarget {
    /// 7-card evaluation throughput
    Evaluator {
        #[arg(default_value_t = 1_000_000)]
        sample_size: usize,
    },
}

/// Solver settings shared by `play` and `decide`
#[derive(Args)]
struct SolverArgs {
    /// YAML solver configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured iteration count
    #[arg(long)]
    iterations: Option<u32>,

    /// Override the configured tree depth
    #[arg(long)]
    max_depth: Option<usize>,
}

impl SolverArgs {
    fn load(&self) -> Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::load(path)?,
            None => SolverConfig::default(),
        };
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args)]
struct PlayArgs {
    #[command(flatten)]
    solver: SolverArgs,

    /// Hands per table
    #[arg(long, default_value_t = 10)]
    rounds: u32,

    #[arg(long, default_value_t = 1000)]
    stack: Chips,

    #[arg(long, default_value_t = 10)]
    small_blind: Chips,

    /// Independent tables, played in parallel
    #[arg(long, default_value_t = 1)]
    tables: usize,

    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Append every CFR decision to this JSON-lines file
    #[arg(long)]
    decisions: Option<PathBuf>,
}

#[derive(Args)]
struct DecideArgs {
    #[command(flatten)]
    solver: SolverArgs,

    /// Hole cards, e.g. "As Ah"
    #[arg(long)]
    hole: String,

    /// Community cards, e.g. "Ad Kc 7h 2s"
    #[arg(long, default_value = "")]
    board: String,

    #[arg(long)]
    pot: Chips,

    /// Chips behind for the acting seat and the opponent
    #[arg(long, num_args = 2, value_names = ["HERO", "VILLAIN"], required = true)]
    stacks: Vec<Chips>,

    /// Chips put in on this street by the acting seat and the opponent
    #[arg(long, num_args = 2, value_names = ["HERO", "VILLAIN"], default_values_t = [0, 0])]
    committed: Vec<Chips>,

    #[arg(long, default_value_t = 20)]
    big_blind: Chips,

    /// The acting seat holds the button
    #[arg(long)]
    button: bool,

    /// The opponent has already acted on this street
    #[arg(long)]
    opponent_acted: bool,

    /// Folding is not offered
    #[arg(long)]
    no_fold: bool,

    /// Raise range as "raise to" amounts
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    raise: Option<Vec<Chips>>,
}

impl DecideArgs {
    /// The acting seat is always seat zero
    fn request(&self) -> Result<DecisionRequest> {
        let hole = Card::parse_many(&self.hole)?;
        let [a, b] = hole[..] else {
            bail!("expected two hole cards, got {}", hole.len());
        };
        let [stack, villain_stack] = self.stacks[..] else {
            bail!("--stacks takes two amounts");
        };
        let [mine, theirs] = self.committed[..] else {
            bail!("--committed takes two amounts");
        };

        let to_call = theirs.saturating_sub(mine);
        let mut legal = Vec::with_capacity(3);
        if !self.no_fold && to_call > 0 {
            legal.push(LegalAction::Fold);
        }
        legal.push(LegalAction::Call {
            amount: to_call.min(stack),
        });
        if let Some(range) = &self.raise {
            if let [min, max] = range[..] {
                legal.push(LegalAction::Raise { min, max });
            }
        }

        Ok(DecisionRequest {
            seat: Seat::Zero,
            hole_cards: [a, b],
            board: Card::parse_many(&self.board)?,
            pot: self.pot,
            stacks: [stack, villain_stack],
            committed: [mine, theirs],
            big_blind: self.big_blind,
            button: if self.button { Seat::Zero } else { Seat::One },
            opponent_acted: self.opponent_acted,
            legal,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Command::Play(args) => play(args),
        Command::Decide(args) => decide(args),
        Command::Bench {
            target: BenchTarget::Evaluator { sample_size },
        } => {
            bench_evaluator(sample_size);
            Ok(())
        }
    }
}

fn play(args: PlayArgs) -> Result<()> {
    let solver = args.solver.load()?;
    info!(
        "{} table(s), {} hands each, {} iterations at depth {}",
        args.tables, args.rounds, solver.iterations, solver.max_depth
    );

    let summaries: Vec<TableSummary> = (0..args.tables)
        .into_par_iter()
        .map(|index| {
            let seed = args.seed.wrapping_add(index as u64);
            let log = match &args.decisions {
                Some(path) if args.tables > 1 => DecisionLog::with_file(path.with_extension(format!("{}.jsonl", index))),
                Some(path) => DecisionLog::with_file(path),
                None => Ok(DecisionLog::new()),
            }
            .context("open decision log")?;
            let players: [Box<dyn Player + Send>; 2] = [
                Box::new(CfrPlayer::with_log("cfr", solver.clone(), log)),
                Box::new(RandomPlayer::new("random", seed ^ 0xA5A5)),
            ];
            let config = TableConfig {
                rounds: args.rounds,
                initial_stack: args.stack,
                small_blind: args.small_blind,
                seed,
            };
            Table::new(players, config)
                .play()
                .with_context(|| format!("table {}", index))
        })
        .collect::<Result<_>>()?;

    for (index, summary) in summaries.iter().enumerate() {
        println!(
            "table {}: {} hands | {} {} | {} {}",
            index, summary.hands, summary.names[0], summary.stacks[0], summary.names[1], summary.stacks[1]
        );
    }
    let net: i64 = summaries
        .iter()
        .map(|s| s.stacks[0] as i64 - args.stack as i64)
        .sum();
    println!("cfr net: {:+} chips over {} table(s)", net, summaries.len());
    Ok(())
}

fn decide(args: DecideArgs) -> Result<()> {
    let config = args.solver.load()?;
    let request = args.request()?;
    let mut player = CfrPlayer::new("cfr", config);

    let chosen = player.decide(&request)?;
    if let Some(record) = player.log().records().last() {
        println!("average strategy after {} iterations:", record.iterations);
        for (action, p) in &record.strategy {
            println!("  {:>6} {:.4}", action.to_string(), p);
        }
    }
    println!("chosen: {}", chosen);
    Ok(())
}

fn bench_evaluator(sample_size: usize) {
    println!("Running hand evaluator benchmark...");
    println!("Sample size: {} hands", sample_size);
    let (evals_per_sec, duration_ms) = benchmark_throughput(sample_size);

    println!("Results:");
    println!("  Duration: {} ms", duration_ms);
    println!("  Throughput: {:.2} evals/sec", evals_per_sec);
    println!("  Throughput: {:.2}M evals/sec", evals_per_sec / 1_000_000.0);
}
