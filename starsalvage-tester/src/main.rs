mod logic;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use logic::{
    AutopilotStrategy, RunRecord, SimulationConfig, SimulationSession, aggregate_runs,
    expand_iterations, parse_strategies, resolve_seed_inputs,
};
use starsalvage_game::{ExpeditionConfig, HullBreachRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HullBreachArg {
    /// Negative hull has no further consequence
    Ignore,
    /// A breached hull ends the run and forfeits carried scrap
    EndRun,
}

impl From<HullBreachArg> for HullBreachRule {
    fn from(arg: HullBreachArg) -> Self {
        match arg {
            HullBreachArg::Ignore => Self::Ignore,
            HullBreachArg::EndRun => Self::EndRun,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "starsalvage-tester", version = "0.1.0")]
#[command(about = "Autopilot runs and balance reports for Starsalvage expeditions")]
struct Args {
    /// Autopilot strategies to fly (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Seeds to run (comma-separated; supports 0x hex and a..b ranges)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Successive seeds flown per base seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Travel steps allowed per run before it counts as incomplete
    #[arg(long, default_value_t = 500)]
    max_steps: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json", "markdown"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Expedition config JSON; omitted fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the hull breach rule from the config
    #[arg(long, value_enum)]
    hull_breach: Option<HullBreachArg>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let strategies = parse_strategies(&args.strategies)?;
    let seed_tokens = split_csv(&args.seeds);
    let seeds = expand_iterations(&resolve_seed_inputs(&seed_tokens)?, args.iterations);
    let expedition = load_expedition_config(&args)?;

    let records = run_autopilot(&args, &strategies, &seeds, &expedition)?;
    write_reports(&args, &records, start_time)?;

    if records.iter().any(|record| !record.completed) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .try_init();
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in AutopilotStrategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:10} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🚀 Starsalvage Autopilot Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn load_expedition_config(args: &Args) -> Result<ExpeditionConfig> {
    let mut config = match args.config.as_deref() {
        Some(path) => read_config(path)?,
        None => ExpeditionConfig::default(),
    };
    if let Some(rule) = args.hull_breach {
        config.rules.hull_breach = rule.into();
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<ExpeditionConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    ExpeditionConfig::from_json(&raw)
        .with_context(|| format!("invalid expedition config in {}", path.display()))
}

fn run_autopilot(
    args: &Args,
    strategies: &[AutopilotStrategy],
    seeds: &[u64],
    expedition: &ExpeditionConfig,
) -> Result<Vec<RunRecord>> {
    let mut records = Vec::with_capacity(strategies.len() * seeds.len());
    for &strategy in strategies {
        println!("{} {}", "🛰️  Flying".bright_blue().bold(), strategy.label());
        for &seed in seeds {
            let config = SimulationConfig::new(strategy, seed)
                .with_max_steps(args.max_steps)
                .with_expedition(expedition.clone());
            let record = SimulationSession::new(config)?
                .run()
                .with_context(|| format!("{strategy} run failed on seed {seed}"))?;
            if args.verbose {
                print_run_line(&record);
            }
            records.push(record);
        }
    }
    Ok(records)
}

fn print_run_line(record: &RunRecord) {
    let outcome = record
        .summary
        .outcome
        .map_or_else(|| "incomplete".yellow(), |outcome| {
            format!("{outcome:?}").normal()
        });
    println!(
        "   seed {:>6}  {}  scrap {}  nodes {}  hull {}  steps {}",
        record.seed,
        outcome,
        record.summary.scrap_banked,
        record.summary.nodes_visited,
        record.summary.hull_left,
        record.summary.ledger.steps
    );
}

fn write_reports(args: &Args, records: &[RunRecord], start_time: Instant) -> Result<()> {
    let aggregates = aggregate_runs(records);
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, &aggregates, records)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, &aggregates)?,
        _ => logic::reports::generate_console_report(
            &mut output_target,
            &aggregates,
            start_time.elapsed(),
        )?,
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            strategies: "all".to_string(),
            list_strategies: false,
            seeds: "1337".to_string(),
            iterations: 1,
            max_steps: 500,
            report: "json".to_string(),
            output: None,
            config: None,
            hull_breach: None,
            verbose: false,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "starsalvage-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn split_csv_drops_blanks() {
        assert_eq!(split_csv(" 1, ,0x2,3..4 "), vec!["1", "0x2", "3..4"]);
    }

    #[test]
    fn hull_breach_flag_overrides_config() {
        let mut args = base_args();
        assert_eq!(
            load_expedition_config(&args).unwrap().rules.hull_breach,
            HullBreachRule::Ignore
        );
        args.hull_breach = Some(HullBreachArg::EndRun);
        assert_eq!(
            load_expedition_config(&args).unwrap().rules.hull_breach,
            HullBreachRule::EndRun
        );
    }

    #[test]
    fn config_file_is_parsed_and_validated() {
        let path = temp_path("config");
        std::fs::write(&path, r#"{ "map": { "node_count": 9 } }"#).unwrap();
        let mut args = base_args();
        args.config = Some(path.clone());
        assert_eq!(load_expedition_config(&args).unwrap().map.node_count, 9);

        std::fs::write(&path, "{ nope").unwrap();
        assert!(load_expedition_config(&args).is_err());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn list_strategies_writes_every_key() {
        let path = temp_path("list");
        let mut args = base_args();
        args.list_strategies = true;
        args.output = Some(path.clone());
        assert!(maybe_list_strategies(&args).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        for strategy in AutopilotStrategy::ALL {
            assert!(content.contains(strategy.key()));
        }
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn autopilot_runs_feed_json_report() {
        let args = base_args();
        let strategies = parse_strategies("greedy").unwrap();
        let records =
            run_autopilot(&args, &strategies, &[1, 2], &ExpeditionConfig::default()).unwrap();
        assert_eq!(records.len(), 2);

        let path = temp_path("report");
        let mut args = base_args();
        args.output = Some(path.clone());
        write_reports(&args, &records, Instant::now()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["runs"].as_array().map(Vec::len), Some(2));
        let _ = std::fs::remove_file(path);
    }
}
