use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use starsalvage_game::RunOutcome;

use super::policy::AutopilotStrategy;
use super::simulation::RunRecord;

/// Per-strategy rollup of autopilot runs.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyAggregate {
    pub strategy: AutopilotStrategy,
    pub runs: usize,
    pub secured_pct: f64,
    pub lost_pct: f64,
    pub breached_pct: f64,
    pub incomplete: usize,
    pub retreat_pct: f64,
    pub mean_scrap_banked: f64,
    pub mean_nodes_visited: f64,
    pub mean_hull_left: f64,
    pub mean_steps: f64,
    pub mean_items_salvaged: f64,
}

#[allow(clippy::cast_precision_loss)]
fn mean(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

fn mean_of(runs: &[&RunRecord], metric: impl Fn(&RunRecord) -> f64) -> f64 {
    mean(runs.iter().copied().map(metric).sum(), runs.len())
}

fn pct(hits: usize, count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let hits = hits as f64;
    mean(hits * 100.0, count)
}

#[must_use]
pub fn aggregate_runs(records: &[RunRecord]) -> Vec<StrategyAggregate> {
    let mut grouped: BTreeMap<AutopilotStrategy, Vec<&RunRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.strategy).or_default().push(record);
    }

    grouped
        .into_iter()
        .map(|(strategy, runs)| {
            let count = runs.len();
            let outcome_count = |outcome: RunOutcome| {
                runs.iter()
                    .filter(|r| r.summary.outcome == Some(outcome))
                    .count()
            };
            StrategyAggregate {
                strategy,
                runs: count,
                secured_pct: pct(outcome_count(RunOutcome::Secured), count),
                lost_pct: pct(outcome_count(RunOutcome::Lost), count),
                breached_pct: pct(outcome_count(RunOutcome::Breached), count),
                incomplete: runs.iter().filter(|r| !r.completed).count(),
                retreat_pct: pct(runs.iter().filter(|r| r.retreated).count(), count),
                mean_scrap_banked: mean_of(&runs, |r| f64::from(r.summary.scrap_banked)),
                mean_nodes_visited: mean_of(&runs, |r| {
                    f64::from(u32::try_from(r.summary.nodes_visited).unwrap_or(u32::MAX))
                }),
                mean_hull_left: mean_of(&runs, |r| f64::from(r.summary.hull_left)),
                mean_steps: mean_of(&runs, |r| f64::from(r.summary.ledger.steps)),
                mean_items_salvaged: mean_of(&runs, |r| {
                    f64::from(r.summary.ledger.items_salvaged)
                }),
            }
        })
        .collect()
}

pub fn generate_console_report<W: Write>(
    out: &mut W,
    aggregates: &[StrategyAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Autopilot Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "============================".cyan())?;

    for agg in aggregates {
        let status = if agg.incomplete == 0 {
            "✅".green()
        } else {
            "⚠️ ".yellow()
        };
        writeln!(out, "{} {}", status, agg.strategy.label().bold())?;
        writeln!(out, "   Runs: {}", agg.runs)?;
        writeln!(
            out,
            "   Secured: {}  Lost: {}  Breached: {}",
            format!("{:.1}%", agg.secured_pct).green(),
            format!("{:.1}%", agg.lost_pct).red(),
            format!("{:.1}%", agg.breached_pct).red()
        )?;
        writeln!(out, "   Retreated: {:.1}%", agg.retreat_pct)?;
        writeln!(
            out,
            "   Mean scrap banked: {:.2}  nodes: {:.2}  hull: {:.2}  steps: {:.1}  items: {:.2}",
            agg.mean_scrap_banked,
            agg.mean_nodes_visited,
            agg.mean_hull_left,
            agg.mean_steps,
            agg.mean_items_salvaged
        )?;
        if agg.incomplete > 0 {
            writeln!(
                out,
                "   {}",
                format!("{} runs hit the step cap", agg.incomplete).yellow()
            )?;
        }
        writeln!(out)?;
    }

    if let Some(best) = aggregates
        .iter()
        .max_by(|a, b| a.mean_scrap_banked.total_cmp(&b.mean_scrap_banked))
    {
        writeln!(out, "{}", "⚡ Best Strategy".bright_yellow().bold())?;
        writeln!(out, "{}", "================".yellow())?;
        writeln!(
            out,
            "{} ({:.2} scrap per run)",
            best.strategy.label().green(),
            best.mean_scrap_banked
        )?;
    }
    writeln!(out, "Total time: {total_duration:?}")?;
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    aggregates: &'a [StrategyAggregate],
    runs: &'a [RunRecord],
}

pub fn generate_json_report<W: Write>(
    out: &mut W,
    aggregates: &[StrategyAggregate],
    runs: &[RunRecord],
) -> Result<()> {
    let report = JsonReport { aggregates, runs };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(
    out: &mut W,
    aggregates: &[StrategyAggregate],
) -> Result<()> {
    writeln!(out, "# Starsalvage Autopilot Results\n")?;
    writeln!(
        out,
        "| Strategy | Runs | Secured | Lost | Breached | Scrap | Nodes | Hull | Steps |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|---|---|")?;
    for agg in aggregates {
        writeln!(
            out,
            "| {} | {} | {:.1}% | {:.1}% | {:.1}% | {:.2} | {:.2} | {:.2} | {:.1} |",
            agg.strategy.label(),
            agg.runs,
            agg.secured_pct,
            agg.lost_pct,
            agg.breached_pct,
            agg.mean_scrap_banked,
            agg.mean_nodes_visited,
            agg.mean_hull_left,
            agg.mean_steps
        )?;
    }
    let incomplete: usize = aggregates.iter().map(|agg| agg.incomplete).sum();
    if incomplete > 0 {
        writeln!(out, "\n> {incomplete} runs hit the step cap.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use starsalvage_game::{RunLedger, RunStats, RunSummary};

    fn record(strategy: AutopilotStrategy, outcome: RunOutcome, scrap: u32) -> RunRecord {
        let stats = RunStats {
            hull: 2,
            max_hull: 3,
            fuel: 1.0,
            max_fuel: 8.0,
            scrap,
        };
        RunRecord {
            seed: 1,
            strategy,
            summary: RunSummary::new(1, Some(outcome), &stats, 3, RunLedger::default()),
            decisions: Vec::new(),
            retreated: false,
            completed: true,
        }
    }

    #[test]
    fn aggregates_group_by_strategy() {
        let records = vec![
            record(AutopilotStrategy::Greedy, RunOutcome::Secured, 4),
            record(AutopilotStrategy::Greedy, RunOutcome::Lost, 4),
            record(AutopilotStrategy::Cautious, RunOutcome::Secured, 1),
        ];
        let aggregates = aggregate_runs(&records);
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].strategy, AutopilotStrategy::Cautious);
        let greedy = &aggregates[1];
        assert_eq!(greedy.runs, 2);
        assert!((greedy.secured_pct - 50.0).abs() < f64::EPSILON);
        assert!((greedy.mean_scrap_banked - 2.0).abs() < f64::EPSILON);
        assert!((greedy.mean_nodes_visited - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn markdown_report_lists_each_strategy() {
        let aggregates = aggregate_runs(&[record(AutopilotStrategy::Balanced, RunOutcome::Secured, 2)]);
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &aggregates).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("| Balanced | 1 | 100.0% |"));
    }

    #[test]
    fn json_report_carries_runs() {
        let records = vec![record(AutopilotStrategy::Greedy, RunOutcome::Secured, 3)];
        let aggregates = aggregate_runs(&records);
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &aggregates, &records).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["aggregates"][0]["strategy"], "greedy");
        assert_eq!(value["runs"][0]["summary"]["scrap_banked"], 3);
    }
}
