//! Simulation report generation.

use crate::core::tables::ROUTE;
use crate::core::tracks::Track;
use crate::utils::serde_u128_string;
use serde::Serialize;

/// What happened during one simulated player's run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub total_ticks: u64,
    pub total_clicks: u64,
    pub upgrades_bought: u32,
    pub rebirths: u32,
    /// Length of each completed cycle, in ticks
    pub ticks_per_rebirth: Vec<u64>,
    /// Tick at which each stage was first reached (index 0 = start)
    pub first_cycle_stage_ticks: Vec<u64>,
    #[serde(with = "serde_u128_string")]
    pub final_currency: u128,
    pub final_levels: [u32; 3],
    pub final_multipliers: [f64; 3],
    pub reached_target: bool,
}

/// Aggregated results from multiple simulation runs.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub num_runs: u32,
    pub runs_completed: u32,
    pub runs_timed_out: u32,

    pub avg_total_ticks: f64,
    pub avg_total_clicks: f64,
    pub avg_upgrades_bought: f64,
    pub avg_rebirths: f64,
    pub avg_ticks_to_first_rebirth: f64,
    pub avg_ticks_per_rebirth: f64,
    pub avg_final_multipliers: [f64; 3],

    /// Mean tick of first arrival per stage, over the runs that got there
    pub avg_stage_arrival: Vec<Option<f64>>,

    #[serde(skip)]
    pub run_stats: Vec<RunStats>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

impl SimReport {
    /// Create a new report from completed run stats.
    pub fn from_runs(runs: Vec<RunStats>, max_ticks: u64) -> Self {
        let num_runs = runs.len() as u32;
        let runs_completed = runs.iter().filter(|r| r.reached_target).count() as u32;
        let runs_timed_out = runs
            .iter()
            .filter(|r| !r.reached_target && r.total_ticks >= max_ticks)
            .count() as u32;

        let avg = |f: &dyn Fn(&RunStats) -> f64| mean(runs.iter().map(f)).unwrap_or(0.0);

        let avg_total_ticks = avg(&|r| r.total_ticks as f64);
        let avg_total_clicks = avg(&|r| r.total_clicks as f64);
        let avg_upgrades_bought = avg(&|r| r.upgrades_bought as f64);
        let avg_rebirths = avg(&|r| r.rebirths as f64);
        let avg_ticks_to_first_rebirth = mean(
            runs.iter()
                .filter_map(|r| r.ticks_per_rebirth.first().map(|&t| t as f64)),
        )
        .unwrap_or(0.0);
        let avg_ticks_per_rebirth = mean(
            runs.iter()
                .flat_map(|r| r.ticks_per_rebirth.iter().map(|&t| t as f64)),
        )
        .unwrap_or(0.0);

        let mut avg_final_multipliers = [0.0; 3];
        for track in Track::all() {
            avg_final_multipliers[track.index()] = avg(&|r| r.final_multipliers[track.index()]);
        }

        let avg_stage_arrival = (0..ROUTE.len())
            .map(|stage| {
                mean(
                    runs.iter()
                        .filter_map(|r| r.first_cycle_stage_ticks.get(stage).map(|&t| t as f64)),
                )
            })
            .collect();

        Self {
            num_runs,
            runs_completed,
            runs_timed_out,
            avg_total_ticks,
            avg_total_clicks,
            avg_upgrades_bought,
            avg_rebirths,
            avg_ticks_to_first_rebirth,
            avg_ticks_per_rebirth,
            avg_final_multipliers,
            avg_stage_arrival,
            run_stats: runs,
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                    SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Runs: {} total, {} completed, {} timed out\n\n",
            self.num_runs, self.runs_completed, self.runs_timed_out
        ));

        report.push_str("── PROGRESSION ──────────────────────────────────────────────────\n");
        report.push_str(&format!("  Avg Ticks:             {:.0}\n", self.avg_total_ticks));
        report.push_str(&format!("  Avg Clicks:            {:.0}\n", self.avg_total_clicks));
        report.push_str(&format!("  Avg Upgrades Bought:   {:.1}\n", self.avg_upgrades_bought));
        report.push_str(&format!("  Avg Rebirths:          {:.2}\n", self.avg_rebirths));
        report.push_str(&format!(
            "  Avg Ticks 1st Rebirth: {:.0}\n",
            self.avg_ticks_to_first_rebirth
        ));
        report.push_str(&format!(
            "  Avg Ticks per Rebirth: {:.0}\n\n",
            self.avg_ticks_per_rebirth
        ));

        report.push_str("── FIRST CYCLE ROUTE ────────────────────────────────────────────\n");
        for (stage, arrival) in ROUTE.iter().zip(&self.avg_stage_arrival) {
            match arrival {
                Some(tick) => report.push_str(&format!("  {:<10} {:>10.0}\n", stage.name, tick)),
                None => report.push_str(&format!("  {:<10} {:>10}\n", stage.name, "-")),
            }
        }
        report.push('\n');

        report.push_str("── PRESTIGE BONUSES ─────────────────────────────────────────────\n");
        for track in Track::all() {
            report.push_str(&format!(
                "  {:<10} x{:.2}\n",
                track.id(),
                self.avg_final_multipliers[track.index()]
            ));
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
