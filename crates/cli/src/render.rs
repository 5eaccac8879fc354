//! Terminal rendering of engine snapshots

use anyhow::Result;
use colored::Colorize;
use queuesim_core::domain::Snapshot;
use tabled::{Table, Tabled};

/// Utilization above this is highlighted
const HIGH_UTILIZATION_PERCENT: f64 = 80.0;

const PROGRESS_BAR_WIDTH: usize = 20;

/// Queue entries listed before eliding the rest
const MAX_BACKLOG_SHOWN: usize = 12;

#[derive(Tabled)]
struct MetricRow {
    metric: &'static str,
    value: String,
}

#[derive(Tabled)]
struct WorkerRow {
    worker: String,
    status: String,
    job: String,
    progress: String,
}

pub struct Renderer {
    json: bool,
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn render(&self, snapshot: &Snapshot) -> Result<()> {
        if self.json {
            println!("{}", snapshot.to_json()?);
            return Ok(());
        }

        let status = if snapshot.running {
            "RUNNING".green().bold()
        } else {
            "STOPPED".red().bold()
        };
        println!();
        println!("{} {}", "Queue Simulator".cyan().bold(), status);
        println!("{}", metric_table(snapshot));
        println!("  {} {}", "Backlog:".bold(), backlog_line(snapshot));
        println!("{}", worker_table(snapshot));
        Ok(())
    }

    /// Final report printed on exit
    pub fn render_summary(&self, snapshot: &Snapshot) -> Result<()> {
        if self.json {
            println!("{}", snapshot.to_json()?);
            return Ok(());
        }

        println!();
        println!("{}", "✓ Simulation finished".green().bold());
        println!("{}", metric_table(snapshot));
        Ok(())
    }
}

// Cells carry colour codes; tabled's `ansi` feature measures visible width
fn metric_table(snapshot: &Snapshot) -> String {
    Table::new(metric_rows(snapshot)).to_string()
}

fn worker_table(snapshot: &Snapshot) -> String {
    Table::new(worker_rows(snapshot)).to_string()
}

fn metric_rows(snapshot: &Snapshot) -> Vec<MetricRow> {
    let utilization = format!("{:.1}%", snapshot.utilization);
    let utilization = if snapshot.utilization > HIGH_UTILIZATION_PERCENT {
        utilization.yellow().to_string()
    } else {
        utilization.green().to_string()
    };
    let metrics = &snapshot.lead_time_metrics;

    vec![
        MetricRow {
            metric: "Worker Utilization",
            value: utilization,
        },
        MetricRow {
            metric: "Current Queue",
            value: snapshot.queued_jobs.len().to_string(),
        },
        MetricRow {
            metric: "Peak Queue Size",
            value: snapshot.max_queue_size_observed.to_string(),
        },
        MetricRow {
            metric: "Total Jobs",
            value: snapshot.total_jobs_created.to_string(),
        },
        MetricRow {
            metric: "Avg Lead Time",
            value: format_secs(metrics.average_ms),
        },
        MetricRow {
            metric: "Max Lead Time",
            value: format_secs(metrics.max_ms as f64),
        },
        MetricRow {
            metric: "Completed Jobs",
            value: metrics.completed.to_string(),
        },
    ]
}

fn worker_rows(snapshot: &Snapshot) -> Vec<WorkerRow> {
    snapshot
        .workers
        .iter()
        .map(|w| WorkerRow {
            worker: format!("Worker {}", w.id),
            status: if w.busy {
                "Processing".green().to_string()
            } else {
                "Idle".dimmed().to_string()
            },
            job: w
                .current_job
                .as_ref()
                .map(|j| format!("Job {} ({})", j.id, format_secs(j.processing_time_ms as f64)))
                .unwrap_or_else(|| "-".to_string()),
            progress: progress_bar(w.progress, PROGRESS_BAR_WIDTH),
        })
        .collect()
}

fn backlog_line(snapshot: &Snapshot) -> String {
    if snapshot.queued_jobs.is_empty() {
        return "No jobs in queue".italic().to_string();
    }
    let mut line = snapshot
        .queued_jobs
        .iter()
        .take(MAX_BACKLOG_SHOWN)
        .map(|j| format!("#{} ({})", j.id, format_secs(j.processing_time_ms as f64)))
        .collect::<Vec<_>>()
        .join(" ");
    if snapshot.queued_jobs.len() > MAX_BACKLOG_SHOWN {
        line.push_str(&format!(" … +{}", snapshot.queued_jobs.len() - MAX_BACKLOG_SHOWN));
    }
    line
}

/// Milliseconds as seconds with one decimal
pub fn format_secs(ms: f64) -> String {
    format!("{:.1}s", ms / 1000.0)
}

/// Fixed-width bar with the percentage appended
pub fn progress_bar(percent: f64, width: usize) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        percent
    )
}
