//! Terminal rendering of host reports.
//!
//! The renderer owns its output sink instead of printing through a global
//! console, so tests can render into a buffer. It reads records but never
//! mutates them; the 70% / 90% usage thresholds live here as pure display
//! policy.

use std::io::{self, Write};

use chrono::Local;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::style;

use fleetmon_core::{FetchResult, GpuRecord, HostReport, StorageRecord};

const WARN_PERCENT: u32 = 70;
const CRIT_PERCENT: u32 = 90;

pub struct Renderer<W: Write> {
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Render one full poll cycle: a dashboard header followed by every
    /// host section in report order.
    pub fn dashboard(&mut self, reports: &[HostReport]) -> io::Result<()> {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(self.out)?;
        writeln!(
            self.out,
            "{}  {}",
            style("Fleet Dashboard").bold().yellow(),
            style(format!("updated {now}")).dim()
        )?;
        writeln!(self.out, "Monitoring {} servers", reports.len())?;

        for report in reports {
            self.host_section(report)?;
        }
        Ok(())
    }

    fn host_section(&mut self, report: &HostReport) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "{} {}",
            style("Server:").bold().blue(),
            style(&report.target).bold()
        )?;

        match &report.result {
            FetchResult::Failure { message } => {
                writeln!(self.out, "  {} {}", style("Error:").red().bold(), message)
            }
            FetchResult::Success { gpus, storage } => {
                if gpus.is_empty() {
                    writeln!(self.out, "  {}", style("No GPU information available").yellow())?;
                } else {
                    writeln!(self.out, "{}", gpu_table(gpus))?;
                }
                writeln!(self.out, "{}", storage_table(storage))
            }
        }
    }
}

fn gpu_table(gpus: &[GpuRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("GPU").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Mem Used").add_attribute(Attribute::Bold),
        Cell::new("Mem Total").add_attribute(Attribute::Bold),
        Cell::new("Util").add_attribute(Attribute::Bold),
    ]);

    for gpu in gpus {
        table.add_row(vec![
            Cell::new(&gpu.index).fg(Color::Cyan),
            Cell::new(&gpu.name),
            Cell::new(&gpu.memory_used).fg(Color::Yellow),
            Cell::new(&gpu.memory_total).fg(Color::Yellow),
            Cell::new(&gpu.utilization).fg(Color::Blue),
        ]);
    }
    table
}

fn storage_table(storage: &[StorageRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Filesystem").add_attribute(Attribute::Bold),
        Cell::new("Size").add_attribute(Attribute::Bold),
        Cell::new("Used").add_attribute(Attribute::Bold),
        Cell::new("Avail").add_attribute(Attribute::Bold),
        Cell::new("Use%").add_attribute(Attribute::Bold),
        Cell::new("Mounted on").add_attribute(Attribute::Bold),
    ]);

    for disk in storage {
        table.add_row(vec![
            Cell::new(&disk.filesystem).fg(Color::Cyan),
            Cell::new(&disk.size),
            Cell::new(&disk.used),
            Cell::new(&disk.available),
            use_percent_cell(&disk.use_percent),
            Cell::new(&disk.mount_point).fg(Color::Green),
        ]);
    }
    table
}

fn use_percent_cell(use_percent: &str) -> Cell {
    match use_percent_color(use_percent) {
        Some(color) => Cell::new(use_percent).fg(color),
        None => Cell::new(use_percent),
    }
}

/// Color a Use% value by how full the filesystem is. Values the tool emits
/// in an unexpected shape render uncolored rather than dropping the row.
fn use_percent_color(use_percent: &str) -> Option<Color> {
    let pct = use_percent.trim_end_matches('%').parse::<u32>().ok()?;
    if pct > CRIT_PERCENT {
        Some(Color::Red)
    } else if pct > WARN_PERCENT {
        Some(Color::Yellow)
    } else {
        Some(Color::Green)
    }
}
