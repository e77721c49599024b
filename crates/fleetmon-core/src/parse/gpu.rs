use crate::record::GpuRecord;

use super::Parsed;

// nvidia-smi prints a two-line banner before the table body.
const BANNER_LINES: usize = 2;
// A usable body row splits into at least this many fields.
const MIN_FIELDS: usize = 13;

/// Parse `nvidia-smi` default table output into GPU records.
///
/// The column indices assume the tool's fixed layout; a row from a version
/// that lays out differently will come up short and be counted in
/// `dropped`. The sentinel text substituted when the tool is absent never
/// survives the banner skip, so it parses to zero records.
pub fn parse_gpu_table(raw: &str) -> Parsed<GpuRecord> {
    let mut records = Vec::new();
    let mut dropped = 0;

    for line in raw.trim().lines().skip(BANNER_LINES) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            dropped += 1;
            continue;
        }
        records.push(GpuRecord {
            index: fields[1].to_string(),
            name: fields[2].to_string(),
            memory_used: fields[8].to_string(),
            memory_total: fields[10].to_string(),
            utilization: fields[12].to_string(),
        });
    }

    Parsed { records, dropped }
}
