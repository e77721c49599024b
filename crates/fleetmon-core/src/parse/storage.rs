use crate::record::StorageRecord;

use super::Parsed;

// df prints a single header line above the data rows.
const HEADER_LINES: usize = 1;
const MIN_FIELDS: usize = 6;

/// Parse `df -h` output into storage records.
///
/// Rows with fewer than six fields (a wrapped device name, for instance)
/// are dropped and counted.
pub fn parse_storage_table(raw: &str) -> Parsed<StorageRecord> {
    let mut records = Vec::new();
    let mut dropped = 0;

    for line in raw.trim().lines().skip(HEADER_LINES) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            dropped += 1;
            continue;
        }
        records.push(StorageRecord {
            filesystem: fields[0].to_string(),
            size: fields[1].to_string(),
            used: fields[2].to_string(),
            available: fields[3].to_string(),
            use_percent: fields[4].to_string(),
            mount_point: fields[5].to_string(),
        });
    }

    Parsed { records, dropped }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DF_OUTPUT: &str = "\
Filesystem      Size  Used Avail Use% Mounted on
/dev/sda1       100G   91G    9G  91% /
tmpfs            32G     0   32G   0% /dev/shm
/dev/nvme0n1    1.8T  1.2T  600G  67% /data
";

    #[test]
    fn parses_df_rows_in_order() {
        let parsed = parse_storage_table(DF_OUTPUT);
        assert_eq!(parsed.records.len(), 3);
        assert_eq!(parsed.dropped, 0);

        let root = &parsed.records[0];
        assert_eq!(root.filesystem, "/dev/sda1");
        assert_eq!(root.size, "100G");
        assert_eq!(root.used, "91G");
        assert_eq!(root.available, "9G");
        assert_eq!(root.use_percent, "91%");
        assert_eq!(root.mount_point, "/");

        assert_eq!(parsed.records[2].mount_point, "/data");
    }

    #[test]
    fn use_percent_keeps_its_suffix() {
        let parsed = parse_storage_table(DF_OUTPUT);
        assert_eq!(parsed.records[0].use_percent, "91%");
        assert_eq!(parsed.records[1].use_percent, "0%");
    }

    #[test]
    fn short_row_is_dropped_and_counted() {
        let raw = "\
Filesystem      Size  Used Avail Use% Mounted on
/dev/sda1       100G   91G    9G  91% /
/dev/mapper/very-long-device-name
";
        let parsed = parse_storage_table(raw);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.dropped, 1);
    }

    #[test]
    fn header_only_output_yields_no_records() {
        let parsed = parse_storage_table("Filesystem Size Used Avail Use% Mounted on\n");
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.dropped, 0);
    }
}
