//! File driver: full-tape analysis into a line-oriented text report.

use crate::{
    aggregator::{Snapshot, TradeAggregator},
    error::AnalysisError,
};
use itertools::Itertools;
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};
use tracing::{debug, info};

/// Formats a snapshot as report lines, one
/// `symbol,max_time_gap,total_volume,weighted_average_price,max_trade_price`
/// row per symbol. Writing the lines anywhere is the caller's concern.
pub fn report_lines(snapshot: &Snapshot) -> impl Iterator<Item = String> {
    snapshot.iter().map(ToString::to_string)
}

/// Analyzes a whole tape file and writes the final per-symbol report.
///
/// Reads `input` to exhaustion, keeps only the final aggregator state, and
/// writes newline-joined report lines to `output`. Both file handles are
/// scoped to this call and released on return, error or not. The first parse
/// failure aborts the run.
pub fn analyze_file(input: &Path, output: &Path) -> Result<(), AnalysisError> {
    let reader = BufReader::new(File::open(input)?);

    let mut aggregator = TradeAggregator::new();
    let mut records = 0usize;
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        aggregator.apply_line(&line)?;
        records += 1;
    }
    debug!(records, symbols = aggregator.len(), "tape consumed");

    let snapshot = aggregator.snapshot()?;
    let mut writer = BufWriter::new(File::create(output)?);
    writer.write_all(report_lines(&snapshot).join("\n").as_bytes())?;
    writer.flush()?;

    info!(
        records,
        symbols = snapshot.len(),
        output = %output.display(),
        "trade report written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_analyze_file_writes_final_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tape.txt");
        let output = dir.path().join("report.csv");

        fs::write(
            &input,
            "100,ACME,10,50\n105,ACME,5,55\n110,ACME,5,45\n1,ZINC,2,7\n",
        )
        .unwrap();

        analyze_file(&input, &output).unwrap();

        let report = fs::read_to_string(&output).unwrap();
        assert_eq!(report, "ACME,5,20,52,55\nZINC,0,2,7,7");
    }

    #[test]
    fn test_analyze_file_propagates_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tape.txt");
        let output = dir.path().join("report.csv");

        fs::write(&input, "100,ACME,10,50\nnot-a-record\n").unwrap();

        assert!(matches!(
            analyze_file(&input, &output),
            Err(AnalysisError::Parse { .. })
        ));
    }

    #[test]
    fn test_analyze_file_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            analyze_file(&dir.path().join("absent.txt"), &dir.path().join("out.csv")),
            Err(AnalysisError::Io(_))
        ));
    }
}
