//! CSV export for accumulated bench trajectories.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::store::TrajectoryResults;
use crate::sim::types::TIME_KEY;

/// Exports both trajectory stores to a CSV file at the given path.
///
/// Writes a header row followed by one data row per accumulated
/// sample: the time column first, then every measurement series, then
/// every echoed input series, each in name order. Produces
/// deterministic output for identical inputs.
///
/// # Arguments
///
/// * `results` - Trajectory snapshot from a bench
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &TrajectoryResults<'_>, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes both trajectory stores as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &TrajectoryResults<'_>, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let y_names: Vec<&str> = results.y.keys().filter(|name| *name != TIME_KEY).collect();
    let u_names: Vec<&str> = results.u.keys().filter(|name| *name != TIME_KEY).collect();

    let mut header = vec![TIME_KEY];
    header.extend(&y_names);
    header.extend(&u_names);
    wtr.write_record(&header)?;

    let time = results.y.series(TIME_KEY).unwrap_or(&[]);
    for (row, instant) in time.iter().enumerate() {
        let mut record = vec![format!("{instant:.1}")];
        for name in &y_names {
            record.push(format_cell(results.y.series(name), row));
        }
        for name in &u_names {
            record.push(format_cell(results.u.series(name), row));
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

fn format_cell(series: Option<&[f64]>, row: usize) -> String {
    match series.and_then(|values| values.get(row)) {
        Some(value) => format!("{value:.4}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::SimulationOutput;
    use crate::sim::store::TrajectoryStore;

    fn store_from(variables: &[&str], rows: &[(f64, &[f64])]) -> TrajectoryStore {
        let mut store = TrajectoryStore::new(variables.iter().copied());
        let mut output = SimulationOutput::new();
        // prepend a sentinel row so the merge keeps every listed one
        let mut time = vec![rows[0].0 - 1.0];
        time.extend(rows.iter().map(|&(t, _)| t));
        output.columns.insert(TIME_KEY.to_string(), time);
        for (idx, name) in variables.iter().enumerate() {
            let mut column = vec![rows[0].1[idx]];
            column.extend(rows.iter().map(|&(_, values)| values[idx]));
            output.columns.insert((*name).to_string(), column);
        }
        store.merge_step(&output);
        store
    }

    fn sample_results() -> (TrajectoryStore, TrajectoryStore) {
        let y = store_from(
            &["zoneTemp", "heaterPower"],
            &[
                (150.0, &[20.1, 3.0]),
                (300.0, &[20.4, 2.8]),
                (450.0, &[20.6, 2.5]),
            ],
        );
        let u = store_from(
            &["heatingSetpoint"],
            &[(150.0, &[22.0]), (300.0, &[22.0]), (450.0, &[23.0])],
        );
        (y, u)
    }

    #[test]
    fn header_lists_time_then_measurements_then_inputs() {
        let (y, u) = sample_results();
        let results = TrajectoryResults { y: &y, u: &u };
        let mut buf = Vec::new();
        write_csv(&results, &mut buf).ok();

        let output = String::from_utf8(buf).ok();
        let first_line = output.as_deref().unwrap_or("").lines().next().unwrap_or("");
        assert_eq!(first_line, "time,heaterPower,zoneTemp,heatingSetpoint");
    }

    #[test]
    fn row_count_matches_sample_count() {
        let (y, u) = sample_results();
        let results = TrajectoryResults { y: &y, u: &u };
        let mut buf = Vec::new();
        write_csv(&results, &mut buf).ok();

        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        // 1 header + 3 data rows
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn deterministic_output() {
        let (y, u) = sample_results();
        let results = TrajectoryResults { y: &y, u: &u };
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_csv(&results, &mut buf1).ok();
        write_csv(&results, &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn round_trip_parseable() {
        let (y, u) = sample_results();
        let results = TrajectoryResults { y: &y, u: &u };
        let mut buf = Vec::new();
        write_csv(&results, &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(4));

        let mut row_count = 0;
        for record in rdr.records() {
            let rec = record.ok();
            assert!(rec.is_some(), "every row should parse");
            for field in rec.iter().flat_map(csv::StringRecord::iter) {
                let value: Result<f64, _> = field.parse();
                assert!(value.is_ok(), "field {field:?} should parse as f64");
            }
            row_count += 1;
        }
        assert_eq!(row_count, 3);
    }

    #[test]
    fn empty_stores_export_header_only() {
        let y = TrajectoryStore::new(["zoneTemp"]);
        let u = TrajectoryStore::new(["heatingSetpoint"]);
        let results = TrajectoryResults { y: &y, u: &u };
        let mut buf = Vec::new();
        write_csv(&results, &mut buf).ok();

        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        assert_eq!(lines, vec!["time,zoneTemp,heatingSetpoint"]);
    }
}
