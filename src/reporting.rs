//! Plain-text presentation of step samples, KPI reports, and
//! clamping diagnostics.

use crate::sim::diagnostics::Diagnostic;
use crate::sim::kpi::KpiReport;
use crate::sim::types::{OutputSample, TIME_KEY};

/// Formats one end-of-step sample as a single readable line.
pub fn format_step_line(sample: &OutputSample) -> String {
    let time = sample.get(TIME_KEY).copied().unwrap_or(f64::NAN);
    let mut line = format!("Time (s) {time:.0}:");
    let mut first = true;
    for (name, value) in sample {
        if name == TIME_KEY {
            continue;
        }
        let sep = if first { " " } else { ", " };
        line.push_str(&format!("{sep}{name}={value:.2}"));
        first = false;
    }
    line
}

pub fn print_step_line(sample: &OutputSample) {
    println!("{}", format_step_line(sample));
}

pub fn print_kpi_report(report: &KpiReport) {
    println!("\n{report}");
}

/// Prints every clamping diagnostic on its own line, or nothing when
/// the run stayed in range.
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!("\n--- Diagnostics ---");
    for diagnostic in diagnostics {
        println!("{diagnostic}");
    }
}

#[cfg(test)]
mod tests {
    use super::format_step_line;
    use crate::sim::types::OutputSample;

    #[test]
    fn step_line_lists_every_measurement_once() {
        let mut sample = OutputSample::new();
        sample.insert("time".to_string(), 300.0);
        sample.insert("zoneTemp".to_string(), 20.456);
        sample.insert("heaterPower".to_string(), 3.1);

        let line = format_step_line(&sample);
        assert_eq!(line, "Time (s) 300: heaterPower=3.10, zoneTemp=20.46");
    }

    #[test]
    fn step_line_tolerates_missing_time() {
        let mut sample = OutputSample::new();
        sample.insert("zoneTemp".to_string(), 20.0);
        let line = format_step_line(&sample);
        assert!(line.contains("zoneTemp=20.00"));
    }
}
