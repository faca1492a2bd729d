//! Append-only per-variable histories accumulated across steps.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::emulator::SimulationOutput;
use crate::sim::types::TIME_KEY;

/// Ordered history of every tracked variable, all columns sharing the
/// same length and index semantics: position `i` across all keys is
/// one simulated instant.
///
/// The bench keeps two of these, one for measurements and one for
/// echoed control inputs. Serializes as a plain name-to-series map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrajectoryStore {
    columns: BTreeMap<String, Vec<f64>>,
}

impl TrajectoryStore {
    /// Creates an empty store keyed by [`TIME_KEY`] plus `variables`.
    pub fn new<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns = BTreeMap::new();
        columns.insert(TIME_KEY.to_string(), Vec::new());
        for name in variables {
            columns.insert(name.into(), Vec::new());
        }
        Self { columns }
    }

    /// Iterates tracked variable names, [`TIME_KEY`] included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Returns `true` when `name` is tracked by this store.
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Returns the accumulated series for `name`, if tracked.
    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Number of accumulated samples, taken from the time column.
    pub fn len(&self) -> usize {
        self.columns.get(TIME_KEY).map_or(0, Vec::len)
    }

    /// Returns `true` when no samples have been accumulated yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends one step's result, dropping each returned column's first
    /// row. That row restates the window start, which the previous
    /// step's merge already recorded; keeping it would duplicate every
    /// boundary sample.
    ///
    /// The caller must have checked that `output` covers every tracked
    /// key with equal-length columns of at least two rows.
    pub fn merge_step(&mut self, output: &SimulationOutput) {
        for (name, series) in &mut self.columns {
            let Some(returned) = output.columns.get(name) else {
                debug_assert!(false, "emulator output missing column {name}");
                continue;
            };
            debug_assert!(returned.len() >= 2, "column {name} shorter than a window");
            if returned.len() > 1 {
                series.extend_from_slice(&returned[1..]);
            }
        }
    }
}

/// Read-only snapshot over both stores, the shape returned by
/// [`TestBench::results`](crate::sim::bench::TestBench::results).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrajectoryResults<'a> {
    /// Measurement histories.
    pub y: &'a TrajectoryStore,
    /// Echoed control input histories.
    pub u: &'a TrajectoryStore,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(rows: &[(f64, f64)]) -> SimulationOutput {
        let mut out = SimulationOutput::new();
        out.columns.insert(
            TIME_KEY.to_string(),
            rows.iter().map(|&(t, _)| t).collect(),
        );
        out.columns.insert(
            "zoneTemp".to_string(),
            rows.iter().map(|&(_, v)| v).collect(),
        );
        out
    }

    #[test]
    fn new_store_tracks_time_and_variables() {
        let store = TrajectoryStore::new(["zoneTemp", "heaterPower"]);
        let keys: Vec<_> = store.keys().collect();
        assert_eq!(keys, vec!["heaterPower", "time", "zoneTemp"]);
        assert!(store.is_empty());
    }

    #[test]
    fn merge_drops_the_window_start_row() {
        let mut store = TrajectoryStore::new(["zoneTemp"]);
        store.merge_step(&output(&[(0.0, 20.0), (150.0, 20.2), (300.0, 20.5)]));

        assert_eq!(store.series("time"), Some(&[150.0, 300.0][..]));
        assert_eq!(store.series("zoneTemp"), Some(&[20.2, 20.5][..]));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn consecutive_merges_keep_boundary_samples_unique() {
        let mut store = TrajectoryStore::new(["zoneTemp"]);
        store.merge_step(&output(&[(0.0, 20.0), (300.0, 20.5)]));
        store.merge_step(&output(&[(300.0, 20.5), (600.0, 20.9)]));

        let time = store.series("time").unwrap();
        assert_eq!(time, &[300.0, 600.0]);
        assert_eq!(time.iter().filter(|&&t| t == 300.0).count(), 1);
    }

    #[test]
    fn columns_stay_equal_length_across_merges() {
        let mut store = TrajectoryStore::new(["zoneTemp"]);
        store.merge_step(&output(&[(0.0, 20.0), (100.0, 20.1), (200.0, 20.2), (300.0, 20.3)]));
        store.merge_step(&output(&[(300.0, 20.3), (600.0, 20.6)]));

        let lengths: Vec<_> = store
            .keys()
            .map(|key| store.series(key).unwrap().len())
            .collect();
        assert!(lengths.iter().all(|&len| len == store.len()));
        assert_eq!(store.len(), 4);
    }
}
