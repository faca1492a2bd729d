//! The stepwise test bench around a black-box emulator.
//!
//! This is the heart of the crate: time bookkeeping, input validation
//! and clamping, the per-step emulator call, merging results into the
//! cumulative trajectory stores, and decision-latency instrumentation.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::config::BenchConfig;
use crate::data::{self, BoundaryData};
use crate::emulator::{Causality, Emulator, INTERFACE_VERSION, SimulationOutput};
use crate::error::BenchError;
use crate::forecast::Forecaster;
use crate::sim::clock::SimClock;
use crate::sim::diagnostics::Diagnostic;
use crate::sim::kpi::{KpiReport, KpiSpec};
use crate::sim::metadata::{VariableMetadata, build_metadata};
use crate::sim::store::{TrajectoryResults, TrajectoryStore};
use crate::sim::types::{
    ForecastParameters, InputRequest, InputTrajectory, OutputSample, TIME_KEY, is_activation_flag,
};

/// Construction-time defaults, restored verbatim on reset.
#[derive(Debug, Clone, Copy)]
struct BenchDefaults {
    step: f64,
    horizon: f64,
    interval: f64,
}

/// All mutable run state, replaced wholesale on reset.
#[derive(Debug)]
struct BenchState {
    clock: SimClock,
    forecast: ForecastParameters,
    y_store: TrajectoryStore,
    u_store: TrajectoryStore,
    latest: Option<OutputSample>,
    elapsed: Vec<f64>,
    pending: Option<Instant>,
    diagnostics: Vec<Diagnostic>,
}

impl BenchState {
    fn initial(defaults: &BenchDefaults, output_names: &[String], input_names: &[String]) -> Self {
        Self {
            clock: SimClock::new(defaults.step),
            forecast: ForecastParameters {
                horizon: defaults.horizon,
                interval: defaults.interval,
            },
            y_store: TrajectoryStore::new(output_names.iter().cloned()),
            u_store: TrajectoryStore::new(input_names.iter().cloned()),
            latest: None,
            elapsed: Vec::new(),
            pending: None,
            diagnostics: Vec::new(),
        }
    }
}

/// Drives one emulator instance one control interval at a time.
///
/// A `TestBench` owns the emulator for its whole lifetime. External
/// control code repeatedly calls [`advance`](Self::advance) with the
/// input overrides for the upcoming interval; the bench validates and
/// clamps them, runs the emulator across `[start, start + step]`,
/// merges the returned samples into its cumulative histories, and
/// hands back the end-of-interval measurement sample.
///
/// All state is mutated in place and the bench is strictly
/// single-threaded: one `advance` completes before the next may begin,
/// and concurrent callers must serialize access at a higher layer.
///
/// A failed step commits nothing: the clock stays where it was and no
/// partial history is appended, so the same interval can be retried.
pub struct TestBench<E: Emulator> {
    emulator: E,
    input_names: Vec<String>,
    output_names: Vec<String>,
    inputs_metadata: BTreeMap<String, VariableMetadata>,
    outputs_metadata: BTreeMap<String, VariableMetadata>,
    boundary: BoundaryData,
    kpi_spec: KpiSpec,
    forecaster: Forecaster,
    defaults: BenchDefaults,
    state: BenchState,
}

impl<E: Emulator> TestBench<E> {
    /// Binds a bench to an emulator and loads its collaborators.
    ///
    /// Validates the configuration, checks the emulator's interface
    /// version against [`INTERFACE_VERSION`], enumerates the variable
    /// catalog into metadata and empty trajectory stores, and loads
    /// boundary data plus KPI definitions.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration, an interface-version
    /// mismatch, or unreadable boundary data. No partial bench is ever
    /// produced.
    pub fn new(emulator: E, config: &BenchConfig) -> Result<Self, BenchError> {
        if let Some(error) = config.validate().into_iter().next() {
            return Err(error.into());
        }

        let found = emulator.interface_version();
        if found != INTERFACE_VERSION {
            return Err(BenchError::UnsupportedInterface {
                found: found.to_string(),
                required: INTERFACE_VERSION,
            });
        }

        let catalog = emulator.variables().to_vec();
        let input_names: Vec<String> = catalog
            .iter()
            .filter(|spec| spec.causality == Causality::Input)
            .map(|spec| spec.name.clone())
            .collect();
        let output_names: Vec<String> = catalog
            .iter()
            .filter(|spec| spec.causality == Causality::Output)
            .map(|spec| spec.name.clone())
            .collect();
        let inputs_metadata = build_metadata(&catalog, Causality::Input);
        let outputs_metadata = build_metadata(&catalog, Causality::Output);

        let (boundary, kpi_spec) = data::load(config)?;

        let defaults = BenchDefaults {
            step: config.simulation.step,
            horizon: config.forecast.horizon,
            interval: config.forecast.interval,
        };
        let state = BenchState::initial(&defaults, &output_names, &input_names);

        Ok(Self {
            emulator,
            input_names,
            output_names,
            inputs_metadata,
            outputs_metadata,
            boundary,
            kpi_spec,
            forecaster: Forecaster,
            defaults,
            state,
        })
    }

    /// Advances the emulation forward one control interval.
    ///
    /// # Arguments
    ///
    /// * `request` - Input overrides for the upcoming interval; may be
    ///   empty, and entries set to `None` are skipped
    ///
    /// # Returns
    ///
    /// The measurement sample at the end of the interval, keyed by
    /// variable name and including `time`.
    ///
    /// # Errors
    ///
    /// Fails without committing anything when a written value is
    /// non-finite, targets an undeclared variable, or the emulator
    /// call itself fails or returns a malformed result. Out-of-bounds
    /// values are not errors: they are clamped and recorded in
    /// [`diagnostics`](Self::diagnostics).
    pub fn advance(&mut self, request: &InputRequest) -> Result<OutputSample, BenchError> {
        // 1. Capture how long the caller took to decide since the last
        //    completed step.
        if let Some(pending) = &self.state.pending {
            self.state.elapsed.push(pending.elapsed().as_secs_f64());
        }

        // 2. Compute the step window.
        let (start_time, final_time) = self.state.clock.window();
        let initialize = self.state.clock.initializing();

        // 3. Validate and clamp the request into a trajectory.
        let input = build_input_trajectory(
            &self.inputs_metadata,
            request,
            start_time,
            &mut self.state.diagnostics,
        )?;

        // 4. Delegate to the emulator.
        let output = self
            .emulator
            .simulate(start_time, final_time, initialize, input.as_ref())?;

        // 5. Check the result shape before touching any state, then
        //    merge histories and capture the end-of-interval sample.
        check_output_shape(&output, &self.state.y_store, &self.state.u_store)?;
        let sample = end_of_step_sample(&output, &self.output_names);
        self.state.y_store.merge_step(&output);
        self.state.u_store.merge_step(&output);
        self.state.latest = Some(sample.clone());

        // 6. Commit the window and stamp the next latency measurement.
        self.state.clock.advance();
        self.state.pending = Some(Instant::now());

        Ok(sample)
    }

    /// Short name of the bound emulator model.
    pub fn name(&self) -> &str {
        self.emulator.model_name()
    }

    /// Metadata for every declared control input.
    pub fn inputs(&self) -> &BTreeMap<String, VariableMetadata> {
        &self.inputs_metadata
    }

    /// Metadata for every declared measurement.
    pub fn measurements(&self) -> &BTreeMap<String, VariableMetadata> {
        &self.outputs_metadata
    }

    /// Read-only view over both accumulated trajectory stores.
    pub fn results(&self) -> TrajectoryResults<'_> {
        TrajectoryResults {
            y: &self.state.y_store,
            u: &self.state.u_store,
        }
    }

    /// Measurement sample from the end of the most recent step, if any
    /// step has completed since construction or reset.
    pub fn latest(&self) -> Option<&OutputSample> {
        self.state.latest.as_ref()
    }

    /// Current step window length in seconds.
    pub fn step(&self) -> f64 {
        self.state.clock.step()
    }

    /// Replaces the step length used by subsequent `advance` calls.
    ///
    /// # Errors
    ///
    /// Rejects values that are not positive finite numbers; accepting
    /// one would break the strictly increasing time history.
    pub fn set_step(&mut self, step: f64) -> Result<(), BenchError> {
        if !(step.is_finite() && step > 0.0) {
            return Err(BenchError::InvalidParameter {
                name: "step",
                value: step,
                constraint: "must be a positive number of seconds",
            });
        }
        self.state.clock.set_step(step);
        Ok(())
    }

    /// Current forecast window configuration.
    pub fn forecast_parameters(&self) -> ForecastParameters {
        self.state.forecast
    }

    /// Replaces the forecast horizon and sampling interval.
    ///
    /// # Errors
    ///
    /// Rejects values that are not non-negative finite numbers.
    pub fn set_forecast_parameters(
        &mut self,
        horizon: f64,
        interval: f64,
    ) -> Result<(), BenchError> {
        if !(horizon.is_finite() && horizon >= 0.0) {
            return Err(BenchError::InvalidParameter {
                name: "horizon",
                value: horizon,
                constraint: "must be zero or more seconds",
            });
        }
        if !(interval.is_finite() && interval >= 0.0) {
            return Err(BenchError::InvalidParameter {
                name: "interval",
                value: interval,
                constraint: "must be zero or more seconds",
            });
        }
        self.state.forecast = ForecastParameters { horizon, interval };
        Ok(())
    }

    /// Boundary-data forecast from the current simulation time over
    /// the configured horizon and interval.
    pub fn forecast(&self) -> BTreeMap<String, Vec<f64>> {
        let ForecastParameters { horizon, interval } = self.state.forecast;
        self.forecaster.forecast(
            &self.boundary,
            self.state.clock.start_time(),
            horizon,
            interval,
        )
    }

    /// Scores the run so far against the loaded KPI definitions.
    pub fn kpis(&self) -> KpiReport {
        KpiReport::from_stores(
            &self.kpi_spec,
            &self.state.y_store,
            &self.state.u_store,
            &self.state.elapsed,
            self.state.clock.step(),
        )
    }

    /// Wall-clock decision latencies, one per `advance` call after the
    /// first.
    pub fn elapsed_control_time(&self) -> &[f64] {
        &self.state.elapsed
    }

    /// Clamping diagnostics accumulated since construction or reset.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.state.diagnostics
    }

    /// Discards all history and returns the bench to its construction
    /// state: empty stores, time zero, default step and forecast
    /// parameters, and an initializing first step.
    pub fn reset(&mut self) {
        self.state = BenchState::initial(&self.defaults, &self.output_names, &self.input_names);
    }

    /// The bound emulator.
    pub fn emulator(&self) -> &E {
        &self.emulator
    }
}

/// Turns a request into the piecewise-constant trajectory for one step.
///
/// Returns `None` when nothing is written, so the emulator runs on its
/// internal defaults. Entries set to `None` and any entry named
/// [`TIME_KEY`] are skipped. Written values must be finite and target
/// a declared input; non-flag values are clamped to their declared
/// bounds, recording a [`Diagnostic`] per truncation.
fn build_input_trajectory(
    metadata: &BTreeMap<String, VariableMetadata>,
    request: &InputRequest,
    start_time: f64,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Option<InputTrajectory>, BenchError> {
    if !request.has_written() {
        return Ok(None);
    }

    let mut values = Vec::new();
    for (name, value) in request.entries() {
        let Some(value) = value else { continue };
        if name == TIME_KEY {
            continue;
        }
        if !value.is_finite() {
            return Err(BenchError::NonFiniteInput {
                variable: name.to_string(),
            });
        }
        let Some(record) = metadata.get(name) else {
            return Err(BenchError::UnknownInput {
                variable: name.to_string(),
            });
        };
        let applied = if is_activation_flag(name) {
            value
        } else {
            clamp_to_bounds(name, value, record, diagnostics)
        };
        values.push((name.to_string(), applied));
    }

    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(InputTrajectory { start_time, values }))
}

/// Truncates `value` to the declared bounds, maximum checked first.
/// In-range values pass through untouched, so the rule is idempotent.
fn clamp_to_bounds(
    name: &str,
    value: f64,
    record: &VariableMetadata,
    diagnostics: &mut Vec<Diagnostic>,
) -> f64 {
    if let Some(max) = record.maximum {
        if value > max {
            diagnostics.push(Diagnostic::above_maximum(name, value, max));
            return max;
        }
    }
    if let Some(min) = record.minimum {
        if value < min {
            diagnostics.push(Diagnostic::below_minimum(name, value, min));
            return min;
        }
    }
    value
}

fn check_output_shape(
    output: &SimulationOutput,
    y_store: &TrajectoryStore,
    u_store: &TrajectoryStore,
) -> Result<(), BenchError> {
    let Some(time) = output.column(TIME_KEY) else {
        return Err(malformed("missing time column"));
    };
    if time.len() < 2 {
        return Err(malformed("fewer than two sample rows"));
    }
    for key in y_store.keys().chain(u_store.keys()) {
        match output.column(key) {
            None => return Err(malformed(&format!("missing column {key}"))),
            Some(column) if column.len() != time.len() => {
                return Err(malformed(&format!(
                    "column {key} has {} rows, time has {}",
                    column.len(),
                    time.len()
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn malformed(reason: &str) -> BenchError {
    BenchError::MalformedOutput {
        reason: reason.to_string(),
    }
}

/// Builds the end-of-interval sample from the last returned row: the
/// reported time plus every declared measurement.
fn end_of_step_sample(output: &SimulationOutput, output_names: &[String]) -> OutputSample {
    let mut sample = OutputSample::new();
    if let Some(time) = output.last(TIME_KEY) {
        sample.insert(TIME_KEY.to_string(), time);
    }
    for name in output_names {
        if let Some(value) = output.last(name) {
            sample.insert(name.clone(), value);
        }
    }
    sample
}
