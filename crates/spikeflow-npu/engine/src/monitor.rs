// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recorded time series of one run

use std::collections::BTreeMap;
use std::ops::Index;

use ndarray::{Array1, Array2, Axis, Ix1, Ix2};
use spikeflow_npu_neural::NeuState;
use spikeflow_npu_runtime::{OperatorTable, RuntimeError, Tensor};

use crate::error::{Result, SimError};

/// Monitored variables of one run plus the sample times
///
/// Created fresh by every run and fully written before it is returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Monitors {
    ts: Array1<f64>,
    series: BTreeMap<String, Tensor>,
}

impl Monitors {
    /// Sample times, one per step
    pub fn ts(&self) -> &Array1<f64> {
        &self.ts
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.series.get(name)
    }

    /// Monitored variable names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Number of monitored variables (`ts` not included)
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of recorded steps
    pub fn steps(&self) -> usize {
        self.ts.len()
    }
}

impl Index<&str> for Monitors {
    type Output = Tensor;

    /// # Panics
    /// Panics if `name` was not monitored.
    fn index(&self, name: &str) -> &Tensor {
        match self.series.get(name) {
            Some(series) => series,
            None => panic!("\"{name}\" was not monitored"),
        }
    }
}

/// How a recorder samples the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sampling {
    /// Whole variable row per step, series shaped `(steps, num)`
    Units,
    /// Unit 0 of a vector-based state, series shaped `(steps,)`
    FirstUnit,
    /// Bare scalar of a single-unit scalar state, series shaped `(steps,)`
    Scalar,
}

/// Preallocated monitor buffers filled during a run
pub(crate) struct MonitorRecorder {
    names: Vec<String>,
    buffers: Vec<Array2<f64>>,
    sampling: Sampling,
}

impl MonitorRecorder {
    pub(crate) fn new(
        names: &[String],
        steps: usize,
        num: usize,
        sampling: Sampling,
        ops: &OperatorTable,
    ) -> Result<Self> {
        let width = match sampling {
            Sampling::Units => num,
            Sampling::FirstUnit | Sampling::Scalar => 1,
        };
        let buffers = names
            .iter()
            .map(|_| {
                ops.zeros(&[steps, width])
                    .into_dimensionality::<Ix2>()
                    .map_err(|e| {
                        SimError::from(RuntimeError::ShapeMismatch(format!(
                            "zeros did not return a ({steps}, {width}) buffer: {e}"
                        )))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            names: names.to_vec(),
            buffers,
            sampling,
        })
    }

    /// Copy the monitored variables of `state` into row `i`
    pub(crate) fn record(&mut self, i: usize, state: &NeuState) -> Result<()> {
        for (name, buffer) in self.names.iter().zip(self.buffers.iter_mut()) {
            match self.sampling {
                Sampling::Units => buffer.row_mut(i).assign(&state.var(name)?),
                Sampling::FirstUnit => buffer[[i, 0]] = state.var(name)?[0],
                Sampling::Scalar => buffer[[i, 0]] = state.scalar(name)?,
            }
        }
        Ok(())
    }

    pub(crate) fn finish(self, ts: Array1<f64>) -> Monitors {
        let squeeze = self.sampling != Sampling::Units;
        let series = self
            .names
            .into_iter()
            .zip(self.buffers)
            .map(|(name, buffer)| {
                let series = if squeeze {
                    buffer.index_axis_move(Axis(1), 0).into_dyn()
                } else {
                    buffer.into_dyn()
                };
                (name, series)
            })
            .collect();
        Monitors { ts, series }
    }
}

/// Sample times `[start, end)` with step `dt`, from the operator table's `arange`
pub(crate) fn time_axis(start: f64, end: f64, dt: f64, ops: &OperatorTable) -> Result<Array1<f64>> {
    let times = ops.arange(start, end, dt)?;
    let times = times.into_dimensionality::<Ix1>().map_err(|e| {
        RuntimeError::ShapeMismatch(format!("arange did not return a 1-d tensor: {e}"))
    })?;
    Ok(times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spikeflow_npu_neural::{Layout, StateTemplate};

    #[test]
    fn test_recorder_fills_unit_rows() {
        let ops = OperatorTable::host();
        let mut state = StateTemplate::new([("v", 0.0), ("w", 1.0)])
            .unwrap()
            .make_copy(3, Layout::Vector, &ops)
            .unwrap();
        let names = vec!["v".to_string()];
        let mut recorder = MonitorRecorder::new(&names, 2, 3, Sampling::Units, &ops).unwrap();

        recorder.record(0, &state).unwrap();
        state.set("v", 2.0).unwrap();
        recorder.record(1, &state).unwrap();

        let mon = recorder.finish(time_axis(0.0, 2.0, 1.0, &ops).unwrap());
        assert_eq!(mon.len(), 1);
        assert_eq!(mon.steps(), 2);
        assert_eq!(mon["v"].shape(), &[2, 3]);
        assert_eq!(mon["v"][[1, 2]], 2.0);
        assert!(mon.get("w").is_none());
    }

    #[test]
    fn test_first_unit_sampling_is_one_dimensional() {
        let ops = OperatorTable::host();
        let state = StateTemplate::new([("v", 4.0)])
            .unwrap()
            .make_copy(1, Layout::Vector, &ops)
            .unwrap();
        let names = vec!["v".to_string()];
        let mut recorder = MonitorRecorder::new(&names, 1, 1, Sampling::FirstUnit, &ops).unwrap();
        recorder.record(0, &state).unwrap();
        let mon = recorder.finish(time_axis(0.0, 1.0, 1.0, &ops).unwrap());
        assert_eq!(mon["v"].shape(), &[1]);
        assert_eq!(mon["v"][[0]], 4.0);
    }

    #[test]
    fn test_scalar_sampling_needs_scalar_layout() {
        let ops = OperatorTable::host();
        let state = StateTemplate::new([("v", 4.0)])
            .unwrap()
            .make_copy(1, Layout::Vector, &ops)
            .unwrap();
        let names = vec!["v".to_string()];
        let mut recorder = MonitorRecorder::new(&names, 1, 1, Sampling::Scalar, &ops).unwrap();
        assert!(recorder.record(0, &state).is_err());
    }
}
