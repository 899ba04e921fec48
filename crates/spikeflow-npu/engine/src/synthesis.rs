// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Standalone Model Runs
//!
//! [`NeuType::run`] simulates one unit of a model without building a group:
//!
//! 1. time axis `arange(start, end, dt)` from the backend context
//! 2. one monitor buffer per requested variable, plus `ts`
//! 3. template copy with `vars_init` applied
//! 4. fresh single-unit state
//! 5. one-time binding of the first step function (`ST`, `t`, `i`, `dt` only)
//! 6. the loop: call, then sample monitors
//!
//! Vector-based models are sampled at unit 0 of each variable row; scalar-based
//! models are sampled through the scalar accessor. The two paths stay separate.

use std::collections::BTreeMap;

use spikeflow_npu_neural::{bind, BindScope, Layout};
use tracing::{debug, info};

use crate::backend::{self, BackendContext};
use crate::error::{Result, SimError};
use crate::model::NeuType;
use crate::monitor::{time_axis, MonitorRecorder, Monitors, Sampling};
use crate::runner::execution_error;

/// Length of a run, or explicit `[start, end)` bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Duration {
    /// `[0, length)`
    Length(f64),
    /// `[start, end)`
    Span(f64, f64),
}

impl Duration {
    /// Start and end time
    ///
    /// # Errors
    /// `InvalidDuration` for non-finite values, a non-positive length, or
    /// `start >= end`.
    pub fn bounds(&self) -> Result<(f64, f64)> {
        match *self {
            Duration::Length(length) if length.is_finite() && length > 0.0 => Ok((0.0, length)),
            Duration::Length(length) => Err(SimError::InvalidDuration(format!(
                "length must be finite and positive, got {length}"
            ))),
            Duration::Span(start, end) if start.is_finite() && end.is_finite() && start < end => {
                Ok((start, end))
            }
            Duration::Span(start, end) => Err(SimError::InvalidDuration(format!(
                "({start}, {end}) is not a finite span with start < end"
            ))),
        }
    }
}

impl From<f64> for Duration {
    fn from(length: f64) -> Self {
        Duration::Length(length)
    }
}

impl From<(f64, f64)> for Duration {
    fn from((start, end): (f64, f64)) -> Self {
        Duration::Span(start, end)
    }
}

impl From<[f64; 2]> for Duration {
    fn from([start, end]: [f64; 2]) -> Self {
        Duration::Span(start, end)
    }
}

impl TryFrom<&[f64]> for Duration {
    type Error = SimError;

    /// One value is a length, two are a span; anything else is malformed
    fn try_from(values: &[f64]) -> Result<Self> {
        match values {
            [length] => Ok(Duration::Length(*length)),
            [start, end] => Ok(Duration::Span(*start, *end)),
            other => Err(SimError::InvalidDuration(format!(
                "expected a length or a (start, end) pair, got {} values",
                other.len()
            ))),
        }
    }
}

impl NeuType {
    /// Simulate one unit against the process-wide backend context
    ///
    /// Returns one `(steps,)` series per monitored variable plus `ts`.
    ///
    /// # Errors
    /// Configuration errors before the first step (malformed duration, unknown
    /// monitor or `vars_init` name, undeclared step parameter), or `Execution`
    /// when the step body fails.
    pub fn run(
        &self,
        duration: impl Into<Duration>,
        monitors: &[&str],
        vars_init: &[(&str, f64)],
    ) -> Result<Monitors> {
        self.run_with_context(&backend::current(), duration, monitors, vars_init)
    }

    /// [`run`](Self::run) against an explicit context
    pub fn run_with_context(
        &self,
        ctx: &BackendContext,
        duration: impl Into<Duration>,
        monitors: &[&str],
        vars_init: &[(&str, f64)],
    ) -> Result<Monitors> {
        let ops = ctx.ops();
        let dt = ctx.dt();

        let (start, end) = duration.into().bounds()?;
        let times = time_axis(start, end, dt, ops)?;

        let names: Vec<String> = monitors.iter().map(|m| m.to_string()).collect();
        if let Some(unknown) = names.iter().find(|m| !self.requires().contains(m)) {
            return Err(SimError::UnknownMonitor(unknown.clone()));
        }
        let layout = self.layout();
        let sampling = match layout {
            Layout::Vector => Sampling::FirstUnit,
            Layout::Scalar => Sampling::Scalar,
        };
        let mut recorder = MonitorRecorder::new(&names, times.len(), 1, sampling, ops)?;

        let overrides: BTreeMap<String, f64> = vars_init
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        let template = self.requires().with_overrides(&overrides)?;
        let mut state = template.make_copy(1, layout, ops)?;

        // Standalone runs execute the first step function with run-loop values only.
        let first = self.steps().first().ok_or_else(|| SimError::InvalidModel {
            model: self.name().to_string(),
            reason: "no step functions".to_string(),
        })?;
        let step = bind(first, BindScope { dt, params: None })?;

        info!(
            model = self.name(),
            steps = times.len(),
            dt,
            "[RUN] Running standalone model"
        );
        for (i, &t) in times.iter().enumerate() {
            let outcome = match layout {
                Layout::Vector => step.call(&mut state, i, t),
                Layout::Scalar => step.call_unit(&mut state, i, t, 0),
            };
            outcome.map_err(|source| execution_error(&step, i, source))?;
            recorder.record(i, &state)?;
        }
        debug!(model = self.name(), "standalone run complete");
        Ok(recorder.finish(times))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_bounds() {
        assert_eq!(Duration::from(10.0).bounds().unwrap(), (0.0, 10.0));
        assert_eq!(Duration::from((5.0, 10.0)).bounds().unwrap(), (5.0, 10.0));
        assert!(Duration::from(0.0).bounds().is_err());
        assert!(Duration::from((4.0, 4.0)).bounds().is_err());
        assert!(Duration::from((3.0, 1.0)).bounds().is_err());
        assert!(Duration::from(f64::NAN).bounds().is_err());
    }

    #[test]
    fn test_duration_from_slice() {
        let length: &[f64] = &[2.0];
        let span: &[f64] = &[1.0, 2.0];
        let triple: &[f64] = &[1.0, 2.0, 3.0];
        let empty: &[f64] = &[];
        assert_eq!(Duration::try_from(length).unwrap(), Duration::Length(2.0));
        assert_eq!(Duration::try_from(span).unwrap(), Duration::Span(1.0, 2.0));
        assert!(matches!(
            Duration::try_from(triple),
            Err(SimError::InvalidDuration(_))
        ));
        assert!(Duration::try_from(empty).is_err());
    }
}
