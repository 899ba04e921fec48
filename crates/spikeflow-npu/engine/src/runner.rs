// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Runners
//!
//! Executors that drive groups through a [`RunPlan`].
//!
//! ## Per-step order (each group)
//!
//! ```text
//! 1. apply inputs          (Add / Set on state rows)
//! 2. call bound steps      (declaration order; per unit for scalar layouts)
//! 3. record monitors       (row i of every (steps, num) buffer)
//! ```
//!
//! Step functions are bound once per run, before step 0. Nothing inside the loop
//! resolves names.

use std::fmt;
use std::time::Instant;

use ndarray::Array1;
use spikeflow_npu_neural::{bind, BindScope, BoundStep, Layout, NeuState};
use tracing::{debug, info};

use crate::backend::BackendContext;
use crate::error::{Result, SimError};
use crate::group::NeuGroup;
use crate::monitor::{time_axis, MonitorRecorder, Monitors, Sampling};
use crate::synthesis::Duration;

/// Drives a single group
pub trait NodeRunner: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Run `group` over `plan`, returning its monitors
    fn run(&self, group: &mut NeuGroup, plan: &RunPlan, ctx: &BackendContext) -> Result<Monitors>;
}

/// Drives every group of a network
pub trait NetRunner: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Run `groups` over `plan`; monitors are returned in group order
    fn run(
        &self,
        groups: &mut [NeuGroup],
        plan: &RunPlan,
        ctx: &BackendContext,
    ) -> Result<Vec<Monitors>>;
}

/// How an input combines with the current state value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// `var += value`
    #[default]
    Add,
    /// `var = value`
    Set,
}

/// Input value per step
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    /// Same value every step
    Constant(f64),
    /// One value per step
    Series(Array1<f64>),
}

impl InputValue {
    #[inline]
    fn at(&self, i: usize) -> f64 {
        match self {
            InputValue::Constant(v) => *v,
            InputValue::Series(values) => values[i],
        }
    }
}

impl From<f64> for InputValue {
    fn from(v: f64) -> Self {
        InputValue::Constant(v)
    }
}

impl From<Vec<f64>> for InputValue {
    fn from(v: Vec<f64>) -> Self {
        InputValue::Series(Array1::from(v))
    }
}

impl From<Array1<f64>> for InputValue {
    fn from(v: Array1<f64>) -> Self {
        InputValue::Series(v)
    }
}

/// External drive applied to a state variable before each step
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    /// Group the input targets; `None` = every group that has `var`
    pub target: Option<String>,
    pub var: String,
    pub value: InputValue,
    pub mode: InputMode,
}

impl Input {
    /// `var += value` every step
    pub fn add(var: impl Into<String>, value: impl Into<InputValue>) -> Self {
        Self {
            target: None,
            var: var.into(),
            value: value.into(),
            mode: InputMode::Add,
        }
    }

    /// `var = value` every step
    pub fn set(var: impl Into<String>, value: impl Into<InputValue>) -> Self {
        Self {
            target: None,
            var: var.into(),
            value: value.into(),
            mode: InputMode::Set,
        }
    }

    /// Restrict to one group
    pub fn to(mut self, group: impl Into<String>) -> Self {
        self.target = Some(group.into());
        self
    }
}

/// Options of a group or network run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub inputs: Vec<Input>,
    /// Log progress every 10% of the run
    pub report: bool,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, input: Input) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn report(mut self, report: bool) -> Self {
        self.report = report;
        self
    }
}

/// Resolved time axis and options of one run
#[derive(Debug, Clone)]
pub struct RunPlan {
    times: Array1<f64>,
    dt: f64,
    inputs: Vec<Input>,
    report: bool,
}

impl RunPlan {
    /// Build the time axis from `duration` and the context's `dt`
    ///
    /// # Errors
    /// `InvalidDuration` for a malformed duration; `InvalidInput` for a series input
    /// whose length differs from the number of steps.
    pub fn new(
        duration: impl Into<Duration>,
        options: RunOptions,
        ctx: &BackendContext,
    ) -> Result<Self> {
        let (start, end) = duration.into().bounds()?;
        let dt = ctx.dt();
        let times = time_axis(start, end, dt, ctx.ops())?;
        for input in &options.inputs {
            if let InputValue::Series(values) = &input.value {
                if values.len() != times.len() {
                    return Err(SimError::InvalidInput {
                        var: input.var.clone(),
                        reason: format!(
                            "series has {} values for a run of {} steps",
                            values.len(),
                            times.len()
                        ),
                    });
                }
            }
        }
        Ok(Self {
            times,
            dt,
            inputs: options.inputs,
            report: options.report,
        })
    }

    /// Sample times
    pub fn times(&self) -> &Array1<f64> {
        &self.times
    }

    pub fn steps(&self) -> usize {
        self.times.len()
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn report(&self) -> bool {
        self.report
    }

    /// Check every input reaches at least one of `groups`
    ///
    /// # Errors
    /// `UnknownGroup` for a target that is not among `groups`; `InvalidInput` for an
    /// input whose variable no targeted group has.
    pub fn check_inputs(&self, groups: &[&NeuGroup]) -> Result<()> {
        for input in &self.inputs {
            let mut targeted = groups
                .iter()
                .filter(|g| input.target.as_deref().map_or(true, |t| t == g.name()))
                .peekable();
            if targeted.peek().is_none() {
                if let Some(target) = &input.target {
                    return Err(SimError::UnknownGroup(target.clone()));
                }
            }
            if !targeted.any(|g| g.state().contains(&input.var)) {
                return Err(SimError::InvalidInput {
                    var: input.var.clone(),
                    reason: "not a state variable of any targeted group".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Bound steps, inputs and monitor buffers of one group for one run
pub(crate) struct GroupExecution {
    steps: Vec<BoundStep>,
    inputs: Vec<(String, InputValue, InputMode)>,
    recorder: MonitorRecorder,
    layout: Layout,
    /// Single-unit state reused for every unit of a scalar-layout group
    scratch: Option<NeuState>,
}

impl GroupExecution {
    pub(crate) fn prepare(group: &NeuGroup, plan: &RunPlan, ctx: &BackendContext) -> Result<Self> {
        let scope = BindScope {
            dt: plan.dt(),
            params: Some(group.params()),
        };
        let steps = group
            .model()
            .steps()
            .iter()
            .map(|step| bind(step, scope))
            .collect::<spikeflow_npu_neural::Result<Vec<_>>>()?;

        let state = group.state();
        let mut inputs = Vec::new();
        for input in plan.inputs() {
            let targeted = input.target.as_deref().map_or(true, |t| t == group.name());
            if !targeted || !state.contains(&input.var) {
                continue;
            }
            inputs.push((input.var.clone(), input.value.clone(), input.mode));
        }

        let recorder = MonitorRecorder::new(
            group.monitors(),
            plan.steps(),
            group.num(),
            Sampling::Units,
            ctx.ops(),
        )?;
        let scratch = match state.layout() {
            Layout::Scalar if state.num() > 0 => Some(state.unit(0)?),
            _ => None,
        };
        debug!(
            group = group.name(),
            steps = steps.len(),
            inputs = inputs.len(),
            "prepared group execution"
        );
        Ok(Self {
            steps,
            inputs,
            recorder,
            layout: state.layout(),
            scratch,
        })
    }

    /// One time step: inputs, step functions, monitors
    pub(crate) fn advance(&mut self, state: &mut NeuState, i: usize, t: f64) -> Result<()> {
        for (var, value, mode) in &self.inputs {
            let v = value.at(i);
            let mut row = state.var_mut(var)?;
            match mode {
                InputMode::Add => row += v,
                InputMode::Set => row.fill(v),
            }
        }
        for step in &self.steps {
            match self.layout {
                Layout::Vector => step
                    .call(state, i, t)
                    .map_err(|source| execution_error(step, i, source))?,
                Layout::Scalar => {
                    let Some(single) = self.scratch.as_mut() else {
                        continue;
                    };
                    for unit in 0..state.num() {
                        state.load_unit(unit, single)?;
                        step.call_unit(single, i, t, unit)
                            .map_err(|source| execution_error(step, i, source))?;
                        state.store_unit(unit, single)?;
                    }
                }
            }
        }
        self.recorder.record(i, state)
    }

    pub(crate) fn finish(self, ts: Array1<f64>) -> Monitors {
        self.recorder.finish(ts)
    }
}

pub(crate) fn execution_error(step: &BoundStep, index: usize, source: anyhow::Error) -> SimError {
    SimError::Execution {
        step: step.name().to_string(),
        index,
        source,
    }
}

/// Logs progress at every 10% of a run
pub(crate) struct ProgressReporter {
    label: String,
    steps: usize,
    every: usize,
    enabled: bool,
    started: Instant,
}

impl ProgressReporter {
    pub(crate) fn new(label: impl Into<String>, steps: usize, enabled: bool) -> Self {
        Self {
            label: label.into(),
            steps,
            every: (steps / 10).max(1),
            enabled,
            started: Instant::now(),
        }
    }

    #[inline]
    pub(crate) fn step_done(&self, i: usize, t: f64) {
        #[allow(clippy::manual_is_multiple_of)]
        let due = (i + 1) % self.every == 0;
        if self.enabled && due {
            let percent = (i + 1) * 100 / self.steps.max(1);
            info!(
                run = %self.label,
                percent,
                t,
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "[RUN] progress"
            );
        }
    }

    pub(crate) fn finished(&self) {
        info!(
            run = %self.label,
            steps = self.steps,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "[RUN] Finished"
        );
    }
}

/// Default single-group runner
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralNodeRunner;

impl NodeRunner for GeneralNodeRunner {
    fn name(&self) -> &str {
        "general"
    }

    fn run(&self, group: &mut NeuGroup, plan: &RunPlan, ctx: &BackendContext) -> Result<Monitors> {
        let mut execution = GroupExecution::prepare(group, plan, ctx)?;
        info!(
            group = group.name(),
            steps = plan.steps(),
            dt = plan.dt(),
            "[RUN] Running group"
        );
        let progress = ProgressReporter::new(group.name(), plan.steps(), plan.report());
        let state = group.state_mut();
        for (i, &t) in plan.times().iter().enumerate() {
            execution.advance(state, i, t)?;
            progress.step_done(i, t);
        }
        progress.finished();
        Ok(execution.finish(plan.times().clone()))
    }
}

/// Default network runner: all groups advance in lock-step, in insertion order
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralNetRunner;

impl NetRunner for GeneralNetRunner {
    fn name(&self) -> &str {
        "general"
    }

    fn run(
        &self,
        groups: &mut [NeuGroup],
        plan: &RunPlan,
        ctx: &BackendContext,
    ) -> Result<Vec<Monitors>> {
        let mut executions = groups
            .iter()
            .map(|group| GroupExecution::prepare(group, plan, ctx))
            .collect::<Result<Vec<_>>>()?;
        info!(
            groups = groups.len(),
            steps = plan.steps(),
            dt = plan.dt(),
            "[RUN] Running network"
        );
        let progress = ProgressReporter::new("network", plan.steps(), plan.report());
        for (i, &t) in plan.times().iter().enumerate() {
            for (group, execution) in groups.iter_mut().zip(executions.iter_mut()) {
                execution.advance(group.state_mut(), i, t)?;
            }
            progress.step_done(i, t);
        }
        progress.finished();
        Ok(executions
            .into_iter()
            .map(|execution| execution.finish(plan.times().clone()))
            .collect())
    }
}
