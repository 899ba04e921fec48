// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Neuron Groups
//!
//! A [`NeuGroup`] is a live ensemble of one [`NeuType`]: geometry, resolved
//! parameters, its own state, and the monitors of its last run.
//!
//! ## Geometry
//!
//! | Given          | Normalised      |
//! |----------------|-----------------|
//! | `n`            | `(1, n)`        |
//! | `[n]`          | `(1, n)`        |
//! | `[h, w]`       | `(h, w)`        |
//! | 3+ dimensions  | error           |

use std::sync::atomic::{AtomicUsize, Ordering};

use spikeflow_npu_neural::{NeuState, ParameterSet};
use tracing::debug;

use crate::backend::{self, BackendContext};
use crate::error::{Result, SimError};
use crate::model::{Model, NeuType};
use crate::monitor::Monitors;
use crate::runner::{RunOptions, RunPlan};
use crate::synthesis::Duration;

static NEU_GROUP_NO: AtomicUsize = AtomicUsize::new(0);

/// Group shape as given by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry(Vec<usize>);

impl Geometry {
    /// `(height, width)`
    ///
    /// # Errors
    /// `UnsupportedGeometry` for zero or more than two dimensions.
    pub fn normalize(&self) -> Result<(usize, usize)> {
        match self.0.as_slice() {
            [width] => Ok((1, *width)),
            [height, width] => Ok((*height, *width)),
            dims => Err(SimError::UnsupportedGeometry(dims.to_vec())),
        }
    }
}

impl From<usize> for Geometry {
    fn from(n: usize) -> Self {
        Geometry(vec![n])
    }
}

impl<const N: usize> From<[usize; N]> for Geometry {
    fn from(dims: [usize; N]) -> Self {
        Geometry(dims.to_vec())
    }
}

impl From<(usize, usize)> for Geometry {
    fn from((height, width): (usize, usize)) -> Self {
        Geometry(vec![height, width])
    }
}

impl From<Vec<usize>> for Geometry {
    fn from(dims: Vec<usize>) -> Self {
        Geometry(dims)
    }
}

impl From<&[usize]> for Geometry {
    fn from(dims: &[usize]) -> Self {
        Geometry(dims.to_vec())
    }
}

/// Optional parts of a group
#[derive(Debug, Clone, Default)]
pub struct GroupOptions {
    /// Parameter overrides on top of the model defaults
    pub pars_update: ParameterSet,
    /// State variables recorded on every run
    pub monitors: Vec<String>,
    /// Group name; auto-assigned `NeuGroup{n}` when `None`
    pub name: Option<String>,
}

impl GroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pars_update(mut self, pars_update: ParameterSet) -> Self {
        self.pars_update = pars_update;
        self
    }

    pub fn monitors<I, S>(mut self, monitors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.monitors = monitors.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Live ensemble of one neuron model
#[derive(Debug, Clone)]
pub struct NeuGroup {
    name: String,
    model: NeuType,
    geometry: (usize, usize),
    num: usize,
    params: ParameterSet,
    monitors: Vec<String>,
    state: NeuState,
    mon: Option<Monitors>,
}

impl NeuGroup {
    /// Instantiate `model` against the process-wide backend context
    pub fn new(
        model: &dyn Model,
        geometry: impl Into<Geometry>,
        options: GroupOptions,
    ) -> Result<Self> {
        Self::new_with_context(model, geometry, options, &backend::current())
    }

    /// Instantiate `model`, allocating state through `ctx`
    ///
    /// # Errors
    /// - `UnsupportedGeometry` for 3+ dimensions or a unit count that overflows
    /// - `ModelUse` when `model` is not a neuron model
    /// - `State(InvalidParameter)` for a bad `pars_update`
    /// - `UnknownMonitor` for a monitor that is not a state variable
    pub fn new_with_context(
        model: &dyn Model,
        geometry: impl Into<Geometry>,
        options: GroupOptions,
        ctx: &BackendContext,
    ) -> Result<Self> {
        let geometry = geometry.into().normalize()?;
        let num = geometry
            .0
            .checked_mul(geometry.1)
            .ok_or_else(|| SimError::UnsupportedGeometry(vec![geometry.0, geometry.1]))?;

        let model = model.as_neu_type().ok_or_else(|| SimError::ModelUse {
            expected: "NeuType".to_string(),
            actual: model.type_name().to_string(),
        })?;

        let GroupOptions {
            pars_update,
            monitors,
            name,
        } = options;

        let heterogeneous: Vec<String> = model.heter_params_replace().iter().cloned().collect();
        let params = model
            .parameters()
            .overridden(&pars_update, &heterogeneous, num)?;

        if let Some(unknown) = monitors.iter().find(|m| !model.requires().contains(m)) {
            return Err(SimError::UnknownMonitor(unknown.clone()));
        }

        let name = name.unwrap_or_else(|| {
            format!("NeuGroup{}", NEU_GROUP_NO.fetch_add(1, Ordering::Relaxed))
        });

        // Fresh buffer per group; groups never share state.
        let state = model.requires().make_copy(num, model.layout(), ctx.ops())?;

        debug!(
            group = %name,
            model = model.name(),
            ?geometry,
            num,
            "created neuron group"
        );
        Ok(Self {
            name,
            model: model.clone(),
            geometry,
            num,
            params,
            monitors,
            state,
            mon: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &NeuType {
        &self.model
    }

    /// `(height, width)`
    pub fn geometry(&self) -> (usize, usize) {
        self.geometry
    }

    /// Number of units
    pub fn num(&self) -> usize {
        self.num
    }

    /// Resolved parameters (model defaults with `pars_update` applied)
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Monitored variable names
    pub fn monitors(&self) -> &[String] {
        &self.monitors
    }

    /// The group's state (`ST`)
    pub fn state(&self) -> &NeuState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut NeuState {
        &mut self.state
    }

    /// Monitors of the last run
    pub fn mon(&self) -> Option<&Monitors> {
        self.mon.as_ref()
    }

    pub(crate) fn store_monitors(&mut self, mon: Monitors) {
        self.mon = Some(mon);
    }

    pub(crate) fn clear_monitors(&mut self) {
        self.mon = None;
    }

    /// Run against the process-wide backend context
    pub fn run(&mut self, duration: impl Into<Duration>, options: RunOptions) -> Result<&Monitors> {
        self.run_with_context(&backend::current(), duration, options)
    }

    /// Run with `ctx`'s node runner; monitors are kept on the group and returned
    ///
    /// Monitors of an earlier run are dropped first, so after a failed run
    /// [`mon`](Self::mon) is `None`.
    pub fn run_with_context(
        &mut self,
        ctx: &BackendContext,
        duration: impl Into<Duration>,
        options: RunOptions,
    ) -> Result<&Monitors> {
        self.clear_monitors();
        let plan = RunPlan::new(duration, options, ctx)?;
        plan.check_inputs(&[&*self])?;
        let mon = ctx.node_runner().run(self, &plan, ctx)?;
        let mon: &Monitors = self.mon.insert(mon);
        Ok(mon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_normalisation() {
        assert_eq!(Geometry::from(10usize).normalize().unwrap(), (1, 10));
        assert_eq!(Geometry::from([7usize]).normalize().unwrap(), (1, 7));
        assert_eq!(Geometry::from([2usize, 3]).normalize().unwrap(), (2, 3));
        assert_eq!(Geometry::from((4usize, 5usize)).normalize().unwrap(), (4, 5));
        assert!(matches!(
            Geometry::from([1usize, 2, 3]).normalize(),
            Err(SimError::UnsupportedGeometry(ref dims)) if dims == &[1, 2, 3]
        ));
        assert!(Geometry::from(Vec::<usize>::new()).normalize().is_err());
    }
}
