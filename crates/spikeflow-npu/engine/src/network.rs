// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Named collection of groups run together

use ndarray::Array1;
use tracing::info;

use crate::backend::{self, BackendContext};
use crate::error::{Result, SimError};
use crate::group::NeuGroup;
use crate::runner::{RunOptions, RunPlan};
use crate::synthesis::Duration;

/// Groups advanced in lock-step by the net runner
#[derive(Debug, Clone, Default)]
pub struct Network {
    groups: Vec<NeuGroup>,
    ts: Option<Array1<f64>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group; names must be unique within the network
    pub fn add(&mut self, group: NeuGroup) -> Result<()> {
        if self.group(group.name()).is_some() {
            return Err(SimError::DuplicateGroup(group.name().to_string()));
        }
        self.groups.push(group);
        Ok(())
    }

    /// Builder-style [`add`](Self::add)
    pub fn with(mut self, group: NeuGroup) -> Result<Self> {
        self.add(group)?;
        Ok(self)
    }

    /// Groups in insertion order
    pub fn groups(&self) -> &[NeuGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&NeuGroup> {
        self.groups.iter().find(|g| g.name() == name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut NeuGroup> {
        self.groups.iter_mut().find(|g| g.name() == name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sample times of the last run
    pub fn run_time(&self) -> Option<&Array1<f64>> {
        self.ts.as_ref()
    }

    /// Run against the process-wide backend context
    pub fn run(&mut self, duration: impl Into<Duration>, options: RunOptions) -> Result<()> {
        self.run_with_context(&backend::current(), duration, options)
    }

    /// Run every group with `ctx`'s net runner; each group keeps its monitors
    pub fn run_with_context(
        &mut self,
        ctx: &BackendContext,
        duration: impl Into<Duration>,
        options: RunOptions,
    ) -> Result<()> {
        self.ts = None;
        for group in &mut self.groups {
            group.clear_monitors();
        }
        let plan = RunPlan::new(duration, options, ctx)?;
        let refs: Vec<&NeuGroup> = self.groups.iter().collect();
        plan.check_inputs(&refs)?;

        let runner = ctx.net_runner();
        info!(
            runner = runner.name(),
            groups = self.groups.len(),
            "[NETWORK] Starting run"
        );
        let monitors = runner.run(&mut self.groups, &plan, ctx)?;
        if monitors.len() != self.groups.len() {
            return Err(SimError::InvalidModel {
                model: "network".to_string(),
                reason: format!(
                    "net runner \"{}\" returned {} monitor sets for {} groups",
                    runner.name(),
                    monitors.len(),
                    self.groups.len()
                ),
            });
        }
        for (group, mon) in self.groups.iter_mut().zip(monitors) {
            group.store_monitors(mon);
        }
        self.ts = Some(plan.times().clone());
        Ok(())
    }
}
