// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Neuron State Container
//!
//! Named dynamic variables over a fixed unit count.
//!
//! ## Storage
//!
//! ```text
//!            unit 0   unit 1   ...   unit num-1
//! row 0  V   [ ...                            ]
//! row 1  w   [ ...                            ]
//! ...
//! row -k     [ reserved bookkeeping slots     ]   (addressed by negative index)
//! ```
//!
//! One `Array2<f64>` of shape `(variables + reserved, num)`, allocated through the
//! active operator table's `zeros` so the buffer comes from the current backend.
//! The variable set is fixed at construction; only values change.
//!
//! ## Layouts
//!
//! - [`Layout::Vector`]: every variable is one array over the unit axis.
//! - [`Layout::Scalar`]: each unit is an independent scalar state; step code uses
//!   [`NeuState::scalar`] / [`NeuState::set_scalar`] on single-unit states.

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use ndarray::{Array2, ArrayView1, ArrayViewMut1, Axis, Ix2};
use spikeflow_npu_runtime::OperatorTable;

use crate::types::{NeuralError, Result};

/// How a model addresses its variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// One array per variable, indexed by unit
    #[default]
    Vector,
    /// Independent scalars per unit
    Scalar,
}

impl Layout {
    pub fn from_vector_based(vector_based: bool) -> Self {
        if vector_based {
            Layout::Vector
        } else {
            Layout::Scalar
        }
    }
}

/// Declared variables and their initial values
#[derive(Debug, Clone, PartialEq)]
pub struct StateTemplate {
    vars: Vec<(String, f64)>,
    reserved_slots: usize,
}

impl StateTemplate {
    /// Declare variables in order
    ///
    /// # Errors
    /// `InvalidTemplate` on an empty or duplicated variable name.
    pub fn new<I, K>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut declared: Vec<(String, f64)> = Vec::new();
        for (name, value) in vars {
            let name = name.into();
            if name.is_empty() {
                return Err(NeuralError::InvalidTemplate(
                    "variable names must not be empty".to_string(),
                ));
            }
            if declared.iter().any(|(n, _)| *n == name) {
                return Err(NeuralError::InvalidTemplate(format!(
                    "variable \"{name}\" declared twice"
                )));
            }
            declared.push((name, value));
        }
        Ok(Self {
            vars: declared,
            reserved_slots: 0,
        })
    }

    /// Reserve `n` trailing bookkeeping rows (zero-initialised)
    pub fn with_reserved_slots(mut self, n: usize) -> Self {
        self.reserved_slots = n;
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.iter().map(|(n, _)| n.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.iter().any(|(n, _)| n == name)
    }

    pub fn initial(&self, name: &str) -> Option<f64> {
        self.vars.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn reserved_slots(&self) -> usize {
        self.reserved_slots
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Copy of this template with some initial values replaced
    ///
    /// # Errors
    /// `UnknownVariable` if an override names an undeclared variable.
    pub fn with_overrides(&self, overrides: &BTreeMap<String, f64>) -> Result<Self> {
        let mut copy = self.clone();
        for (name, value) in overrides {
            let slot = copy
                .vars
                .iter_mut()
                .find(|(n, _)| n == name)
                .ok_or_else(|| NeuralError::UnknownVariable(name.clone()))?;
            slot.1 = *value;
        }
        Ok(copy)
    }

    /// Fresh state for `num` units
    ///
    /// Every call allocates a new buffer through `ops`; the result never aliases
    /// another state.
    pub fn make_copy(&self, num: usize, layout: Layout, ops: &OperatorTable) -> Result<NeuState> {
        let rows = self.vars.len() + self.reserved_slots;
        let raw = ops.zeros(&[rows, num]);
        let data = raw.into_dimensionality::<Ix2>().map_err(|e| {
            NeuralError::LayoutMismatch(format!("backend zeros did not return a 2-d buffer: {e}"))
        })?;
        // Named slices require row-major storage regardless of what the backend returned.
        let mut data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        for (row, (_, value)) in self.vars.iter().enumerate() {
            data.row_mut(row).fill(*value);
        }
        tracing::trace!(rows, num, ?layout, "allocated neuron state");
        Ok(NeuState {
            names: self.vars.iter().map(|(n, _)| n.clone()).collect(),
            data,
            reserved: self.reserved_slots,
            layout,
        })
    }
}

/// Named-variable state over `num` units
#[derive(Debug, Clone, PartialEq)]
pub struct NeuState {
    names: Vec<String>,
    data: Array2<f64>,
    reserved: usize,
    layout: Layout,
}

impl NeuState {
    fn row_of(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| NeuralError::UnknownVariable(name.to_string()))
    }

    fn raw_row(&self, index: isize) -> Result<usize> {
        let rows = self.data.nrows();
        let resolved = if index < 0 {
            rows.checked_sub(index.unsigned_abs())
        } else {
            Some(index as usize).filter(|r| *r < rows)
        };
        resolved.ok_or(NeuralError::SlotOutOfRange { index, rows })
    }

    fn require_scalar(&self, name: &str) -> Result<()> {
        if self.layout != Layout::Scalar {
            return Err(NeuralError::LayoutMismatch(format!(
                "scalar access to \"{name}\" on a vector-based state"
            )));
        }
        if self.num() != 1 {
            return Err(NeuralError::LayoutMismatch(format!(
                "scalar access to \"{name}\" on a state of {} units",
                self.num()
            )));
        }
        Ok(())
    }

    /// Variable names in declaration order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Number of units
    pub fn num(&self) -> usize {
        self.data.ncols()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn reserved_slots(&self) -> usize {
        self.reserved
    }

    /// Whole backing buffer, rows = variables then reserved slots
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn var(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        let row = self.row_of(name)?;
        Ok(self.data.row(row))
    }

    pub fn var_mut(&mut self, name: &str) -> Result<ArrayViewMut1<'_, f64>> {
        let row = self.row_of(name)?;
        Ok(self.data.row_mut(row))
    }

    /// Fill a variable with one value across all units
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        self.var_mut(name)?.fill(value);
        Ok(())
    }

    /// Scalar read (scalar layout, single unit)
    pub fn scalar(&self, name: &str) -> Result<f64> {
        self.require_scalar(name)?;
        let row = self.row_of(name)?;
        Ok(self.data[[row, 0]])
    }

    /// Scalar write (scalar layout, single unit)
    pub fn set_scalar(&mut self, name: &str, value: f64) -> Result<()> {
        self.require_scalar(name)?;
        let row = self.row_of(name)?;
        self.data[[row, 0]] = value;
        Ok(())
    }

    /// Raw row access; negative indices count back from the last reserved slot
    pub fn slot(&self, index: isize) -> Result<ArrayView1<'_, f64>> {
        let row = self.raw_row(index)?;
        Ok(self.data.row(row))
    }

    pub fn slot_mut(&mut self, index: isize) -> Result<ArrayViewMut1<'_, f64>> {
        let row = self.raw_row(index)?;
        Ok(self.data.row_mut(row))
    }

    /// Single-unit copy of unit `unit`, for per-unit (scalar) execution
    pub fn unit(&self, unit: usize) -> Result<NeuState> {
        if unit >= self.num() {
            return Err(NeuralError::LayoutMismatch(format!(
                "unit {unit} out of range for {} units",
                self.num()
            )));
        }
        let column = self.data.column(unit).to_owned().insert_axis(Axis(1));
        Ok(NeuState {
            names: self.names.clone(),
            data: column,
            reserved: self.reserved,
            layout: self.layout,
        })
    }

    /// Copy unit `unit` into an existing single-unit state, without allocating
    pub fn load_unit(&self, unit: usize, single: &mut NeuState) -> Result<()> {
        if single.num() != 1 || single.data.nrows() != self.data.nrows() || unit >= self.num() {
            return Err(NeuralError::LayoutMismatch(format!(
                "cannot load unit {unit} of a {}x{} state into a {}x{} state",
                self.data.nrows(),
                self.num(),
                single.data.nrows(),
                single.num()
            )));
        }
        single.data.column_mut(0).assign(&self.data.column(unit));
        Ok(())
    }

    /// Write a single-unit state back into unit `unit`
    pub fn store_unit(&mut self, unit: usize, single: &NeuState) -> Result<()> {
        if single.num() != 1 || single.data.nrows() != self.data.nrows() || unit >= self.num() {
            return Err(NeuralError::LayoutMismatch(format!(
                "cannot store a {}x{} state into unit {unit} of a {}x{} state",
                single.data.nrows(),
                single.num(),
                self.data.nrows(),
                self.num()
            )));
        }
        self.data.column_mut(unit).assign(&single.data.column(0));
        Ok(())
    }

    /// Fresh state of `num` units, every unit starting from unit 0's values
    ///
    /// Allocates through `ops`; the copy never aliases `self`.
    pub fn make_copy(&self, num: usize, ops: &OperatorTable) -> Result<NeuState> {
        if self.num() == 0 {
            return Err(NeuralError::LayoutMismatch(
                "cannot copy from a state without units".to_string(),
            ));
        }
        let rows = self.data.nrows();
        let mut data = ops
            .zeros(&[rows, num])
            .into_dimensionality::<Ix2>()
            .map_err(|e| {
                NeuralError::LayoutMismatch(format!("backend zeros did not return a 2-d buffer: {e}"))
            })?;
        if !data.is_standard_layout() {
            data = data.as_standard_layout().into_owned();
        }
        let first = self.data.column(0);
        for mut column in data.columns_mut() {
            column.assign(&first);
        }
        Ok(NeuState {
            names: self.names.clone(),
            data,
            reserved: self.reserved,
            layout: self.layout,
        })
    }

    /// Overwrite every value from another state with the same shape
    pub fn copy_from(&mut self, other: &NeuState) -> Result<()> {
        if other.data.dim() != self.data.dim() {
            return Err(NeuralError::LayoutMismatch(format!(
                "shape {:?} does not match {:?}",
                other.data.dim(),
                self.data.dim()
            )));
        }
        self.data.assign(&other.data);
        Ok(())
    }
}

impl Index<&str> for NeuState {
    type Output = [f64];

    /// # Panics
    /// Panics if `name` is not a state variable.
    fn index(&self, name: &str) -> &[f64] {
        let row = match self.row_of(name) {
            Ok(row) => row,
            Err(e) => panic!("{e}"),
        };
        let num = self.num();
        match self.data.as_slice() {
            Some(flat) => &flat[row * num..(row + 1) * num],
            None => panic!("neuron state storage is not contiguous"),
        }
    }
}

impl IndexMut<&str> for NeuState {
    fn index_mut(&mut self, name: &str) -> &mut [f64] {
        let row = match self.row_of(name) {
            Ok(row) => row,
            Err(e) => panic!("{e}"),
        };
        let num = self.num();
        match self.data.as_slice_mut() {
            Some(flat) => &mut flat[row * num..(row + 1) * num],
            None => panic!("neuron state storage is not contiguous"),
        }
    }
}
