// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Rayon-parallel host operator module
//!
//! Elementwise maps and reductions run on the Rayon pool via ndarray's `rayon`
//! integration. Construction, shape and linear-algebra primitives are shared with
//! [`HostOps`](super::HostOps).

use ndarray::Axis;
use rayon::prelude::*;

use super::host_ops;
use crate::error::{Result, RuntimeError};
use crate::ops::{OpName, Operator, OperatorModule, Tensor};

/// Parallel host operator module
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelHostOps;

impl ParallelHostOps {
    /// Module name
    pub const NAME: &'static str = "host-parallel";
}

impl OperatorModule for ParallelHostOps {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get(&self, op: OpName) -> Option<Operator> {
        match op {
            OpName::Exp => Some(Operator::unary(par_exp)),
            OpName::Sum => Some(Operator::reduce(par_sum)),
            other => super::HostOps.get(other),
        }
    }
}

fn par_exp(tensor: &Tensor) -> Tensor {
    let mut out = tensor.to_owned();
    out.par_mapv_inplace(f64::exp);
    out
}

fn par_sum(tensor: &Tensor, axis: Option<usize>) -> Result<Tensor> {
    match axis {
        None => {
            let total: f64 = tensor.par_iter().copied().sum();
            Ok(ndarray::arr0(total).into_dyn())
        }
        Some(axis) if axis < tensor.ndim() => {
            if tensor.ndim() == 1 {
                return host_ops::sum(tensor, Some(axis));
            }
            let mut out_shape = tensor.shape().to_vec();
            out_shape.remove(axis);
            let acc = tensor
                .axis_iter(Axis(axis))
                .into_par_iter()
                .map(|lane| lane.to_owned())
                .reduce(|| Tensor::zeros(out_shape.clone()), |a, b| a + b);
            Ok(acc)
        }
        Some(axis) => Err(RuntimeError::ShapeMismatch(format!(
            "sum over axis {axis} of a {}-d tensor",
            tensor.ndim()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::OperatorTable;
    use crate::std_impl::HostOps;

    #[test]
    fn test_parallel_matches_host() {
        let host = OperatorTable::from_module(&HostOps).unwrap();
        let par = OperatorTable::from_module(&ParallelHostOps).unwrap();
        assert_eq!(par.module_name(), "host-parallel");

        let data: Vec<f64> = (0..24).map(|v| v as f64 * 0.25).collect();
        let t = host.as_tensor(&data, &[2, 3, 4]).unwrap();

        assert_eq!(par.sum(&t, Some(1)).unwrap(), host.sum(&t, Some(1)).unwrap());
        assert_eq!(par.sum(&t, Some(0)).unwrap(), host.sum(&t, Some(0)).unwrap());
        let full_par = par.sum(&t, None).unwrap().sum();
        let full_host = host.sum(&t, None).unwrap().sum();
        assert!((full_par - full_host).abs() < 1e-9);

        let e_par = par.exp(&t);
        let e_host = host.exp(&t);
        assert!(e_par
            .iter()
            .zip(e_host.iter())
            .all(|(a, b)| (a - b).abs() < 1e-12));
    }
}
