// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Operator tables resolved from user-defined modules

use ndarray::{ArrayD, IxDyn};
use spikeflow_npu_runtime::{
    HostOps, OpName, Operator, OperatorModule, OperatorTable, RuntimeError, Tensor,
};

/// Host primitives with `exp` replaced by a first-order approximation
struct LinearExp;

impl OperatorModule for LinearExp {
    fn name(&self) -> &str {
        "linear-exp"
    }

    fn get(&self, op: OpName) -> Option<Operator> {
        match op {
            OpName::Exp => Some(Operator::unary(|t| t.mapv(|v| 1.0 + v))),
            other => HostOps.get(other),
        }
    }
}

/// Binds `sum` with the wrong calling convention
struct Miswired;

impl OperatorModule for Miswired {
    fn name(&self) -> &str {
        "miswired"
    }

    fn get(&self, op: OpName) -> Option<Operator> {
        match op {
            OpName::Sum => Some(Operator::unary(|t| t.clone())),
            other => HostOps.get(other),
        }
    }
}

fn tensor(values: &[f64]) -> Tensor {
    ArrayD::from_shape_vec(IxDyn(&[values.len()]), values.to_vec()).unwrap()
}

#[test]
fn test_custom_module_overrides_one_primitive() {
    let ops = OperatorTable::from_module(&LinearExp).unwrap();
    assert_eq!(ops.module_name(), "linear-exp");
    assert_eq!(ops.exp(&tensor(&[0.0, 1.0])), tensor(&[1.0, 2.0]));
    assert_eq!(ops.zeros(&[2, 3]).shape(), &[2, 3]);
}

#[test]
fn test_wrong_convention_is_rejected() {
    let err = OperatorTable::from_module(&Miswired).unwrap_err();
    match err {
        RuntimeError::SignatureMismatch { op, .. } => assert_eq!(op, "sum"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_host_primitives() {
    let ops = OperatorTable::host();

    let m = ops.as_tensor(&[1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    assert_eq!(ops.shape(&m), vec![2, 2]);
    let product = ops.matmul(&m, &ops.eye(2)).unwrap();
    assert_eq!(product, m);

    let col_sums = ops.sum(&m, Some(0)).unwrap();
    assert_eq!(col_sums, tensor(&[4.0, 6.0]));
    let total = ops.sum(&m, None).unwrap();
    assert_eq!(total.iter().copied().collect::<Vec<_>>(), vec![10.0]);

    let stacked = ops.vstack(&[tensor(&[1.0, 2.0]), tensor(&[3.0, 4.0])]).unwrap();
    assert_eq!(stacked, m);

    let flat = ops.reshape(&m, &[4]).unwrap();
    assert_eq!(flat, tensor(&[1.0, 2.0, 3.0, 4.0]));
    assert!(ops.reshape(&m, &[3]).is_err());

    assert_eq!(ops.arange(0.0, 1.0, 0.25).unwrap(), tensor(&[0.0, 0.25, 0.5, 0.75]));
    assert!(ops.arange(0.0, 1.0, 0.0).is_err());

    let samples = ops.normal(0.0, 1.0, &[3, 4]).unwrap();
    assert_eq!(samples.shape(), &[3, 4]);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_module_agrees_with_host() {
    use ndarray::array;
    use spikeflow_npu_runtime::ParallelHostOps;

    let host = OperatorTable::host();
    let parallel = OperatorTable::from_module(&ParallelHostOps).unwrap();
    let m = array![[0.5, -1.0, 2.0], [0.0, 1.5, -0.25]].into_dyn();

    assert_eq!(parallel.exp(&m), host.exp(&m));
    assert_eq!(parallel.sum(&m, Some(1)).unwrap(), host.sum(&m, Some(1)).unwrap());
    assert_eq!(parallel.sum(&m, None).unwrap(), host.sum(&m, None).unwrap());
    assert_eq!(parallel.zeros(&[4]), host.zeros(&[4]));
}
