// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Eager ndarray implementation of the operator vocabulary

use ndarray::{concatenate, Array1, Array2, ArrayD, ArrayView2, Axis, Ix1, Ix2};
use rand_distr::{Distribution, Normal};

use crate::error::{Result, RuntimeError};
use crate::ops::{OpName, Operator, OperatorModule, Tensor};

/// Eager host operator module
#[derive(Debug, Clone, Copy, Default)]
pub struct HostOps;

impl HostOps {
    /// Module name
    pub const NAME: &'static str = "host";
}

impl OperatorModule for HostOps {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get(&self, op: OpName) -> Option<Operator> {
        let operator = match op {
            OpName::AsTensor => Operator::as_tensor(as_tensor),
            OpName::Normal => Operator::normal(normal),
            OpName::Reshape => Operator::reshape(reshape),
            OpName::Shape => Operator::shape(shape),
            OpName::Exp => Operator::unary(exp),
            OpName::Sum => Operator::reduce(sum),
            OpName::Zeros => Operator::fill(zeros),
            OpName::Ones => Operator::fill(ones),
            OpName::Eye => Operator::eye(eye),
            OpName::Matmul => Operator::binary(matmul),
            OpName::Vstack => Operator::stack(vstack),
            OpName::Arange => Operator::range(arange),
        };
        Some(operator)
    }
}

pub(crate) fn as_tensor(data: &[f64], shape: &[usize]) -> Result<Tensor> {
    Ok(ArrayD::from_shape_vec(shape, data.to_vec())?)
}

pub(crate) fn normal(loc: f64, scale: f64, shape: &[usize]) -> Result<Tensor> {
    let dist = Normal::new(loc, scale)
        .map_err(|e| RuntimeError::InvalidParameters(format!("normal({loc}, {scale}): {e}")))?;
    let mut rng = rand::thread_rng();
    Ok(ArrayD::from_shape_simple_fn(shape, || dist.sample(&mut rng)))
}

pub(crate) fn reshape(tensor: &Tensor, shape: &[usize]) -> Result<Tensor> {
    Ok(tensor.to_shape(shape)?.into_owned())
}

pub(crate) fn shape(tensor: &Tensor) -> Vec<usize> {
    tensor.shape().to_vec()
}

pub(crate) fn exp(tensor: &Tensor) -> Tensor {
    tensor.mapv(f64::exp)
}

pub(crate) fn sum(tensor: &Tensor, axis: Option<usize>) -> Result<Tensor> {
    match axis {
        None => Ok(ndarray::arr0(tensor.sum()).into_dyn()),
        Some(axis) if axis < tensor.ndim() => Ok(tensor.sum_axis(Axis(axis))),
        Some(axis) => Err(RuntimeError::ShapeMismatch(format!(
            "sum over axis {axis} of a {}-d tensor",
            tensor.ndim()
        ))),
    }
}

pub(crate) fn zeros(shape: &[usize]) -> Tensor {
    ArrayD::zeros(shape)
}

pub(crate) fn ones(shape: &[usize]) -> Tensor {
    ArrayD::ones(shape)
}

pub(crate) fn eye(n: usize) -> Tensor {
    Array2::<f64>::eye(n).into_dyn()
}

pub(crate) fn matmul(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    let lhs: ArrayView2<f64> = a.view().into_dimensionality::<Ix2>().map_err(|_| {
        RuntimeError::ShapeMismatch(format!("matmul lhs must be 2-d, got {:?}", a.shape()))
    })?;
    match b.ndim() {
        1 => {
            let rhs = b.view().into_dimensionality::<Ix1>()?;
            if lhs.ncols() != rhs.len() {
                return Err(RuntimeError::ShapeMismatch(format!(
                    "matmul {:?} x {:?}",
                    a.shape(),
                    b.shape()
                )));
            }
            Ok(lhs.dot(&rhs).into_dyn())
        }
        2 => {
            let rhs = b.view().into_dimensionality::<Ix2>()?;
            if lhs.ncols() != rhs.nrows() {
                return Err(RuntimeError::ShapeMismatch(format!(
                    "matmul {:?} x {:?}",
                    a.shape(),
                    b.shape()
                )));
            }
            Ok(lhs.dot(&rhs).into_dyn())
        }
        _ => Err(RuntimeError::ShapeMismatch(format!(
            "matmul rhs must be 1-d or 2-d, got {:?}",
            b.shape()
        ))),
    }
}

pub(crate) fn vstack(tensors: &[Tensor]) -> Result<Tensor> {
    if tensors.is_empty() {
        return Err(RuntimeError::InvalidParameters(
            "vstack needs at least one tensor".to_string(),
        ));
    }
    // 1-d inputs become single rows; higher ranks stack along their first axis.
    let views: Vec<_> = tensors
        .iter()
        .map(|t| {
            if t.ndim() <= 1 {
                t.view().insert_axis(Axis(0))
            } else {
                t.view()
            }
        })
        .collect();
    Ok(concatenate(Axis(0), &views)?)
}

pub(crate) fn arange(start: f64, end: f64, step: f64) -> Result<Tensor> {
    if !(step.is_finite() && step != 0.0 && start.is_finite() && end.is_finite()) {
        return Err(RuntimeError::InvalidParameters(format!(
            "arange({start}, {end}, {step})"
        )));
    }
    Ok(Array1::range(start, end, step).into_dyn())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::OperatorTable;

    fn table() -> OperatorTable {
        OperatorTable::from_module(&HostOps).unwrap()
    }

    #[test]
    fn test_host_module_is_complete() {
        for op in OpName::ALL {
            let operator = HostOps.get(op).expect("host module provides every primitive");
            assert_eq!(operator.convention(), op.convention());
        }
    }

    #[test]
    fn test_arange_is_half_open() {
        let ts = table().arange(5.0, 10.0, 1.0).unwrap();
        assert_eq!(ts.as_slice().unwrap(), &[5.0, 6.0, 7.0, 8.0, 9.0]);
        assert!(table().arange(0.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_as_tensor_checks_shape() {
        let ops = table();
        let t = ops.as_tensor(&[1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        assert_eq!(ops.shape(&t), vec![2, 2]);
        assert!(ops.as_tensor(&[1.0, 2.0, 3.0], &[2, 2]).is_err());
    }

    #[test]
    fn test_matmul_and_eye() {
        let ops = table();
        let a = ops.as_tensor(&[1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let i = ops.eye(2);
        assert_eq!(ops.matmul(&a, &i).unwrap(), a);

        let v = ops.as_tensor(&[1.0, 1.0], &[2]).unwrap();
        let av = ops.matmul(&a, &v).unwrap();
        assert_eq!(av.as_slice().unwrap(), &[3.0, 7.0]);

        let bad = ops.zeros(&[3, 1]);
        assert!(ops.matmul(&a, &bad).is_err());
    }

    #[test]
    fn test_sum_and_exp() {
        let ops = table();
        let t = ops.as_tensor(&[0.0, 1.0, 2.0, 3.0], &[2, 2]).unwrap();
        assert_eq!(ops.sum(&t, None).unwrap().sum(), 6.0);
        assert_eq!(ops.sum(&t, Some(0)).unwrap().as_slice().unwrap(), &[2.0, 4.0]);
        assert!(ops.sum(&t, Some(2)).is_err());

        let e = ops.exp(&ops.zeros(&[3]));
        assert!(e.iter().all(|v| (*v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_vstack_rows() {
        let ops = table();
        let a = ops.ones(&[3]);
        let b = ops.zeros(&[3]);
        let s = ops.vstack(&[a, b]).unwrap();
        assert_eq!(ops.shape(&s), vec![2, 3]);
        assert!(ops.vstack(&[]).is_err());
        assert!(ops.vstack(&[ops.ones(&[3]), ops.ones(&[2])]).is_err());
    }

    #[test]
    fn test_reshape_and_normal() {
        let ops = table();
        let t = ops.normal(0.0, 1.0, &[6]).unwrap();
        let r = ops.reshape(&t, &[2, 3]).unwrap();
        assert_eq!(ops.shape(&r), vec![2, 3]);
        assert!(ops.reshape(&t, &[4]).is_err());
        assert!(ops.normal(0.0, -1.0, &[2]).is_err());
    }
}
