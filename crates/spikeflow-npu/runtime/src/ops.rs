// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Primitive operator vocabulary
//!
//! Every backend supplies the same twelve primitives. Each primitive has one fixed
//! calling convention ([`Convention`]); an [`Operator`] is a primitive implementation
//! tagged with its convention so tables can reject mismatched bindings up front.
//!
//! ## Design Notes
//!
//! - **Closed vocabulary**: [`OpName::ALL`] is the complete list; there is no way to
//!   register a primitive outside it.
//! - **Always resolved**: an [`OperatorTable`] holds a callable for every slot, so
//!   model code never observes a missing primitive at call time.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;
use std::sync::Arc;

use ndarray::ArrayD;

use crate::error::{Result, RuntimeError};

/// Backend-native array type
pub type Tensor = ArrayD<f64>;

/// `as_tensor(data, shape)`
pub type AsTensorFn = Arc<dyn Fn(&[f64], &[usize]) -> Result<Tensor> + Send + Sync>;
/// `normal(loc, scale, shape)`
pub type NormalFn = Arc<dyn Fn(f64, f64, &[usize]) -> Result<Tensor> + Send + Sync>;
/// `reshape(tensor, shape)`
pub type ReshapeFn = Arc<dyn Fn(&Tensor, &[usize]) -> Result<Tensor> + Send + Sync>;
/// `shape(tensor)`
pub type ShapeFn = Arc<dyn Fn(&Tensor) -> Vec<usize> + Send + Sync>;
/// Elementwise map (`exp`)
pub type UnaryFn = Arc<dyn Fn(&Tensor) -> Tensor + Send + Sync>;
/// Reduction over all elements or one axis (`sum`)
pub type ReduceFn = Arc<dyn Fn(&Tensor, Option<usize>) -> Result<Tensor> + Send + Sync>;
/// Constant-filled construction (`zeros`, `ones`)
pub type FillFn = Arc<dyn Fn(&[usize]) -> Tensor + Send + Sync>;
/// Identity construction (`eye`)
pub type EyeFn = Arc<dyn Fn(usize) -> Tensor + Send + Sync>;
/// Binary tensor product (`matmul`)
pub type BinaryFn = Arc<dyn Fn(&Tensor, &Tensor) -> Result<Tensor> + Send + Sync>;
/// Stacking (`vstack`)
pub type StackFn = Arc<dyn Fn(&[Tensor]) -> Result<Tensor> + Send + Sync>;
/// Range generation (`arange(start, end, step)`)
pub type RangeFn = Arc<dyn Fn(f64, f64, f64) -> Result<Tensor> + Send + Sync>;

/// Names of the primitives every backend must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpName {
    /// Tensor construction from flat data
    AsTensor,
    /// Normal-random sampling
    Normal,
    /// Reshape
    Reshape,
    /// Shape query
    Shape,
    /// Elementwise exponential
    Exp,
    /// Reduction-sum
    Sum,
    /// Zero construction
    Zeros,
    /// One construction
    Ones,
    /// Identity construction
    Eye,
    /// Matrix multiply
    Matmul,
    /// Vertical stacking
    Vstack,
    /// Range generation
    Arange,
}

impl OpName {
    /// The complete vocabulary, in resolution order
    pub const ALL: [OpName; 12] = [
        OpName::AsTensor,
        OpName::Normal,
        OpName::Reshape,
        OpName::Shape,
        OpName::Exp,
        OpName::Sum,
        OpName::Zeros,
        OpName::Ones,
        OpName::Eye,
        OpName::Matmul,
        OpName::Vstack,
        OpName::Arange,
    ];

    /// Canonical primitive name
    pub const fn as_str(self) -> &'static str {
        match self {
            OpName::AsTensor => "as_tensor",
            OpName::Normal => "normal",
            OpName::Reshape => "reshape",
            OpName::Shape => "shape",
            OpName::Exp => "exp",
            OpName::Sum => "sum",
            OpName::Zeros => "zeros",
            OpName::Ones => "ones",
            OpName::Eye => "eye",
            OpName::Matmul => "matmul",
            OpName::Vstack => "vstack",
            OpName::Arange => "arange",
        }
    }

    /// Calling convention this slot requires
    pub const fn convention(self) -> Convention {
        match self {
            OpName::AsTensor => Convention::AsTensor,
            OpName::Normal => Convention::Normal,
            OpName::Reshape => Convention::Reshape,
            OpName::Shape => Convention::Shape,
            OpName::Exp => Convention::Unary,
            OpName::Sum => Convention::Reduce,
            OpName::Zeros | OpName::Ones => Convention::Fill,
            OpName::Eye => Convention::Eye,
            OpName::Matmul => Convention::Binary,
            OpName::Vstack => Convention::Stack,
            OpName::Arange => Convention::Range,
        }
    }
}

impl fmt::Display for OpName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpName {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self> {
        OpName::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| RuntimeError::UnknownOperators(vec![s.to_string()]))
    }
}

/// Calling conventions of the vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// `fn(&[f64], &[usize]) -> Result<Tensor>`
    AsTensor,
    /// `fn(f64, f64, &[usize]) -> Result<Tensor>`
    Normal,
    /// `fn(&Tensor, &[usize]) -> Result<Tensor>`
    Reshape,
    /// `fn(&Tensor) -> Vec<usize>`
    Shape,
    /// `fn(&Tensor) -> Tensor`
    Unary,
    /// `fn(&Tensor, Option<usize>) -> Result<Tensor>`
    Reduce,
    /// `fn(&[usize]) -> Tensor`
    Fill,
    /// `fn(usize) -> Tensor`
    Eye,
    /// `fn(&Tensor, &Tensor) -> Result<Tensor>`
    Binary,
    /// `fn(&[Tensor]) -> Result<Tensor>`
    Stack,
    /// `fn(f64, f64, f64) -> Result<Tensor>`
    Range,
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sig = match self {
            Convention::AsTensor => "fn(&[f64], &[usize]) -> Result<Tensor>",
            Convention::Normal => "fn(f64, f64, &[usize]) -> Result<Tensor>",
            Convention::Reshape => "fn(&Tensor, &[usize]) -> Result<Tensor>",
            Convention::Shape => "fn(&Tensor) -> Vec<usize>",
            Convention::Unary => "fn(&Tensor) -> Tensor",
            Convention::Reduce => "fn(&Tensor, Option<usize>) -> Result<Tensor>",
            Convention::Fill => "fn(&[usize]) -> Tensor",
            Convention::Eye => "fn(usize) -> Tensor",
            Convention::Binary => "fn(&Tensor, &Tensor) -> Result<Tensor>",
            Convention::Stack => "fn(&[Tensor]) -> Result<Tensor>",
            Convention::Range => "fn(f64, f64, f64) -> Result<Tensor>",
        };
        f.write_str(sig)
    }
}

/// A primitive implementation tagged with its calling convention
#[derive(Clone)]
pub enum Operator {
    /// See [`Convention::AsTensor`]
    AsTensor(AsTensorFn),
    /// See [`Convention::Normal`]
    Normal(NormalFn),
    /// See [`Convention::Reshape`]
    Reshape(ReshapeFn),
    /// See [`Convention::Shape`]
    Shape(ShapeFn),
    /// See [`Convention::Unary`]
    Unary(UnaryFn),
    /// See [`Convention::Reduce`]
    Reduce(ReduceFn),
    /// See [`Convention::Fill`]
    Fill(FillFn),
    /// See [`Convention::Eye`]
    Eye(EyeFn),
    /// See [`Convention::Binary`]
    Binary(BinaryFn),
    /// See [`Convention::Stack`]
    Stack(StackFn),
    /// See [`Convention::Range`]
    Range(RangeFn),
}

impl Operator {
    /// Wrap a tensor constructor
    pub fn as_tensor<F>(f: F) -> Self
    where
        F: Fn(&[f64], &[usize]) -> Result<Tensor> + Send + Sync + 'static,
    {
        Operator::AsTensor(Arc::new(f))
    }

    /// Wrap a normal sampler
    pub fn normal<F>(f: F) -> Self
    where
        F: Fn(f64, f64, &[usize]) -> Result<Tensor> + Send + Sync + 'static,
    {
        Operator::Normal(Arc::new(f))
    }

    /// Wrap a reshape
    pub fn reshape<F>(f: F) -> Self
    where
        F: Fn(&Tensor, &[usize]) -> Result<Tensor> + Send + Sync + 'static,
    {
        Operator::Reshape(Arc::new(f))
    }

    /// Wrap a shape query
    pub fn shape<F>(f: F) -> Self
    where
        F: Fn(&Tensor) -> Vec<usize> + Send + Sync + 'static,
    {
        Operator::Shape(Arc::new(f))
    }

    /// Wrap an elementwise map
    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(&Tensor) -> Tensor + Send + Sync + 'static,
    {
        Operator::Unary(Arc::new(f))
    }

    /// Wrap a reduction
    pub fn reduce<F>(f: F) -> Self
    where
        F: Fn(&Tensor, Option<usize>) -> Result<Tensor> + Send + Sync + 'static,
    {
        Operator::Reduce(Arc::new(f))
    }

    /// Wrap a constant-filled constructor
    pub fn fill<F>(f: F) -> Self
    where
        F: Fn(&[usize]) -> Tensor + Send + Sync + 'static,
    {
        Operator::Fill(Arc::new(f))
    }

    /// Wrap an identity constructor
    pub fn eye<F>(f: F) -> Self
    where
        F: Fn(usize) -> Tensor + Send + Sync + 'static,
    {
        Operator::Eye(Arc::new(f))
    }

    /// Wrap a binary product
    pub fn binary<F>(f: F) -> Self
    where
        F: Fn(&Tensor, &Tensor) -> Result<Tensor> + Send + Sync + 'static,
    {
        Operator::Binary(Arc::new(f))
    }

    /// Wrap a stacking primitive
    pub fn stack<F>(f: F) -> Self
    where
        F: Fn(&[Tensor]) -> Result<Tensor> + Send + Sync + 'static,
    {
        Operator::Stack(Arc::new(f))
    }

    /// Wrap a range generator
    pub fn range<F>(f: F) -> Self
    where
        F: Fn(f64, f64, f64) -> Result<Tensor> + Send + Sync + 'static,
    {
        Operator::Range(Arc::new(f))
    }

    /// Calling convention of this operator
    pub fn convention(&self) -> Convention {
        match self {
            Operator::AsTensor(_) => Convention::AsTensor,
            Operator::Normal(_) => Convention::Normal,
            Operator::Reshape(_) => Convention::Reshape,
            Operator::Shape(_) => Convention::Shape,
            Operator::Unary(_) => Convention::Unary,
            Operator::Reduce(_) => Convention::Reduce,
            Operator::Fill(_) => Convention::Fill,
            Operator::Eye(_) => Convention::Eye,
            Operator::Binary(_) => Convention::Binary,
            Operator::Stack(_) => Convention::Stack,
            Operator::Range(_) => Convention::Range,
        }
    }

    /// Whether both operators wrap the same callable
    pub fn same_callable(&self, other: &Operator) -> bool {
        // Compare data pointers only; vtables may be duplicated across codegen units.
        fn addr<T: ?Sized>(a: &Arc<T>) -> *const u8 {
            Arc::as_ptr(a) as *const u8
        }
        match (self, other) {
            (Operator::AsTensor(a), Operator::AsTensor(b)) => addr(a) == addr(b),
            (Operator::Normal(a), Operator::Normal(b)) => addr(a) == addr(b),
            (Operator::Reshape(a), Operator::Reshape(b)) => addr(a) == addr(b),
            (Operator::Shape(a), Operator::Shape(b)) => addr(a) == addr(b),
            (Operator::Unary(a), Operator::Unary(b)) => addr(a) == addr(b),
            (Operator::Reduce(a), Operator::Reduce(b)) => addr(a) == addr(b),
            (Operator::Fill(a), Operator::Fill(b)) => addr(a) == addr(b),
            (Operator::Eye(a), Operator::Eye(b)) => addr(a) == addr(b),
            (Operator::Binary(a), Operator::Binary(b)) => addr(a) == addr(b),
            (Operator::Stack(a), Operator::Stack(b)) => addr(a) == addr(b),
            (Operator::Range(a), Operator::Range(b)) => addr(a) == addr(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operator({})", self.convention())
    }
}

/// A bundle of named primitives
///
/// The module-shaped operator source: a backend exposes every vocabulary primitive
/// under its canonical name. [`OperatorTable::from_module`] requires all of them.
pub trait OperatorModule: Send + Sync {
    /// Module name (used in error messages and logs)
    fn name(&self) -> &str;

    /// Look up one primitive
    fn get(&self, op: OpName) -> Option<Operator>;
}

/// An owned, possibly partial, primitive bundle
///
/// Handy for assembling a module out of individual callables, or for wrapping
/// an existing module with a few replacements.
#[derive(Clone, Default)]
pub struct OperatorMap {
    name: String,
    ops: BTreeMap<OpName, Operator>,
}

impl OperatorMap {
    /// Empty bundle
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ops: BTreeMap::new(),
        }
    }

    /// Copy every primitive `module` provides
    pub fn from_module(name: impl Into<String>, module: &dyn OperatorModule) -> Self {
        let ops = OpName::ALL
            .iter()
            .filter_map(|op| module.get(*op).map(|operator| (*op, operator)))
            .collect();
        Self {
            name: name.into(),
            ops,
        }
    }

    /// Add or replace a primitive
    pub fn with(mut self, op: OpName, operator: Operator) -> Self {
        self.ops.insert(op, operator);
        self
    }

    /// Remove a primitive
    pub fn without(mut self, op: OpName) -> Self {
        self.ops.remove(&op);
        self
    }
}

impl OperatorModule for OperatorMap {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, op: OpName) -> Option<Operator> {
        self.ops.get(&op).cloned()
    }
}

impl fmt::Debug for OperatorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorMap")
            .field("name", &self.name)
            .field("ops", &self.ops.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Where a backend's primitives come from
///
/// Exactly one form is ever supplied; both normalise into [`OperatorTable`] updates.
#[derive(Clone)]
pub enum OperatorSource {
    /// A complete module (every primitive required)
    Module(Arc<dyn OperatorModule>),
    /// Explicit name → operator overrides (only recognised names allowed)
    Operations(BTreeMap<String, Operator>),
}

impl OperatorSource {
    /// Module-shaped source
    pub fn module<M: OperatorModule + 'static>(module: M) -> Self {
        OperatorSource::Module(Arc::new(module))
    }

    /// Mapping-shaped source
    pub fn operations<I, K>(ops: I) -> Self
    where
        I: IntoIterator<Item = (K, Operator)>,
        K: Into<String>,
    {
        OperatorSource::Operations(ops.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Debug for OperatorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorSource::Module(m) => write!(f, "OperatorSource::Module({})", m.name()),
            OperatorSource::Operations(ops) => f
                .debug_tuple("OperatorSource::Operations")
                .field(&ops.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Fully-resolved primitive table
///
/// Every slot is always bound, so the typed call helpers below never fail on lookup.
#[derive(Clone)]
pub struct OperatorTable {
    module: String,
    as_tensor: AsTensorFn,
    normal: NormalFn,
    reshape: ReshapeFn,
    shape: ShapeFn,
    exp: UnaryFn,
    sum: ReduceFn,
    zeros: FillFn,
    ones: FillFn,
    eye: EyeFn,
    matmul: BinaryFn,
    vstack: StackFn,
    arange: RangeFn,
}

macro_rules! take_slot {
    ($module:expr, $op:expr, $variant:ident) => {
        match $module.get($op) {
            Some(Operator::$variant(f)) => f,
            Some(other) => {
                return Err(RuntimeError::SignatureMismatch {
                    op: $op.to_string(),
                    expected: $op.convention().to_string(),
                    actual: other.convention().to_string(),
                })
            }
            None => {
                return Err(RuntimeError::MissingOperator {
                    op: $op.to_string(),
                    module: $module.name().to_string(),
                })
            }
        }
    };
}

impl OperatorTable {
    /// Resolve every vocabulary primitive from `module`
    ///
    /// # Errors
    /// `MissingOperator` naming the first absent primitive and the module, or
    /// `SignatureMismatch` if the module binds a primitive with the wrong convention.
    pub fn from_module(module: &dyn OperatorModule) -> Result<Self> {
        let table = Self {
            module: module.name().to_string(),
            as_tensor: take_slot!(module, OpName::AsTensor, AsTensor),
            normal: take_slot!(module, OpName::Normal, Normal),
            reshape: take_slot!(module, OpName::Reshape, Reshape),
            shape: take_slot!(module, OpName::Shape, Shape),
            exp: take_slot!(module, OpName::Exp, Unary),
            sum: take_slot!(module, OpName::Sum, Reduce),
            zeros: take_slot!(module, OpName::Zeros, Fill),
            ones: take_slot!(module, OpName::Ones, Fill),
            eye: take_slot!(module, OpName::Eye, Eye),
            matmul: take_slot!(module, OpName::Matmul, Binary),
            vstack: take_slot!(module, OpName::Vstack, Stack),
            arange: take_slot!(module, OpName::Arange, Range),
        };
        tracing::debug!(module = %table.module, "resolved operator table");
        Ok(table)
    }

    /// Table bound to the eager host primitives
    ///
    /// Same bindings as `from_module(&HostOps)`, without the fallible lookup.
    pub fn host() -> Self {
        use crate::std_impl::host_ops;

        Self {
            module: crate::std_impl::HostOps::NAME.to_string(),
            as_tensor: Arc::new(host_ops::as_tensor),
            normal: Arc::new(host_ops::normal),
            reshape: Arc::new(host_ops::reshape),
            shape: Arc::new(host_ops::shape),
            exp: Arc::new(host_ops::exp),
            sum: Arc::new(host_ops::sum),
            zeros: Arc::new(host_ops::zeros),
            ones: Arc::new(host_ops::ones),
            eye: Arc::new(host_ops::eye),
            matmul: Arc::new(host_ops::matmul),
            vstack: Arc::new(host_ops::vstack),
            arange: Arc::new(host_ops::arange),
        }
    }

    /// Rebind the named primitives
    ///
    /// Nothing is modified unless every key is a vocabulary name and every operator
    /// matches its slot's convention.
    ///
    /// # Errors
    /// `UnknownOperators` listing every unrecognised key (sorted), or
    /// `SignatureMismatch` for the first convention mismatch.
    pub fn apply(&mut self, ops: BTreeMap<String, Operator>) -> Result<Vec<OpName>> {
        let unknown: Vec<String> = ops
            .keys()
            .filter(|key| key.parse::<OpName>().is_err())
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(RuntimeError::UnknownOperators(unknown));
        }

        let mut resolved = Vec::with_capacity(ops.len());
        for (key, operator) in ops {
            let op: OpName = key.parse()?;
            if operator.convention() != op.convention() {
                return Err(RuntimeError::SignatureMismatch {
                    op: op.to_string(),
                    expected: op.convention().to_string(),
                    actual: operator.convention().to_string(),
                });
            }
            resolved.push((op, operator));
        }

        let rebound = resolved.iter().map(|(op, _)| *op).collect();
        for (op, operator) in resolved {
            self.bind(op, operator);
        }
        Ok(rebound)
    }

    fn bind(&mut self, op: OpName, operator: Operator) {
        match (op, operator) {
            (OpName::AsTensor, Operator::AsTensor(f)) => self.as_tensor = f,
            (OpName::Normal, Operator::Normal(f)) => self.normal = f,
            (OpName::Reshape, Operator::Reshape(f)) => self.reshape = f,
            (OpName::Shape, Operator::Shape(f)) => self.shape = f,
            (OpName::Exp, Operator::Unary(f)) => self.exp = f,
            (OpName::Sum, Operator::Reduce(f)) => self.sum = f,
            (OpName::Zeros, Operator::Fill(f)) => self.zeros = f,
            (OpName::Ones, Operator::Fill(f)) => self.ones = f,
            (OpName::Eye, Operator::Eye(f)) => self.eye = f,
            (OpName::Matmul, Operator::Binary(f)) => self.matmul = f,
            (OpName::Vstack, Operator::Stack(f)) => self.vstack = f,
            (OpName::Arange, Operator::Range(f)) => self.arange = f,
            // Conventions are checked in `apply` before any slot is touched.
            (op, operator) => tracing::error!(
                %op,
                convention = %operator.convention(),
                "operator convention mismatch reached bind"
            ),
        }
    }

    /// Name of the module the table was resolved from
    pub fn module_name(&self) -> &str {
        &self.module
    }

    /// Current binding of one primitive
    pub fn get(&self, op: OpName) -> Operator {
        match op {
            OpName::AsTensor => Operator::AsTensor(Arc::clone(&self.as_tensor)),
            OpName::Normal => Operator::Normal(Arc::clone(&self.normal)),
            OpName::Reshape => Operator::Reshape(Arc::clone(&self.reshape)),
            OpName::Shape => Operator::Shape(Arc::clone(&self.shape)),
            OpName::Exp => Operator::Unary(Arc::clone(&self.exp)),
            OpName::Sum => Operator::Reduce(Arc::clone(&self.sum)),
            OpName::Zeros => Operator::Fill(Arc::clone(&self.zeros)),
            OpName::Ones => Operator::Fill(Arc::clone(&self.ones)),
            OpName::Eye => Operator::Eye(Arc::clone(&self.eye)),
            OpName::Matmul => Operator::Binary(Arc::clone(&self.matmul)),
            OpName::Vstack => Operator::Stack(Arc::clone(&self.vstack)),
            OpName::Arange => Operator::Range(Arc::clone(&self.arange)),
        }
    }

    // === Typed call helpers ===

    /// Build a tensor from flat data
    pub fn as_tensor(&self, data: &[f64], shape: &[usize]) -> Result<Tensor> {
        (self.as_tensor)(data, shape)
    }

    /// Sample `N(loc, scale²)` into a tensor of `shape`
    pub fn normal(&self, loc: f64, scale: f64, shape: &[usize]) -> Result<Tensor> {
        (self.normal)(loc, scale, shape)
    }

    /// Reshape a tensor
    pub fn reshape(&self, tensor: &Tensor, shape: &[usize]) -> Result<Tensor> {
        (self.reshape)(tensor, shape)
    }

    /// Shape of a tensor
    pub fn shape(&self, tensor: &Tensor) -> Vec<usize> {
        (self.shape)(tensor)
    }

    /// Elementwise exponential
    pub fn exp(&self, tensor: &Tensor) -> Tensor {
        (self.exp)(tensor)
    }

    /// Sum all elements (`axis = None`) or along one axis
    pub fn sum(&self, tensor: &Tensor, axis: Option<usize>) -> Result<Tensor> {
        (self.sum)(tensor, axis)
    }

    /// Zero-filled tensor
    pub fn zeros(&self, shape: &[usize]) -> Tensor {
        (self.zeros)(shape)
    }

    /// One-filled tensor
    pub fn ones(&self, shape: &[usize]) -> Tensor {
        (self.ones)(shape)
    }

    /// `n × n` identity
    pub fn eye(&self, n: usize) -> Tensor {
        (self.eye)(n)
    }

    /// Matrix product
    pub fn matmul(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        (self.matmul)(a, b)
    }

    /// Stack tensors along a new leading row axis
    pub fn vstack(&self, tensors: &[Tensor]) -> Result<Tensor> {
        (self.vstack)(tensors)
    }

    /// Half-open range `[start, end)` with `step`
    pub fn arange(&self, start: f64, end: f64, step: f64) -> Result<Tensor> {
        (self.arange)(start, end, step)
    }
}

impl fmt::Debug for OperatorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorTable")
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}
