// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Step Functions and Argument Binding
//!
//! A step function is one update rule of a model. Its author declares the parameter
//! names it takes; [`bind`] resolves those names exactly once and returns a
//! [`BoundStep`] closure that hands the body only what it declared.
//!
//! ## Recognised names
//!
//! | Declared            | Bound to                 |
//! |---------------------|--------------------------|
//! | `ST`                | the unit state           |
//! | `t`, `_t`, `_t_`    | current time             |
//! | `i`, `_i`, `_i_`    | current step index       |
//! | `dt`, `_dt`, `_dt_` | timestep of the run      |
//! | model parameter     | group parameter value    |
//!
//! Parameter names are only bindable when the caller supplies a parameter set
//! (group and network runs); standalone model runs accept the first four only.

use std::fmt;
use std::sync::Arc;

use crate::state::NeuState;
use crate::types::{NeuralError, ParamValue, ParameterSet, Result};

/// Name under which a step receives the unit state
pub const STATE_KEY: &str = "ST";

/// Body of a step function
pub type StepBody = Arc<dyn Fn(&mut StepArgs<'_>) -> anyhow::Result<()> + Send + Sync>;

/// What a declared parameter name is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgSource {
    /// The unit state
    State,
    /// Current time
    Time,
    /// Current step index
    Index,
    /// Timestep of the run
    Dt,
    /// A model parameter
    Param(String),
}

impl ArgSource {
    /// Resolve a run-loop keyword; `None` for anything else
    pub fn keyword(name: &str) -> Option<ArgSource> {
        match name {
            STATE_KEY => Some(ArgSource::State),
            "t" | "_t" | "_t_" => Some(ArgSource::Time),
            "i" | "_i" | "_i_" => Some(ArgSource::Index),
            "dt" | "_dt" | "_dt_" => Some(ArgSource::Dt),
            _ => None,
        }
    }
}

/// One update rule with its declared parameter list
#[derive(Clone)]
pub struct StepFunction {
    name: String,
    params: Vec<String>,
    body: StepBody,
}

impl StepFunction {
    /// Declare a step
    ///
    /// ```rust
    /// use spikeflow_npu_neural::StepFunction;
    ///
    /// let step = StepFunction::new("update", ["ST", "t"], |args| {
    ///     let t = args.t()?;
    ///     args.state()?.set("v", t)?;
    ///     Ok(())
    /// });
    /// assert_eq!(step.params(), ["ST", "t"]);
    /// ```
    pub fn new<I, S, F>(name: impl Into<String>, params: I, body: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&mut StepArgs<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter names, in declaration order
    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl fmt::Debug for StepFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepFunction")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Arguments handed to a step body
///
/// Only the values the step declared are present; asking for anything else is an
/// `UndeclaredArgument` error.
pub struct StepArgs<'a> {
    step: &'a str,
    state: Option<&'a mut NeuState>,
    t: Option<f64>,
    i: Option<usize>,
    dt: Option<f64>,
    unit: Option<usize>,
    params: &'a [(String, ParamValue)],
}

impl<'a> StepArgs<'a> {
    fn undeclared(&self, arg: &str) -> NeuralError {
        NeuralError::UndeclaredArgument {
            step: self.step.to_string(),
            arg: arg.to_string(),
        }
    }

    pub fn state(&mut self) -> Result<&mut NeuState> {
        let step = self.step;
        self.state
            .as_deref_mut()
            .ok_or_else(|| NeuralError::UndeclaredArgument {
                step: step.to_string(),
                arg: STATE_KEY.to_string(),
            })
    }

    pub fn t(&self) -> Result<f64> {
        self.t.ok_or_else(|| self.undeclared("t"))
    }

    pub fn i(&self) -> Result<usize> {
        self.i.ok_or_else(|| self.undeclared("i"))
    }

    pub fn dt(&self) -> Result<f64> {
        self.dt.ok_or_else(|| self.undeclared("dt"))
    }

    /// Unit index during per-unit (scalar-layout) execution
    pub fn unit(&self) -> Option<usize> {
        self.unit
    }

    /// A declared model parameter
    pub fn param(&self, name: &str) -> Result<&ParamValue> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| self.undeclared(name))
    }

    /// A declared parameter's value for the current unit
    ///
    /// Homogeneous parameters return their shared value; per-unit parameters need a
    /// unit context (scalar-layout execution).
    pub fn param_value(&self, name: &str) -> Result<f64> {
        let value = self.param(name)?;
        match (value, self.unit) {
            (ParamValue::Scalar(v), _) => Ok(*v),
            (ParamValue::PerUnit(_), Some(unit)) => {
                value.at(unit).ok_or_else(|| NeuralError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("no value for unit {unit}"),
                })
            }
            (ParamValue::PerUnit(_), None) => Err(NeuralError::InvalidParameter {
                name: name.to_string(),
                reason: "per-unit parameter read outside per-unit execution; use param()"
                    .to_string(),
            }),
        }
    }
}

/// What [`bind`] may resolve names against
#[derive(Debug, Clone, Copy)]
pub struct BindScope<'a> {
    /// Timestep captured into the bound step
    pub dt: f64,
    /// Parameters bindable by name (`None` = run-loop keywords only)
    pub params: Option<&'a ParameterSet>,
}

type Invoke =
    Box<dyn Fn(&mut NeuState, usize, f64, Option<usize>) -> anyhow::Result<()> + Send + Sync>;

/// A step whose argument binding has been resolved
pub struct BoundStep {
    name: String,
    sources: Vec<ArgSource>,
    invoke: Invoke,
}

impl BoundStep {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved sources, in declaration order
    pub fn sources(&self) -> &[ArgSource] {
        &self.sources
    }

    /// Run the step body for step `i` at time `t`
    #[inline]
    pub fn call(&self, state: &mut NeuState, i: usize, t: f64) -> anyhow::Result<()> {
        (self.invoke)(state, i, t, None)
    }

    /// Run the step body for one unit of a per-unit (scalar-layout) model
    #[inline]
    pub fn call_unit(
        &self,
        state: &mut NeuState,
        i: usize,
        t: f64,
        unit: usize,
    ) -> anyhow::Result<()> {
        (self.invoke)(state, i, t, Some(unit))
    }
}

impl fmt::Debug for BoundStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundStep")
            .field("name", &self.name)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

/// Resolve a step's declared names once
///
/// # Errors
/// `UnknownStepParameter` for the first declared name that is neither a run-loop
/// keyword nor (when `scope.params` is given) a parameter.
pub fn bind(step: &StepFunction, scope: BindScope<'_>) -> Result<BoundStep> {
    let mut sources = Vec::with_capacity(step.params.len());
    let mut params: Vec<(String, ParamValue)> = Vec::new();
    for name in &step.params {
        let source = match ArgSource::keyword(name) {
            Some(source) => source,
            None => match scope.params.and_then(|p| p.get(name)) {
                Some(value) => {
                    params.push((name.clone(), value.clone()));
                    ArgSource::Param(name.clone())
                }
                None => {
                    return Err(NeuralError::UnknownStepParameter {
                        step: step.name.clone(),
                        param: name.clone(),
                    })
                }
            },
        };
        sources.push(source);
    }

    let wants_state = sources.contains(&ArgSource::State);
    let wants_t = sources.contains(&ArgSource::Time);
    let wants_i = sources.contains(&ArgSource::Index);
    let dt = sources.contains(&ArgSource::Dt).then_some(scope.dt);
    let body = Arc::clone(&step.body);
    let name = step.name.clone();
    let step_name = name.clone();

    let invoke: Invoke = Box::new(move |state, i, t, unit| {
        let mut args = StepArgs {
            step: &step_name,
            state: if wants_state { Some(state) } else { None },
            t: wants_t.then_some(t),
            i: wants_i.then_some(i),
            dt,
            unit,
            params: &params,
        };
        body(&mut args)
    });

    tracing::debug!(step = %name, ?sources, "bound step arguments");
    Ok(BoundStep {
        name,
        sources,
        invoke,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Layout, StateTemplate};
    use spikeflow_npu_runtime::{HostOps, OperatorTable};

    fn state() -> NeuState {
        let ops = OperatorTable::from_module(&HostOps).unwrap();
        StateTemplate::new([("v", 0.0)])
            .unwrap()
            .make_copy(1, Layout::Vector, &ops)
            .unwrap()
    }

    fn scope() -> BindScope<'static> {
        BindScope {
            dt: 0.5,
            params: None,
        }
    }

    #[test]
    fn test_keywords_and_aliases() {
        assert_eq!(ArgSource::keyword("ST"), Some(ArgSource::State));
        assert_eq!(ArgSource::keyword("_t_"), Some(ArgSource::Time));
        assert_eq!(ArgSource::keyword("_i"), Some(ArgSource::Index));
        assert_eq!(ArgSource::keyword("dt"), Some(ArgSource::Dt));
        assert_eq!(ArgSource::keyword("tau"), None);
    }

    #[test]
    fn test_bound_step_receives_declared_values() {
        let step = StepFunction::new("update", ["ST", "t", "i", "dt"], |args| {
            let value = args.t()? + args.i()? as f64 * 100.0 + args.dt()? * 1000.0;
            args.state()?.set("v", value)?;
            Ok(())
        });
        let bound = bind(&step, scope()).unwrap();
        assert_eq!(
            bound.sources(),
            &[ArgSource::State, ArgSource::Time, ArgSource::Index, ArgSource::Dt]
        );

        let mut st = state();
        bound.call(&mut st, 2, 3.0).unwrap();
        assert_eq!(st["v"][0], 3.0 + 200.0 + 500.0);
    }

    #[test]
    fn test_undeclared_values_are_withheld() {
        let step = StepFunction::new("only_state", ["ST"], |args| {
            args.t()?;
            Ok(())
        });
        let bound = bind(&step, scope()).unwrap();
        let err = bound.call(&mut state(), 0, 0.0).unwrap_err();
        let neural = err.downcast_ref::<NeuralError>().unwrap();
        assert_eq!(
            neural,
            &NeuralError::UndeclaredArgument {
                step: "only_state".to_string(),
                arg: "t".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_name_fails_binding() {
        let step = StepFunction::new("update", ["ST", "tau"], |_| Ok(()));
        let err = bind(&step, scope()).unwrap_err();
        assert_eq!(
            err,
            NeuralError::UnknownStepParameter {
                step: "update".to_string(),
                param: "tau".to_string(),
            }
        );
    }

    #[test]
    fn test_parameters_bind_when_in_scope() {
        let params = ParameterSet::new().with("tau", 4.0);
        let step = StepFunction::new("decay", ["ST", "tau"], |args| {
            let tau = args.param_value("tau")?;
            args.state()?.set("v", tau)?;
            Ok(())
        });
        let bound = bind(
            &step,
            BindScope {
                dt: 0.1,
                params: Some(&params),
            },
        )
        .unwrap();
        let mut st = state();
        bound.call(&mut st, 0, 0.0).unwrap();
        assert_eq!(st["v"][0], 4.0);
    }
}
