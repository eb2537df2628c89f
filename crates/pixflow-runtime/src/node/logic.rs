//! Arithmetic and comparison helpers used by loop conditions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::{WorkflowError, WorkflowResult};
use crate::node::{Node, NodeContext, NodeInputs, NodeOutput};
use crate::value::Value;

/// Integer operations supported by [`MathInt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MathOperation {
    Add,
    Subtract,
    Multiply,
    /// Floor division.
    Divide,
    /// Floor modulo; the result takes the sign of the divisor.
    Modulo,
    Power,
}

impl MathOperation {
    /// Applies the operation. Division by zero, negative exponents and
    /// overflow all yield `0`.
    pub fn apply(self, a: i64, b: i64) -> i64 {
        let result = match self {
            Self::Add => a.checked_add(b),
            Self::Subtract => a.checked_sub(b),
            Self::Multiply => a.checked_mul(b),
            Self::Divide => floor_div(a, b),
            Self::Modulo => floor_mod(a, b),
            Self::Power => u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp)),
        };
        result.unwrap_or(0)
    }
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    let remainder = a.checked_rem(b)?;
    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let remainder = a.checked_rem(b)?;
    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        remainder.checked_add(b)
    } else {
        Some(remainder)
    }
}

/// Integer arithmetic on `a` and `b`.
///
/// Inputs: `a`, `b` (default 0) and `operation`. Output: the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathInt;

#[async_trait::async_trait]
impl Node for MathInt {
    async fn execute(
        &self,
        _ctx: &NodeContext<'_>,
        inputs: NodeInputs,
    ) -> WorkflowResult<NodeOutput> {
        let operation = inputs.str_or("operation", "add")?;
        let operation: MathOperation = operation.parse().map_err(|_| {
            WorkflowError::invalid_input(
                inputs.node_id(),
                "operation",
                format!("unknown operation {operation:?}"),
            )
        })?;

        let result = operation.apply(inputs.int_or("a", 0), inputs.int_or("b", 0));
        Ok(NodeOutput::values([Value::Int(result)]))
    }
}

/// Comparisons supported by [`Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
pub enum Comparison {
    #[serde(rename = "a == b")]
    #[strum(serialize = "a == b")]
    Equal,
    #[serde(rename = "a != b")]
    #[strum(serialize = "a != b")]
    NotEqual,
    #[serde(rename = "a < b")]
    #[strum(serialize = "a < b")]
    Less,
    #[serde(rename = "a > b")]
    #[strum(serialize = "a > b")]
    Greater,
    #[serde(rename = "a <= b")]
    #[strum(serialize = "a <= b")]
    LessOrEqual,
    #[serde(rename = "a >= b")]
    #[strum(serialize = "a >= b")]
    GreaterOrEqual,
}

impl Comparison {
    /// Evaluates the comparison.
    ///
    /// Values that cannot be ordered against each other only satisfy `!=`.
    pub fn evaluate(self, a: &Value, b: &Value) -> bool {
        match self {
            Self::Equal => a.loose_eq(b),
            Self::NotEqual => !a.loose_eq(b),
            ordering => a.loose_cmp(b).is_some_and(|order| match ordering {
                Self::Less => order == Ordering::Less,
                Self::Greater => order == Ordering::Greater,
                Self::LessOrEqual => order != Ordering::Greater,
                Self::GreaterOrEqual => order != Ordering::Less,
                Self::Equal | Self::NotEqual => false,
            }),
        }
    }
}

/// Compares `a` with `b`.
///
/// Inputs: `a`, `b` (default 0) and `comparison` (default `a == b`).
/// Output: a bool.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compare;

#[async_trait::async_trait]
impl Node for Compare {
    async fn execute(
        &self,
        _ctx: &NodeContext<'_>,
        inputs: NodeInputs,
    ) -> WorkflowResult<NodeOutput> {
        let comparison = inputs.str_or("comparison", "a == b")?;
        let comparison: Comparison = comparison.parse().map_err(|_| {
            WorkflowError::invalid_input(
                inputs.node_id(),
                "comparison",
                format!("unknown comparison {comparison:?}"),
            )
        })?;

        let zero = Value::Int(0);
        let a = inputs.value("a").unwrap_or(&zero);
        let b = inputs.value("b").unwrap_or(&zero);
        Ok(NodeOutput::values([Value::Bool(comparison.evaluate(a, b))]))
    }
}

/// Reports whether `any_data` holds nothing.
///
/// Null, empty text, empty lists, empty maps and empty tensors are empty.
/// `invert` flips the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsEmpty;

#[async_trait::async_trait]
impl Node for IsEmpty {
    async fn execute(
        &self,
        _ctx: &NodeContext<'_>,
        inputs: NodeInputs,
    ) -> WorkflowResult<NodeOutput> {
        let invert = inputs.bool_or("invert", false)?;
        let empty = inputs.value("any_data").is_none_or(Value::is_empty);
        Ok(NodeOutput::values([Value::Bool(empty != invert)]))
    }
}
