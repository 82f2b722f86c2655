//! Boolean filter expression trees.
//!
//! A [`FilterExpression`] is an immutable tree of `And`/`Or`/`Not` nodes
//! over `Compare` leaves. Each leaf names an attribute path, a
//! [`ComparisonOperator`], and a right-hand literal. Trees are evaluated
//! against items through an [`EvaluatorSet`](crate::EvaluatorSet), which
//! dispatches each node kind to its registered evaluator.
//!
//! # Example
//!
//! ```
//! use horizon_facet_core::{ComparisonOperator, EvaluatorSet, FilterExpression, Value};
//!
//! let adults_in_town = FilterExpression::and(vec![
//!     FilterExpression::compare("age", ComparisonOperator::greater_than(), 17),
//!     FilterExpression::compare("address.city", ComparisonOperator::equals(), "Utrecht"),
//! ]);
//!
//! let item = Value::record([
//!     ("age", Value::from(30)),
//!     ("address", Value::record([("city", "Utrecht")])),
//! ]);
//! let evaluators = EvaluatorSet::new();
//! assert!(evaluators.matches(&item, &adults_in_town).unwrap());
//! ```

use std::fmt;

use crate::error::{Error, Result};
use crate::operator::ComparisonOperator;
use crate::registry::EvaluatorSet;
use crate::value::{Attributed, Value};

/// An immutable boolean predicate tree over item attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    /// All children must match; evaluation fails fast on the first miss.
    And(Vec<FilterExpression>),
    /// Any child may match; evaluation short-circuits on the first hit.
    Or(Vec<FilterExpression>),
    /// Negates its child.
    Not(Box<FilterExpression>),
    /// Compares a resolved attribute value against a literal.
    Compare {
        /// Attribute path resolved against each item.
        attribute: String,
        /// The comparison kind and its modifiers.
        operator: ComparisonOperator,
        /// The right-hand literal.
        operand: Value,
    },
}

/// Discriminant used for registry dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    And,
    Or,
    Not,
    Compare,
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprKind::And => write!(f, "and"),
            ExprKind::Or => write!(f, "or"),
            ExprKind::Not => write!(f, "not"),
            ExprKind::Compare => write!(f, "compare"),
        }
    }
}

impl FilterExpression {
    /// Conjunction of `children`.
    pub fn and(children: Vec<FilterExpression>) -> Self {
        FilterExpression::And(children)
    }

    /// Disjunction of `children`.
    pub fn or(children: Vec<FilterExpression>) -> Self {
        FilterExpression::Or(children)
    }

    /// Negation of `child`.
    pub fn not(child: FilterExpression) -> Self {
        FilterExpression::Not(Box::new(child))
    }

    /// A comparison leaf.
    pub fn compare(
        attribute: impl Into<String>,
        operator: ComparisonOperator,
        operand: impl Into<Value>,
    ) -> Self {
        FilterExpression::Compare {
            attribute: attribute.into(),
            operator,
            operand: operand.into(),
        }
    }

    /// The node's kind, used for evaluator dispatch.
    pub fn kind(&self) -> ExprKind {
        match self {
            FilterExpression::And(_) => ExprKind::And,
            FilterExpression::Or(_) => ExprKind::Or,
            FilterExpression::Not(_) => ExprKind::Not,
            FilterExpression::Compare { .. } => ExprKind::Compare,
        }
    }
}

/// Evaluates one expression node kind against an item.
///
/// Implementations receive the full [`EvaluatorSet`] so composite nodes can
/// recurse into their children through the same dispatch.
pub trait ExpressionEvaluator: Send + Sync {
    /// Tests `item` against `expr`.
    fn evaluate(
        &self,
        evaluators: &EvaluatorSet,
        item: &dyn Attributed,
        expr: &FilterExpression,
    ) -> Result<bool>;
}

fn wrong_node(expected: ExprKind, got: ExprKind) -> Error {
    Error::malformed(format!("{expected} evaluator invoked on {got} node"))
}

/// `And`: fails fast on the first non-matching child.
///
/// Zero children is a programming error, not vacuous truth.
pub struct AndEvaluator;

impl ExpressionEvaluator for AndEvaluator {
    fn evaluate(
        &self,
        evaluators: &EvaluatorSet,
        item: &dyn Attributed,
        expr: &FilterExpression,
    ) -> Result<bool> {
        let FilterExpression::And(children) = expr else {
            return Err(wrong_node(ExprKind::And, expr.kind()));
        };
        if children.is_empty() {
            return Err(Error::malformed("'and' requires at least one child"));
        }
        for child in children {
            if !evaluators.matches(item, child)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// `Or`: short-circuits on the first matching child.
///
/// Zero children is a programming error, not vacuous falsehood.
pub struct OrEvaluator;

impl ExpressionEvaluator for OrEvaluator {
    fn evaluate(
        &self,
        evaluators: &EvaluatorSet,
        item: &dyn Attributed,
        expr: &FilterExpression,
    ) -> Result<bool> {
        let FilterExpression::Or(children) = expr else {
            return Err(wrong_node(ExprKind::Or, expr.kind()));
        };
        if children.is_empty() {
            return Err(Error::malformed("'or' requires at least one child"));
        }
        for child in children {
            if evaluators.matches(item, child)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// `Not`: negates its single child.
pub struct NotEvaluator;

impl ExpressionEvaluator for NotEvaluator {
    fn evaluate(
        &self,
        evaluators: &EvaluatorSet,
        item: &dyn Attributed,
        expr: &FilterExpression,
    ) -> Result<bool> {
        let FilterExpression::Not(child) = expr else {
            return Err(wrong_node(ExprKind::Not, expr.kind()));
        };
        Ok(!evaluators.matches(item, child)?)
    }
}

/// `Compare`: resolves the attribute path, then delegates to the operator
/// evaluator registered for the comparison kind.
pub struct CompareEvaluator;

impl ExpressionEvaluator for CompareEvaluator {
    fn evaluate(
        &self,
        evaluators: &EvaluatorSet,
        item: &dyn Attributed,
        expr: &FilterExpression,
    ) -> Result<bool> {
        let FilterExpression::Compare {
            attribute,
            operator,
            operand,
        } = expr
        else {
            return Err(wrong_node(ExprKind::Compare, expr.kind()));
        };
        let value = evaluators.resolver().resolve(item, attribute)?;
        evaluators
            .operator_evaluator(operator.kind())?
            .evaluate(operator, operand, &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(age: i64, city: &str) -> Value {
        Value::record([
            ("age", Value::from(age)),
            ("address", Value::record([("city", city)])),
        ])
    }

    fn age_over(n: i64) -> FilterExpression {
        FilterExpression::compare("age", ComparisonOperator::greater_than(), n)
    }

    fn city_is(name: &str) -> FilterExpression {
        FilterExpression::compare("address.city", ComparisonOperator::equals(), name)
    }

    #[test]
    fn test_and_fail_fast() {
        let evaluators = EvaluatorSet::new();
        let expr = FilterExpression::and(vec![city_is("Bonn"), age_over(17)]);
        // First child misses; the age comparison is never reached, so no
        // error escapes even though age ordering would be fine anyway.
        assert!(!evaluators.matches(&item(30, "Utrecht"), &expr).unwrap());
        assert!(evaluators.matches(&item(30, "Bonn"), &expr).unwrap());
    }

    #[test]
    fn test_or_short_circuit() {
        let evaluators = EvaluatorSet::new();
        let expr = FilterExpression::or(vec![city_is("Utrecht"), city_is("Bonn")]);
        assert!(evaluators.matches(&item(30, "Bonn"), &expr).unwrap());
        assert!(!evaluators.matches(&item(30, "Oslo"), &expr).unwrap());
    }

    #[test]
    fn test_empty_and_or_are_malformed() {
        let evaluators = EvaluatorSet::new();
        let it = item(30, "Bonn");
        assert!(matches!(
            evaluators
                .matches(&it, &FilterExpression::and(vec![]))
                .unwrap_err(),
            Error::MalformedExpression(_)
        ));
        assert!(matches!(
            evaluators
                .matches(&it, &FilterExpression::or(vec![]))
                .unwrap_err(),
            Error::MalformedExpression(_)
        ));
    }

    #[test]
    fn test_not_negates() {
        let evaluators = EvaluatorSet::new();
        let expr = FilterExpression::not(city_is("Bonn"));
        assert!(evaluators.matches(&item(30, "Oslo"), &expr).unwrap());
        assert!(!evaluators.matches(&item(30, "Bonn"), &expr).unwrap());
    }

    #[test]
    fn test_resolution_error_propagates() {
        let evaluators = EvaluatorSet::new();
        let expr = FilterExpression::compare("address.country", ComparisonOperator::equals(), "NL");
        // An unresolvable attribute is never treated as "no match".
        assert!(matches!(
            evaluators.matches(&item(30, "Bonn"), &expr).unwrap_err(),
            Error::AttributeResolution { .. }
        ));
    }
}
