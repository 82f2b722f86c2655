//! Kind-keyed evaluator registry.
//!
//! [`EvaluatorSet`] maps expression kinds and operator kinds to their
//! evaluators. Dispatch by tagged-variant discriminant replaces visitor
//! double-dispatch: adding a domain-specific operator means registering a
//! strategy under a new kind, with no change to the builtin `And`/`Or`/
//! `Not`/`Compare` handling.
//!
//! A set is built once, treated read-only afterwards, and is safe to share
//! across threads.
//!
//! # Example
//!
//! ```
//! use horizon_facet_core::{
//!     ComparisonOperator, EvaluatorSet, FilterExpression, OperatorEvaluator, OperatorKind,
//!     Result, Value,
//! };
//!
//! struct EvenEvaluator;
//!
//! impl OperatorEvaluator for EvenEvaluator {
//!     fn evaluate(&self, _: &ComparisonOperator, _: &Value, value: &Value) -> Result<bool> {
//!         Ok(value.as_int().is_some_and(|n| n % 2 == 0))
//!     }
//! }
//!
//! let mut evaluators = EvaluatorSet::new();
//! evaluators.register_operator(OperatorKind::Custom("even".into()), EvenEvaluator);
//!
//! let expr = FilterExpression::compare("age", ComparisonOperator::custom("even"), Value::Null);
//! let item = Value::record([("age", 30i64)]);
//! assert!(evaluators.matches(&item, &expr).unwrap());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::expr::{
    AndEvaluator, CompareEvaluator, ExprKind, ExpressionEvaluator, FilterExpression, NotEvaluator,
    OrEvaluator,
};
use crate::operator::{
    ContainsEvaluator, EqualsEvaluator, GreaterThanEvaluator, InEvaluator, IsEmptyEvaluator,
    IsNotEmptyEvaluator, IsNullEvaluator, LessThanEvaluator, NotContainsEvaluator,
    NotEqualsEvaluator, OperatorEvaluator, OperatorKind, StartsWithEvaluator,
};
use crate::path::PathResolver;
use crate::value::Attributed;

/// Maps expression and operator kinds to their evaluators.
pub struct EvaluatorSet {
    resolver: PathResolver,
    expressions: HashMap<ExprKind, Arc<dyn ExpressionEvaluator>>,
    operators: HashMap<OperatorKind, Arc<dyn OperatorEvaluator>>,
}

impl Default for EvaluatorSet {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluatorSet {
    /// Creates a set with all builtin evaluators registered.
    pub fn new() -> Self {
        let mut set = Self {
            resolver: PathResolver::new(),
            expressions: HashMap::new(),
            operators: HashMap::new(),
        };

        set.register_expression(ExprKind::And, AndEvaluator);
        set.register_expression(ExprKind::Or, OrEvaluator);
        set.register_expression(ExprKind::Not, NotEvaluator);
        set.register_expression(ExprKind::Compare, CompareEvaluator);

        set.register_operator(OperatorKind::Equals, EqualsEvaluator);
        set.register_operator(OperatorKind::NotEquals, NotEqualsEvaluator);
        set.register_operator(OperatorKind::GreaterThan, GreaterThanEvaluator);
        set.register_operator(OperatorKind::LessThan, LessThanEvaluator);
        set.register_operator(OperatorKind::IsNull, IsNullEvaluator);
        set.register_operator(OperatorKind::StringStartsWith, StartsWithEvaluator);
        set.register_operator(OperatorKind::StringContains, ContainsEvaluator);
        set.register_operator(OperatorKind::StringNotContains, NotContainsEvaluator);
        set.register_operator(OperatorKind::StringIsEmpty, IsEmptyEvaluator);
        set.register_operator(OperatorKind::StringIsNotEmpty, IsNotEmptyEvaluator);
        set.register_operator(OperatorKind::In, InEvaluator);

        set
    }

    /// Registers (or replaces) the evaluator for an expression kind.
    pub fn register_expression<E>(&mut self, kind: ExprKind, evaluator: E)
    where
        E: ExpressionEvaluator + 'static,
    {
        self.expressions.insert(kind, Arc::new(evaluator));
    }

    /// Registers (or replaces) the evaluator for an operator kind.
    pub fn register_operator<E>(&mut self, kind: OperatorKind, evaluator: E)
    where
        E: OperatorEvaluator + 'static,
    {
        self.operators.insert(kind, Arc::new(evaluator));
    }

    /// The shared attribute path resolver.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Looks up the evaluator for an operator kind.
    pub fn operator_evaluator(&self, kind: &OperatorKind) -> Result<&dyn OperatorEvaluator> {
        self.operators
            .get(kind)
            .map(Arc::as_ref)
            .ok_or_else(|| Error::unknown_evaluator(format!("operator '{kind}'")))
    }

    /// Tests an item against a filter expression.
    ///
    /// The node's kind selects the expression evaluator; composite nodes
    /// recurse back through this method for their children.
    pub fn matches(&self, item: &dyn Attributed, expr: &FilterExpression) -> Result<bool> {
        let evaluator = self
            .expressions
            .get(&expr.kind())
            .ok_or_else(|| Error::unknown_evaluator(format!("expression '{}'", expr.kind())))?;
        evaluator.evaluate(self, item, expr)
    }
}

impl std::fmt::Debug for EvaluatorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluatorSet")
            .field("expressions", &self.expressions.len())
            .field("operators", &self.operators.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::ComparisonOperator;
    use crate::value::Value;

    #[test]
    fn test_builtins_registered() {
        let evaluators = EvaluatorSet::new();
        assert!(evaluators.operator_evaluator(&OperatorKind::Equals).is_ok());
        assert!(evaluators.operator_evaluator(&OperatorKind::In).is_ok());
    }

    #[test]
    fn test_unknown_operator_kind_fails() {
        let evaluators = EvaluatorSet::new();
        let expr = FilterExpression::compare(
            "age",
            ComparisonOperator::custom("fancy"),
            Value::Null,
        );
        let item = Value::record([("age", 30i64)]);
        assert!(matches!(
            evaluators.matches(&item, &expr).unwrap_err(),
            Error::UnknownEvaluator { .. }
        ));
    }

    #[test]
    fn test_custom_operator_registration() {
        struct Divides;
        impl OperatorEvaluator for Divides {
            fn evaluate(
                &self,
                _: &ComparisonOperator,
                operand: &Value,
                value: &Value,
            ) -> Result<bool> {
                match (value.as_int(), operand.as_int()) {
                    (Some(v), Some(d)) if d != 0 => Ok(v % d == 0),
                    _ => Ok(false),
                }
            }
        }

        let mut evaluators = EvaluatorSet::new();
        evaluators.register_operator(OperatorKind::Custom("divides".into()), Divides);

        let expr = FilterExpression::compare("age", ComparisonOperator::custom("divides"), 5);
        assert!(
            evaluators
                .matches(&Value::record([("age", 30i64)]), &expr)
                .unwrap()
        );
        assert!(
            !evaluators
                .matches(&Value::record([("age", 31i64)]), &expr)
                .unwrap()
        );
    }
}
