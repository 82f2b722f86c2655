//! Comparison operators and their evaluators.
//!
//! A [`ComparisonOperator`] is an immutable value identifying a comparison
//! kind plus its text-matching modifiers. The right-hand literal lives on
//! the `Compare` expression node; evaluators receive both and test a
//! resolved attribute value against them.
//!
//! Dispatch from kind to evaluator goes through the
//! [`EvaluatorSet`](crate::EvaluatorSet), so new kinds can be added without
//! touching the builtin ones.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};
use crate::value::Value;

/// Identifies a comparison kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// Structural equality; null equals null.
    Equals,
    /// Negated structural equality.
    NotEquals,
    /// Natural ordering; both operands must share an order.
    GreaterThan,
    /// Natural ordering; both operands must share an order.
    LessThan,
    /// True iff the value is null.
    IsNull,
    /// Substring match anchored at index 0.
    StringStartsWith,
    /// Substring match anywhere.
    StringContains,
    /// Negated substring match.
    StringNotContains,
    /// True for null, empty, or whitespace-only text.
    StringIsEmpty,
    /// Negation of `StringIsEmpty`.
    StringIsNotEmpty,
    /// Membership in the operand list.
    In,
    /// A domain-specific kind, resolved through the registry.
    Custom(String),
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorKind::Equals => write!(f, "equals"),
            OperatorKind::NotEquals => write!(f, "not-equals"),
            OperatorKind::GreaterThan => write!(f, "greater-than"),
            OperatorKind::LessThan => write!(f, "less-than"),
            OperatorKind::IsNull => write!(f, "is-null"),
            OperatorKind::StringStartsWith => write!(f, "starts-with"),
            OperatorKind::StringContains => write!(f, "contains"),
            OperatorKind::StringNotContains => write!(f, "not-contains"),
            OperatorKind::StringIsEmpty => write!(f, "is-empty"),
            OperatorKind::StringIsNotEmpty => write!(f, "is-not-empty"),
            OperatorKind::In => write!(f, "in"),
            OperatorKind::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

/// A comparison kind plus text-matching modifiers.
///
/// # Example
///
/// ```
/// use horizon_facet_core::ComparisonOperator;
///
/// let contains = ComparisonOperator::string_contains().with_ignore_case();
/// assert!(contains.ignores_case());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComparisonOperator {
    kind: OperatorKind,
    ignore_case: bool,
    ignore_spaces: bool,
}

impl ComparisonOperator {
    /// Creates an operator of the given kind with no modifiers.
    pub fn new(kind: OperatorKind) -> Self {
        Self {
            kind,
            ignore_case: false,
            ignore_spaces: false,
        }
    }

    /// Structural equality.
    pub fn equals() -> Self {
        Self::new(OperatorKind::Equals)
    }

    /// Negated structural equality.
    pub fn not_equals() -> Self {
        Self::new(OperatorKind::NotEquals)
    }

    /// Natural ordering, strictly greater.
    pub fn greater_than() -> Self {
        Self::new(OperatorKind::GreaterThan)
    }

    /// Natural ordering, strictly less.
    pub fn less_than() -> Self {
        Self::new(OperatorKind::LessThan)
    }

    /// Null check.
    pub fn is_null() -> Self {
        Self::new(OperatorKind::IsNull)
    }

    /// Prefix match.
    pub fn string_starts_with() -> Self {
        Self::new(OperatorKind::StringStartsWith)
    }

    /// Substring match.
    pub fn string_contains() -> Self {
        Self::new(OperatorKind::StringContains)
    }

    /// Negated substring match.
    pub fn string_not_contains() -> Self {
        Self::new(OperatorKind::StringNotContains)
    }

    /// Blank/empty check.
    pub fn string_is_empty() -> Self {
        Self::new(OperatorKind::StringIsEmpty)
    }

    /// Negated blank/empty check.
    pub fn string_is_not_empty() -> Self {
        Self::new(OperatorKind::StringIsNotEmpty)
    }

    /// List membership.
    pub fn is_in() -> Self {
        Self::new(OperatorKind::In)
    }

    /// A domain-specific operator kind.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(OperatorKind::Custom(name.into()))
    }

    /// Enables case-insensitive text matching.
    pub fn with_ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Enables space-insensitive text matching.
    pub fn with_ignore_spaces(mut self) -> Self {
        self.ignore_spaces = true;
        self
    }

    /// The comparison kind.
    pub fn kind(&self) -> &OperatorKind {
        &self.kind
    }

    /// Whether text matching ignores case.
    pub fn ignores_case(&self) -> bool {
        self.ignore_case
    }

    /// Whether text matching ignores spaces.
    pub fn ignores_spaces(&self) -> bool {
        self.ignore_spaces
    }

    /// Applies the operator's text modifiers to a string.
    pub(crate) fn normalize(&self, text: &str) -> String {
        let mut text = text.to_string();
        if self.ignore_spaces {
            text.retain(|c| c != ' ');
        }
        if self.ignore_case {
            text = text.to_lowercase();
        }
        text
    }
}

/// Evaluates one comparison kind against a resolved value.
///
/// The operand is the right-hand literal carried by the `Compare` node;
/// `value` is the attribute value resolved from the item under test.
pub trait OperatorEvaluator: Send + Sync {
    /// Tests `value` against `operand` under `operator`.
    fn evaluate(&self, operator: &ComparisonOperator, operand: &Value, value: &Value)
    -> Result<bool>;
}

// =========================================================================
// Builtin evaluators
// =========================================================================

/// Text of a value for string matching; `None` means absent text.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Structural equality with modifier-aware text comparison.
fn values_equal(operator: &ComparisonOperator, operand: &Value, value: &Value) -> bool {
    if let (Value::Str(a), Value::Str(b)) = (value, operand)
        && (operator.ignores_case() || operator.ignores_spaces())
    {
        return operator.normalize(a) == operator.normalize(b);
    }
    value == operand
}

fn ordering_of(operand: &Value, value: &Value) -> Result<Ordering> {
    value
        .partial_cmp_value(operand)
        .ok_or_else(|| Error::NotComparable {
            left: value.kind_name().to_string(),
            right: operand.kind_name().to_string(),
        })
}

/// `Equals`: structural equality, null == null.
pub struct EqualsEvaluator;

impl OperatorEvaluator for EqualsEvaluator {
    fn evaluate(&self, op: &ComparisonOperator, operand: &Value, value: &Value) -> Result<bool> {
        Ok(values_equal(op, operand, value))
    }
}

/// `NotEquals`: negated structural equality.
pub struct NotEqualsEvaluator;

impl OperatorEvaluator for NotEqualsEvaluator {
    fn evaluate(&self, op: &ComparisonOperator, operand: &Value, value: &Value) -> Result<bool> {
        Ok(!values_equal(op, operand, value))
    }
}

/// `GreaterThan`: natural ordering, no implicit null guard.
///
/// Compose with `IsNull` beforehand when the attribute may be null; a null
/// operand surfaces [`Error::NotComparable`].
pub struct GreaterThanEvaluator;

impl OperatorEvaluator for GreaterThanEvaluator {
    fn evaluate(&self, _op: &ComparisonOperator, operand: &Value, value: &Value) -> Result<bool> {
        Ok(ordering_of(operand, value)? == Ordering::Greater)
    }
}

/// `LessThan`: natural ordering, no implicit null guard.
pub struct LessThanEvaluator;

impl OperatorEvaluator for LessThanEvaluator {
    fn evaluate(&self, _op: &ComparisonOperator, operand: &Value, value: &Value) -> Result<bool> {
        Ok(ordering_of(operand, value)? == Ordering::Less)
    }
}

/// `IsNull`: true iff the value is null. The operand is ignored.
pub struct IsNullEvaluator;

impl OperatorEvaluator for IsNullEvaluator {
    fn evaluate(&self, _op: &ComparisonOperator, _operand: &Value, value: &Value) -> Result<bool> {
        Ok(value.is_null())
    }
}

/// `StringStartsWith`: substring match anchored at index 0.
pub struct StartsWithEvaluator;

impl OperatorEvaluator for StartsWithEvaluator {
    fn evaluate(&self, op: &ComparisonOperator, operand: &Value, value: &Value) -> Result<bool> {
        let (Some(haystack), Some(needle)) = (text_of(value), text_of(operand)) else {
            return Ok(false);
        };
        Ok(op.normalize(&haystack).starts_with(&op.normalize(&needle)))
    }
}

/// `StringContains`: substring match anywhere in the text.
pub struct ContainsEvaluator;

impl OperatorEvaluator for ContainsEvaluator {
    fn evaluate(&self, op: &ComparisonOperator, operand: &Value, value: &Value) -> Result<bool> {
        let (Some(haystack), Some(needle)) = (text_of(value), text_of(operand)) else {
            return Ok(false);
        };
        Ok(op.normalize(&haystack).contains(&op.normalize(&needle)))
    }
}

/// `StringNotContains`: negated substring match; absent text contains nothing.
pub struct NotContainsEvaluator;

impl OperatorEvaluator for NotContainsEvaluator {
    fn evaluate(&self, op: &ComparisonOperator, operand: &Value, value: &Value) -> Result<bool> {
        Ok(!ContainsEvaluator.evaluate(op, operand, value)?)
    }
}

/// `StringIsEmpty`: true for null, empty, or whitespace-only text.
pub struct IsEmptyEvaluator;

impl OperatorEvaluator for IsEmptyEvaluator {
    fn evaluate(&self, _op: &ComparisonOperator, _operand: &Value, value: &Value) -> Result<bool> {
        Ok(match text_of(value) {
            None => true,
            Some(text) => text.trim().is_empty(),
        })
    }
}

/// `StringIsNotEmpty`: negation of [`IsEmptyEvaluator`].
pub struct IsNotEmptyEvaluator;

impl OperatorEvaluator for IsNotEmptyEvaluator {
    fn evaluate(&self, op: &ComparisonOperator, operand: &Value, value: &Value) -> Result<bool> {
        Ok(!IsEmptyEvaluator.evaluate(op, operand, value)?)
    }
}

/// `In`: membership in the operand list, by structural equality.
pub struct InEvaluator;

impl OperatorEvaluator for InEvaluator {
    fn evaluate(&self, op: &ComparisonOperator, operand: &Value, value: &Value) -> Result<bool> {
        let candidates = operand.as_list().ok_or_else(|| {
            Error::malformed(format!(
                "'in' operand must be a list, got {}",
                operand.kind_name()
            ))
        })?;
        Ok(candidates
            .iter()
            .any(|candidate| values_equal(op, candidate, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals_null_is_null() {
        let op = ComparisonOperator::equals();
        assert!(
            EqualsEvaluator
                .evaluate(&op, &Value::Null, &Value::Null)
                .unwrap()
        );
        assert!(
            !EqualsEvaluator
                .evaluate(&op, &Value::Int(1), &Value::Null)
                .unwrap()
        );
    }

    #[test]
    fn test_equals_ignore_case_and_spaces() {
        let op = ComparisonOperator::equals()
            .with_ignore_case()
            .with_ignore_spaces();
        assert!(
            EqualsEvaluator
                .evaluate(&op, &Value::from("New York"), &Value::from("newyork"))
                .unwrap()
        );
    }

    #[test]
    fn test_ordering_operators() {
        let op = ComparisonOperator::greater_than();
        assert!(
            GreaterThanEvaluator
                .evaluate(&op, &Value::Int(3), &Value::Int(5))
                .unwrap()
        );
        assert!(
            !GreaterThanEvaluator
                .evaluate(&op, &Value::Int(3), &Value::Int(3))
                .unwrap()
        );
        assert!(
            LessThanEvaluator
                .evaluate(&op, &Value::Float(3.5), &Value::Int(3))
                .unwrap()
        );
    }

    #[test]
    fn test_ordering_without_order_fails() {
        let op = ComparisonOperator::greater_than();
        let err = GreaterThanEvaluator
            .evaluate(&op, &Value::Int(3), &Value::Null)
            .unwrap_err();
        assert!(matches!(err, Error::NotComparable { .. }));
    }

    #[test]
    fn test_is_null() {
        let op = ComparisonOperator::is_null();
        assert!(
            IsNullEvaluator
                .evaluate(&op, &Value::Null, &Value::Null)
                .unwrap()
        );
        assert!(
            !IsNullEvaluator
                .evaluate(&op, &Value::Null, &Value::Int(0))
                .unwrap()
        );
    }

    #[test]
    fn test_starts_with_requires_index_zero() {
        let op = ComparisonOperator::string_starts_with();
        assert!(
            StartsWithEvaluator
                .evaluate(&op, &Value::from("Spring"), &Value::from("Springfield"))
                .unwrap()
        );
        assert!(
            !StartsWithEvaluator
                .evaluate(&op, &Value::from("field"), &Value::from("Springfield"))
                .unwrap()
        );
    }

    #[test]
    fn test_contains_family_on_null() {
        let contains = ComparisonOperator::string_contains();
        assert!(
            !ContainsEvaluator
                .evaluate(&contains, &Value::from("x"), &Value::Null)
                .unwrap()
        );
        let not_contains = ComparisonOperator::string_not_contains();
        assert!(
            NotContainsEvaluator
                .evaluate(&not_contains, &Value::from("x"), &Value::Null)
                .unwrap()
        );
    }

    #[test]
    fn test_contains_ignore_case() {
        let op = ComparisonOperator::string_contains().with_ignore_case();
        assert!(
            ContainsEvaluator
                .evaluate(&op, &Value::from("FIELD"), &Value::from("Springfield"))
                .unwrap()
        );
    }

    #[test]
    fn test_is_empty_blank_check() {
        let op = ComparisonOperator::string_is_empty();
        assert!(
            IsEmptyEvaluator
                .evaluate(&op, &Value::Null, &Value::Null)
                .unwrap()
        );
        assert!(
            IsEmptyEvaluator
                .evaluate(&op, &Value::Null, &Value::from("   "))
                .unwrap()
        );
        assert!(
            !IsEmptyEvaluator
                .evaluate(&op, &Value::Null, &Value::from("x"))
                .unwrap()
        );
    }

    #[test]
    fn test_in_membership() {
        let op = ComparisonOperator::is_in();
        let operand = Value::List(vec![Value::Int(5), Value::Int(7)]);
        assert!(InEvaluator.evaluate(&op, &operand, &Value::Int(7)).unwrap());
        assert!(!InEvaluator.evaluate(&op, &operand, &Value::Int(6)).unwrap());
    }

    #[test]
    fn test_in_requires_list_operand() {
        let op = ComparisonOperator::is_in();
        let err = InEvaluator
            .evaluate(&op, &Value::Int(5), &Value::Int(5))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedExpression(_)));
    }
}
