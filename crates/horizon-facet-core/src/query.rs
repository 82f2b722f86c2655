//! In-memory query evaluation.
//!
//! [`QueryEvaluator`] applies filter trees and sort orders to in-memory
//! collections. It is a stateless pure function over its inputs (the parse
//! cache inside the resolver aside) and safe to call concurrently as long
//! as the caller hands it a stable snapshot of the collection.

use crate::error::Result;
use crate::expr::FilterExpression;
use crate::registry::EvaluatorSet;
use crate::sort::SortOrder;
use crate::value::{Attributed, Value};

/// Applies filter expressions and sort orders to in-memory collections.
///
/// # Example
///
/// ```
/// use horizon_facet_core::{ComparisonOperator, FilterExpression, QueryEvaluator, Value};
///
/// let items = vec![
///     Value::record([("name", "Ada")]),
///     Value::record([("name", "Grace")]),
/// ];
/// let expr = FilterExpression::compare(
///     "name",
///     ComparisonOperator::string_starts_with(),
///     "A",
/// );
///
/// let evaluator = QueryEvaluator::new();
/// let matched = evaluator.filter(&items, Some(&expr)).unwrap();
/// assert_eq!(matched.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct QueryEvaluator {
    evaluators: EvaluatorSet,
}

impl QueryEvaluator {
    /// Creates an evaluator with the builtin evaluator set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an evaluator over a customized evaluator set.
    pub fn with_evaluators(evaluators: EvaluatorSet) -> Self {
        Self { evaluators }
    }

    /// The underlying evaluator set.
    pub fn evaluators(&self) -> &EvaluatorSet {
        &self.evaluators
    }

    /// Returns the items matching `expr`, preserving relative order.
    ///
    /// No expression means no restriction: a fresh copy of the input.
    /// Resolution errors propagate; an unresolvable attribute is never
    /// treated as "no match".
    pub fn filter<T>(&self, items: &[T], expr: Option<&FilterExpression>) -> Result<Vec<T>>
    where
        T: Attributed + Clone,
    {
        let Some(expr) = expr else {
            return Ok(items.to_vec());
        };
        let mut matched = Vec::new();
        for item in items {
            if self.evaluators.matches(item, expr)? {
                matched.push(item.clone());
            }
        }
        Ok(matched)
    }

    /// Returns the items ordered by `order`, stably.
    ///
    /// Sort keys are resolved once per item before sorting, so resolution
    /// errors surface before any reordering happens. No order means a
    /// fresh copy in input order; the result never aliases the source.
    pub fn sort<T>(&self, items: &[T], order: Option<&SortOrder>) -> Result<Vec<T>>
    where
        T: Attributed + Clone,
    {
        let Some(order) = order else {
            return Ok(items.to_vec());
        };

        let resolver = self.evaluators.resolver();
        let mut keyed = items
            .iter()
            .map(|item| Ok((order.key_for(resolver, item)?, item.clone())))
            .collect::<Result<Vec<_>>>()?;
        keyed.sort_by(|(a, _), (b, _)| order.compare_keys(a, b));
        Ok(keyed.into_iter().map(|(_, item)| item).collect())
    }

    /// Resolves one attribute value; thin wrapper over the path resolver.
    pub fn attribute_value<T>(&self, item: &T, path: &str) -> Result<Value>
    where
        T: Attributed + ?Sized,
    {
        self.evaluators.resolver().resolve(item, path)
    }
}
