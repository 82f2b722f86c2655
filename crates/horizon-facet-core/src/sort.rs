//! Reversible, null-aware sort orders.
//!
//! A [`SortOrder`] is an ordered list of criteria, each binding an
//! attribute path to a direction and, optionally, a custom value
//! comparator. Composed with the path resolver it yields a total order
//! over items: null sorts before any non-null value, and non-null values
//! that share no natural order tie.
//!
//! # Example
//!
//! ```
//! use horizon_facet_core::SortOrder;
//!
//! let order = SortOrder::by("lastName").then_by_descending("age");
//! let reversed = order.reversed();
//! assert_eq!(reversed.reversed(), order);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::path::PathResolver;
use crate::value::{Attributed, Value};

/// Custom comparison over resolved attribute values.
pub type ValueComparator = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// One attribute bound to a sort direction.
#[derive(Clone)]
pub struct SortCriterion {
    attribute: String,
    ascending: bool,
    comparator: Option<ValueComparator>,
}

impl SortCriterion {
    fn new(attribute: impl Into<String>, ascending: bool) -> Self {
        Self {
            attribute: attribute.into(),
            ascending,
            comparator: None,
        }
    }

    /// The attribute path this criterion resolves.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Whether this criterion sorts ascending.
    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Compares two resolved values under this criterion.
    ///
    /// Null sorts before any non-null value regardless of direction
    /// source; the direction then applies to the result as a whole.
    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let natural = match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => match &self.comparator {
                Some(compare) => compare(a, b),
                None => a.partial_cmp_value(b).unwrap_or(Ordering::Equal),
            },
        };
        if self.ascending { natural } else { natural.reverse() }
    }

    fn reversed(&self) -> Self {
        Self {
            attribute: self.attribute.clone(),
            ascending: !self.ascending,
            comparator: self.comparator.clone(),
        }
    }
}

impl fmt::Debug for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortCriterion")
            .field("attribute", &self.attribute)
            .field("ascending", &self.ascending)
            .field("custom", &self.comparator.is_some())
            .finish()
    }
}

impl PartialEq for SortCriterion {
    fn eq(&self, other: &Self) -> bool {
        // Custom comparators compare by presence; closures have no identity.
        self.attribute == other.attribute
            && self.ascending == other.ascending
            && self.comparator.is_some() == other.comparator.is_some()
    }
}

/// An ordered, reversible list of sort criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortOrder {
    criteria: Vec<SortCriterion>,
}

impl SortOrder {
    /// Sorts ascending by `attribute`.
    pub fn by(attribute: impl Into<String>) -> Self {
        Self {
            criteria: vec![SortCriterion::new(attribute, true)],
        }
    }

    /// Sorts descending by `attribute`.
    pub fn by_descending(attribute: impl Into<String>) -> Self {
        Self {
            criteria: vec![SortCriterion::new(attribute, false)],
        }
    }

    /// Adds an ascending tie-break criterion.
    pub fn then_by(mut self, attribute: impl Into<String>) -> Self {
        self.criteria.push(SortCriterion::new(attribute, true));
        self
    }

    /// Adds a descending tie-break criterion.
    pub fn then_by_descending(mut self, attribute: impl Into<String>) -> Self {
        self.criteria.push(SortCriterion::new(attribute, false));
        self
    }

    /// Sets a custom value comparator on the most recently added criterion.
    ///
    /// The comparator sees only non-null values; null ordering stays with
    /// the engine.
    pub fn with_comparator<F>(mut self, compare: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        if let Some(criterion) = self.criteria.last_mut() {
            criterion.comparator = Some(Arc::new(compare));
        }
        self
    }

    /// The criteria in priority order.
    pub fn criteria(&self) -> &[SortCriterion] {
        &self.criteria
    }

    /// A copy with every criterion's direction flipped.
    ///
    /// Reversing twice behaves identically to the original order.
    pub fn reversed(&self) -> Self {
        Self {
            criteria: self.criteria.iter().map(SortCriterion::reversed).collect(),
        }
    }

    /// Resolves this order's sort key for one item.
    pub fn key_for<T: Attributed + ?Sized>(
        &self,
        resolver: &PathResolver,
        item: &T,
    ) -> Result<Vec<Value>> {
        self.criteria
            .iter()
            .map(|criterion| resolver.resolve(item, &criterion.attribute))
            .collect()
    }

    /// Compares two keys produced by [`SortOrder::key_for`].
    pub fn compare_keys(&self, a: &[Value], b: &[Value]) -> Ordering {
        for (criterion, (left, right)) in self.criteria.iter().zip(a.iter().zip(b.iter())) {
            let ordering = criterion.compare(left, right);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Compares two items directly, resolving both keys.
    pub fn compare_items<T: Attributed + ?Sized>(
        &self,
        resolver: &PathResolver,
        a: &T,
        b: &T,
    ) -> Result<Ordering> {
        let key_a = self.key_for(resolver, a)?;
        let key_b = self.key_for(resolver, b)?;
        Ok(self.compare_keys(&key_a, &key_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: Option<&str>, rank: i64) -> Value {
        Value::record([
            ("name", Value::from(name.map(|n| n.to_string()))),
            ("rank", Value::from(rank)),
        ])
    }

    #[test]
    fn test_ascending_by_attribute() {
        let resolver = PathResolver::new();
        let order = SortOrder::by("name");
        let a = entry(Some("a"), 1);
        let b = entry(Some("b"), 2);
        assert_eq!(
            order.compare_items(&resolver, &a, &b).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_descending_reverses() {
        let resolver = PathResolver::new();
        let order = SortOrder::by_descending("name");
        let a = entry(Some("a"), 1);
        let b = entry(Some("b"), 2);
        assert_eq!(
            order.compare_items(&resolver, &a, &b).unwrap(),
            Ordering::Greater
        );
    }

    #[test]
    fn test_null_sorts_first_in_both_directions() {
        let resolver = PathResolver::new();
        let null = entry(None, 1);
        let named = entry(Some("a"), 2);

        let ascending = SortOrder::by("name");
        assert_eq!(
            ascending.compare_items(&resolver, &null, &named).unwrap(),
            Ordering::Less
        );
        // Descending flips the whole comparison, nulls included.
        let descending = ascending.reversed();
        assert_eq!(
            descending.compare_items(&resolver, &null, &named).unwrap(),
            Ordering::Greater
        );
    }

    #[test]
    fn test_double_reversal_is_identity() {
        let order = SortOrder::by("name").then_by_descending("rank");
        let twice = order.reversed().reversed();
        assert_eq!(twice, order);
        let directions: Vec<bool> = twice.criteria().iter().map(|c| c.is_ascending()).collect();
        assert_eq!(directions, vec![true, false]);
    }

    #[test]
    fn test_tie_break_criterion() {
        let resolver = PathResolver::new();
        let order = SortOrder::by("name").then_by_descending("rank");
        let low = entry(Some("a"), 1);
        let high = entry(Some("a"), 9);
        assert_eq!(
            order.compare_items(&resolver, &high, &low).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_custom_comparator() {
        let resolver = PathResolver::new();
        // Order names by length rather than lexicographically.
        let order = SortOrder::by("name").with_comparator(|a, b| {
            let len = |v: &Value| v.as_str().map(str::len).unwrap_or(0);
            len(a).cmp(&len(b))
        });
        let short = entry(Some("zz"), 1);
        let long = entry(Some("aaaa"), 2);
        assert_eq!(
            order.compare_items(&resolver, &short, &long).unwrap(),
            Ordering::Less
        );
    }
}
