//! Id-based selection filter builder.
//!
//! Bulk remote operations ("delete the selected rows") cannot ship a
//! selection object to the server; they ship a filter. This module turns
//! the raw toggle state of an id-backed handler into a push-down
//! [`FilterExpression`] restricting a base query to exactly the selected
//! rows.

use horizon_facet_core::{ComparisonOperator, FilterExpression, Value};

/// Raw client toggle state: a set of clicked ids plus an inverted flag.
///
/// With `inverted` unset the ids are the entire positive selection. With
/// it set the user started from select-all and the ids are the
/// *deselected* exceptions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClickedIds<I> {
    /// The toggled ids, in click order.
    pub ids: Vec<I>,
    /// Whether the ids are exclusions from an implicit select-all.
    pub inverted: bool,
}

impl<I> ClickedIds<I> {
    /// Ids forming the entire positive selection.
    pub fn positive(ids: Vec<I>) -> Self {
        Self {
            ids,
            inverted: false,
        }
    }

    /// Ids excluded from an implicit select-all.
    pub fn inverted(ids: Vec<I>) -> Self {
        Self {
            ids,
            inverted: true,
        }
    }

    /// Returns `true` if no ids were toggled.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Builds the push-down filter matching exactly the selected rows.
///
/// `None` means "no restriction". The four cases:
///
/// - no ids, inverted: everything is selected, so the base filter (if
///   any) passes through unchanged
/// - no ids, not inverted: nothing is selected; there is no canonical
///   always-false filter, so `id IS NULL` stands in for one, assuming
///   ids are never null
/// - ids, not inverted: `id IN ids`, AND-combined with the base filter
/// - ids, inverted: `NOT (id IN ids)`, AND-combined with the base filter
pub fn build_selection_filter<I>(
    id_attribute: &str,
    base: Option<&FilterExpression>,
    clicked: &ClickedIds<I>,
) -> Option<FilterExpression>
where
    I: Clone + Into<Value>,
{
    if clicked.is_empty() {
        if clicked.inverted {
            return base.cloned();
        }
        return Some(FilterExpression::compare(
            id_attribute,
            ComparisonOperator::is_null(),
            Value::Null,
        ));
    }

    let id_list = Value::List(clicked.ids.iter().cloned().map(Into::into).collect());
    let membership = FilterExpression::compare(id_attribute, ComparisonOperator::is_in(), id_list);
    let restriction = if clicked.inverted {
        FilterExpression::not(membership)
    } else {
        membership
    };

    match base {
        Some(base) => Some(FilterExpression::and(vec![base.clone(), restriction])),
        None => Some(restriction),
    }
}
