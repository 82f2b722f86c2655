//! Selection variants.
//!
//! A [`Selection`] is an immutable, sized, iterable "set of chosen items".
//! Four representations cover collections from a handful of local items up
//! to server-resident result sets that are never materialized:
//!
//! - [`Selection::Empty`]: nothing chosen; the rest state
//! - [`Selection::Items`]: a materialized item set
//! - [`Selection::Ids`]: an id set plus a service for id/item conversion
//! - [`Selection::Inverted`]: everything matching a base query *except*
//!   a (small) positive base selection
//!
//! A selection is never mutated after being published; handlers replace
//! their current selection wholesale. The declared [`size`](Selection::size)
//! always equals the number of items the sequence yields, computed
//! analytically for the inverted variant.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use tracing::trace;

use crate::error::Result;
use crate::service::{Query, ServiceHandle};

/// Page size used when an inverted selection walks its source.
const DEFAULT_PAGE_SIZE: usize = 500;

/// An immutable snapshot of chosen items.
pub enum Selection<T, I = u64> {
    /// Nothing chosen. Size 0, contains nothing, yields nothing.
    Empty,
    /// Backed by a materialized item set.
    Items(ItemSetSelection<T>),
    /// Backed by an id set; membership via id lookup.
    Ids(IdSetSelection<T, I>),
    /// Everything matching a base query except a base selection.
    Inverted(InvertedSelection<T, I>),
}

impl<T, I> Selection<T, I> {
    /// The empty selection.
    pub fn empty() -> Self {
        Selection::Empty
    }

    /// The number of items this selection holds.
    pub fn size(&self) -> u64 {
        match self {
            Selection::Empty => 0,
            Selection::Items(set) => set.size(),
            Selection::Ids(set) => set.size(),
            Selection::Inverted(inverted) => inverted.size(),
        }
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

impl<T, I> Selection<T, I>
where
    T: Eq + Hash + Clone,
    I: Eq + Hash + Clone,
{
    /// A selection over materialized items; duplicates collapse, first
    /// occurrence wins the position.
    ///
    /// An empty iterator produces [`Selection::Empty`].
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let set = ItemSetSelection::new(items);
        if set.is_empty() {
            Selection::Empty
        } else {
            Selection::Items(set)
        }
    }

    /// A selection over an id set, converted through `service` on demand.
    ///
    /// An empty id set produces [`Selection::Empty`].
    pub fn from_ids(ids: impl IntoIterator<Item = I>, service: ServiceHandle<T, I>) -> Self {
        let set = IdSetSelection::new(ids, service);
        if set.is_empty() {
            Selection::Empty
        } else {
            Selection::Ids(set)
        }
    }

    /// An inverted selection: all items matching `query` except the
    /// members of `base`.
    ///
    /// Performs one count query against the service; see
    /// [`InvertedSelection`] for the caching caveat.
    pub fn inverted(
        base: Selection<T, I>,
        query: Query,
        service: ServiceHandle<T, I>,
    ) -> Result<Self> {
        Ok(Selection::Inverted(InvertedSelection::new(
            base, query, service,
        )?))
    }

    /// Membership test.
    pub fn contains(&self, item: &T) -> bool {
        match self {
            Selection::Empty => false,
            Selection::Items(set) => set.contains(item),
            Selection::Ids(set) => set.contains(item),
            Selection::Inverted(inverted) => inverted.contains(item),
        }
    }

    /// Lazily produces the selected items.
    ///
    /// Local variants always yield `Ok`; id- and query-backed variants
    /// read through the service and can yield `Err`. Each call restarts
    /// the walk; nothing is cached across iterations.
    pub fn iter(&self) -> SelectionIter<'_, T, I> {
        let state = match self {
            Selection::Empty => IterState::Empty,
            Selection::Items(set) => IterState::Items(set.items().iter()),
            Selection::Ids(set) => IterState::Ids {
                ids: set.ids().iter(),
                service: &set.service,
            },
            Selection::Inverted(inverted) => IterState::Inverted {
                inverted,
                page: Vec::new().into_iter(),
                next_start: 0,
                exhausted: false,
            },
        };
        SelectionIter { state }
    }
}

impl<T, I> Clone for Selection<T, I>
where
    T: Clone,
    I: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Selection::Empty => Selection::Empty,
            Selection::Items(set) => Selection::Items(set.clone()),
            Selection::Ids(set) => Selection::Ids(set.clone()),
            Selection::Inverted(inverted) => Selection::Inverted(inverted.clone()),
        }
    }
}

impl<T, I> fmt::Debug for Selection<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Empty => write!(f, "Selection::Empty"),
            Selection::Items(set) => write!(f, "Selection::Items({})", set.size()),
            Selection::Ids(set) => write!(f, "Selection::Ids({})", set.size()),
            Selection::Inverted(inverted) => {
                write!(
                    f,
                    "Selection::Inverted(total {}, except {})",
                    inverted.total,
                    inverted.base.size()
                )
            }
        }
    }
}

impl<T, I> Default for Selection<T, I> {
    fn default() -> Self {
        Selection::Empty
    }
}

// =========================================================================
// Variant payloads
// =========================================================================

/// A materialized item set with a stable iteration order.
#[derive(Clone)]
pub struct ItemSetSelection<T> {
    // Ordered list plus hash set for O(1) membership.
    order: Vec<T>,
    members: HashSet<T>,
}

impl<T> ItemSetSelection<T> {
    /// Number of distinct items.
    pub fn size(&self) -> u64 {
        self.order.len() as u64
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The items in selection order.
    pub fn items(&self) -> &[T] {
        &self.order
    }
}

impl<T: Eq + Hash + Clone> ItemSetSelection<T> {
    fn new(items: impl IntoIterator<Item = T>) -> Self {
        let mut order = Vec::new();
        let mut members = HashSet::new();
        for item in items {
            if members.insert(item.clone()) {
                order.push(item);
            }
        }
        Self { order, members }
    }

    /// Membership test.
    pub fn contains(&self, item: &T) -> bool {
        self.members.contains(item)
    }
}

/// An id set plus the service that converts between ids and items.
pub struct IdSetSelection<T, I> {
    order: Vec<I>,
    members: HashSet<I>,
    service: ServiceHandle<T, I>,
}

impl<T, I> IdSetSelection<T, I> {
    /// Number of distinct ids.
    pub fn size(&self) -> u64 {
        self.order.len() as u64
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The ids in selection order.
    pub fn ids(&self) -> &[I] {
        &self.order
    }
}

impl<T, I: Eq + Hash + Clone> IdSetSelection<T, I> {
    fn new(ids: impl IntoIterator<Item = I>, service: ServiceHandle<T, I>) -> Self {
        let mut order = Vec::new();
        let mut members = HashSet::new();
        for id in ids {
            if members.insert(id.clone()) {
                order.push(id);
            }
        }
        Self {
            order,
            members,
            service,
        }
    }

    /// Membership test via the item's id.
    pub fn contains(&self, item: &T) -> bool {
        self.members.contains(&self.service.id_for_item(item))
    }

    /// Returns `true` if the id itself is a member.
    pub fn contains_id(&self, id: &I) -> bool {
        self.members.contains(id)
    }
}

impl<T, I: Clone> Clone for IdSetSelection<T, I> {
    fn clone(&self) -> Self {
        Self {
            order: self.order.clone(),
            members: self.members.clone(),
            service: self.service.clone(),
        }
    }
}

/// All items matching a base query except a positive base selection.
///
/// The total query count is fetched once at construction and cached for
/// the selection's lifetime; if the backing data changes afterwards the
/// declared size goes stale. This is a documented limitation: selections
/// are snapshots, and handlers replace them on every transition anyway.
pub struct InvertedSelection<T, I> {
    base: Box<Selection<T, I>>,
    query: Query,
    service: ServiceHandle<T, I>,
    page_size: usize,
    total: u64,
}

impl<T, I> InvertedSelection<T, I> {
    /// Overrides the page size used when iterating the source.
    ///
    /// A zero page size is clamped to 1; pages must make progress.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// The total query count minus the base size, computed analytically.
    pub fn size(&self) -> u64 {
        self.total.saturating_sub(self.base.size())
    }

    /// The excepted (positively selected) base.
    pub fn base(&self) -> &Selection<T, I> {
        &self.base
    }

    /// The query whose matches this selection inverts.
    pub fn query(&self) -> &Query {
        &self.query
    }
}

impl<T, I> InvertedSelection<T, I>
where
    T: Eq + Hash + Clone,
    I: Eq + Hash + Clone,
{
    fn new(base: Selection<T, I>, query: Query, service: ServiceHandle<T, I>) -> Result<Self> {
        let total = service.count(&query)?;
        trace!(total, base = base.size(), "cached inverted selection count");
        Ok(Self {
            base: Box::new(base),
            query,
            service,
            page_size: DEFAULT_PAGE_SIZE,
            total,
        })
    }

    /// Membership is the negation of the base selection's.
    pub fn contains(&self, item: &T) -> bool {
        !self.base.contains(item)
    }
}

impl<T: Clone, I: Clone> Clone for InvertedSelection<T, I> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            query: self.query.clone(),
            service: self.service.clone(),
            page_size: self.page_size,
            total: self.total,
        }
    }
}

// =========================================================================
// Iteration
// =========================================================================

/// Lazy iterator over a selection's items.
pub struct SelectionIter<'a, T, I> {
    state: IterState<'a, T, I>,
}

enum IterState<'a, T, I> {
    Empty,
    Items(std::slice::Iter<'a, T>),
    Ids {
        ids: std::slice::Iter<'a, I>,
        service: &'a ServiceHandle<T, I>,
    },
    Inverted {
        inverted: &'a InvertedSelection<T, I>,
        page: std::vec::IntoIter<T>,
        next_start: usize,
        exhausted: bool,
    },
}

impl<T, I> Iterator for SelectionIter<'_, T, I>
where
    T: Eq + Hash + Clone,
    I: Eq + Hash + Clone,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.state {
            IterState::Empty => None,
            IterState::Items(items) => items.next().cloned().map(Ok),
            IterState::Ids { ids, service } => {
                let id = ids.next()?;
                Some(service.item_for_id(id))
            }
            IterState::Inverted {
                inverted,
                page,
                next_start,
                exhausted,
            } => loop {
                if let Some(item) = page.next() {
                    return Some(Ok(item));
                }
                if *exhausted {
                    return None;
                }

                let batch = match inverted.service.items(
                    &inverted.query,
                    *next_start,
                    inverted.page_size,
                ) {
                    Ok(batch) => batch,
                    Err(err) => {
                        *exhausted = true;
                        return Some(Err(err));
                    }
                };

                // A short page means the source is exhausted.
                if batch.len() < inverted.page_size {
                    *exhausted = true;
                }
                *next_start += batch.len();

                let kept: Vec<T> = batch
                    .into_iter()
                    .filter(|item| !inverted.base.contains(item))
                    .collect();
                *page = kept.into_iter();
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::VecQueryService;
    use horizon_facet_core::{Attributed, ComparisonOperator, FilterExpression, Value};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Person {
        id: i64,
        name: String,
    }

    impl Attributed for Person {
        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(Value::from(self.id)),
                "name" => Some(Value::from(self.name.as_str())),
                _ => None,
            }
        }
    }

    fn person(id: i64, name: &str) -> Person {
        Person {
            id,
            name: name.to_string(),
        }
    }

    fn service() -> ServiceHandle<Person, i64> {
        Arc::new(VecQueryService::new(
            vec![
                person(1, "Ada"),
                person(2, "Grace"),
                person(3, "Edsger"),
                person(4, "Barbara"),
                person(5, "Tony"),
            ],
            |p: &Person| p.id,
        ))
    }

    fn collect(selection: &Selection<Person, i64>) -> Vec<i64> {
        selection.iter().map(|item| item.unwrap().id).collect()
    }

    #[test]
    fn test_empty_selection() {
        let selection: Selection<Person, i64> = Selection::empty();
        assert_eq!(selection.size(), 0);
        assert!(!selection.contains(&person(1, "Ada")));
        assert_eq!(selection.iter().count(), 0);
    }

    #[test]
    fn test_item_set_selection() {
        let ada = person(1, "Ada");
        let selection: Selection<Person, i64> =
            Selection::from_items(vec![ada.clone(), person(2, "Grace"), ada.clone()]);
        assert_eq!(selection.size(), 2);
        assert!(selection.contains(&ada));
        assert!(!selection.contains(&person(3, "Edsger")));
        assert_eq!(collect(&selection), vec![1, 2]);
    }

    #[test]
    fn test_id_set_selection_matches_id_set() {
        let ids = vec![2i64, 4];
        let selection = Selection::from_ids(ids.clone(), service());

        assert_eq!(selection.size(), ids.len() as u64);
        for item in service().items(&Query::new(), 0, 100).unwrap() {
            assert_eq!(selection.contains(&item), ids.contains(&item.id));
        }
        assert_eq!(collect(&selection), ids);
    }

    #[test]
    fn test_empty_inputs_collapse_to_empty() {
        assert!(matches!(
            Selection::<Person, i64>::from_items(vec![]),
            Selection::Empty
        ));
        assert!(matches!(
            Selection::from_ids(Vec::<i64>::new(), service()),
            Selection::Empty
        ));
    }

    #[test]
    fn test_inverted_size_and_membership() {
        let service = service();
        let base = Selection::from_ids(vec![2i64, 4], service.clone());
        let selection = Selection::inverted(base, Query::new(), service.clone()).unwrap();

        assert_eq!(selection.size(), 3);
        assert!(selection.contains(&person(1, "Ada")));
        assert!(!selection.contains(&person(2, "Grace")));
    }

    #[test]
    fn test_inverted_iteration_skips_base() {
        let service = service();
        let base = Selection::from_ids(vec![2i64, 4], service.clone());
        let selection = Selection::inverted(base, Query::new(), service).unwrap();

        let ids = collect(&selection);
        assert_eq!(ids.len() as u64, selection.size());
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn test_inverted_iteration_pages_through_source() {
        let service = service();
        let base = Selection::from_ids(vec![3i64], service.clone());
        let selection = match Selection::inverted(base, Query::new(), service).unwrap() {
            Selection::Inverted(inverted) => Selection::Inverted(inverted.with_page_size(2)),
            other => other,
        };

        assert_eq!(collect(&selection), vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_inverted_respects_base_query_filter() {
        let service = service();
        let query = Query::new().with_filter(FilterExpression::compare(
            "name",
            ComparisonOperator::string_contains(),
            "ra",
        ));
        // Matches Grace and Barbara; base excepts Grace.
        let base = Selection::from_ids(vec![2i64], service.clone());
        let selection = Selection::inverted(base, query, service).unwrap();

        assert_eq!(selection.size(), 1);
        assert_eq!(collect(&selection), vec![4]);
    }

    #[test]
    fn test_debug_reports_variant_and_size() {
        let service = service();
        let items: Selection<Person, i64> = Selection::from_items(vec![person(1, "Ada")]);
        assert_eq!(format!("{items:?}"), "Selection::Items(1)");

        let base = Selection::from_ids(vec![2i64, 4], service.clone());
        assert_eq!(format!("{base:?}"), "Selection::Ids(2)");

        let inverted = Selection::inverted(base, Query::new(), service).unwrap();
        assert_eq!(
            format!("{inverted:?}"),
            "Selection::Inverted(total 5, except 2)"
        );
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let service = service();
        let base = Selection::from_ids(vec![2i64], service.clone());
        let selection = match Selection::inverted(base, Query::new(), service).unwrap() {
            Selection::Inverted(inverted) => Selection::Inverted(inverted.with_page_size(0)),
            other => other,
        };

        // Iteration still terminates: pages are at least one item long.
        assert_eq!(collect(&selection), vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_iteration_restarts_from_first_page() {
        let service = service();
        let base = Selection::from_ids(vec![1i64], service.clone());
        let selection = Selection::inverted(base, Query::new(), service).unwrap();

        // Two full walks over the same selection see the same sequence.
        assert_eq!(collect(&selection), collect(&selection));
    }
}
