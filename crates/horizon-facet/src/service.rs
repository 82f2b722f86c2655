//! The paged query service seam.
//!
//! Server-resident collections are reached through [`PagedQueryService`]:
//! a paged item fetch, a count query, and an id/item conversion. It is the
//! sole external collaborator of the selection subsystem; id-backed
//! handlers and inverted selections are built entirely on top of it.
//! Timeouts and cancellation belong to implementations, not to this layer.

use std::sync::Arc;

use horizon_facet_core::{FilterExpression, SortOrder};

use crate::error::Result;

/// A push-down query: an optional filter plus an optional sort order.
///
/// `None` in either position means "no restriction" / "source order".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Filter pushed down to the source.
    pub filter: Option<FilterExpression>,
    /// Sort order applied by the source.
    pub sort: Option<SortOrder>,
}

impl Query {
    /// An unrestricted query in source order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the push-down filter.
    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the sort order.
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// A paged, countable source of identifiable items.
///
/// Implementations typically wrap a remote search or repository service.
/// All reads are synchronous on the calling thread; nothing at this layer
/// caches across calls.
pub trait PagedQueryService: Send + Sync {
    /// The item type the source produces.
    type Item;
    /// The identifier type items are keyed by.
    type Id;

    /// Returns one page of items matching `query`, starting at `start`.
    ///
    /// A page shorter than `page_size` signals that the source is
    /// exhausted.
    fn items(&self, query: &Query, start: usize, page_size: usize) -> Result<Vec<Self::Item>>;

    /// Returns the total number of items matching `query`.
    fn count(&self, query: &Query) -> Result<u64>;

    /// Returns the identifier of an item.
    fn id_for_item(&self, item: &Self::Item) -> Self::Id;

    /// Returns the item for an identifier.
    ///
    /// An id with no backing item is a service error, not an empty result:
    /// id sets handed to the selection subsystem are expected to be valid.
    fn item_for_id(&self, id: &Self::Id) -> Result<Self::Item>;
}

/// Shared handle to a paged query service.
pub type ServiceHandle<T, I> = Arc<dyn PagedQueryService<Item = T, Id = I>>;
