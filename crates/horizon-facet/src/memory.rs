//! In-memory paged query service.
//!
//! [`VecQueryService`] serves a local `Vec` through the
//! [`PagedQueryService`] seam, executing queries with the core
//! [`QueryEvaluator`]. It backs local data sets that should look like a
//! remote source, and the crate's own tests.

use std::fmt;

use horizon_facet_core::{Attributed, QueryEvaluator};

use crate::error::{Error, Result};
use crate::service::{PagedQueryService, Query};

/// A [`PagedQueryService`] over an in-memory collection.
///
/// # Example
///
/// ```
/// use horizon_facet::{PagedQueryService, Query, VecQueryService};
/// use horizon_facet_core::Value;
///
/// let people = vec![
///     Value::record([("id", Value::from(1i64)), ("name", Value::from("Ada"))]),
///     Value::record([("id", Value::from(2i64)), ("name", Value::from("Grace"))]),
/// ];
/// let service = VecQueryService::new(people, |person: &Value| {
///     person.field("id").and_then(|v| v.as_int()).unwrap_or(0)
/// });
///
/// assert_eq!(service.count(&Query::new()).unwrap(), 2);
/// ```
pub struct VecQueryService<T, I> {
    items: Vec<T>,
    id_of: Box<dyn Fn(&T) -> I + Send + Sync>,
    evaluator: QueryEvaluator,
}

impl<T, I> VecQueryService<T, I>
where
    T: Attributed + Clone + Send + Sync,
    I: PartialEq + fmt::Debug + Send + Sync,
{
    /// Creates a service over `items`, keyed by the `id_of` projection.
    pub fn new<F>(items: Vec<T>, id_of: F) -> Self
    where
        F: Fn(&T) -> I + Send + Sync + 'static,
    {
        Self {
            items,
            id_of: Box::new(id_of),
            evaluator: QueryEvaluator::new(),
        }
    }

    /// Replaces the default evaluator, e.g. to add custom operators.
    pub fn with_evaluator(mut self, evaluator: QueryEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// All matching items in query order, before paging.
    fn matching(&self, query: &Query) -> Result<Vec<T>> {
        let matched = self.evaluator.filter(&self.items, query.filter.as_ref())?;
        Ok(self.evaluator.sort(&matched, query.sort.as_ref())?)
    }
}

impl<T, I> PagedQueryService for VecQueryService<T, I>
where
    T: Attributed + Clone + Send + Sync,
    I: PartialEq + fmt::Debug + Send + Sync,
{
    type Item = T;
    type Id = I;

    fn items(&self, query: &Query, start: usize, page_size: usize) -> Result<Vec<T>> {
        let matched = self.matching(query)?;
        let end = start.saturating_add(page_size).min(matched.len());
        if start >= matched.len() {
            return Ok(Vec::new());
        }
        Ok(matched[start..end].to_vec())
    }

    fn count(&self, query: &Query) -> Result<u64> {
        Ok(self.matching(query)?.len() as u64)
    }

    fn id_for_item(&self, item: &T) -> I {
        (self.id_of)(item)
    }

    fn item_for_id(&self, id: &I) -> Result<T> {
        self.items
            .iter()
            .find(|item| (self.id_of)(item) == *id)
            .cloned()
            .ok_or_else(|| Error::service(format!("no item for id {id:?}")))
    }
}

impl<T, I> fmt::Debug for VecQueryService<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecQueryService")
            .field("items", &self.items.len())
            .finish()
    }
}
