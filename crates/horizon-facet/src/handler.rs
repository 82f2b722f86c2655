//! Selection handlers.
//!
//! A handler owns exactly one current [`Selection`] and replaces it
//! wholesale on every accepted transition. Mutations run through a
//! veto-then-notify protocol: observers may reject the new selection
//! (the call returns `Ok(false)` and state is untouched), otherwise the
//! replacement is committed and observers see both snapshots.
//!
//! Two representations are provided:
//!
//! - [`SetSelectionHandler`] tracks materialized items from a local,
//!   bounded collection; select-all clones every item
//! - [`IdSelectionHandler`] tracks ids against a paged query service;
//!   select-all flips to an inverted representation with an empty id
//!   set and never materializes the remote result set
//!
//! Handlers model single-session interactive state and are not thread
//! safe; serialize mutating calls externally.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::mem;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::observer::{ObserverId, ObserverList, SelectionObserver};
use crate::push_down::ClickedIds;
use crate::selection::Selection;
use crate::service::{Query, ServiceHandle};

/// Governs which select operations a handler accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    /// At most one item selected; a positive select replaces the current
    /// selection.
    Single,
    /// Any number of items; select-all is legal.
    Multi,
    /// Selection is disabled; mutating calls are no-ops returning
    /// `Ok(false)`.
    None,
    /// Defer to the handler's default, which is multi-select.
    #[default]
    Default,
}

impl SelectMode {
    /// Resolves [`SelectMode::Default`] to the concrete mode handlers
    /// fall back to.
    pub fn effective(self) -> SelectMode {
        match self {
            SelectMode::Default => SelectMode::Multi,
            other => other,
        }
    }
}

/// The mutable selection contract exposed to UI layers.
///
/// Every mutating operation returns `Ok(true)` when the transition was
/// committed, `Ok(false)` when an observer vetoed it or the mode made it
/// a no-op, and `Err` for contract violations or service failures.
pub trait SelectionHandler {
    /// The item type being selected.
    type Item;
    /// The identifier type items are keyed by.
    type Id;

    /// The current selection. Never absent; empty is the rest state.
    fn selection(&self) -> &Selection<Self::Item, Self::Id>;

    /// The configured select mode.
    fn select_mode(&self) -> SelectMode;

    /// Reconfigures the select mode. Takes effect on the next mutation;
    /// the current selection is left as is.
    fn set_select_mode(&mut self, mode: SelectMode);

    /// Selects or deselects one item.
    ///
    /// Under single mode a positive select replaces any other selection.
    fn select(&mut self, selected: bool, item: Self::Item) -> Result<bool>;

    /// Selects or deselects several items at once.
    ///
    /// Selecting more than one item under single mode is an
    /// [`Error::UnsupportedOperation`].
    fn select_many(&mut self, selected: bool, items: Vec<Self::Item>) -> Result<bool>;

    /// Selects or deselects everything.
    ///
    /// `select_all(true)` is legal only when the effective mode is
    /// multi; `select_all(false)` resets to the empty selection.
    fn select_all(&mut self, selected: bool) -> Result<bool>;

    /// Replaces the current selection wholesale, still veto-guarded.
    fn set_selection(&mut self, selection: Selection<Self::Item, Self::Id>) -> Result<bool>;

    /// Registers an observer for the veto/notify protocol.
    fn add_observer(
        &mut self,
        observer: Box<dyn SelectionObserver<Self::Item, Self::Id>>,
    ) -> ObserverId;

    /// Removes a previously registered observer.
    fn remove_observer(&mut self, id: ObserverId) -> bool;
}

// =========================================================================
// Shared transition plumbing
// =========================================================================

/// State and protocol shared by both handler representations.
struct HandlerCore<T, I> {
    current: Selection<T, I>,
    mode: SelectMode,
    observers: ObserverList<T, I>,
}

impl<T, I> HandlerCore<T, I>
where
    T: Eq + Hash + Clone,
    I: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self {
            current: Selection::empty(),
            mode: SelectMode::default(),
            observers: ObserverList::new(),
        }
    }

    fn effective_mode(&self) -> SelectMode {
        self.mode.effective()
    }

    /// Runs the veto-then-notify protocol for a candidate selection.
    ///
    /// Returns `false` without touching state when an observer rejects.
    fn apply(&mut self, new: Selection<T, I>) -> bool {
        if !self.observers.approves(&self.current, &new) {
            debug!(candidate = ?new, "selection change vetoed");
            return false;
        }
        let old = mem::replace(&mut self.current, new);
        self.observers.notify(&old, &self.current);
        true
    }

    /// Logs and reports the no-op for mutations under disabled selection.
    fn selection_disabled(&self, operation: &'static str) -> Result<bool> {
        trace!(operation, "selection disabled, ignoring");
        Ok(false)
    }
}

// =========================================================================
// Set-backed handler
// =========================================================================

/// Tracks materialized items from a local collection.
///
/// Select-all clones every item into the selection, which assumes the
/// collection is reasonably bounded. For server-resident data use
/// [`IdSelectionHandler`].
pub struct SetSelectionHandler<T, I = u64> {
    items: Vec<T>,
    core: HandlerCore<T, I>,
}

impl<T, I> SetSelectionHandler<T, I>
where
    T: Eq + Hash + Clone,
    I: Eq + Hash + Clone,
{
    /// Creates a handler over `items` with an empty selection.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            core: HandlerCore::new(),
        }
    }

    /// The selectable items.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The currently selected items, in selection order.
    pub fn selected_items(&self) -> Result<Vec<T>> {
        self.core.current.iter().collect()
    }

    fn current_items(&self) -> Result<Vec<T>> {
        self.core.current.iter().collect()
    }

    /// Builds the candidate item list for a toggle, or `None` when the
    /// items are already in the requested state.
    fn toggled(&self, selected: bool, items: &[T]) -> Result<Option<Vec<T>>> {
        let mut candidate = self.current_items()?;
        let mut changed = false;
        for item in items {
            if selected {
                if !candidate.contains(item) {
                    candidate.push(item.clone());
                    changed = true;
                }
            } else if let Some(pos) = candidate.iter().position(|c| c == item) {
                candidate.remove(pos);
                changed = true;
            }
        }
        Ok(changed.then_some(candidate))
    }
}

impl<T, I> SelectionHandler for SetSelectionHandler<T, I>
where
    T: Eq + Hash + Clone,
    I: Eq + Hash + Clone,
{
    type Item = T;
    type Id = I;

    fn selection(&self) -> &Selection<T, I> {
        &self.core.current
    }

    fn select_mode(&self) -> SelectMode {
        self.core.mode
    }

    fn set_select_mode(&mut self, mode: SelectMode) {
        self.core.mode = mode;
    }

    fn select(&mut self, selected: bool, item: T) -> Result<bool> {
        self.select_many(selected, vec![item])
    }

    fn select_many(&mut self, selected: bool, items: Vec<T>) -> Result<bool> {
        let mode = self.core.effective_mode();
        if mode == SelectMode::None {
            return self.core.selection_disabled("select");
        }
        if mode == SelectMode::Single && selected {
            if items.len() > 1 {
                return Err(Error::unsupported(self.core.mode, "multi-item select"));
            }
            // A positive single select replaces whatever was selected.
            return Ok(self.core.apply(Selection::from_items(items)));
        }

        match self.toggled(selected, &items)? {
            Some(candidate) => Ok(self.core.apply(Selection::from_items(candidate))),
            None => Ok(true),
        }
    }

    fn select_all(&mut self, selected: bool) -> Result<bool> {
        let mode = self.core.effective_mode();
        if selected && mode != SelectMode::Multi {
            // A contract violation in every non-multi mode, disabled
            // selection included.
            return Err(Error::unsupported(self.core.mode, "select_all"));
        }
        if mode == SelectMode::None {
            return self.core.selection_disabled("select_all");
        }
        if !selected {
            return Ok(self.core.apply(Selection::empty()));
        }
        Ok(self.core.apply(Selection::from_items(self.items.clone())))
    }

    fn set_selection(&mut self, selection: Selection<T, I>) -> Result<bool> {
        Ok(self.core.apply(selection))
    }

    fn add_observer(&mut self, observer: Box<dyn SelectionObserver<T, I>>) -> ObserverId {
        self.core.observers.add(observer)
    }

    fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.core.observers.remove(id)
    }
}

impl<T, I> fmt::Debug for SetSelectionHandler<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetSelectionHandler")
            .field("items", &self.items.len())
            .field("selection", &self.core.current)
            .field("mode", &self.core.mode)
            .finish()
    }
}

// =========================================================================
// Id-backed handler
// =========================================================================

/// Tracks an id set against a paged query service.
///
/// Normally the id set is the positive selection. After
/// `select_all(true)` the handler flips to an inverted representation:
/// the id set holds the *exceptions* and the selection is "everything
/// matching the query except these ids". Bookkeeping never loads the
/// remote result set; only iteration and one count query touch it.
pub struct IdSelectionHandler<T, I> {
    service: ServiceHandle<T, I>,
    query: Query,
    ids: Vec<I>,
    id_set: HashSet<I>,
    inverted: bool,
    core: HandlerCore<T, I>,
}

impl<T, I> IdSelectionHandler<T, I>
where
    T: Eq + Hash + Clone + 'static,
    I: Eq + Hash + Clone + 'static,
{
    /// Creates a handler over the service's full, unfiltered collection.
    pub fn new(service: ServiceHandle<T, I>) -> Self {
        Self::with_query(service, Query::new())
    }

    /// Creates a handler scoped to the items matching `query`.
    pub fn with_query(service: ServiceHandle<T, I>, query: Query) -> Self {
        Self {
            service,
            query,
            ids: Vec::new(),
            id_set: HashSet::new(),
            inverted: false,
            core: HandlerCore::new(),
        }
    }

    /// The query scoping this handler.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The raw toggle state: the id set plus the inverted flag, as input
    /// for [`build_selection_filter`](crate::push_down::build_selection_filter).
    pub fn clicked_ids(&self) -> ClickedIds<I> {
        if self.inverted {
            ClickedIds::inverted(self.ids.clone())
        } else {
            ClickedIds::positive(self.ids.clone())
        }
    }

    /// Whether an id is currently selected.
    pub fn is_selected_id(&self, id: &I) -> bool {
        self.id_set.contains(id) != self.inverted
    }

    /// Builds the selection a given id state represents.
    fn selection_for(&self, ids: &[I], inverted: bool) -> Result<Selection<T, I>> {
        let base = Selection::from_ids(ids.iter().cloned(), self.service.clone());
        if inverted {
            Selection::inverted(base, self.query.clone(), self.service.clone())
        } else {
            Ok(base)
        }
    }

    /// Commits an id state through the veto protocol.
    fn commit(&mut self, ids: Vec<I>, inverted: bool) -> Result<bool> {
        let candidate = self.selection_for(&ids, inverted)?;
        if !self.core.apply(candidate) {
            return Ok(false);
        }
        self.id_set = ids.iter().cloned().collect();
        self.ids = ids;
        self.inverted = inverted;
        Ok(true)
    }

    /// Builds the candidate id list for a toggle, or `None` when the ids
    /// are already in the requested state.
    ///
    /// Under the inverted representation the id set holds exceptions, so
    /// selecting removes and deselecting inserts.
    fn toggled(&self, selected: bool, toggles: &[I]) -> Option<Vec<I>> {
        let insert = selected != self.inverted;
        let mut candidate = self.ids.clone();
        let mut members = self.id_set.clone();
        let mut changed = false;
        for id in toggles {
            if insert {
                if members.insert(id.clone()) {
                    candidate.push(id.clone());
                    changed = true;
                }
            } else if members.remove(id) {
                if let Some(pos) = candidate.iter().position(|c| c == id) {
                    candidate.remove(pos);
                }
                changed = true;
            }
        }
        changed.then_some(candidate)
    }
}

impl<T, I> SelectionHandler for IdSelectionHandler<T, I>
where
    T: Eq + Hash + Clone + 'static,
    I: Eq + Hash + Clone + 'static,
{
    type Item = T;
    type Id = I;

    fn selection(&self) -> &Selection<T, I> {
        &self.core.current
    }

    fn select_mode(&self) -> SelectMode {
        self.core.mode
    }

    fn set_select_mode(&mut self, mode: SelectMode) {
        self.core.mode = mode;
    }

    fn select(&mut self, selected: bool, item: T) -> Result<bool> {
        self.select_many(selected, vec![item])
    }

    fn select_many(&mut self, selected: bool, items: Vec<T>) -> Result<bool> {
        let mode = self.core.effective_mode();
        if mode == SelectMode::None {
            return self.core.selection_disabled("select");
        }
        let toggles: Vec<I> = items
            .iter()
            .map(|item| self.service.id_for_item(item))
            .collect();
        if mode == SelectMode::Single && selected {
            if toggles.len() > 1 {
                return Err(Error::unsupported(self.core.mode, "multi-item select"));
            }
            return self.commit(toggles, false);
        }

        match self.toggled(selected, &toggles) {
            Some(candidate) => self.commit(candidate, self.inverted),
            None => Ok(true),
        }
    }

    fn select_all(&mut self, selected: bool) -> Result<bool> {
        let mode = self.core.effective_mode();
        if selected && mode != SelectMode::Multi {
            // A contract violation in every non-multi mode, disabled
            // selection included.
            return Err(Error::unsupported(self.core.mode, "select_all"));
        }
        if mode == SelectMode::None {
            return self.core.selection_disabled("select_all");
        }
        if !selected {
            // Reset clears the inverted flag along with the ids.
            return self.commit(Vec::new(), false);
        }
        self.commit(Vec::new(), true)
    }

    fn set_selection(&mut self, selection: Selection<T, I>) -> Result<bool> {
        let (ids, inverted) = self.id_state_of(&selection)?;
        if !self.core.apply(selection) {
            return Ok(false);
        }
        self.id_set = ids.iter().cloned().collect();
        self.ids = ids;
        self.inverted = inverted;
        Ok(true)
    }

    fn add_observer(&mut self, observer: Box<dyn SelectionObserver<T, I>>) -> ObserverId {
        self.core.observers.add(observer)
    }

    fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.core.observers.remove(id)
    }
}

impl<T, I> IdSelectionHandler<T, I>
where
    T: Eq + Hash + Clone + 'static,
    I: Eq + Hash + Clone + 'static,
{
    /// Derives the internal id state a selection corresponds to.
    fn id_state_of(&self, selection: &Selection<T, I>) -> Result<(Vec<I>, bool)> {
        match selection {
            Selection::Inverted(inverted) => Ok((self.ids_of(inverted.base())?, true)),
            other => Ok((self.ids_of(other)?, false)),
        }
    }

    fn ids_of(&self, selection: &Selection<T, I>) -> Result<Vec<I>> {
        match selection {
            Selection::Empty => Ok(Vec::new()),
            Selection::Items(set) => Ok(set
                .items()
                .iter()
                .map(|item| self.service.id_for_item(item))
                .collect()),
            Selection::Ids(set) => Ok(set.ids().to_vec()),
            Selection::Inverted(_) => Err(Error::service(
                "nested inverted selection is not supported",
            )),
        }
    }
}

impl<T, I> fmt::Debug for IdSelectionHandler<T, I>
where
    I: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdSelectionHandler")
            .field("ids", &self.ids)
            .field("inverted", &self.inverted)
            .field("selection", &self.core.current)
            .field("mode", &self.core.mode)
            .finish()
    }
}
