//! Convenience re-exports for the common selection workflow.
//!
//! ```
//! use horizon_facet::prelude::*;
//! ```

pub use crate::handler::{IdSelectionHandler, SelectMode, SelectionHandler, SetSelectionHandler};
pub use crate::observer::{ObserverId, SelectionObserver};
pub use crate::push_down::{ClickedIds, build_selection_filter};
pub use crate::selection::Selection;
pub use crate::service::{PagedQueryService, Query, ServiceHandle};

pub use horizon_facet_core::{
    Attributed, ComparisonOperator, FilterExpression, QueryEvaluator, SortOrder, Value,
};
