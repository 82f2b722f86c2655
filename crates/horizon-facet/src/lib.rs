//! Selection tracking over local and server-resident collections.
//!
//! This crate builds the stateful half of the selection-and-filter
//! engine on top of [`horizon_facet_core`]:
//!
//! - **Selections**: immutable snapshots of chosen items, from a
//!   materialized set up to an inverted "everything except these" view
//!   over a remote query
//! - **Handlers**: mutable controllers that replace their selection
//!   wholesale through a veto-then-notify observer protocol
//! - **Paged query service**: the seam through which server-resident
//!   collections are counted, paged, and converted between ids and items
//! - **Push-down filters**: translation of an id-backed selection into a
//!   filter expression a server can execute
//!
//! # Example
//!
//! ```
//! use horizon_facet::prelude::*;
//!
//! let rows = vec![
//!     Value::record([("id", Value::from(1i64)), ("name", Value::from("Ada"))]),
//!     Value::record([("id", Value::from(2i64)), ("name", Value::from("Grace"))]),
//! ];
//! let service = std::sync::Arc::new(horizon_facet::VecQueryService::new(
//!     rows,
//!     |row: &Value| row.field("id").and_then(|v| v.as_int()).unwrap_or(0),
//! ));
//!
//! assert_eq!(service.count(&Query::new()).unwrap(), 2);
//! ```

pub mod error;
pub mod handler;
pub mod memory;
pub mod observer;
pub mod prelude;
pub mod push_down;
pub mod selection;
pub mod service;

pub use error::{Error, Result};
pub use handler::{IdSelectionHandler, SelectMode, SelectionHandler, SetSelectionHandler};
pub use memory::VecQueryService;
pub use observer::{ObserverId, ObserverList, SelectionObserver};
pub use push_down::{ClickedIds, build_selection_filter};
pub use selection::{
    IdSetSelection, InvertedSelection, ItemSetSelection, Selection, SelectionIter,
};
pub use service::{PagedQueryService, Query, ServiceHandle};
