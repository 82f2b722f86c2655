//! Core filter and query engine for Horizon Facet.
//!
//! This crate provides the evaluation half of the selection-and-filter
//! engine:
//!
//! - **Values**: a tagged [`Value`] union for item state and the
//!   [`Attributed`] seam through which items expose named attributes
//! - **Attribute Paths**: dotted references (`address.city`) parsed once,
//!   cached, and resolved lazily per item
//! - **Comparison Operators**: pluggable boolean predicates with
//!   case/space-insensitive text matching
//! - **Filter Expressions**: immutable `And`/`Or`/`Not`/`Compare` trees
//! - **Evaluator Registry**: kind-keyed dispatch, open for
//!   domain-specific operators
//! - **Sort Orders**: reversible, null-aware, multi-criterion orders
//! - **Query Evaluation**: in-memory filtering and stable sorting
//!
//! Evaluation is pure: evaluators hold no per-call state, and a built
//! [`EvaluatorSet`] is read-only and safe to share across threads.
//!
//! # Example
//!
//! ```
//! use horizon_facet_core::{
//!     ComparisonOperator, FilterExpression, QueryEvaluator, SortOrder, Value,
//! };
//!
//! let people = vec![
//!     Value::record([("name", Value::from("Ada")), ("age", Value::from(36))]),
//!     Value::record([("name", Value::from("Grace")), ("age", Value::from(45))]),
//!     Value::record([("name", Value::from("Edsger")), ("age", Value::from(28))]),
//! ];
//!
//! let over_30 = FilterExpression::compare("age", ComparisonOperator::greater_than(), 30);
//! let by_name = SortOrder::by("name");
//!
//! let evaluator = QueryEvaluator::new();
//! let matched = evaluator.filter(&people, Some(&over_30)).unwrap();
//! let ordered = evaluator.sort(&matched, Some(&by_name)).unwrap();
//! assert_eq!(ordered.len(), 2);
//! ```

mod error;
mod expr;
mod operator;
mod path;
mod query;
mod registry;
mod sort;
mod value;

pub use error::{Error, Result};
pub use expr::{
    AndEvaluator, CompareEvaluator, ExprKind, ExpressionEvaluator, FilterExpression, NotEvaluator,
    OrEvaluator,
};
pub use operator::{
    ComparisonOperator, ContainsEvaluator, EqualsEvaluator, GreaterThanEvaluator, InEvaluator,
    IsEmptyEvaluator, IsNotEmptyEvaluator, IsNullEvaluator, LessThanEvaluator,
    NotContainsEvaluator, NotEqualsEvaluator, OperatorEvaluator, OperatorKind,
    StartsWithEvaluator,
};
pub use path::{PathResolver, ResolveContext};
pub use query::QueryEvaluator;
pub use registry::EvaluatorSet;
pub use sort::{SortCriterion, SortOrder, ValueComparator};
pub use value::{Attributed, Value};
