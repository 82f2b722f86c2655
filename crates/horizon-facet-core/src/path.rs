//! Attribute path parsing and resolution.
//!
//! An attribute path is a dotted reference into an item's state, resolved
//! lazily at evaluation time:
//!
//! - `address.city`: follow `address`, then `city` within it
//! - `address.zip?`: `zip` is optional, so a null or missing value
//!   terminates the chain early with `Null` instead of failing
//! - `firstName + " " + lastName`: string concatenation; operands are
//!   chains or quoted literals, each evaluated against the original item
//! - `` (empty): the item itself ("this")
//!
//! Paths are parsed once and cached per distinct path string, since
//! resolution runs once per item during large filter and sort passes.
//!
//! # Example
//!
//! ```
//! use horizon_facet_core::{PathResolver, Value};
//!
//! let resolver = PathResolver::new();
//! let item = Value::record([("address", Value::record([("city", "Utrecht")]))]);
//!
//! let city = resolver.resolve(&item, "address.city").unwrap();
//! assert_eq!(city, Value::from("Utrecht"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::value::{Attributed, Value};

/// One step of a dotted chain.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    name: String,
    optional: bool,
}

/// An operand of a concatenation expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConcatPart {
    /// A quoted literal, passed through verbatim.
    Literal(String),
    /// A segment chain resolved against the root item.
    Chain(Vec<Segment>),
}

/// A parsed attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathExpr {
    /// Empty path: the item itself.
    This,
    /// A dotted segment chain.
    Chain(Vec<Segment>),
    /// `+`-joined operands, stringified and concatenated.
    Concat(Vec<ConcatPart>),
}

/// Execution state carried through one resolution pass.
///
/// The context holds the value the next segment will be resolved against
/// and an append-only trace of the steps taken so far (used for error
/// reporting). Concatenation operands run in forked contexts that share
/// only the original root item.
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    current: Value,
    trace: Vec<String>,
}

impl ResolveContext {
    /// Creates a fresh context positioned at the root item.
    pub fn new() -> Self {
        Self::default()
    }

    /// The value the next segment resolves against.
    pub fn current(&self) -> &Value {
        &self.current
    }

    /// The steps taken so far, as `segment -> kind` entries.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Forks a context for a sub-expression. Only the root item is shared
    /// with the parent; current value and trace start fresh.
    pub fn fork(&self) -> Self {
        Self::new()
    }

    fn step(&mut self, segment: &str, value: &Value) {
        self.trace.push(format!("{segment} -> {}", value.kind_name()));
        self.current = value.clone();
    }

    fn describe(&self) -> String {
        if self.trace.is_empty() {
            "at root".to_string()
        } else {
            format!("after {}", self.trace.join(", "))
        }
    }
}

/// Parses and resolves attribute paths against items.
///
/// The resolver keeps a cache of parsed paths keyed by the raw path string.
/// It is read-only after construction apart from that cache and is safe to
/// share across threads.
#[derive(Debug, Default)]
pub struct PathResolver {
    cache: RwLock<HashMap<String, Arc<PathExpr>>>,
}

impl PathResolver {
    /// Creates a resolver with an empty parse cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `path` against `item`.
    ///
    /// Fails with [`Error::AttributeResolution`] when a mandatory segment
    /// is missing or resolves to null while further segments remain, and
    /// with [`Error::InvalidPath`] when the path text cannot be parsed.
    pub fn resolve<T: Attributed + ?Sized>(&self, item: &T, path: &str) -> Result<Value> {
        let expr = self.parse(path)?;
        match expr.as_ref() {
            PathExpr::This => Ok(item.this()),
            PathExpr::Chain(segments) => {
                let mut ctx = ResolveContext::new();
                resolve_chain(item, segments, path, &mut ctx)
            }
            PathExpr::Concat(parts) => {
                let ctx = ResolveContext::new();
                let mut joined = String::new();
                for part in parts {
                    match part {
                        ConcatPart::Literal(text) => joined.push_str(text),
                        ConcatPart::Chain(segments) => {
                            // Each operand gets its own context; only the
                            // root item is shared.
                            let mut sub = ctx.fork();
                            let value = resolve_chain(item, segments, path, &mut sub)?;
                            joined.push_str(&value.to_string());
                        }
                    }
                }
                Ok(Value::Str(joined))
            }
        }
    }

    /// Parses a path, consulting the cache first.
    fn parse(&self, path: &str) -> Result<Arc<PathExpr>> {
        if let Some(expr) = self.cache.read().get(path) {
            return Ok(expr.clone());
        }
        let expr = Arc::new(parse_path(path)?);
        self.cache.write().insert(path.to_string(), expr.clone());
        Ok(expr)
    }
}

/// Walks a segment chain against an item.
fn resolve_chain<T: Attributed + ?Sized>(
    item: &T,
    segments: &[Segment],
    path: &str,
    ctx: &mut ResolveContext,
) -> Result<Value> {
    debug_assert!(!segments.is_empty());

    for (index, segment) in segments.iter().enumerate() {
        // The first segment reads the item; later segments read the value
        // carried in the context.
        let resolved = if index == 0 {
            item.attribute(&segment.name)
        } else {
            ctx.current().attribute(&segment.name)
        };

        let value = match resolved {
            Some(value) => value,
            None if segment.optional => return Ok(Value::Null),
            None => {
                return Err(Error::resolution(
                    path,
                    &segment.name,
                    format!("no such attribute {}", ctx.describe()),
                ));
            }
        };

        let is_last = index + 1 == segments.len();
        if value.is_null() && !is_last {
            if segment.optional {
                return Ok(Value::Null);
            }
            return Err(Error::resolution(
                path,
                &segment.name,
                format!("mandatory segment is null {}", ctx.describe()),
            ));
        }

        ctx.step(&segment.name, &value);
    }

    Ok(ctx.current().clone())
}

// =========================================================================
// Parsing
// =========================================================================

fn parse_path(path: &str) -> Result<PathExpr> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Ok(PathExpr::This);
    }

    let parts = split_operands(path, trimmed)?;
    if parts.len() == 1 {
        return match parse_operand(path, &parts[0])? {
            ConcatPart::Chain(segments) => Ok(PathExpr::Chain(segments)),
            literal @ ConcatPart::Literal(_) => Ok(PathExpr::Concat(vec![literal])),
        };
    }

    let operands = parts
        .iter()
        .map(|part| parse_operand(path, part))
        .collect::<Result<Vec<_>>>()?;
    Ok(PathExpr::Concat(operands))
}

/// Splits on `+` at the top level, leaving quoted text intact.
fn split_operands(path: &str, text: &str) -> Result<Vec<String>> {
    let mut parts = Vec::new();
    let mut part = String::new();
    let mut quote: Option<char> = None;

    for ch in text.chars() {
        match quote {
            Some(q) => {
                part.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    part.push(ch);
                }
                '+' => {
                    parts.push(std::mem::take(&mut part));
                }
                _ => part.push(ch),
            },
        }
    }

    if quote.is_some() {
        return Err(Error::invalid_path(path, "unterminated string literal"));
    }
    parts.push(part);
    Ok(parts)
}

fn parse_operand(path: &str, text: &str) -> Result<ConcatPart> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_path(path, "empty concatenation operand"));
    }

    if let Some(first) = trimmed.chars().next()
        && (first == '\'' || first == '"')
    {
        let inner = trimmed
            .strip_prefix(first)
            .and_then(|rest| rest.strip_suffix(first))
            .ok_or_else(|| Error::invalid_path(path, "unterminated string literal"))?;
        if inner.contains(first) {
            return Err(Error::invalid_path(path, "stray quote inside literal"));
        }
        return Ok(ConcatPart::Literal(inner.to_string()));
    }

    Ok(ConcatPart::Chain(parse_chain(path, trimmed)?))
}

fn parse_chain(path: &str, text: &str) -> Result<Vec<Segment>> {
    text.split('.')
        .map(|raw| parse_segment(path, raw))
        .collect()
}

fn parse_segment(path: &str, raw: &str) -> Result<Segment> {
    let trimmed = raw.trim();
    let (name, optional) = match trimmed.strip_suffix('?') {
        Some(name) => (name, true),
        None => (trimmed, false),
    };

    if name.is_empty() {
        return Err(Error::invalid_path(path, "empty path segment"));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap_or('.');
    if !(first.is_alphabetic() || first == '_')
        || !chars.all(|c| c.is_alphanumeric() || c == '_')
    {
        return Err(Error::invalid_path(
            path,
            format!("invalid segment '{name}'"),
        ));
    }

    Ok(Segment {
        name: name.to_string(),
        optional,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Value {
        Value::record([
            ("firstName", Value::from("Ada")),
            ("lastName", Value::from("Lovelace")),
            (
                "address",
                Value::record([("city", Value::from("London")), ("zip", Value::Null)]),
            ),
        ])
    }

    #[test]
    fn test_resolve_nested_path() {
        let resolver = PathResolver::new();
        assert_eq!(
            resolver.resolve(&person(), "address.city").unwrap(),
            Value::from("London")
        );
    }

    #[test]
    fn test_empty_path_is_this() {
        let resolver = PathResolver::new();
        let item = person();
        assert_eq!(resolver.resolve(&item, "").unwrap(), item);
    }

    #[test]
    fn test_terminal_null_is_a_value() {
        let resolver = PathResolver::new();
        assert_eq!(
            resolver.resolve(&person(), "address.zip").unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_optional_segment_terminates_early() {
        let resolver = PathResolver::new();
        // zip is null; the optional marker lets the chain stop with Null.
        assert_eq!(
            resolver.resolve(&person(), "address.zip?.district").unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_mandatory_null_mid_chain_fails() {
        let resolver = PathResolver::new();
        let err = resolver
            .resolve(&person(), "address.zip.district")
            .unwrap_err();
        assert!(matches!(err, Error::AttributeResolution { .. }));
    }

    #[test]
    fn test_unknown_attribute_fails() {
        let resolver = PathResolver::new();
        let err = resolver.resolve(&person(), "address.country").unwrap_err();
        assert!(matches!(err, Error::AttributeResolution { .. }));
    }

    #[test]
    fn test_optional_unknown_attribute_is_null() {
        let resolver = PathResolver::new();
        assert_eq!(
            resolver.resolve(&person(), "address.country?").unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_concatenation() {
        let resolver = PathResolver::new();
        assert_eq!(
            resolver
                .resolve(&person(), "firstName + ' ' + lastName")
                .unwrap(),
            Value::from("Ada Lovelace")
        );
    }

    #[test]
    fn test_concatenation_operands_share_only_root() {
        let resolver = PathResolver::new();
        // Both operands start from the item, not from each other's result.
        assert_eq!(
            resolver
                .resolve(&person(), "address.city + \", \" + firstName")
                .unwrap(),
            Value::from("London, Ada")
        );
    }

    #[test]
    fn test_parse_errors() {
        let resolver = PathResolver::new();
        let item = person();
        assert!(matches!(
            resolver.resolve(&item, "address..city").unwrap_err(),
            Error::InvalidPath { .. }
        ));
        assert!(matches!(
            resolver.resolve(&item, "firstName + 'oops").unwrap_err(),
            Error::InvalidPath { .. }
        ));
        assert!(matches!(
            resolver.resolve(&item, "first name").unwrap_err(),
            Error::InvalidPath { .. }
        ));
    }

    #[test]
    fn test_parse_cache_reuse() {
        let resolver = PathResolver::new();
        let item = person();
        resolver.resolve(&item, "address.city").unwrap();
        resolver.resolve(&item, "address.city").unwrap();
        assert_eq!(resolver.cache.read().len(), 1);
    }
}
