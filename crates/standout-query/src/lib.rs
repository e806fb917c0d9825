//! Query - Deferred query combinators over Rust iterators.
//!
//! Query provides composable, lazily evaluated operations over in-memory
//! sequences of any element type. It supports:
//!
//! - Element selection: first, last, single and positional access, with a
//!   defined failure policy
//! - Quantifiers: any, all, contains and sequence equality
//! - Relational operators: inner join, group join and left outer join
//! - Stable multi-key ordering with per-key direction and pluggable comparers
//! - Grouping into a key -> elements lookup
//!
//! # Quick Start
//!
//! ```rust
//! use standout_query::{QueryError, Sequence};
//!
//! let categories = ["Beverages", "Condiments", "Vegetables", "Seafood"];
//! let products = [
//!     ("Chai", "Beverages", 18),
//!     ("Chang", "Beverages", 19),
//!     ("Aniseed Syrup", "Condiments", 10),
//!     ("Ikura", "Seafood", 31),
//!     ("Konbu", "Seafood", 6),
//! ];
//!
//! // Every category with its product names, "(none)" where there are none.
//! let rows: Vec<(&str, &str)> = categories
//!     .iter()
//!     .left_join(products.iter(), |c| **c, |p| p.1, |c, p| {
//!         (**c, p.map_or("(none)", |p| p.0))
//!     })
//!     .collect();
//! assert_eq!(rows[3], ("Vegetables", "(none)"));
//!
//! // Products by category, most expensive first within each.
//! let sorted: Vec<_> = products
//!     .iter()
//!     .order_by(|p| p.1)
//!     .then_by_desc(|p| p.2)
//!     .map(|p| p.0)
//!     .collect();
//! assert_eq!(sorted, ["Chang", "Chai", "Aniseed Syrup", "Ikura", "Konbu"]);
//!
//! // Exactly-one lookups report ambiguity.
//! let seafood = products.iter().single_where(|p| p.1 == "Seafood");
//! assert_eq!(seafood, Err(QueryError::MultipleMatch));
//! ```
//!
//! # Evaluation
//!
//! Nothing runs until the result is pulled. Most operators stream; a few have
//! to see the whole input first:
//!
//! | operator | materializes |
//! |----------|--------------|
//! | `order_by` and `then_by` | the source, on the first pull |
//! | `reversed` | the source, on the first pull |
//! | joins | the inner sequence, on the first pull; the outer streams |
//! | `group_by` / `to_lookup` | the source |
//! | `single` | scans until a second match or the end |
//!
//! # Failure Policy
//!
//! Selectors that need a match return [`Result`]. The `_or_default` and `_or`
//! forms substitute a value when nothing matched, but the `single` family
//! always reports [`QueryError::MultipleMatch`]. `first` of several matches is
//! simply the first one.

mod comparer;
mod element;
mod error;
mod join;
mod lookup;
mod ordering;
mod quantifier;
mod sequence;

// Re-export public API
pub use comparer::{Comparer, EqualityComparer, IgnoreAsciiCase, Natural, PartialNatural, Projected};
pub use element::{
    element_at, element_at_or, element_at_or_default, first, first_or, first_or_default,
    first_or_default_where, first_or_where, first_where, last, last_or, last_or_default,
    last_or_default_where, last_or_where, last_where, single, single_or, single_or_default,
    single_or_default_where, single_or_where, single_where,
};
pub use error::{QueryError, Result};
pub use join::{
    group_join, group_join_with, inner_join, inner_join_with, left_join, left_join_with,
    GroupJoin, InnerJoin, LeftJoin,
};
pub use lookup::{group_by, group_by_with, to_lookup, to_lookup_with, GroupBy, Grouping, Lookup};
pub use ordering::{
    order_by, order_by_desc, order_by_with, Dir, OrderKey, OrderedSequence, SortKeys, ThenBy,
};
pub use quantifier::{
    all, any, contains, contains_by, contains_with, has_any, sequence_equal, sequence_equal_by,
    sequence_equal_with,
};
pub use sequence::{default_if_empty, reverse, DefaultIfEmpty, Reverse, Sequence};
