//! Pluggable key comparison.
//!
//! Two capabilities are used by the engine:
//!
//! - [`Comparer`] orders keys, used by the sorter.
//! - [`EqualityComparer`] tests keys for equality and hashes them, used by the
//!   join index and grouping.
//!
//! [`Natural`] is the default for both and defers to the key type's own
//! `Ord`/`Eq + Hash`. Any closure `Fn(&K, &K) -> Ordering` is also a
//! [`Comparer`].

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Orders two keys.
///
/// Implementations should be consistent (a total preorder). An inconsistent
/// comparer produces an unspecified order but never panics the sorter.
pub trait Comparer<K: ?Sized> {
    /// Compares `a` with `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

impl<K: ?Sized, F> Comparer<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// Tests two keys for equality and hashes keys consistently with it.
///
/// Keys that compare equal must feed identical data to the hasher.
pub trait EqualityComparer<K: ?Sized> {
    /// Returns `true` if `a` and `b` are the same key.
    fn equals(&self, a: &K, b: &K) -> bool;

    /// Feeds `key` into `state`.
    fn hash_key<H: Hasher>(&self, key: &K, state: &mut H);
}

/// The key type's own ordering and equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord + ?Sized> Comparer<K> for Natural {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: Eq + Hash + ?Sized> EqualityComparer<K> for Natural {
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }

    fn hash_key<H: Hasher>(&self, key: &K, state: &mut H) {
        key.hash(state);
    }
}

/// Ordering for keys that are only `PartialOrd`, such as floats.
///
/// Incomparable pairs (NaN) are treated as equal, so the next key in the
/// chain decides and input order is kept otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialNatural;

impl<K: PartialOrd + ?Sized> Comparer<K> for PartialNatural {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.partial_cmp(b).unwrap_or(Ordering::Equal)
    }
}

/// Ordinal, ASCII case-insensitive string comparison.
///
/// ASCII letters are folded to upper case before comparing, byte by byte.
/// Other characters, including non-ASCII letters such as `é` and `É`, are
/// compared as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IgnoreAsciiCase;

impl<K: AsRef<str> + ?Sized> Comparer<K> for IgnoreAsciiCase {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        let a = a.as_ref().bytes().map(|c| c.to_ascii_uppercase());
        let b = b.as_ref().bytes().map(|c| c.to_ascii_uppercase());
        a.cmp(b)
    }
}

impl<K: AsRef<str> + ?Sized> EqualityComparer<K> for IgnoreAsciiCase {
    fn equals(&self, a: &K, b: &K) -> bool {
        a.as_ref().eq_ignore_ascii_case(b.as_ref())
    }

    fn hash_key<H: Hasher>(&self, key: &K, state: &mut H) {
        for byte in key.as_ref().bytes() {
            state.write_u8(byte.to_ascii_uppercase());
        }
        state.write_u8(0xff);
    }
}

/// Compares keys through a projection.
///
/// Two keys are equal when their projections are equal, and order by their
/// projections' natural order.
///
/// ```
/// use standout_query::{EqualityComparer, Projected};
///
/// let by_len = Projected::new(|s: &&str| s.len());
/// assert!(by_len.equals(&"abc", &"xyz"));
/// assert!(!by_len.equals(&"ab", &"xyz"));
/// ```
pub struct Projected<F, P> {
    project: F,
    _projection: PhantomData<fn() -> P>,
}

impl<F, P> Projected<F, P> {
    /// Creates a comparer that compares keys by `project(key)`.
    pub fn new(project: F) -> Self {
        Projected {
            project,
            _projection: PhantomData,
        }
    }
}

impl<F: Clone, P> Clone for Projected<F, P> {
    fn clone(&self) -> Self {
        Projected::new(self.project.clone())
    }
}

impl<F, P> std::fmt::Debug for Projected<F, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projected").finish_non_exhaustive()
    }
}

impl<K: ?Sized, F, P> EqualityComparer<K> for Projected<F, P>
where
    F: Fn(&K) -> P,
    P: Eq + Hash,
{
    fn equals(&self, a: &K, b: &K) -> bool {
        (self.project)(a) == (self.project)(b)
    }

    fn hash_key<H: Hasher>(&self, key: &K, state: &mut H) {
        (self.project)(key).hash(state);
    }
}

impl<K: ?Sized, F, P> Comparer<K> for Projected<F, P>
where
    F: Fn(&K) -> P,
    P: Ord,
{
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.project)(a).cmp(&(self.project)(b))
    }
}
