//! The `Sequence` extension trait and the adapters that live with it.
//!
//! Every [`Iterator`] is a sequence. `Sequence` adds the query combinators as
//! methods so they chain fluently; each method delegates to the free function
//! of the same name in its module.

use std::iter::Fuse;

use tracing::trace;

use crate::comparer::{Comparer, EqualityComparer};
use crate::element;
use crate::error::Result;
use crate::join::{self, GroupJoin, InnerJoin, LeftJoin};
use crate::lookup::{self, GroupBy, Lookup};
use crate::ordering::{self, Dir, OrderKey, OrderedSequence};
use crate::quantifier;

/// Yields a sequence back to front.
///
/// The source is buffered in full on the first pull.
#[derive(Debug)]
pub struct Reverse<I: Iterator> {
    pending: Option<I>,
    buffer: Vec<I::Item>,
}

impl<I: Iterator> Reverse<I> {
    fn new(source: I) -> Self {
        Reverse {
            pending: Some(source),
            buffer: Vec::new(),
        }
    }
}

impl<I: Iterator> Iterator for Reverse<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(source) = self.pending.take() {
            self.buffer = source.collect();
            trace!(elements = self.buffer.len(), "materialized reverse buffer");
        }
        self.buffer.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.pending {
            Some(source) => source.size_hint(),
            None => (self.buffer.len(), Some(self.buffer.len())),
        }
    }
}

/// Yields the source unchanged, or a single fallback value if it is empty.
#[derive(Debug, Clone)]
pub struct DefaultIfEmpty<I: Iterator> {
    source: Fuse<I>,
    fallback: Option<I::Item>,
}

impl<I: Iterator> Iterator for DefaultIfEmpty<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.source.next() {
            Some(item) => {
                self.fallback = None;
                Some(item)
            }
            None => self.fallback.take(),
        }
    }
}

/// Reverses `source`.
pub fn reverse<I: IntoIterator>(source: I) -> Reverse<I::IntoIter> {
    Reverse::new(source.into_iter())
}

/// Yields `source`, or `fallback` once if `source` is empty.
pub fn default_if_empty<I: IntoIterator>(source: I, fallback: I::Item) -> DefaultIfEmpty<I::IntoIter> {
    DefaultIfEmpty {
        source: source.into_iter().fuse(),
        fallback: Some(fallback),
    }
}

/// Query combinators for every iterator.
///
/// Names that would collide with [`Iterator`]'s own methods are adjusted:
/// [`last_element`](Sequence::last_element) instead of `last`,
/// [`reversed`](Sequence::reversed) instead of `rev`, and
/// [`has_any`](Sequence::has_any) for the predicate-less `any`. Use
/// `Iterator::any` and `Iterator::all` for the predicate forms.
///
/// # Example
///
/// ```
/// use standout_query::{QueryError, Sequence};
///
/// let digits = ["zero", "one", "two", "three", "four", "five"];
///
/// assert_eq!(digits.iter().first_where(|d| d.starts_with('t')), Ok(&"two"));
/// assert_eq!(
///     digits.iter().single_where(|d| d.starts_with('t')),
///     Err(QueryError::MultipleMatch)
/// );
///
/// let by_length: Vec<_> = digits.iter().order_by_desc(|d| d.len()).then_by(|d| **d).collect();
/// assert_eq!(by_length[0], &"three");
/// ```
pub trait Sequence: Iterator {
    /// Returns the first element, or [`QueryError::NoMatch`](crate::QueryError::NoMatch).
    fn first(self) -> Result<Self::Item>
    where
        Self: Sized,
    {
        element::first(self)
    }

    /// Returns the first element satisfying `predicate`.
    fn first_where<P>(self, predicate: P) -> Result<Self::Item>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        element::first_where(self, predicate)
    }

    /// Returns the first element, or `Self::Item::default()`.
    fn first_or_default(self) -> Self::Item
    where
        Self: Sized,
        Self::Item: Default,
    {
        element::first_or_default(self)
    }

    /// Returns the first element satisfying `predicate`, or the default.
    fn first_or_default_where<P>(self, predicate: P) -> Self::Item
    where
        Self: Sized,
        Self::Item: Default,
        P: FnMut(&Self::Item) -> bool,
    {
        element::first_or_default_where(self, predicate)
    }

    /// Returns the first element, or `default`.
    fn first_or(self, default: Self::Item) -> Self::Item
    where
        Self: Sized,
    {
        element::first_or(self, default)
    }

    /// Returns the first element satisfying `predicate`, or `default`.
    fn first_or_where<P>(self, predicate: P, default: Self::Item) -> Self::Item
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        element::first_or_where(self, predicate, default)
    }

    /// Returns the last element, or [`QueryError::NoMatch`](crate::QueryError::NoMatch).
    fn last_element(self) -> Result<Self::Item>
    where
        Self: Sized,
    {
        element::last(self)
    }

    /// Returns the last element satisfying `predicate`.
    fn last_where<P>(self, predicate: P) -> Result<Self::Item>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        element::last_where(self, predicate)
    }

    /// Returns the last element, or the default.
    fn last_or_default(self) -> Self::Item
    where
        Self: Sized,
        Self::Item: Default,
    {
        element::last_or_default(self)
    }

    /// Returns the last element satisfying `predicate`, or the default.
    fn last_or_default_where<P>(self, predicate: P) -> Self::Item
    where
        Self: Sized,
        Self::Item: Default,
        P: FnMut(&Self::Item) -> bool,
    {
        element::last_or_default_where(self, predicate)
    }

    /// Returns the last element, or `default`.
    fn last_or(self, default: Self::Item) -> Self::Item
    where
        Self: Sized,
    {
        element::last_or(self, default)
    }

    /// Returns the last element satisfying `predicate`, or `default`.
    fn last_or_where<P>(self, predicate: P, default: Self::Item) -> Self::Item
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        element::last_or_where(self, predicate, default)
    }

    /// Returns the only element.
    fn single(self) -> Result<Self::Item>
    where
        Self: Sized,
    {
        element::single(self)
    }

    /// Returns the only element satisfying `predicate`.
    fn single_where<P>(self, predicate: P) -> Result<Self::Item>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        element::single_where(self, predicate)
    }

    /// Returns the only element, or the default if there is none.
    ///
    /// More than one element is still an error.
    fn single_or_default(self) -> Result<Self::Item>
    where
        Self: Sized,
        Self::Item: Default,
    {
        element::single_or_default(self)
    }

    /// Returns the only element satisfying `predicate`, or the default.
    fn single_or_default_where<P>(self, predicate: P) -> Result<Self::Item>
    where
        Self: Sized,
        Self::Item: Default,
        P: FnMut(&Self::Item) -> bool,
    {
        element::single_or_default_where(self, predicate)
    }

    /// Returns the only element, or `default` if there is none.
    fn single_or(self, default: Self::Item) -> Result<Self::Item>
    where
        Self: Sized,
    {
        element::single_or(self, default)
    }

    /// Returns the only element satisfying `predicate`, or `default` if none
    /// does.
    fn single_or_where<P>(self, predicate: P, default: Self::Item) -> Result<Self::Item>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        element::single_or_where(self, predicate, default)
    }

    /// Returns the element at `index`.
    fn element_at(self, index: usize) -> Result<Self::Item>
    where
        Self: Sized,
    {
        element::element_at(self, index)
    }

    /// Returns the element at `index`, or the default.
    fn element_at_or_default(self, index: usize) -> Self::Item
    where
        Self: Sized,
        Self::Item: Default,
    {
        element::element_at_or_default(self, index)
    }

    /// Returns the element at `index`, or `default`.
    fn element_at_or(self, index: usize, default: Self::Item) -> Self::Item
    where
        Self: Sized,
    {
        element::element_at_or(self, index, default)
    }

    /// Returns `true` if the sequence has any element.
    fn has_any(self) -> bool
    where
        Self: Sized,
    {
        quantifier::has_any(self)
    }

    /// Returns `true` if the sequence contains `value`.
    fn contains(self, value: &Self::Item) -> bool
    where
        Self: Sized,
        Self::Item: PartialEq,
    {
        quantifier::contains(self, value)
    }

    /// Returns `true` if `eq(element, value)` holds for some element.
    fn contains_by<E>(self, value: &Self::Item, eq: E) -> bool
    where
        Self: Sized,
        E: FnMut(&Self::Item, &Self::Item) -> bool,
    {
        quantifier::contains_by(self, value, eq)
    }

    /// Returns `true` if some element equals `value` under `comparer`.
    fn contains_with<C>(self, value: &Self::Item, comparer: C) -> bool
    where
        Self: Sized,
        C: EqualityComparer<Self::Item>,
    {
        quantifier::contains_with(self, value, comparer)
    }

    /// Returns `true` if `other` has the same elements in the same order.
    fn sequence_equal<B>(self, other: B) -> bool
    where
        Self: Sized,
        B: IntoIterator<Item = Self::Item>,
        Self::Item: PartialEq,
    {
        quantifier::sequence_equal(self, other)
    }

    /// [`sequence_equal`](Sequence::sequence_equal) comparing pairs with `eq`.
    fn sequence_equal_by<B, E>(self, other: B, eq: E) -> bool
    where
        Self: Sized,
        B: IntoIterator<Item = Self::Item>,
        E: FnMut(&Self::Item, &Self::Item) -> bool,
    {
        quantifier::sequence_equal_by(self, other, eq)
    }

    /// [`sequence_equal`](Sequence::sequence_equal) comparing pairs with
    /// `comparer`.
    fn sequence_equal_with<B, C>(self, other: B, comparer: C) -> bool
    where
        Self: Sized,
        B: IntoIterator<Item = Self::Item>,
        C: EqualityComparer<Self::Item>,
    {
        quantifier::sequence_equal_with(self, other, comparer)
    }

    /// Inner equi-join with `inner`. See [`inner_join`](crate::inner_join).
    fn inner_join<J, F, G, R, K, T>(
        self,
        inner: J,
        outer_key: F,
        inner_key: G,
        result: R,
    ) -> InnerJoin<Self, J::IntoIter, F, G, R, K>
    where
        Self: Sized,
        J: IntoIterator,
        F: FnMut(&Self::Item) -> K,
        G: FnMut(&J::Item) -> K,
        R: FnMut(&Self::Item, &J::Item) -> T,
        K: Eq + std::hash::Hash,
    {
        join::inner_join(self, inner, outer_key, inner_key, result)
    }

    /// Inner equi-join with keys compared by `comparer`.
    fn inner_join_with<J, F, G, R, K, C, T>(
        self,
        inner: J,
        outer_key: F,
        inner_key: G,
        result: R,
        comparer: C,
    ) -> InnerJoin<Self, J::IntoIter, F, G, R, K, C>
    where
        Self: Sized,
        J: IntoIterator,
        F: FnMut(&Self::Item) -> K,
        G: FnMut(&J::Item) -> K,
        R: FnMut(&Self::Item, &J::Item) -> T,
        C: EqualityComparer<K>,
    {
        join::inner_join_with(self, inner, outer_key, inner_key, result, comparer)
    }

    /// Group-join with `inner`. See [`group_join`](crate::group_join).
    fn group_join<J, F, G, R, K, T>(
        self,
        inner: J,
        outer_key: F,
        inner_key: G,
        result: R,
    ) -> GroupJoin<Self, J::IntoIter, F, G, R, K>
    where
        Self: Sized,
        J: IntoIterator,
        F: FnMut(&Self::Item) -> K,
        G: FnMut(&J::Item) -> K,
        R: FnMut(Self::Item, &[J::Item]) -> T,
        K: Eq + std::hash::Hash,
    {
        join::group_join(self, inner, outer_key, inner_key, result)
    }

    /// Group-join with keys compared by `comparer`.
    fn group_join_with<J, F, G, R, K, C, T>(
        self,
        inner: J,
        outer_key: F,
        inner_key: G,
        result: R,
        comparer: C,
    ) -> GroupJoin<Self, J::IntoIter, F, G, R, K, C>
    where
        Self: Sized,
        J: IntoIterator,
        F: FnMut(&Self::Item) -> K,
        G: FnMut(&J::Item) -> K,
        R: FnMut(Self::Item, &[J::Item]) -> T,
        C: EqualityComparer<K>,
    {
        join::group_join_with(self, inner, outer_key, inner_key, result, comparer)
    }

    /// Left outer join with `inner`. See [`left_join`](crate::left_join).
    fn left_join<J, F, G, R, K, T>(
        self,
        inner: J,
        outer_key: F,
        inner_key: G,
        result: R,
    ) -> LeftJoin<Self, J::IntoIter, F, G, R, K>
    where
        Self: Sized,
        J: IntoIterator,
        F: FnMut(&Self::Item) -> K,
        G: FnMut(&J::Item) -> K,
        R: FnMut(&Self::Item, Option<&J::Item>) -> T,
        K: Eq + std::hash::Hash,
    {
        join::left_join(self, inner, outer_key, inner_key, result)
    }

    /// Left outer join with keys compared by `comparer`.
    fn left_join_with<J, F, G, R, K, C, T>(
        self,
        inner: J,
        outer_key: F,
        inner_key: G,
        result: R,
        comparer: C,
    ) -> LeftJoin<Self, J::IntoIter, F, G, R, K, C>
    where
        Self: Sized,
        J: IntoIterator,
        F: FnMut(&Self::Item) -> K,
        G: FnMut(&J::Item) -> K,
        R: FnMut(&Self::Item, Option<&J::Item>) -> T,
        C: EqualityComparer<K>,
    {
        join::left_join_with(self, inner, outer_key, inner_key, result, comparer)
    }

    /// Lazily groups elements by `key`, in first-seen key order.
    fn group_by<F, K>(self, key: F) -> GroupBy<Self, F, K>
    where
        Self: Sized,
        F: FnMut(&Self::Item) -> K,
        K: Eq + std::hash::Hash,
    {
        lookup::group_by(self, key)
    }

    /// Lazily groups elements by `key` compared with `comparer`.
    fn group_by_with<F, K, C>(self, key: F, comparer: C) -> GroupBy<Self, F, K, C>
    where
        Self: Sized,
        F: FnMut(&Self::Item) -> K,
        C: EqualityComparer<K>,
    {
        lookup::group_by_with(self, key, comparer)
    }

    /// Eagerly builds a [`Lookup`] keyed by `key`.
    fn to_lookup<F, K>(self, key: F) -> Lookup<K, Self::Item>
    where
        Self: Sized,
        F: FnMut(&Self::Item) -> K,
        K: Eq + std::hash::Hash,
    {
        lookup::to_lookup(self, key)
    }

    /// Eagerly builds a [`Lookup`] keyed by `key` compared with `comparer`.
    fn to_lookup_with<F, K, C>(self, key: F, comparer: C) -> Lookup<K, Self::Item, C>
    where
        Self: Sized,
        F: FnMut(&Self::Item) -> K,
        C: EqualityComparer<K>,
    {
        lookup::to_lookup_with(self, key, comparer)
    }

    /// Orders ascending by `key`.
    fn order_by<F, K>(self, key: F) -> OrderedSequence<Self, OrderKey<F, K>>
    where
        Self: Sized,
        F: FnMut(&Self::Item) -> K,
        K: Ord,
    {
        ordering::order_by(self, key)
    }

    /// Orders descending by `key`.
    fn order_by_desc<F, K>(self, key: F) -> OrderedSequence<Self, OrderKey<F, K>>
    where
        Self: Sized,
        F: FnMut(&Self::Item) -> K,
        K: Ord,
    {
        ordering::order_by_desc(self, key)
    }

    /// Orders by `key` using `comparer` in direction `dir`.
    fn order_by_with<F, K, C>(
        self,
        key: F,
        comparer: C,
        dir: Dir,
    ) -> OrderedSequence<Self, OrderKey<F, K, C>>
    where
        Self: Sized,
        F: FnMut(&Self::Item) -> K,
        C: Comparer<K>,
    {
        ordering::order_by_with(self, key, comparer, dir)
    }

    /// Yields the elements in reverse order.
    fn reversed(self) -> Reverse<Self>
    where
        Self: Sized,
    {
        reverse(self)
    }

    /// Yields the elements, or `fallback` once if there are none.
    fn default_if_empty(self, fallback: Self::Item) -> DefaultIfEmpty<Self>
    where
        Self: Sized,
    {
        default_if_empty(self, fallback)
    }
}

impl<I: Iterator> Sequence for I {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::IgnoreAsciiCase;
    use crate::error::QueryError;
    use std::cell::Cell;

    #[test]
    fn reverse_is_lazy_until_first_pull() {
        let pulled = Cell::new(0);
        let mut reversed = (1..=4).inspect(|_| pulled.set(pulled.get() + 1)).reversed();
        assert_eq!(pulled.get(), 0);

        assert_eq!(reversed.next(), Some(4));
        assert_eq!(pulled.get(), 4);
        assert_eq!(reversed.size_hint(), (3, Some(3)));
        assert_eq!(reversed.collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn reverse_twice_is_identity() {
        let items = vec!["a", "b", "c"];
        let twice: Vec<_> = items.iter().copied().reversed().reversed().collect();
        assert_eq!(twice, items);
    }

    #[test]
    fn reverse_empty() {
        assert_eq!(reverse(Vec::<i32>::new()).next(), None);
    }

    #[test]
    fn default_if_empty_passes_through() {
        let items: Vec<_> = vec![1, 2].into_iter().default_if_empty(0).collect();
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn default_if_empty_yields_fallback_once() {
        let mut items = Vec::<i32>::new().into_iter().default_if_empty(7);
        assert_eq!(items.next(), Some(7));
        assert_eq!(items.next(), None);
        assert_eq!(items.next(), None);
    }

    #[test]
    fn selectors_chain_after_filters() {
        let numbers = [5, 4, 1, 3, 9, 8, 6, 7, 2, 0];
        assert_eq!(numbers.iter().filter(|n| **n > 5).element_at(1), Ok(&8));
        assert_eq!(numbers.iter().copied().last_where(|n| n % 2 == 0), Ok(0));
        assert_eq!(numbers.iter().copied().single_where(|n| *n > 8), Ok(9));
        assert_eq!(
            numbers.iter().copied().single_or_default_where(|n| *n > 7),
            Err(QueryError::MultipleMatch)
        );
        assert_eq!(numbers.iter().copied().skip(10).first_or(-1), -1);
    }

    #[test]
    fn quantifier_methods() {
        let words = ["Believe", "Relief", "Receipt", "Field"];
        assert!(words.iter().has_any());
        assert!(words.iter().contains(&&"Relief"));
        assert!(words.iter().copied().contains_with(&"RECEIPT", IgnoreAsciiCase));
        assert!(words.iter().sequence_equal(words.iter()));
        assert!(!words.iter().sequence_equal(words.iter().take(3)));
    }

    #[test]
    fn group_by_method_with_comparer() {
        let words = ["apple", "Avocado", "banana", "Apricot"];
        let groups: Vec<(String, usize)> = words
            .iter()
            .group_by_with(|w| w[..1].to_string(), IgnoreAsciiCase)
            .map(|g| (g.key().clone(), g.len()))
            .collect();
        assert_eq!(groups, vec![("a".to_string(), 3), ("b".to_string(), 1)]);
    }

    #[test]
    fn group_join_method() {
        let counts: Vec<(&str, usize)> = ["Seafood", "Produce"]
            .into_iter()
            .group_join([("Ikura", "Seafood"), ("Konbu", "Seafood")], |c| *c, |p| p.1, |c, g| {
                (c, g.len())
            })
            .collect();
        assert_eq!(counts, vec![("Seafood", 2), ("Produce", 0)]);
    }

    #[test]
    fn left_join_with_method() {
        let rows: Vec<(&str, &str)> = ["seafood", "produce"]
            .into_iter()
            .left_join_with(
                [("Ikura", "SEAFOOD")],
                |c| *c,
                |p| p.1,
                |c, p| (*c, p.map_or("-", |p| p.0)),
                IgnoreAsciiCase,
            )
            .collect();
        assert_eq!(rows, vec![("seafood", "Ikura"), ("produce", "-")]);
    }

    #[test]
    fn to_lookup_with_method() {
        let lookup = ["Chai", "chang", "Ikura"]
            .into_iter()
            .to_lookup_with(|w| w[..1].to_string(), IgnoreAsciiCase);
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get(&"C".to_string()), &["Chai", "chang"]);
    }

    #[test]
    fn or_where_methods() {
        let numbers = [3, 8, 5, 10];
        assert_eq!(numbers.iter().copied().first_or_where(|n| *n > 6, 0), 8);
        assert_eq!(numbers.iter().copied().last_or_where(|n| *n > 20, -1), -1);
        assert_eq!(numbers.iter().copied().single_or_where(|n| *n == 5, 0), Ok(5));
    }

    #[test]
    fn join_then_order() {
        let categories = ["Seafood", "Beverages"];
        let products = [("Ikura", "Seafood"), ("Chai", "Beverages"), ("Chang", "Beverages")];
        let rows: Vec<_> = categories
            .iter()
            .inner_join(products.iter(), |c| **c, |p| p.1, |c, p| (*c, p.0))
            .order_by(|row| row.0)
            .then_by_desc(|row| row.1)
            .collect();

        assert_eq!(
            rows,
            vec![(&"Beverages", "Chang"), (&"Beverages", "Chai"), (&"Seafood", "Ikura")]
        );
    }
}
