//! Stable multi-key ordering.
//!
//! Provides [`Dir`] for sort direction, [`OrderKey`] for a single key and
//! comparer, [`ThenBy`] for tie-break chaining, and [`OrderedSequence`], the
//! iterator produced by `order_by` and extended by `then_by`.
//!
//! Sorting is a materializing operation: nothing is pulled from the source
//! until the first call to `next`, at which point the whole source is
//! buffered, every key of the chain is evaluated once per element, and the
//! buffer is stably sorted.

use std::cmp::Ordering;
use std::marker::PhantomData;

use tracing::trace;

use crate::comparer::{Comparer, Natural};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering. `Equal` stays `Equal`, so ties keep
    /// their input order in both directions.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }
}

/// A chain of sort keys over elements of type `T`.
///
/// Keys are extracted once for the whole buffer into `Keys`, then compared by
/// element position.
pub trait SortKeys<T> {
    /// Materialized key columns for a buffer.
    type Keys;

    /// Evaluates every key of the chain for each element, in order.
    fn extract(&mut self, items: &[T]) -> Self::Keys;

    /// Compares the elements at positions `a` and `b`.
    ///
    /// Walks the chain left to right and returns on the first non-equal key.
    fn compare(&self, keys: &Self::Keys, a: usize, b: usize) -> Ordering;

    /// Returns the number of keys in the chain.
    fn key_count(&self) -> usize;
}

/// A single sort key: a key selector, a comparer and a direction.
pub struct OrderKey<F, K, C = Natural> {
    key: F,
    comparer: C,
    dir: Dir,
    _key: PhantomData<fn() -> K>,
}

impl<F, K, C> OrderKey<F, K, C> {
    /// Creates a sort key.
    pub fn new(key: F, comparer: C, dir: Dir) -> Self {
        OrderKey {
            key,
            comparer,
            dir,
            _key: PhantomData,
        }
    }

    /// Returns the direction of this key.
    pub fn dir(&self) -> Dir {
        self.dir
    }
}

impl<F, K, C: std::fmt::Debug> std::fmt::Debug for OrderKey<F, K, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderKey")
            .field("comparer", &self.comparer)
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl<T, F, K, C> SortKeys<T> for OrderKey<F, K, C>
where
    F: FnMut(&T) -> K,
    C: Comparer<K>,
{
    type Keys = Vec<K>;

    fn extract(&mut self, items: &[T]) -> Vec<K> {
        items.iter().map(|item| (self.key)(item)).collect()
    }

    fn compare(&self, keys: &Vec<K>, a: usize, b: usize) -> Ordering {
        self.dir.apply(self.comparer.compare(&keys[a], &keys[b]))
    }

    fn key_count(&self) -> usize {
        1
    }
}

/// A primary key chain followed by a tie-break key.
///
/// The secondary key is only consulted when the primary chain compares equal.
#[derive(Debug)]
pub struct ThenBy<A, B> {
    primary: A,
    secondary: B,
}

impl<T, A, B> SortKeys<T> for ThenBy<A, B>
where
    A: SortKeys<T>,
    B: SortKeys<T>,
{
    type Keys = (A::Keys, B::Keys);

    fn extract(&mut self, items: &[T]) -> Self::Keys {
        (self.primary.extract(items), self.secondary.extract(items))
    }

    fn compare(&self, keys: &Self::Keys, a: usize, b: usize) -> Ordering {
        self.primary
            .compare(&keys.0, a, b)
            .then_with(|| self.secondary.compare(&keys.1, a, b))
    }

    fn key_count(&self) -> usize {
        self.primary.key_count() + self.secondary.key_count()
    }
}

enum SortState<I: Iterator> {
    Pending(I),
    // partially consumed, then extended with another key
    Resort(Vec<I::Item>),
    Sorted(std::vec::IntoIter<I::Item>),
}

/// A sequence tagged with its active sort-key chain.
///
/// Created by `order_by`, `order_by_desc` and `order_by_with`. Further keys
/// are appended with [`then_by`](Self::then_by) and friends; they only break
/// ties left by the keys before them.
///
/// # Example
///
/// ```
/// use standout_query::Sequence;
///
/// let digits = ["zero", "one", "two", "three", "four", "five", "six"];
/// let sorted: Vec<_> = digits
///     .iter()
///     .order_by(|d| d.len())
///     .then_by(|d| **d)
///     .collect();
///
/// assert_eq!(sorted, [&"one", &"six", &"two", &"five", &"four", &"zero", &"three"]);
/// ```
pub struct OrderedSequence<I: Iterator, S> {
    state: SortState<I>,
    keys: S,
}

impl<I, S> OrderedSequence<I, S>
where
    I: Iterator,
    S: SortKeys<I::Item>,
{
    pub(crate) fn new(source: I, keys: S) -> Self {
        OrderedSequence {
            state: SortState::Pending(source),
            keys,
        }
    }

    /// Appends an ascending tie-break key using the key's natural order.
    pub fn then_by<F, K>(self, key: F) -> OrderedSequence<I, ThenBy<S, OrderKey<F, K>>>
    where
        F: FnMut(&I::Item) -> K,
        K: Ord,
    {
        self.then_by_with(key, Natural, Dir::Asc)
    }

    /// Appends a descending tie-break key using the key's natural order.
    pub fn then_by_desc<F, K>(self, key: F) -> OrderedSequence<I, ThenBy<S, OrderKey<F, K>>>
    where
        F: FnMut(&I::Item) -> K,
        K: Ord,
    {
        self.then_by_with(key, Natural, Dir::Desc)
    }

    /// Appends a tie-break key with an explicit comparer and direction.
    ///
    /// If elements have already been yielded, the remaining ones are
    /// re-sorted with the extended chain on the next pull.
    pub fn then_by_with<F, K, C>(
        self,
        key: F,
        comparer: C,
        dir: Dir,
    ) -> OrderedSequence<I, ThenBy<S, OrderKey<F, K, C>>>
    where
        F: FnMut(&I::Item) -> K,
        C: Comparer<K>,
    {
        let keys = ThenBy {
            primary: self.keys,
            secondary: OrderKey::new(key, comparer, dir),
        };
        let state = match self.state {
            SortState::Pending(source) => SortState::Pending(source),
            SortState::Resort(rest) => SortState::Resort(rest),
            SortState::Sorted(rest) => SortState::Resort(rest.collect()),
        };
        OrderedSequence { state, keys }
    }

    fn materialize(&mut self) {
        let items: Vec<I::Item> = match &mut self.state {
            SortState::Pending(source) => source.collect(),
            SortState::Resort(rest) => std::mem::take(rest),
            SortState::Sorted(_) => return,
        };
        let sorted = sort_stable(items, &mut self.keys);
        self.state = SortState::Sorted(sorted.into_iter());
    }
}

impl<I, S> Iterator for OrderedSequence<I, S>
where
    I: Iterator,
    S: SortKeys<I::Item>,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.materialize();
        match &mut self.state {
            SortState::Sorted(items) => items.next(),
            SortState::Pending(_) | SortState::Resort(_) => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.state {
            SortState::Pending(source) => source.size_hint(),
            SortState::Resort(items) => (items.len(), Some(items.len())),
            SortState::Sorted(items) => items.size_hint(),
        }
    }
}

impl<I, S> std::fmt::Debug for OrderedSequence<I, S>
where
    I: Iterator,
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sorted = matches!(self.state, SortState::Sorted(_));
        f.debug_struct("OrderedSequence")
            .field("sorted", &sorted)
            .field("keys", &self.keys)
            .finish()
    }
}

/// Orders `source` ascending by `key`.
pub fn order_by<I, F, K>(source: I, key: F) -> OrderedSequence<I::IntoIter, OrderKey<F, K>>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> K,
    K: Ord,
{
    order_by_with(source, key, Natural, Dir::Asc)
}

/// Orders `source` descending by `key`.
pub fn order_by_desc<I, F, K>(source: I, key: F) -> OrderedSequence<I::IntoIter, OrderKey<F, K>>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> K,
    K: Ord,
{
    order_by_with(source, key, Natural, Dir::Desc)
}

/// Orders `source` by `key` with an explicit comparer and direction.
pub fn order_by_with<I, F, K, C>(
    source: I,
    key: F,
    comparer: C,
    dir: Dir,
) -> OrderedSequence<I::IntoIter, OrderKey<F, K, C>>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> K,
    C: Comparer<K>,
{
    OrderedSequence::new(source.into_iter(), OrderKey::new(key, comparer, dir))
}

/// Stably sorts a buffer by a key chain.
fn sort_stable<T, S: SortKeys<T>>(items: Vec<T>, keys: &mut S) -> Vec<T> {
    let columns = keys.extract(&items);
    let order = merge_sort((0..items.len()).collect(), |a, b| {
        keys.compare(&columns, a, b)
    });
    trace!(
        elements = items.len(),
        keys = keys.key_count(),
        "materialized sort buffer"
    );

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|position| slots[position].take())
        .collect()
}

/// Bottom-up merge sort of element positions.
///
/// Takes from the right run only when strictly less, which keeps equal
/// elements in input order. Never panics, even for inconsistent comparers.
fn merge_sort<F>(order: Vec<usize>, mut compare: F) -> Vec<usize>
where
    F: FnMut(usize, usize) -> Ordering,
{
    let len = order.len();
    let mut src = order;
    let mut dst = vec![0; len];
    let mut width = 1;

    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut i, mut j, mut k) = (start, mid, start);

            while i < mid && j < end {
                if compare(src[j], src[i]) == Ordering::Less {
                    dst[k] = src[j];
                    j += 1;
                } else {
                    dst[k] = src[i];
                    i += 1;
                }
                k += 1;
            }
            dst[k..k + (mid - i)].copy_from_slice(&src[i..mid]);
            dst[j..end].copy_from_slice(&src[j..end]);

            start = end;
        }
        std::mem::swap(&mut src, &mut dst);
        width *= 2;
    }
    src
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::{IgnoreAsciiCase, PartialNatural};
    use std::cell::Cell;

    #[test]
    fn dir_apply() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Asc.apply(Ordering::Greater), Ordering::Greater);
        assert_eq!(Dir::Asc.apply(Ordering::Equal), Ordering::Equal);

        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Greater), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
    }

    #[test]
    fn order_key_compares_materialized_column() {
        let mut key = OrderKey::new(|s: &&str| s.len(), Natural, Dir::Desc);
        assert_eq!(key.dir(), Dir::Desc);
        assert_eq!(SortKeys::<&str>::key_count(&key), 1);

        let items = ["a", "abc", "ab"];
        let column = SortKeys::<&str>::extract(&mut key, &items);
        assert_eq!(column, vec![1, 3, 2]);
        assert_eq!(
            SortKeys::<&str>::compare(&key, &column, 0, 1),
            Ordering::Greater
        );
        assert_eq!(SortKeys::<&str>::compare(&key, &column, 1, 2), Ordering::Less);
    }

    #[test]
    fn merge_sort_matches_std_stable_sort() {
        let values = [5, 3, 9, 3, 1, 5, 0, 9, 2, 3, 7];
        let order = merge_sort((0..values.len()).collect(), |a, b| values[a].cmp(&values[b]));

        let mut expected: Vec<usize> = (0..values.len()).collect();
        expected.sort_by_key(|&i| values[i]);
        assert_eq!(order, expected);
    }

    #[test]
    fn merge_sort_handles_tiny_inputs() {
        assert!(merge_sort(Vec::new(), |_, _| Ordering::Equal).is_empty());
        assert_eq!(merge_sort(vec![0], |_, _| Ordering::Less), vec![0]);
    }

    #[test]
    fn inconsistent_comparer_does_not_panic() {
        let flip = Cell::new(false);
        let sorted: Vec<i32> = order_by_with(
            vec![4, 1, 3, 2, 5, 0],
            |x| *x,
            |_: &i32, _: &i32| {
                flip.set(!flip.get());
                if flip.get() {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            },
            Dir::Asc,
        )
        .collect();

        let mut check = sorted.clone();
        check.sort();
        assert_eq!(check, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn order_by_is_stable() {
        let items = vec![(1, "b"), (1, "a"), (2, "a")];

        let by_first: Vec<_> = order_by(items.clone(), |p| p.0).collect();
        assert_eq!(by_first, vec![(1, "b"), (1, "a"), (2, "a")]);

        let chained: Vec<_> = order_by(items, |p| p.0).then_by(|p| p.1).collect();
        assert_eq!(chained, vec![(1, "a"), (1, "b"), (2, "a")]);
    }

    #[test]
    fn then_by_never_overrides_primary() {
        let items = vec![(2, "a"), (1, "z"), (1, "b")];
        let sorted: Vec<_> = order_by(items, |p| p.0).then_by(|p| p.1).collect();
        assert_eq!(sorted, vec![(1, "b"), (1, "z"), (2, "a")]);
    }

    #[test]
    fn descending_applies_to_one_key_only() {
        let items = vec![("Seafood", 10), ("Beverages", 5), ("Seafood", 30), ("Beverages", 18)];
        let sorted: Vec<_> = order_by(items, |p| p.0).then_by_desc(|p| p.1).collect();
        assert_eq!(
            sorted,
            vec![("Beverages", 18), ("Beverages", 5), ("Seafood", 30), ("Seafood", 10)]
        );
    }

    #[test]
    fn descending_keeps_ties_in_input_order() {
        let items = vec![(1, 'a'), (2, 'b'), (1, 'c'), (2, 'd')];
        let sorted: Vec<_> = order_by_desc(items, |p| p.0).collect();
        assert_eq!(sorted, vec![(2, 'b'), (2, 'd'), (1, 'a'), (1, 'c')]);
    }

    #[test]
    fn custom_comparer() {
        let words = ["aPPLE", "AbAcUs", "bRaNcH", "BlUeBeRrY", "ClOvEr", "cHeRry"];
        let sorted: Vec<_> = order_by_with(words, |w| *w, IgnoreAsciiCase, Dir::Asc).collect();
        assert_eq!(
            sorted,
            vec!["AbAcUs", "aPPLE", "BlUeBeRrY", "bRaNcH", "cHeRry", "ClOvEr"]
        );
    }

    #[test]
    fn partial_keys_sort_descending() {
        let doubles = [1.7, 2.3, 1.9, 4.1, 2.9];
        let sorted: Vec<f64> = order_by_with(doubles, |d| *d, PartialNatural, Dir::Desc).collect();
        assert_eq!(sorted, vec![4.1, 2.9, 2.3, 1.9, 1.7]);
    }

    #[test]
    fn keys_are_extracted_once_per_element() {
        let calls = Cell::new(0);
        let sorted: Vec<i32> = order_by(vec![3, 1, 2, 5, 4], |x| {
            calls.set(calls.get() + 1);
            *x
        })
        .collect();

        assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn source_is_not_pulled_until_first_next() {
        let pulled = Cell::new(0);
        let source = (0..4).inspect(|_| pulled.set(pulled.get() + 1));

        let mut ordered = order_by_desc(source, |x| *x);
        assert_eq!(pulled.get(), 0);

        assert_eq!(ordered.next(), Some(3));
        assert_eq!(pulled.get(), 4);
        assert_eq!(ordered.size_hint(), (3, Some(3)));
    }

    #[test]
    fn then_by_after_partial_consumption_resorts_remainder() {
        let items = vec![(1, 'c'), (2, 'b'), (2, 'a'), (1, 'a')];
        let mut ordered = order_by(items, |p| p.0);
        assert_eq!(ordered.next(), Some((1, 'c')));

        let rest: Vec<_> = ordered.then_by(|p| p.1).collect();
        assert_eq!(rest, vec![(1, 'a'), (2, 'a'), (2, 'b')]);
    }

    #[test]
    fn resort_waits_for_next_pull() {
        let calls = Cell::new(0);
        let mut ordered = order_by(vec![(2, 'b'), (1, 'z'), (2, 'a'), (1, 'y')], |p| p.0);
        assert_eq!(ordered.next(), Some((1, 'z')));

        let mut extended = ordered
            .then_by(|p| {
                calls.set(calls.get() + 1);
                p.1
            })
            .then_by_desc(|p| p.0);
        assert_eq!(calls.get(), 0);
        assert_eq!(extended.size_hint(), (3, Some(3)));

        assert_eq!(extended.next(), Some((1, 'y')));
        assert_eq!(calls.get(), 3);
        assert_eq!(extended.collect::<Vec<_>>(), vec![(2, 'a'), (2, 'b')]);
    }

    #[test]
    fn key_count_spans_chain() {
        let keys = ThenBy {
            primary: ThenBy {
                primary: OrderKey::<_, i32, _>::new(|p: &(i32, i32)| p.0, Natural, Dir::Asc),
                secondary: OrderKey::<_, i32, _>::new(|p: &(i32, i32)| p.1, Natural, Dir::Desc),
            },
            secondary: OrderKey::<_, i32, _>::new(|p: &(i32, i32)| p.0 + p.1, Natural, Dir::Asc),
        };
        assert_eq!(SortKeys::<(i32, i32)>::key_count(&keys), 3);
    }

    #[test]
    fn empty_source() {
        let sorted: Vec<i32> = order_by(Vec::<i32>::new(), |x| *x).then_by_desc(|x| *x).collect();
        assert!(sorted.is_empty());
    }
}
