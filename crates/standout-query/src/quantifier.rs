//! Quantifiers and sequence equality.
//!
//! All of these short-circuit: they stop pulling as soon as the answer is
//! known.

use crate::comparer::EqualityComparer;

/// Returns `true` if any element satisfies `predicate`.
///
/// An empty sequence yields `false`.
pub fn any<I, P>(source: I, predicate: P) -> bool
where
    I: IntoIterator,
    P: FnMut(I::Item) -> bool,
{
    source.into_iter().any(predicate)
}

/// Returns `true` if every element satisfies `predicate`.
///
/// An empty sequence yields `true`.
pub fn all<I, P>(source: I, predicate: P) -> bool
where
    I: IntoIterator,
    P: FnMut(I::Item) -> bool,
{
    source.into_iter().all(predicate)
}

/// Returns `true` if the sequence has at least one element.
///
/// Pulls at most one element.
pub fn has_any<I: IntoIterator>(source: I) -> bool {
    source.into_iter().next().is_some()
}

/// Returns `true` if the sequence contains `value`.
pub fn contains<I>(source: I, value: &I::Item) -> bool
where
    I: IntoIterator,
    I::Item: PartialEq,
{
    source.into_iter().any(|item| item == *value)
}

/// Returns `true` if `eq(element, value)` holds for some element.
pub fn contains_by<I, E>(source: I, value: &I::Item, mut eq: E) -> bool
where
    I: IntoIterator,
    E: FnMut(&I::Item, &I::Item) -> bool,
{
    source.into_iter().any(|item| eq(&item, value))
}

/// Returns `true` if some element equals `value` under `comparer`.
pub fn contains_with<I, C>(source: I, value: &I::Item, comparer: C) -> bool
where
    I: IntoIterator,
    C: EqualityComparer<I::Item>,
{
    source.into_iter().any(|item| comparer.equals(&item, value))
}

/// Returns `true` if both sequences have the same length and pairwise equal
/// elements.
///
/// Elements are compared in lockstep; the first unequal pair or length
/// mismatch ends the walk.
pub fn sequence_equal<A, B>(first: A, second: B) -> bool
where
    A: IntoIterator,
    B: IntoIterator<Item = A::Item>,
    A::Item: PartialEq,
{
    sequence_equal_by(first, second, |a, b| a == b)
}

/// [`sequence_equal`] comparing pairs with `eq`.
pub fn sequence_equal_by<A, B, E>(first: A, second: B, mut eq: E) -> bool
where
    A: IntoIterator,
    B: IntoIterator<Item = A::Item>,
    E: FnMut(&A::Item, &A::Item) -> bool,
{
    let mut first = first.into_iter();
    let mut second = second.into_iter();
    loop {
        match (first.next(), second.next()) {
            (Some(a), Some(b)) => {
                if !eq(&a, &b) {
                    return false;
                }
            }
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// [`sequence_equal`] comparing pairs with `comparer`.
pub fn sequence_equal_with<A, B, C>(first: A, second: B, comparer: C) -> bool
where
    A: IntoIterator,
    B: IntoIterator<Item = A::Item>,
    C: EqualityComparer<A::Item>,
{
    sequence_equal_by(first, second, |a, b| comparer.equals(a, b))
}
