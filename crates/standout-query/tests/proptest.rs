//! Property-based tests for the query combinators using proptest.

use proptest::prelude::*;
use standout_query::{
    group_join, inner_join, order_by, order_by_desc, sequence_equal, to_lookup, QueryError,
    Sequence,
};

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone)]
struct TestItem {
    group: u8,
    rank: i32,
    name: String,
}

// Small key space so generated items share keys often.
fn test_item_strategy() -> impl Strategy<Value = TestItem> {
    (0u8..5, -3i32..3, "[a-z]{1,4}").prop_map(|(group, rank, name)| TestItem { group, rank, name })
}

fn items_strategy() -> impl Strategy<Value = Vec<TestItem>> {
    prop::collection::vec(test_item_strategy(), 0..40)
}

// ============================================================================
// Quantifiers
// ============================================================================

proptest! {
    /// any(S, P) is the negation of all(S, not P).
    #[test]
    fn any_all_duality(
        values in prop::collection::vec(any::<i32>(), 0..50),
        threshold in any::<i32>(),
    ) {
        // proptest's prelude also exports `any`
        let some = standout_query::any(&values, |v| *v > threshold);
        let none = standout_query::all(&values, |v| *v <= threshold);
        prop_assert_eq!(some, !none);
    }

    /// A sequence equals itself.
    #[test]
    fn sequence_equal_reflexive(values in prop::collection::vec(any::<i64>(), 0..50)) {
        prop_assert!(sequence_equal(&values, &values));
    }

    /// sequence_equal is symmetric and agrees with Vec equality.
    #[test]
    fn sequence_equal_symmetric(
        a in prop::collection::vec(0u8..3, 0..8),
        b in prop::collection::vec(0u8..3, 0..8),
    ) {
        let ab = sequence_equal(&a, &b);
        prop_assert_eq!(ab, sequence_equal(&b, &a));
        prop_assert_eq!(ab, a == b);
    }

    /// contains agrees with slice contains.
    #[test]
    fn contains_agrees_with_slice(
        values in prop::collection::vec(0i32..20, 0..30),
        needle in 0i32..20,
    ) {
        prop_assert_eq!(values.iter().copied().contains(&needle), values.contains(&needle));
    }
}

// ============================================================================
// Element selection
// ============================================================================

proptest! {
    /// first_where and single_where agree with a filtered collection.
    #[test]
    fn selectors_consistent_with_filter(
        values in prop::collection::vec(0i32..10, 0..30),
        target in 0i32..10,
    ) {
        let matches: Vec<i32> = values.iter().copied().filter(|v| *v == target).collect();

        let first = values.iter().copied().first_where(|v| *v == target);
        let single = values.iter().copied().single_where(|v| *v == target);

        match matches.len() {
            0 => {
                prop_assert_eq!(first, Err(QueryError::NoMatch));
                prop_assert_eq!(single, Err(QueryError::NoMatch));
            }
            1 => {
                prop_assert_eq!(first, Ok(target));
                prop_assert_eq!(single, Ok(target));
            }
            _ => {
                prop_assert_eq!(first, Ok(target));
                prop_assert_eq!(single, Err(QueryError::MultipleMatch));
            }
        }
    }

    /// element_at agrees with slice indexing.
    #[test]
    fn element_at_agrees_with_indexing(
        values in prop::collection::vec(any::<i16>(), 0..20),
        index in 0usize..25,
    ) {
        let result = values.iter().copied().element_at(index);
        match values.get(index) {
            Some(v) => prop_assert_eq!(result, Ok(*v)),
            None => prop_assert_eq!(
                result,
                Err(QueryError::IndexOutOfRange { index, len: values.len() })
            ),
        }
    }
}

// ============================================================================
// Ordering
// ============================================================================

proptest! {
    /// order_by produces the same order as std's stable sort.
    #[test]
    fn order_by_matches_stable_sort(items in items_strategy()) {
        let ours: Vec<String> = order_by(items.clone(), |i| i.rank).map(|i| i.name).collect();

        let mut expected = items;
        expected.sort_by_key(|i| i.rank);
        let expected: Vec<String> = expected.into_iter().map(|i| i.name).collect();

        prop_assert_eq!(ours, expected);
    }

    /// A chained sort equals sorting by the tuple of keys.
    #[test]
    fn then_by_matches_tuple_sort(items in items_strategy()) {
        let ours: Vec<(u8, i32, String)> = items
            .iter()
            .order_by(|i| i.group)
            .then_by_desc(|i| i.rank)
            .map(|i| (i.group, i.rank, i.name.clone()))
            .collect();

        let mut expected: Vec<(u8, i32, String)> =
            items.iter().map(|i| (i.group, i.rank, i.name.clone())).collect();
        expected.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        prop_assert_eq!(ours, expected);
    }

    /// Descending order keeps equal keys in input order.
    #[test]
    fn descending_is_stable(items in items_strategy()) {
        let ours: Vec<String> = order_by_desc(items.clone(), |i| i.rank).map(|i| i.name).collect();

        let mut expected = items;
        expected.sort_by(|a, b| b.rank.cmp(&a.rank));
        let expected: Vec<String> = expected.into_iter().map(|i| i.name).collect();

        prop_assert_eq!(ours, expected);
    }

    /// Reversing twice restores the original sequence.
    #[test]
    fn reverse_is_an_involution(values in prop::collection::vec(any::<i32>(), 0..50)) {
        let twice: Vec<i32> = values.iter().copied().reversed().reversed().collect();
        prop_assert_eq!(twice, values);
    }
}

// ============================================================================
// Joins and grouping
// ============================================================================

proptest! {
    /// Inner join yields one row per matching pair.
    #[test]
    fn inner_join_row_count(outer in prop::collection::vec(0u8..6, 0..20), inner in items_strategy()) {
        let rows = inner_join(&outer, &inner, |o| **o, |i| i.group, |_, _| ()).count();

        let expected: usize = outer
            .iter()
            .map(|o| inner.iter().filter(|i| i.group == *o).count())
            .sum();
        prop_assert_eq!(rows, expected);
    }

    /// Group join yields exactly one row per outer element.
    #[test]
    fn group_join_one_row_per_outer(outer in prop::collection::vec(0u8..6, 0..20), inner in items_strategy()) {
        let sizes: Vec<usize> = group_join(&outer, &inner, |o| **o, |i| i.group, |_, g| g.len()).collect();
        prop_assert_eq!(sizes.len(), outer.len());

        for (o, size) in outer.iter().zip(&sizes) {
            prop_assert_eq!(*size, inner.iter().filter(|i| i.group == *o).count());
        }
    }

    /// Grouping partitions the input and keeps element order within groups.
    #[test]
    fn lookup_partitions_input(items in items_strategy()) {
        let lookup = to_lookup(&items, |i| i.group);
        prop_assert_eq!(lookup.element_count(), items.len());

        for group in &lookup {
            let expected: Vec<&str> = items
                .iter()
                .filter(|i| i.group == *group.key())
                .map(|i| i.name.as_str())
                .collect();
            let actual: Vec<&str> = group.items().iter().map(|i| i.name.as_str()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
