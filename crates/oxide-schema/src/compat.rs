//! Type compatibility between desired and observed columns.
//!
//! Catalogs normalize type synonyms differently (a `BOOLEAN` may come back
//! as `TINYINT(1)`, a `FLOAT` as `DOUBLE`). Columns whose families differ
//! only by such a synonym are treated as equal so that a round trip through
//! the catalog does not register as type drift.

use crate::schema::ColumnDescriptor;
use crate::types::TypeFamily;

type Predicate = fn(&ColumnDescriptor, &ColumnDescriptor) -> bool;

/// A cross-family equivalence. The predicate receives the columns in
/// `(left, right)` orientation.
struct Equivalence {
    left: TypeFamily,
    right: TypeFamily,
    holds: Predicate,
}

const fn always(_: &ColumnDescriptor, _: &ColumnDescriptor) -> bool {
    true
}

const fn same_length(left: &ColumnDescriptor, right: &ColumnDescriptor) -> bool {
    left.length == right.length
}

const fn same_precision(left: &ColumnDescriptor, right: &ColumnDescriptor) -> bool {
    left.length == right.length && left.scale == right.scale
}

const fn single_digit_tinyint(_: &ColumnDescriptor, tinyint: &ColumnDescriptor) -> bool {
    tinyint.length == 1
}

/// Family pairs are distinct and never listed in both orientations.
const EQUIVALENCES: &[Equivalence] = &[
    Equivalence {
        left: TypeFamily::Longvarchar,
        right: TypeFamily::Varchar,
        holds: always,
    },
    Equivalence {
        left: TypeFamily::Binary,
        right: TypeFamily::Varbinary,
        holds: same_length,
    },
    Equivalence {
        left: TypeFamily::Longvarbinary,
        right: TypeFamily::Varbinary,
        holds: same_length,
    },
    Equivalence {
        left: TypeFamily::Float,
        right: TypeFamily::Double,
        holds: always,
    },
    Equivalence {
        left: TypeFamily::Numeric,
        right: TypeFamily::Decimal,
        holds: same_precision,
    },
    Equivalence {
        left: TypeFamily::Boolean,
        right: TypeFamily::Tinyint,
        holds: single_digit_tinyint,
    },
];

/// Returns whether `desired` and `observed` have compatible types.
///
/// The result is symmetric in its arguments.
#[must_use]
pub fn types_equal(desired: &ColumnDescriptor, observed: &ColumnDescriptor) -> bool {
    if desired.family == observed.family {
        return same_family_equal(desired, observed);
    }
    cross_family(desired, observed)
        .or_else(|| cross_family(observed, desired))
        .unwrap_or(false)
}

fn same_family_equal(a: &ColumnDescriptor, b: &ColumnDescriptor) -> bool {
    match a.family {
        TypeFamily::Numeric | TypeFamily::Decimal => same_precision(a, b),
        TypeFamily::Char | TypeFamily::Varchar => same_length(a, b),
        _ => true,
    }
}

fn cross_family(left: &ColumnDescriptor, right: &ColumnDescriptor) -> Option<bool> {
    EQUIVALENCES
        .iter()
        .find(|e| e.left == left.family && e.right == right.family)
        .map(|e| (e.holds)(left, right))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn col(family: TypeFamily, length: u32, scale: u32) -> ColumnDescriptor {
        ColumnDescriptor::new("c", family).precision(length, scale)
    }

    #[test]
    fn test_equivalence_pairs_are_distinct() {
        for (i, a) in EQUIVALENCES.iter().enumerate() {
            for b in &EQUIVALENCES[i + 1..] {
                let same = a.left == b.left && a.right == b.right;
                let mirrored = a.left == b.right && a.right == b.left;
                assert!(!same && !mirrored, "{} / {}", a.left, a.right);
            }
        }
    }

    #[test]
    fn test_same_family_fixed_width() {
        assert!(types_equal(
            &col(TypeFamily::Integer, 10, 0),
            &col(TypeFamily::Integer, 32, 0)
        ));
        assert!(types_equal(
            &col(TypeFamily::Longvarchar, 100, 0),
            &col(TypeFamily::Longvarchar, 200, 0)
        ));
    }

    #[test]
    fn test_same_family_sized() {
        assert!(types_equal(
            &col(TypeFamily::Varchar, 50, 0),
            &col(TypeFamily::Varchar, 50, 0)
        ));
        assert!(!types_equal(
            &col(TypeFamily::Char, 10, 0),
            &col(TypeFamily::Char, 12, 0)
        ));
        assert!(!types_equal(
            &col(TypeFamily::Numeric, 10, 2),
            &col(TypeFamily::Numeric, 10, 4)
        ));
    }

    #[test]
    fn test_boolean_matches_single_digit_tinyint() {
        let boolean = col(TypeFamily::Boolean, 0, 0);
        assert!(types_equal(&boolean, &col(TypeFamily::Tinyint, 1, 0)));
        assert!(types_equal(&col(TypeFamily::Tinyint, 1, 0), &boolean));
        assert!(!types_equal(&boolean, &col(TypeFamily::Tinyint, 3, 0)));
    }

    #[test]
    fn test_cross_family_synonyms() {
        assert!(types_equal(
            &col(TypeFamily::Longvarchar, 0, 0),
            &col(TypeFamily::Varchar, 255, 0)
        ));
        assert!(types_equal(
            &col(TypeFamily::Float, 0, 0),
            &col(TypeFamily::Double, 0, 0)
        ));
        assert!(types_equal(
            &col(TypeFamily::Decimal, 12, 3),
            &col(TypeFamily::Numeric, 12, 3)
        ));
        assert!(!types_equal(
            &col(TypeFamily::Decimal, 12, 3),
            &col(TypeFamily::Numeric, 12, 2)
        ));
        assert!(types_equal(
            &col(TypeFamily::Varbinary, 16, 0),
            &col(TypeFamily::Binary, 16, 0)
        ));
        assert!(!types_equal(
            &col(TypeFamily::Varbinary, 16, 0),
            &col(TypeFamily::Longvarbinary, 32, 0)
        ));
    }

    #[test]
    fn test_unrelated_families() {
        assert!(!types_equal(
            &col(TypeFamily::Integer, 0, 0),
            &col(TypeFamily::Bigint, 0, 0)
        ));
        assert!(!types_equal(
            &col(TypeFamily::Real, 0, 0),
            &col(TypeFamily::Double, 0, 0)
        ));
    }

    fn any_column() -> impl Strategy<Value = ColumnDescriptor> {
        (0..TypeFamily::ALL.len(), 0u32..4, 0u32..3)
            .prop_map(|(i, length, scale)| col(TypeFamily::ALL[i], length, scale))
    }

    proptest! {
        #[test]
        fn prop_types_equal_is_symmetric(a in any_column(), b in any_column()) {
            prop_assert_eq!(types_equal(&a, &b), types_equal(&b, &a));
        }

        #[test]
        fn prop_types_equal_is_reflexive(a in any_column()) {
            prop_assert!(types_equal(&a, &a));
        }
    }
}
