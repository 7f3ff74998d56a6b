//! Partition table comparison
//!
//! Ordering is significant: extents are compared position by position
//! because order reflects the on-disk partition table.

use crate::domain::entities::{PartitionExtent, PartitionMismatch};

/// Compares decoded extents against the expected ones
///
/// Returns every difference: a count mismatch (if any) followed by each
/// differing position in the common prefix. An empty result means an exact
/// match.
pub fn compare_partitions(
    expected: &[PartitionExtent],
    actual: &[PartitionExtent],
) -> Vec<PartitionMismatch> {
    let mut mismatches = Vec::new();

    if expected.len() != actual.len() {
        mismatches.push(PartitionMismatch::CountDiffers {
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    for (index, (e, a)) in expected.iter().zip(actual).enumerate() {
        if e != a {
            mismatches.push(PartitionMismatch::ExtentDiffers {
                index,
                expected: *e,
                actual: *a,
            });
        }
    }

    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extents(pairs: &[(u64, u64)]) -> Vec<PartitionExtent> {
        pairs
            .iter()
            .map(|&(start, length)| PartitionExtent::new(start, length))
            .collect()
    }

    #[test]
    fn test_exact_match() {
        let table = extents(&[(63, 20417)]);
        assert!(compare_partitions(&table, &table).is_empty());
    }

    #[test]
    fn test_swapped_entries_mismatch() {
        let expected = extents(&[(63, 1000), (2048, 500)]);
        let actual = extents(&[(2048, 500), (63, 1000)]);
        let mismatches = compare_partitions(&expected, &actual);
        assert_eq!(mismatches.len(), 2);
        assert!(matches!(
            mismatches[0],
            PartitionMismatch::ExtentDiffers { index: 0, .. }
        ));
    }

    #[test]
    fn test_count_mismatch_also_reports_prefix() {
        let expected = extents(&[(63, 1000), (2048, 500)]);
        let actual = extents(&[(64, 1000)]);
        let mismatches = compare_partitions(&expected, &actual);
        assert_eq!(
            mismatches,
            vec![
                PartitionMismatch::CountDiffers {
                    expected: 2,
                    actual: 1
                },
                PartitionMismatch::ExtentDiffers {
                    index: 0,
                    expected: PartitionExtent::new(63, 1000),
                    actual: PartitionExtent::new(64, 1000),
                },
            ]
        );
    }

    #[test]
    fn test_both_empty_match() {
        assert!(compare_partitions(&[], &[]).is_empty());
    }
}
