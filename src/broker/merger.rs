use crate::record::Identified;
use std::collections::HashSet;

/// Combines per-partition result lists into one identity-deduplicated list.
pub struct ResultMerger;

impl ResultMerger {
    /// Merges lists given in partition priority order.
    ///
    /// The first list is taken whole and in its returned order. Every later
    /// record is appended only if no accumulated record shares its identity,
    /// so the first partition to report a record wins.
    pub fn merge<T, I>(results_by_partition: I) -> Vec<T>
    where
        T: Identified,
        I: IntoIterator<Item = Vec<T>>,
    {
        let mut lists = results_by_partition.into_iter();
        let mut merged: Vec<T> = lists.next().unwrap_or_default();
        let mut seen: HashSet<String> = merged
            .iter()
            .map(|record| record.identity().to_owned())
            .collect();

        for list in lists {
            for record in list {
                if seen.insert(record.identity().to_owned()) {
                    merged.push(record);
                }
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Referral;

    fn referrals(ids: &[&str]) -> Vec<Referral> {
        ids.iter().map(|id| Referral::new(*id)).collect()
    }

    fn ids(records: &[Referral]) -> Vec<&str> {
        records.iter().map(|r| r.referral_id.as_str()).collect()
    }

    #[test]
    fn later_partitions_only_add_novel_records() {
        let merged = ResultMerger::merge(vec![
            referrals(&["R1", "R2"]),
            referrals(&["R2", "R3"]),
            referrals(&[]),
        ]);
        assert_eq!(ids(&merged), vec!["R1", "R2", "R3"]);
    }

    #[test]
    fn identical_sets_collapse_to_first_partition_order() {
        let merged = ResultMerger::merge(vec![
            referrals(&["A", "B"]),
            referrals(&["B", "A"]),
            referrals(&["A"]),
        ]);
        assert_eq!(ids(&merged), vec!["A", "B"]);
    }

    #[test]
    fn first_reported_copy_wins() {
        let retail = vec![Referral::new("R1").with_status("OPEN")];
        let commercial = vec![
            Referral::new("R1").with_status("CLOSED"),
            Referral::new("R4").with_status("CLOSED"),
        ];
        let merged = ResultMerger::merge(vec![retail, commercial]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].status, "OPEN");
    }

    #[test]
    fn first_list_is_taken_whole() {
        let merged = ResultMerger::merge(vec![referrals(&["R1", "R1"]), referrals(&["R1", "R2", "R2"])]);
        assert_eq!(ids(&merged), vec!["R1", "R1", "R2"]);
    }

    #[test]
    fn no_partitions_merge_to_nothing() {
        let merged: Vec<Referral> = ResultMerger::merge(Vec::<Vec<Referral>>::new());
        assert!(merged.is_empty());
    }
}
