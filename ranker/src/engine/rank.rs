//! Rank-within-partition and tier bucketing.
//!
//! A [`RankSpec`] describes one windowed ranking: rows are grouped by
//! `partition_by`, ranked by `order_by` with standard competition ranking
//! (ties share a rank, the next distinct value skips), and each rank is
//! mapped to a label through a [`TierTable`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{GroupKey, Value};

/// Direction of the ranking order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Rank 1 is the highest value
    #[default]
    Descending,
    /// Rank 1 is the lowest value
    Ascending,
}

/// One bucket: ranks strictly below `below` get `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub below: u64,
    pub label: String,
}

/// Ordered tiers plus the catch-all label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTable {
    pub tiers: Vec<Tier>,
    pub default: String,
}

impl TierTable {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            tiers: Vec::new(),
            default: default.into(),
        }
    }

    pub fn with_tier(mut self, below: u64, label: impl Into<String>) -> Self {
        self.tiers.push(Tier {
            below,
            label: label.into(),
        });
        self
    }

    /// First tier whose bound exceeds `rank`, else the default.
    pub fn label_for(&self, rank: u64) -> &str {
        self.tiers
            .iter()
            .find(|tier| rank < tier.below)
            .map(|tier| tier.label.as_str())
            .unwrap_or(&self.default)
    }

    /// Every label this table can produce, tiers first.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.tiers.iter().map(|t| t.label.as_str()).collect();
        labels.push(&self.default);
        labels
    }
}

/// Parameters of one rank annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankSpec {
    /// Column whose values define the partitions
    pub partition_by: String,
    /// Column ranked inside each partition
    pub order_by: String,
    #[serde(default)]
    pub order: SortOrder,
    /// Name of the label column to add
    pub output: String,
    pub tiers: TierTable,
}

/// Competition rank of each value inside one partition.
///
/// Nulls rank after every non-null value (all sharing that rank). Returns
/// `None` for every position when the partition holds only nulls.
pub fn competition_ranks(values: &[&Value], order: SortOrder) -> Vec<Option<u64>> {
    let mut non_null: Vec<usize> = (0..values.len()).filter(|&i| !values[i].is_null()).collect();
    if non_null.is_empty() {
        return vec![None; values.len()];
    }

    let cmp = |a: &Value, b: &Value| {
        let ordering = a.compare(b).unwrap_or(Ordering::Equal);
        match order {
            SortOrder::Descending => ordering.reverse(),
            SortOrder::Ascending => ordering,
        }
    };
    non_null.sort_by(|&a, &b| cmp(values[a], values[b]));

    let null_rank = non_null.len() as u64 + 1;
    let mut ranks = vec![Some(null_rank); values.len()];
    let mut current = 0u64;
    for (position, &idx) in non_null.iter().enumerate() {
        let tied = position > 0 && cmp(values[non_null[position - 1]], values[idx]) == Ordering::Equal;
        if !tied {
            current = position as u64 + 1;
        }
        ranks[idx] = Some(current);
    }
    ranks
}

/// Tier label for every row, given the partition and order columns.
pub fn rank_labels(partitions: &[&Value], order_values: &[&Value], spec: &RankSpec) -> Vec<String> {
    let mut groups: HashMap<GroupKey, Vec<usize>> = HashMap::new();
    for (row, key) in partitions.iter().enumerate() {
        groups.entry(key.group_key()).or_default().push(row);
    }

    let mut labels = vec![spec.tiers.default.clone(); partitions.len()];
    for rows in groups.values() {
        let values: Vec<&Value> = rows.iter().map(|&r| order_values[r]).collect();
        let ranks = competition_ranks(&values, spec.order);
        for (&row, rank) in rows.iter().zip(ranks) {
            if let Some(rank) = rank {
                labels[row] = spec.tiers.label_for(rank).to_string();
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[Option<i64>]) -> Vec<Value> {
        values.iter().map(|v| Value::from(*v)).collect()
    }

    #[test]
    fn test_competition_rank_with_ties() {
        let values = ints(&[Some(180), Some(190), Some(180), Some(175)]);
        let refs: Vec<&Value> = values.iter().collect();
        let ranks = competition_ranks(&refs, SortOrder::Descending);
        assert_eq!(ranks, vec![Some(2), Some(1), Some(2), Some(4)]);
    }

    #[test]
    fn test_ascending_order() {
        let values = ints(&[Some(3), Some(1), Some(2)]);
        let refs: Vec<&Value> = values.iter().collect();
        assert_eq!(
            competition_ranks(&refs, SortOrder::Ascending),
            vec![Some(3), Some(1), Some(2)]
        );
    }

    #[test]
    fn test_nulls_rank_last() {
        let values = ints(&[None, Some(170), None, Some(185)]);
        let refs: Vec<&Value> = values.iter().collect();
        let ranks = competition_ranks(&refs, SortOrder::Descending);
        assert_eq!(ranks, vec![Some(3), Some(2), Some(3), Some(1)]);
    }

    #[test]
    fn test_all_null_partition_has_no_rank() {
        let values = ints(&[None, None]);
        let refs: Vec<&Value> = values.iter().collect();
        assert_eq!(competition_ranks(&refs, SortOrder::Descending), vec![None, None]);
    }

    #[test]
    fn test_tier_boundaries_are_exclusive() {
        let tiers = TierTable::new("C").with_tier(10, "A").with_tier(50, "B");
        assert_eq!(tiers.label_for(1), "A");
        assert_eq!(tiers.label_for(9), "A");
        assert_eq!(tiers.label_for(10), "B");
        assert_eq!(tiers.label_for(49), "B");
        assert_eq!(tiers.label_for(50), "C");
        assert_eq!(tiers.labels(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_rank_labels_per_partition() {
        let spec = RankSpec {
            partition_by: "team_position".into(),
            order_by: "height_cm".into(),
            order: SortOrder::Descending,
            output: "cat".into(),
            tiers: TierTable::new("Z").with_tier(2, "X").with_tier(3, "Y"),
        };
        let positions: Vec<Value> = vec!["ST".into(), "ST".into(), "GK".into(), "ST".into(), "GK".into()];
        let heights = ints(&[Some(190), Some(185), None, Some(170), None]);
        let p: Vec<&Value> = positions.iter().collect();
        let h: Vec<&Value> = heights.iter().collect();

        let labels = rank_labels(&p, &h, &spec);
        // ST ranks 1,2,3; GK is all null and gets the catch-all
        assert_eq!(labels, vec!["X", "Y", "Z", "Z", "Z"]);
    }
}
