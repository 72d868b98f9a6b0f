//! Ranking and filtering rules of the player pipeline.
//!
//! The rules are plain data ([`RankSpec`], [`Expr`]) so they can be printed,
//! serialized and run by any [`crate::engine::TabularEngine`].

use serde::{Deserialize, Serialize};

use crate::engine::{col, lit, Expr, RankSpec, SortOrder, TierTable};
use crate::models::columns;

/// Minimum ratio for a `C` player to be kept.
pub const C_RATIO_THRESHOLD: f64 = 1.15;

/// Minimum ratio for a `D` player to be kept.
pub const D_RATIO_THRESHOLD: f64 = 1.25;

/// Rows must carry these fields to be processed at all.
pub fn clean_rule() -> Expr {
    col(columns::TEAM_POSITION)
        .is_not_null()
        .and(col(columns::SHORT_NAME).is_not_null())
        .and(col(columns::OVERALL).is_not_null())
}

/// Height rank inside each position: A below 10, B below 50, else C.
pub fn height_by_position() -> RankSpec {
    RankSpec {
        partition_by: columns::TEAM_POSITION.to_string(),
        order_by: columns::HEIGHT_CM.to_string(),
        order: SortOrder::Descending,
        output: columns::CAT_HEIGHT_BY_POSITION.to_string(),
        tiers: TierTable::new("C").with_tier(10, "A").with_tier(50, "B"),
    }
}

/// Overall rank inside each nationality: A below 10, B below 20, C below 50, else D.
pub fn player_cat_by_nationality() -> RankSpec {
    RankSpec {
        partition_by: columns::NATIONALITY.to_string(),
        order_by: columns::OVERALL.to_string(),
        order: SortOrder::Descending,
        output: columns::PLAYER_CAT.to_string(),
        tiers: TierTable::new("D")
            .with_tier(10, "A")
            .with_tier(20, "B")
            .with_tier(50, "C"),
    }
}

/// `overall / potential`, null when potential is null or zero.
pub fn potential_vs_overall() -> Expr {
    col(columns::OVERALL).divide(col(columns::POTENTIAL))
}

/// Keep every A and B player, and C/D players whose ratio clears the threshold.
pub fn quality_rule() -> Expr {
    let cat = |label: &str| col(columns::PLAYER_CAT).equal_to(lit(label));
    let ratio_above = |threshold: f64| col(columns::POTENTIAL_VS_OVERALL).gt(lit(threshold));

    cat("A")
        .or(cat("B"))
        .or(cat("C").and(ratio_above(C_RATIO_THRESHOLD)))
        .or(cat("D").and(ratio_above(D_RATIO_THRESHOLD)))
}

/// All rules of one run, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub clean: Expr,
    pub rankings: Vec<RankSpec>,
    pub ratio_column: String,
    pub ratio: Expr,
    pub quality: Expr,
    pub output_columns: Vec<String>,
}

impl RuleSet {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// One line per rule, for console output.
    pub fn describe(&self) -> String {
        let mut lines = vec![format!("clean:    {}", self.clean)];
        for spec in &self.rankings {
            let tiers: Vec<String> = spec
                .tiers
                .tiers
                .iter()
                .map(|t| format!("rank < {} -> {}", t.below, t.label))
                .collect();
            lines.push(format!(
                "rank:     {} = rank({} {:?}) over {} [{}; else {}]",
                spec.output,
                spec.order_by,
                spec.order,
                spec.partition_by,
                tiers.join(", "),
                spec.tiers.default
            ));
        }
        lines.push(format!("derive:   {} = {}", self.ratio_column, self.ratio));
        lines.push(format!("filter:   {}", self.quality));
        lines.push(format!("select:   {}", self.output_columns.join(", ")));
        lines.join("\n")
    }
}

/// The rule set applied by [`crate::transform::pipeline::run`].
pub fn player_rules() -> RuleSet {
    RuleSet {
        clean: clean_rule(),
        rankings: vec![height_by_position(), player_cat_by_nationality()],
        ratio_column: columns::POTENTIAL_VS_OVERALL.to_string(),
        ratio: potential_vs_overall(),
        quality: quality_rule(),
        output_columns: columns::OUTPUT.iter().map(|c| c.to_string()).collect(),
    }
}
