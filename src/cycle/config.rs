//! Cycle seed configuration
//!
//! Parses `tanda.toml` into a validated seed from which a new cycle is
//! built: the founding group, the standard contribution amount, and the
//! joining rules.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::cycle::model::{Cycle, Member, RuleType};

/// A founding member in the seed file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberSeed {
    /// Display name, unique within the group.
    pub name: String,
    /// Avatar reference; a placeholder is generated when omitted.
    #[serde(default)]
    pub avatar_url: String,
}

/// Top-level seed configuration parsed from `tanda.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleSeed {
    /// Display name of the new cycle.
    pub name: String,
    /// Fixed per-period contribution amount.
    #[serde(default = "default_contribution_amount")]
    pub contribution_amount: f64,
    /// Fee charged to members joining mid-cycle.
    #[serde(default = "default_joining_fee")]
    pub joining_fee: f64,
    /// Joining-rule mode.
    #[serde(default = "default_rule_type")]
    pub rule_type: RuleType,
    /// The founding group.
    #[serde(rename = "member")]
    pub members: Vec<MemberSeed>,
}

const fn default_contribution_amount() -> f64 {
    1000.0
}

const fn default_joining_fee() -> f64 {
    1000.0
}

const fn default_rule_type() -> RuleType {
    RuleType::Strict
}

impl CycleSeed {
    /// Parse a seed file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse seed content from a string.
    pub fn parse(content: &str) -> Result<Self> {
        let seed: Self = toml::from_str(content).context("Failed to parse tanda.toml")?;
        seed.validate()?;
        Ok(seed)
    }

    /// The stock starter group used when no seed file is given.
    #[must_use]
    pub fn default_group(name: &str) -> Self {
        let members = ["Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace"]
            .iter()
            .map(|n| MemberSeed {
                name: (*n).to_string(),
                avatar_url: String::new(),
            })
            .collect();
        Self {
            name: name.to_string(),
            contribution_amount: default_contribution_amount(),
            joining_fee: default_joining_fee(),
            rule_type: default_rule_type(),
            members,
        }
    }

    /// Build a fresh cycle from this seed: one month per founding member,
    /// everything pending, collection at month 1.
    #[must_use]
    pub fn build(&self) -> Cycle {
        let members = self
            .members
            .iter()
            .map(|m| {
                let avatar = if m.avatar_url.is_empty() {
                    placeholder_avatar(&m.name)
                } else {
                    m.avatar_url.clone()
                };
                Member::founding(&m.name, &avatar)
            })
            .collect();
        Cycle::new(
            &self.name,
            members,
            self.contribution_amount,
            self.joining_fee,
            self.rule_type,
        )
    }

    /// Validate the seed.
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Cycle name cannot be empty");
        }
        if self.members.is_empty() {
            bail!("A cycle needs at least one founding member");
        }

        let mut seen = HashSet::new();
        for member in &self.members {
            if member.name.trim().is_empty() {
                bail!("Member name cannot be empty");
            }
            if !seen.insert(&member.name) {
                bail!("Duplicate member name: '{}'", member.name);
            }
        }

        if !self.contribution_amount.is_finite() || self.contribution_amount <= 0.0 {
            bail!(
                "Contribution amount must be a positive number, got {}",
                self.contribution_amount
            );
        }
        if !self.joining_fee.is_finite() || self.joining_fee < 0.0 {
            bail!("Joining fee cannot be negative, got {}", self.joining_fee);
        }

        Ok(())
    }
}

/// Deterministic placeholder avatar reference derived from the name.
fn placeholder_avatar(name: &str) -> String {
    format!("https://picsum.photos/seed/{}/100", name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_SEED: &str = r#"
name = "Helping Hand"
contribution_amount = 500.0
joining_fee = 250.0
rule_type = "flexible"

[[member]]
name = "Alice"
avatar_url = "avatar://alice"

[[member]]
name = "Bob"
"#;

    #[test]
    fn test_parse_full_seed() {
        let seed = CycleSeed::parse(GOOD_SEED).unwrap();
        assert_eq!(seed.name, "Helping Hand");
        assert_eq!(seed.contribution_amount, 500.0);
        assert_eq!(seed.joining_fee, 250.0);
        assert_eq!(seed.rule_type, RuleType::Flexible);
        assert_eq!(seed.members.len(), 2);
    }

    #[test]
    fn test_defaults_apply_when_omitted() {
        let seed = CycleSeed::parse(
            r#"
name = "Minimal"

[[member]]
name = "Alice"
"#,
        )
        .unwrap();
        assert_eq!(seed.contribution_amount, 1000.0);
        assert_eq!(seed.joining_fee, 1000.0);
        assert_eq!(seed.rule_type, RuleType::Strict);
    }

    #[test]
    fn test_duplicate_member_names_rejected() {
        let result = CycleSeed::parse(
            r#"
name = "Dupes"

[[member]]
name = "Alice"

[[member]]
name = "Alice"
"#,
        );
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Duplicate"));
    }

    #[test]
    fn test_empty_member_name_rejected() {
        let result = CycleSeed::parse(
            r#"
name = "Blank"

[[member]]
name = "  "
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_no_members_rejected() {
        let result = CycleSeed::parse("name = \"Empty\"\nmember = []\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_joining_fee_rejected() {
        let result = CycleSeed::parse(
            r#"
name = "Bad Fee"
joining_fee = -5.0

[[member]]
name = "Alice"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_non_positive_contribution_rejected() {
        let result = CycleSeed::parse(
            r#"
name = "Bad Amount"
contribution_amount = 0.0

[[member]]
name = "Alice"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_build_produces_month_per_member() {
        let seed = CycleSeed::parse(GOOD_SEED).unwrap();
        let cycle = seed.build();
        assert_eq!(cycle.members.len(), 2);
        assert_eq!(cycle.months.len(), 2);
        assert_eq!(cycle.members[0].avatar_url, "avatar://alice");
        // Omitted avatar gets a deterministic placeholder
        assert!(cycle.members[1].avatar_url.contains("bob"));
    }

    #[test]
    fn test_default_group_matches_stock_roster() {
        let seed = CycleSeed::default_group("My First Trust Circle");
        assert_eq!(seed.members.len(), 7);
        seed.validate().unwrap();
        let cycle = seed.build();
        assert_eq!(cycle.cycle_length, 7);
        assert_eq!(cycle.contribution_amount, 1000.0);
    }
}
