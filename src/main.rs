//! Tanda - rotating savings circle ledger
//!
//! CLI entry point: the presentation layer that drives the pure engine
//! operations, persists the registry as a JSON state file, and journals
//! every committed mutation.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};

use tanda::cycle::config::CycleSeed;
use tanda::cycle::engine::{self, ArrearsPolicy, MemberEdit};
use tanda::cycle::model::{Cycle, MemberId, PaymentStatus, RuleType};
use tanda::cycle::registry::CycleRegistry;
use tanda::cycle::tracker;
use tanda::log::{Journal, JournalAction, JournalEntry};
use tanda::{render_month, CycleDisplay};

/// Rotating savings circle ledger
///
/// Administers trust circles: records contributions, finalizes months with
/// a randomized payout draw, and manages members joining and leaving.
#[derive(Parser, Debug)]
#[command(name = "tanda", version, about)]
struct Cli {
    /// Directory for the state file and journal
    #[arg(long, default_value = ".tanda")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the state file with a first cycle
    Init {
        /// Seed file (tanda.toml); the stock starter group when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Cycle name (overridden by the seed file's name)
        #[arg(long, default_value = "My First Trust Circle")]
        name: String,
    },
    /// Add another cycle and make it active
    NewCycle {
        /// Seed file (tanda.toml); the stock starter group when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Cycle name (overridden by the seed file's name)
        #[arg(long, default_value = "New Circle")]
        name: String,
    },
    /// Show the active cycle
    Status,
    /// Show one month's ledger, or the whole schedule
    History {
        /// Month number; all months when omitted
        month: Option<u32>,
    },
    /// Record a member's payment for the current month
    Pay {
        /// Member name or id
        member: String,
        /// Amount paid; the standard contribution when omitted
        #[arg(long)]
        amount: Option<f64>,
        /// Month number; the current month when omitted
        #[arg(long)]
        month: Option<u32>,
    },
    /// Administratively correct a contribution record
    EditContribution {
        /// Member name or id
        member: String,
        /// Month number
        month: u32,
        /// New status: pending, paid, or overdue
        status: String,
        /// Amount paid (paid status only)
        #[arg(long)]
        amount: Option<f64>,
        /// Payment date, RFC 3339 (paid status only)
        #[arg(long)]
        date: Option<String>,
    },
    /// Finalize the current month: draw the recipient and advance
    Advance {
        /// Payout to disburse; collected minus the savings cut when omitted
        #[arg(long)]
        payout: Option<f64>,
        /// Close the month even with unpaid dues, marking them overdue
        #[arg(long)]
        allow_arrears: bool,
    },
    /// Admit a new member as of the current month
    AddMember {
        /// Display name
        name: String,
        /// Joining premium; the cycle's joining fee when omitted
        #[arg(long)]
        fee: Option<f64>,
        /// Avatar reference
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Remove a member who has not been paid out
    RemoveMember {
        /// Member name or id
        member: String,
    },
    /// Edit a member's display details
    EditMember {
        /// Member name or id
        member: String,
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// New avatar reference
        #[arg(long)]
        avatar: Option<String>,
        /// New joining-period label
        #[arg(long)]
        joining_label: Option<String>,
    },
    /// Replace the joining fee for future members
    SetFee {
        /// New fee, non-negative
        fee: f64,
    },
    /// Switch joining rules: strict or flexible
    SetRule {
        /// "strict" or "flexible"
        rule: String,
    },
    /// Rename the active cycle
    Rename {
        /// New name
        name: String,
    },
    /// Archive the active cycle
    Archive,
    /// Switch the active cycle by name
    Use {
        /// Cycle name
        cycle: String,
    },
    /// Delete a cycle by name
    DeleteCycle {
        /// Cycle name
        cycle: String,
    },
    /// Print the operation journal
    Journal,
}

fn state_path(state_dir: &Path) -> PathBuf {
    state_dir.join("state.json")
}

fn load_registry(state_dir: &Path) -> Result<CycleRegistry> {
    let path = state_path(state_dir);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read state file: {} (run `tanda init`)", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))
}

fn save_registry(state_dir: &Path, registry: &CycleRegistry) -> Result<()> {
    std::fs::create_dir_all(state_dir)
        .with_context(|| format!("Failed to create state directory: {}", state_dir.display()))?;
    let json = serde_json::to_string_pretty(registry).context("Failed to serialize state")?;
    std::fs::write(state_path(state_dir), json).context("Failed to write state file")
}

fn active_cycle(registry: &CycleRegistry) -> Result<Cycle> {
    registry
        .active()
        .cloned()
        .context("No active cycle (run `tanda init` or `tanda use <cycle>`)")
}

/// Payments and corrections may only touch months collection has reached.
/// This is the presentation layer's rule; the tracker itself accepts any
/// existing month.
fn ensure_month_reached(cycle: &Cycle, month: u32) -> Result<()> {
    if month > cycle.current_month {
        bail!(
            "Month {month} has not been reached yet (collection is in month {})",
            cycle.current_month
        );
    }
    Ok(())
}

/// Resolve a member argument as an id first, then as an exact name.
fn resolve_member(cycle: &Cycle, arg: &str) -> Result<MemberId> {
    if let Ok(id) = arg.parse::<MemberId>() {
        if cycle.member(id).is_some() {
            return Ok(id);
        }
    }
    cycle
        .member_by_name(arg)
        .map(|m| m.id)
        .with_context(|| format!("No member '{arg}' in cycle '{}'", cycle.name))
}

fn parse_status(arg: &str) -> Result<PaymentStatus> {
    match arg.to_lowercase().as_str() {
        "pending" => Ok(PaymentStatus::Pending),
        "paid" => Ok(PaymentStatus::Paid),
        "overdue" => Ok(PaymentStatus::Overdue),
        other => bail!("Unknown status '{other}' (expected pending, paid, or overdue)"),
    }
}

fn parse_rule(arg: &str) -> Result<RuleType> {
    match arg.to_lowercase().as_str() {
        "strict" => Ok(RuleType::Strict),
        "flexible" => Ok(RuleType::Flexible),
        other => bail!("Unknown rule '{other}' (expected strict or flexible)"),
    }
}

/// Record a committed mutation in the journal.
fn journal_commit(
    state_dir: &Path,
    cycle: &Cycle,
    action: JournalAction,
    detail: String,
) -> Result<()> {
    let journal = Journal::new(state_dir)?;
    journal.append(&JournalEntry {
        seq: journal.next_seq()?,
        cycle_id: cycle.id,
        timestamp: chrono::Utc::now(),
        action,
        detail,
        current_month: cycle.current_month,
        savings_fund: cycle.savings_fund,
    })
}

fn build_seed(config: Option<&PathBuf>, name: &str) -> Result<CycleSeed> {
    config.map_or_else(
        || Ok(CycleSeed::default_group(name)),
        CycleSeed::from_path,
    )
}

/// Apply an engine operation to the active cycle and commit the result.
fn commit(
    state_dir: &Path,
    registry: &mut CycleRegistry,
    next: Cycle,
    action: JournalAction,
    detail: String,
) -> Result<()> {
    journal_commit(state_dir, &next, action, detail)?;
    registry.replace(next);
    save_registry(state_dir, registry)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let state_dir = cli.state_dir.as_path();

    match cli.command {
        Command::Init { config, name } => {
            if state_path(state_dir).exists() {
                bail!("State file already exists: {}", state_path(state_dir).display());
            }
            let mut registry = CycleRegistry::new();
            let cycle = build_seed(config.as_ref(), &name)?.build();
            let cycle_name = cycle.name.clone();
            registry.add(cycle);
            save_registry(state_dir, &registry)?;
            let created = active_cycle(&registry)?;
            journal_commit(
                state_dir,
                &created,
                JournalAction::CycleCreated,
                format!("created '{cycle_name}' with {} members", created.members.len()),
            )?;
            println!("Created cycle '{cycle_name}'");
        }
        Command::NewCycle { config, name } => {
            let mut registry = load_registry(state_dir)?;
            let cycle = build_seed(config.as_ref(), &name)?.build();
            let cycle_name = cycle.name.clone();
            registry.add(cycle);
            save_registry(state_dir, &registry)?;
            let created = active_cycle(&registry)?;
            journal_commit(
                state_dir,
                &created,
                JournalAction::CycleCreated,
                format!("created '{cycle_name}'"),
            )?;
            println!("Created cycle '{cycle_name}'");
        }
        Command::Status => {
            let registry = load_registry(state_dir)?;
            let cycle = active_cycle(&registry)?;
            CycleDisplay::new(&cycle).print_status();
        }
        Command::History { month } => {
            let registry = load_registry(state_dir)?;
            let cycle = active_cycle(&registry)?;
            match month {
                Some(n) => print!("{}", render_month(&cycle, n)),
                None => {
                    for m in &cycle.months {
                        print!("{}", render_month(&cycle, m.month));
                    }
                }
            }
        }
        Command::Pay { member, amount, month } => {
            let mut registry = load_registry(state_dir)?;
            let cycle = active_cycle(&registry)?;
            let member_id = resolve_member(&cycle, &member)?;
            let amount = amount.unwrap_or(cycle.contribution_amount);
            let month = month.unwrap_or(cycle.current_month);
            ensure_month_reached(&cycle, month)?;
            let next = tracker::record_payment(&cycle, month, member_id, amount);
            let detail = format!("{member} paid {amount:.2} for month {month}");
            commit(state_dir, &mut registry, next, JournalAction::PaymentRecorded, detail)?;
        }
        Command::EditContribution { member, month, status, amount, date } => {
            let mut registry = load_registry(state_dir)?;
            let cycle = active_cycle(&registry)?;
            let member_id = resolve_member(&cycle, &member)?;
            ensure_month_reached(&cycle, month)?;
            let status = parse_status(&status)?;
            let date = date
                .map(|d| {
                    DateTime::parse_from_rfc3339(&d)
                        .map(|d| d.to_utc())
                        .with_context(|| format!("Invalid payment date: {d}"))
                })
                .transpose()?;
            let next = tracker::edit_contribution(&cycle, month, member_id, status, date, amount);
            let detail = format!("{member} month {month} set to {status}");
            commit(state_dir, &mut registry, next, JournalAction::ContributionEdited, detail)?;
        }
        Command::Advance { payout, allow_arrears } => {
            let mut registry = load_registry(state_dir)?;
            let cycle = active_cycle(&registry)?;
            let payout = payout.unwrap_or_else(|| {
                tracker::month_progress(&cycle, cycle.current_month).suggested_payout()
            });
            let policy = if allow_arrears {
                ArrearsPolicy::MarkOverdue
            } else {
                ArrearsPolicy::Refuse
            };
            let month = cycle.current_month;
            let next = engine::advance_to_next_month(&cycle, payout, policy)?;
            let recipient = next
                .month(month)
                .and_then(|m| m.payout_member_id)
                .and_then(|id| next.member(id))
                .map_or_else(|| "nobody (all paid out)".to_string(), |m| m.name.clone());
            println!("Month {month} finalized: payout {payout:.2} to {recipient}");
            if next.is_complete() {
                println!("The circle is complete.");
            }
            let detail = format!("month {month} payout {payout:.2} to {recipient}");
            commit(state_dir, &mut registry, next, JournalAction::MonthFinalized, detail)?;
        }
        Command::AddMember { name, fee, avatar } => {
            let mut registry = load_registry(state_dir)?;
            let cycle = active_cycle(&registry)?;
            // Joining-rule gate lives here, not in the engine
            if cycle.rule_type == RuleType::Strict && cycle.current_month > 1 {
                bail!(
                    "'{}' has strict rules: no joining after month 1 (see `tanda set-rule flexible`)",
                    cycle.name
                );
            }
            let fee = fee.unwrap_or(cycle.joining_fee);
            let next = engine::add_member(&cycle, &name, fee, avatar.as_deref())?;
            let detail = format!("{name} joined in month {} (premium {fee:.2})", cycle.current_month);
            commit(state_dir, &mut registry, next, JournalAction::MemberAdded, detail)?;
        }
        Command::RemoveMember { member } => {
            let mut registry = load_registry(state_dir)?;
            let cycle = active_cycle(&registry)?;
            let member_id = resolve_member(&cycle, &member)?;
            let next = engine::remove_member(&cycle, member_id)?;
            let detail = format!("{member} removed");
            commit(state_dir, &mut registry, next, JournalAction::MemberRemoved, detail)?;
        }
        Command::EditMember { member, name, avatar, joining_label } => {
            let mut registry = load_registry(state_dir)?;
            let cycle = active_cycle(&registry)?;
            let member_id = resolve_member(&cycle, &member)?;
            let edit = MemberEdit {
                name,
                avatar_url: avatar,
                joining_month_name: joining_label,
            };
            let next = engine::edit_member(&cycle, member_id, &edit)?;
            let detail = format!("{member} details edited");
            commit(state_dir, &mut registry, next, JournalAction::MemberEdited, detail)?;
        }
        Command::SetFee { fee } => {
            let mut registry = load_registry(state_dir)?;
            let cycle = active_cycle(&registry)?;
            let next = engine::set_joining_fee(&cycle, fee)?;
            let detail = format!("joining fee set to {fee:.2}");
            commit(state_dir, &mut registry, next, JournalAction::FeeChanged, detail)?;
        }
        Command::SetRule { rule } => {
            let mut registry = load_registry(state_dir)?;
            let cycle = active_cycle(&registry)?;
            let rule = parse_rule(&rule)?;
            let next = engine::set_rule_type(&cycle, rule);
            let detail = format!("rules set to {rule:?}");
            commit(state_dir, &mut registry, next, JournalAction::RuleChanged, detail)?;
        }
        Command::Rename { name } => {
            let mut registry = load_registry(state_dir)?;
            let cycle = active_cycle(&registry)?;
            registry.rename(cycle.id, &name)?;
            save_registry(state_dir, &registry)?;
            let renamed = active_cycle(&registry)?;
            journal_commit(
                state_dir,
                &renamed,
                JournalAction::CycleRenamed,
                format!("renamed to '{}'", renamed.name),
            )?;
        }
        Command::Archive => {
            let mut registry = load_registry(state_dir)?;
            let cycle = active_cycle(&registry)?;
            registry.archive(cycle.id);
            save_registry(state_dir, &registry)?;
            let archived = active_cycle(&registry)?;
            journal_commit(
                state_dir,
                &archived,
                JournalAction::CycleArchived,
                format!("archived '{}'", archived.name),
            )?;
            println!("Archived '{}'", archived.name);
        }
        Command::Use { cycle } => {
            let mut registry = load_registry(state_dir)?;
            let id = registry
                .get_by_name(&cycle)
                .map(|c| c.id)
                .with_context(|| format!("No cycle named '{cycle}'"))?;
            registry.set_active(id);
            save_registry(state_dir, &registry)?;
            println!("Active cycle: '{cycle}'");
        }
        Command::DeleteCycle { cycle } => {
            let mut registry = load_registry(state_dir)?;
            let target = registry
                .get_by_name(&cycle)
                .cloned()
                .with_context(|| format!("No cycle named '{cycle}'"))?;
            registry.remove(target.id);
            save_registry(state_dir, &registry)?;
            journal_commit(
                state_dir,
                &target,
                JournalAction::CycleDeleted,
                format!("deleted '{}'", target.name),
            )?;
            println!("Deleted '{}'", target.name);
        }
        Command::Journal => {
            let registry = load_registry(state_dir)?;
            let journal = Journal::new(state_dir)?;
            for entry in journal.read_all()? {
                let cycle_name = registry
                    .get(entry.cycle_id)
                    .map_or_else(|| entry.cycle_id.to_string(), |c| c.name.clone());
                println!(
                    "{:>4}  {}  {:<22} {}  [{cycle_name}]",
                    entry.seq,
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.action.to_string(),
                    entry.detail,
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanda::cycle::model::Member;

    fn test_cycle() -> Cycle {
        let members = vec![
            Member::founding("Alice", ""),
            Member::founding("Bob", ""),
            Member::founding("Charlie", ""),
        ];
        Cycle::new("Test Circle", members, 1000.0, 1000.0, RuleType::Strict)
    }

    #[test]
    fn test_unreached_month_is_refused_for_payments_and_edits() {
        let mut cycle = test_cycle();
        cycle.current_month = 2;

        let err = ensure_month_reached(&cycle, 5).unwrap_err();
        assert!(err.to_string().contains("Month 5 has not been reached"));
    }

    #[test]
    fn test_current_and_past_months_pass_the_gate() {
        let mut cycle = test_cycle();
        cycle.current_month = 2;

        assert!(ensure_month_reached(&cycle, 1).is_ok());
        assert!(ensure_month_reached(&cycle, 2).is_ok());
    }

    #[test]
    fn test_parse_status_accepts_any_case() {
        assert_eq!(parse_status("PAID").unwrap(), PaymentStatus::Paid);
        assert_eq!(parse_status("pending").unwrap(), PaymentStatus::Pending);
        assert!(parse_status("settled").is_err());
    }

    #[test]
    fn test_parse_rule_rejects_unknown_modes() {
        assert_eq!(parse_rule("flexible").unwrap(), RuleType::Flexible);
        assert!(parse_rule("rigid").is_err());
    }

    #[test]
    fn test_resolve_member_by_name_and_id() {
        let cycle = test_cycle();
        let alice = cycle.members[0].id;

        assert_eq!(resolve_member(&cycle, "Alice").unwrap(), alice);
        assert_eq!(resolve_member(&cycle, &alice.to_string()).unwrap(), alice);
        assert!(resolve_member(&cycle, "Nobody").is_err());
    }
}
