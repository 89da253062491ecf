//! Terminal rendering of cycle state
//!
//! Renders the ledger as human-readable terminal output: a status header,
//! per-member rows with payment dots, month collection progress, and the
//! completion summary once the rotation is done. Pure string builders so
//! rendering stays testable; only `print_*` methods touch stdout.

use colored::Colorize;

use crate::cycle::model::{Cycle, PaymentStatus, RuleType};
use crate::cycle::tracker;

/// Display handler for a single cycle.
pub struct CycleDisplay<'a> {
    cycle: &'a Cycle,
}

impl<'a> CycleDisplay<'a> {
    /// Create a display handler for the given cycle.
    #[must_use]
    pub const fn new(cycle: &'a Cycle) -> Self {
        Self { cycle }
    }

    /// The status header: name, schedule position, rules, fund level.
    #[must_use]
    pub fn render_header(&self) -> String {
        let cycle = self.cycle;
        let position = if cycle.is_complete() {
            "complete".green().bold().to_string()
        } else {
            format!("month {}/{}", cycle.current_month, cycle.cycle_length)
        };
        let archived = if cycle.archived {
            " [archived]".dimmed().to_string()
        } else {
            String::new()
        };

        let mut out = String::new();
        out.push_str(&format!(
            "{} {}{archived}\n",
            "===".bold().cyan(),
            cycle.name.bold().cyan()
        ));
        out.push_str(&format!("{}\n", "─".repeat(50).dimmed()));
        out.push_str(&format!(
            "  {position} · {} rules · joining fee {:.2} · contribution {:.2}\n",
            rule_label(cycle.rule_type),
            cycle.joining_fee,
            cycle.contribution_amount
        ));
        out.push_str(&format!(
            "  {} {}\n",
            "Savings fund:".dimmed(),
            format!("{:.2}", cycle.savings_fund).green()
        ));
        out
    }

    /// One row per member: status dot, name, running total, payout marker.
    #[must_use]
    pub fn render_members(&self) -> String {
        let cycle = self.cycle;
        let mut out = String::new();
        for member in &cycle.members {
            let status = tracker::effective_status(cycle, member.id);
            let total = tracker::total_contributed(cycle, member.id);
            let paid_out = if tracker::has_received_payout(cycle, member.id) {
                " ★ paid out".yellow().to_string()
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  {} {:<20} {:>10.2}  {}{paid_out}\n",
                status_dot(status),
                member.name,
                total,
                member.joining_month_name.dimmed()
            ));
        }
        out
    }

    /// Collection progress line for the current month.
    #[must_use]
    pub fn render_progress(&self) -> String {
        let cycle = self.cycle;
        if cycle.is_complete() {
            return String::new();
        }
        let progress = tracker::month_progress(cycle, cycle.current_month);
        format!(
            "  Collected {:.2} ({}/{} paid) · suggested payout {:.2}\n",
            progress.collected,
            progress.paid,
            progress.total,
            progress.suggested_payout()
        )
    }

    /// Per-member totals once the rotation is complete.
    #[must_use]
    pub fn render_completion(&self) -> String {
        let cycle = self.cycle;
        let mut out = String::new();
        out.push_str(&format!(
            "{}\n",
            "  The circle is complete.".green().bold()
        ));
        for row in tracker::completion_summary(cycle) {
            let premium = if row.joining_fee_paid > 0.0 {
                format!(" (late premium {:.2})", row.joining_fee_paid)
                    .red()
                    .to_string()
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  {:<20} in {:>10.2} · out {:>10.2}{premium}\n",
                row.name, row.total_contributions, row.payout_received
            ));
        }
        out
    }

    /// Print the full status view to stdout.
    pub fn print_status(&self) {
        print!("{}", self.render_header());
        print!("{}", self.render_members());
        if self.cycle.is_complete() {
            print!("{}", self.render_completion());
        } else {
            print!("{}", self.render_progress());
        }
    }
}

/// Render a month's ledger rows (one per contribution), for `history`.
#[must_use]
pub fn render_month(cycle: &Cycle, month_number: u32) -> String {
    let Some(month) = cycle.month(month_number) else {
        return format!("  No month {month_number} in this cycle\n");
    };

    let mut out = String::new();
    let recipient = month
        .payout_member_id
        .and_then(|id| cycle.member(id))
        .map_or_else(|| "unassigned".to_string(), |m| m.name.clone());
    let payout = month
        .payout_amount
        .map_or_else(|| "—".to_string(), |a| format!("{a:.2}"));
    out.push_str(&format!(
        "  {} payout {} to {}\n",
        format!("Month {}", month.month).bold(),
        payout,
        recipient
    ));

    for c in &month.contributions {
        let name = cycle
            .member(c.member_id)
            .map_or_else(|| c.member_id.to_string(), |m| m.name.clone());
        let amount = c
            .amount_paid
            .map_or_else(String::new, |a| format!(" {a:.2}"));
        let date = c
            .payment_date
            .map_or_else(String::new, |d| format!(" on {}", d.format("%Y-%m-%d")));
        out.push_str(&format!(
            "    {} {:<20}{amount}{}\n",
            status_dot(c.status),
            name,
            date.dimmed()
        ));
    }
    out
}

/// The joining-rule vocabulary the CLI accepts, used for output too.
const fn rule_label(rule: RuleType) -> &'static str {
    match rule {
        RuleType::Strict => "strict",
        RuleType::Flexible => "flexible",
    }
}

fn status_dot(status: PaymentStatus) -> String {
    match status {
        PaymentStatus::Paid => "●".green().to_string(),
        PaymentStatus::Pending => "●".yellow().to_string(),
        PaymentStatus::Overdue => "●".red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::tracker::record_payment;
    use crate::testutil::make_test_cycle;

    #[test]
    fn test_header_shows_name_and_position() {
        let cycle = make_test_cycle(&["Alice", "Bob"], 1000.0);
        let header = CycleDisplay::new(&cycle).render_header();
        assert!(header.contains("Test Circle"));
        assert!(header.contains("month 1/2"));
    }

    #[test]
    fn test_header_uses_money_format_and_lowercase_rules() {
        let cycle = make_test_cycle(&["Alice", "Bob"], 1000.0);
        let header = CycleDisplay::new(&cycle).render_header();
        assert!(header.contains("strict rules"));
        assert!(header.contains("joining fee 1000.00"));
        assert!(header.contains("contribution 1000.00"));
        assert!(!header.contains("Strict"));
    }

    #[test]
    fn test_header_marks_complete_cycle() {
        let mut cycle = make_test_cycle(&["Alice", "Bob"], 1000.0);
        cycle.current_month = 3;
        let header = CycleDisplay::new(&cycle).render_header();
        assert!(header.contains("complete"));
    }

    #[test]
    fn test_members_view_lists_every_member() {
        let cycle = make_test_cycle(&["Alice", "Bob", "Charlie"], 1000.0);
        let view = CycleDisplay::new(&cycle).render_members();
        for name in ["Alice", "Bob", "Charlie"] {
            assert!(view.contains(name));
        }
    }

    #[test]
    fn test_progress_reflects_payments() {
        let cycle = make_test_cycle(&["Alice", "Bob"], 100.0);
        let cycle = record_payment(&cycle, 1, cycle.members[0].id, 100.0);
        let progress = CycleDisplay::new(&cycle).render_progress();
        assert!(progress.contains("1/2 paid"));
        assert!(progress.contains("100.00"));
    }

    #[test]
    fn test_month_view_shows_unassigned_payout() {
        let cycle = make_test_cycle(&["Alice", "Bob"], 100.0);
        let view = render_month(&cycle, 1);
        assert!(view.contains("unassigned"));
        assert!(view.contains("Alice"));
    }

    #[test]
    fn test_month_view_handles_missing_month() {
        let cycle = make_test_cycle(&["Alice", "Bob"], 100.0);
        let view = render_month(&cycle, 9);
        assert!(view.contains("No month 9"));
    }

    #[test]
    fn test_completion_summary_lists_totals() {
        let mut cycle = make_test_cycle(&["Alice", "Bob"], 1000.0);
        cycle.current_month = 3;
        let view = CycleDisplay::new(&cycle).render_completion();
        assert!(view.contains("complete"));
        assert!(view.contains("Alice"));
    }
}
