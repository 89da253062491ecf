//! JSONL operation journal
//!
//! Append-only record of every mutation the administrator drives through
//! the engine, one JSON object per line in `.tanda/journal.jsonl`. Written
//! by the presentation layer after an operation commits; the engine itself
//! never touches it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use crate::cycle::model::CycleId;

/// The kind of operation a journal entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalAction {
    /// A new cycle was created.
    CycleCreated,
    /// A member's payment was recorded.
    PaymentRecorded,
    /// A contribution record was administratively corrected.
    ContributionEdited,
    /// A month was finalized and collection advanced.
    MonthFinalized,
    /// A member joined mid-cycle.
    MemberAdded,
    /// A member was removed.
    MemberRemoved,
    /// A member's display details were edited.
    MemberEdited,
    /// The joining-rule mode was switched.
    RuleChanged,
    /// The joining fee was replaced.
    FeeChanged,
    /// The cycle was renamed.
    CycleRenamed,
    /// The cycle was archived.
    CycleArchived,
    /// The cycle was deleted.
    CycleDeleted,
}

impl fmt::Display for JournalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CycleCreated => "cycle created",
            Self::PaymentRecorded => "payment recorded",
            Self::ContributionEdited => "contribution edited",
            Self::MonthFinalized => "month finalized",
            Self::MemberAdded => "member added",
            Self::MemberRemoved => "member removed",
            Self::MemberEdited => "member edited",
            Self::RuleChanged => "rule changed",
            Self::FeeChanged => "fee changed",
            Self::CycleRenamed => "cycle renamed",
            Self::CycleArchived => "cycle archived",
            Self::CycleDeleted => "cycle deleted",
        };
        write!(f, "{s}")
    }
}

/// One committed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Sequence number (1-indexed) within the journal.
    pub seq: u32,
    /// The cycle the operation applied to.
    pub cycle_id: CycleId,
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub action: JournalAction,
    /// Human-readable detail, e.g. who paid what.
    pub detail: String,
    /// Month pointer after the operation.
    pub current_month: u32,
    /// Savings fund level after the operation.
    pub savings_fund: f64,
}

/// Append-only journal writer/reader backed by a JSONL file.
pub struct Journal {
    journal_path: PathBuf,
}

impl Journal {
    /// Open (or create) a journal in the given directory.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create journal directory: {}", dir.display()))?;
        Ok(Self {
            journal_path: dir.join("journal.jsonl"),
        })
    }

    /// Append an entry as one JSON line.
    pub fn append(&self, entry: &JournalEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.journal_path)
            .with_context(|| {
                format!("Failed to open journal: {}", self.journal_path.display())
            })?;

        let json = serde_json::to_string(entry).context("Failed to serialize journal entry")?;
        writeln!(file, "{json}").context("Failed to write to journal")?;
        Ok(())
    }

    /// Read every entry in write order. A journal that does not exist yet
    /// reads as empty.
    pub fn read_all(&self) -> Result<Vec<JournalEntry>> {
        if !self.journal_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.journal_path)
            .with_context(|| format!("Failed to read journal: {}", self.journal_path.display()))?;

        let mut entries = Vec::new();
        for (line_num, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: JournalEntry = serde_json::from_str(line)
                .with_context(|| format!("Failed to parse journal line {}", line_num + 1))?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// The next sequence number to use.
    pub fn next_seq(&self) -> Result<u32> {
        Ok(self.read_all()?.last().map_or(1, |e| e.seq + 1))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.journal_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_entry(seq: u32, cycle_id: CycleId, action: JournalAction) -> JournalEntry {
        JournalEntry {
            seq,
            cycle_id,
            timestamp: Utc::now(),
            action,
            detail: "test".to_string(),
            current_month: 1,
            savings_fund: 0.0,
        }
    }

    #[test]
    fn test_new_journal_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".tanda");
        let journal = Journal::new(&dir).unwrap();
        assert!(dir.exists());
        assert!(journal.path().ends_with("journal.jsonl"));
    }

    #[test]
    fn test_append_then_read_roundtrips_in_order() {
        let temp = TempDir::new().unwrap();
        let journal = Journal::new(temp.path()).unwrap();
        let cycle_id = CycleId::new();

        journal
            .append(&make_entry(1, cycle_id, JournalAction::CycleCreated))
            .unwrap();
        journal
            .append(&make_entry(2, cycle_id, JournalAction::PaymentRecorded))
            .unwrap();

        let entries = journal.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, JournalAction::CycleCreated);
        assert_eq!(entries[1].action, JournalAction::PaymentRecorded);
        assert_eq!(entries[1].seq, 2);
    }

    #[test]
    fn test_missing_journal_reads_empty() {
        let temp = TempDir::new().unwrap();
        let journal = Journal::new(temp.path()).unwrap();
        assert!(journal.read_all().unwrap().is_empty());
        assert_eq!(journal.next_seq().unwrap(), 1);
    }

    #[test]
    fn test_next_seq_follows_last_entry() {
        let temp = TempDir::new().unwrap();
        let journal = Journal::new(temp.path()).unwrap();
        journal
            .append(&make_entry(1, CycleId::new(), JournalAction::CycleCreated))
            .unwrap();
        assert_eq!(journal.next_seq().unwrap(), 2);
    }
}
