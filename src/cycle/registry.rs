//! Cycle registry
//!
//! Collection management for the cycles an administrator runs: create,
//! rename, archive, delete, and pick the active one. No cross-cycle
//! invariants beyond id uniqueness; cycles never share members or months.

use serde::{Deserialize, Serialize};

use crate::cycle::engine::Rejection;
use crate::cycle::model::{Cycle, CycleId};

/// The full set of cycles plus the one currently being administered.
/// This is the root value the presentation layer persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleRegistry {
    cycles: Vec<Cycle>,
    active_cycle: Option<CycleId>,
}

impl CycleRegistry {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cycles: Vec::new(),
            active_cycle: None,
        }
    }

    /// All cycles, in creation order.
    #[must_use]
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Number of cycles held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// Whether no cycles exist yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Look up a cycle by id.
    #[must_use]
    pub fn get(&self, id: CycleId) -> Option<&Cycle> {
        self.cycles.iter().find(|c| c.id == id)
    }

    /// Find a cycle by display name (exact match), for CLI convenience.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Cycle> {
        self.cycles.iter().find(|c| c.name == name)
    }

    /// The cycle currently being administered.
    #[must_use]
    pub fn active(&self) -> Option<&Cycle> {
        self.active_cycle.and_then(|id| self.get(id))
    }

    /// Make a held cycle the active one. Returns false for unknown ids.
    pub fn set_active(&mut self, id: CycleId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active_cycle = Some(id);
        true
    }

    /// Add a cycle and make it active, returning its id.
    pub fn add(&mut self, cycle: Cycle) -> CycleId {
        let id = cycle.id;
        self.cycles.push(cycle);
        self.active_cycle = Some(id);
        id
    }

    /// Swap in a new value for the cycle with the same id. Engine and
    /// tracker operations produce whole replacement values; this is the
    /// single point where they land. Unknown ids are ignored.
    pub fn replace(&mut self, cycle: Cycle) {
        if let Some(slot) = self.cycles.iter_mut().find(|c| c.id == cycle.id) {
            *slot = cycle;
        }
    }

    /// Rename a cycle. Empty and all-whitespace names are refused.
    pub fn rename(&mut self, id: CycleId, name: &str) -> Result<(), Rejection> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Rejection::EmptyName);
        }
        if let Some(cycle) = self.cycles.iter_mut().find(|c| c.id == id) {
            cycle.name = trimmed.to_string();
        }
        Ok(())
    }

    /// Soft-disable a completed cycle. Unknown ids are ignored.
    pub fn archive(&mut self, id: CycleId) {
        if let Some(cycle) = self.cycles.iter_mut().find(|c| c.id == id) {
            cycle.archived = true;
        }
    }

    /// Delete a cycle outright. If it was active, the first remaining
    /// cycle becomes active. Returns whether anything was removed.
    pub fn remove(&mut self, id: CycleId) -> bool {
        let before = self.cycles.len();
        self.cycles.retain(|c| c.id != id);
        let removed = self.cycles.len() != before;
        if removed && self.active_cycle == Some(id) {
            self.active_cycle = self.cycles.first().map(|c| c.id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::make_test_cycle;

    #[test]
    fn test_add_makes_cycle_active() {
        let mut registry = CycleRegistry::new();
        let id = registry.add(make_test_cycle(&["Alice", "Bob"], 1000.0));
        assert_eq!(registry.active().unwrap().id, id);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_replace_swaps_whole_value() {
        let mut registry = CycleRegistry::new();
        let id = registry.add(make_test_cycle(&["Alice", "Bob"], 1000.0));

        let mut updated = registry.get(id).unwrap().clone();
        updated.savings_fund = 400.0;
        registry.replace(updated);

        assert_eq!(registry.get(id).unwrap().savings_fund, 400.0);
    }

    #[test]
    fn test_replace_unknown_id_is_noop() {
        let mut registry = CycleRegistry::new();
        registry.add(make_test_cycle(&["Alice", "Bob"], 1000.0));
        let before = registry.clone();

        registry.replace(make_test_cycle(&["Zed"], 50.0));
        assert_eq!(registry, before);
    }

    #[test]
    fn test_rename_rejects_empty_name() {
        let mut registry = CycleRegistry::new();
        let id = registry.add(make_test_cycle(&["Alice", "Bob"], 1000.0));

        assert_eq!(registry.rename(id, "   "), Err(Rejection::EmptyName));
        let renamed = registry.rename(id, "  Helping Hand  ");
        assert_eq!(renamed, Ok(()));
        assert_eq!(registry.get(id).unwrap().name, "Helping Hand");
    }

    #[test]
    fn test_archive_sets_flag() {
        let mut registry = CycleRegistry::new();
        let id = registry.add(make_test_cycle(&["Alice", "Bob"], 1000.0));
        registry.archive(id);
        assert!(registry.get(id).unwrap().archived);
    }

    #[test]
    fn test_remove_active_cycle_falls_back_to_first() {
        let mut registry = CycleRegistry::new();
        let first = registry.add(make_test_cycle(&["Alice", "Bob"], 1000.0));
        let second = registry.add(make_test_cycle(&["Carol", "Dave"], 500.0));
        assert_eq!(registry.active().unwrap().id, second);

        assert!(registry.remove(second));
        assert_eq!(registry.active().unwrap().id, first);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_unknown_id_returns_false() {
        let mut registry = CycleRegistry::new();
        registry.add(make_test_cycle(&["Alice", "Bob"], 1000.0));
        assert!(!registry.remove(CycleId::new()));
    }
}
