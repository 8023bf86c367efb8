use super::CandidateContact;
use crate::model::contact::ExternalId;
use std::collections::BTreeSet;

/// Working set of candidates chosen for import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSelection {
    candidates: Vec<CandidateContact>,
    selected: BTreeSet<ExternalId>,
}

impl ImportSelection {
    /// Creates an empty selection. Repeated external ids keep their first
    /// occurrence.
    pub fn new(candidates: Vec<CandidateContact>) -> Self {
        let mut seen = BTreeSet::new();
        let candidates = candidates
            .into_iter()
            .filter(|candidate| seen.insert(candidate.external_id))
            .collect();

        Self {
            candidates,
            selected: BTreeSet::new(),
        }
    }

    pub fn candidates(&self) -> &[CandidateContact] {
        &self.candidates
    }

    /// Checks or unchecks one candidate.
    ///
    /// Returns `false` when `external_id` is not a listed candidate.
    pub fn toggle(&mut self, external_id: ExternalId, checked: bool) -> bool {
        if !self.contains_candidate(external_id) {
            return false;
        }

        if checked {
            self.selected.insert(external_id);
        } else {
            self.selected.remove(&external_id);
        }
        true
    }

    /// "Select all" checkbox: selects every candidate or clears the set.
    pub fn set_all(&mut self, checked: bool) {
        if checked {
            self.selected = self
                .candidates
                .iter()
                .map(|candidate| candidate.external_id)
                .collect();
        } else {
            self.selected.clear();
        }
    }

    pub fn is_selected(&self, external_id: ExternalId) -> bool {
        self.selected.contains(&external_id)
    }

    /// State of the "select all" checkbox, derived from counts so individual
    /// toggles that complete the set report `true` again.
    pub fn is_all_selected(&self) -> bool {
        !self.candidates.is_empty() && self.selected.len() == self.candidates.len()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected candidates in listing order.
    pub fn selected_candidates(&self) -> Vec<CandidateContact> {
        self.candidates
            .iter()
            .filter(|candidate| self.selected.contains(&candidate.external_id))
            .cloned()
            .collect()
    }

    fn contains_candidate(&self, external_id: ExternalId) -> bool {
        self.candidates
            .iter()
            .any(|candidate| candidate.external_id == external_id)
    }
}
