//! Lookup of checklist items by id across all checklists of a context.

use std::collections::HashMap;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{SmartChecklist, SmartChecklistItem};

/// Position of an item inside `TrackingContext::checklists`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemLocation {
    pub checklist_index: usize,
    pub item_index: usize,
}

/// Index from item id to its position.
///
/// Built once per context load. Positions are only valid for the checklist
/// slice the index was built from; any structural change to the checklists
/// requires a rebuild.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    items: HashMap<String, ItemLocation>,
}

impl EntityIndex {
    /// Build the index, rejecting item ids that appear more than once.
    pub fn build(checklists: &[SmartChecklist]) -> DomainResult<Self> {
        let mut items = HashMap::new();

        for (checklist_index, checklist) in checklists.iter().enumerate() {
            for (item_index, item) in checklist.items.iter().enumerate() {
                let location = ItemLocation {
                    checklist_index,
                    item_index,
                };
                if items.insert(item.id.clone(), location).is_some() {
                    return Err(DomainError::ValidationFailed(format!(
                        "duplicate checklist item id '{}'",
                        item.id
                    )));
                }
            }
        }

        Ok(Self { items })
    }

    pub fn locate(&self, item_id: &str) -> Option<ItemLocation> {
        self.items.get(item_id).copied()
    }

    /// Like [`locate`](Self::locate) but reports unknown ids as `ItemNotFound`.
    pub fn require(&self, item_id: &str) -> DomainResult<ItemLocation> {
        self.locate(item_id)
            .ok_or_else(|| DomainError::ItemNotFound(item_id.to_string()))
    }

    pub fn get<'a>(
        &self,
        checklists: &'a [SmartChecklist],
        item_id: &str,
    ) -> Option<(&'a SmartChecklist, &'a SmartChecklistItem)> {
        let loc = self.locate(item_id)?;
        let checklist = checklists.get(loc.checklist_index)?;
        let item = checklist.items.get(loc.item_index)?;
        Some((checklist, item))
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ImplementationType, PhaseType};
    use crate::services::checklist_generator::ChecklistGenerator;

    fn session_checklists() -> Vec<SmartChecklist> {
        ChecklistGenerator::new()
            .generate_all(ImplementationType::FullDeployment)
            .unwrap()
    }

    #[test]
    fn test_indexes_every_item() {
        let checklists = session_checklists();
        let index = EntityIndex::build(&checklists).unwrap();
        let total: usize = checklists.iter().map(|c| c.items.len()).sum();
        assert_eq!(index.len(), total);

        for checklist in &checklists {
            for item in &checklist.items {
                let (found_checklist, found_item) = index.get(&checklists, &item.id).unwrap();
                assert_eq!(found_checklist.id, checklist.id);
                assert_eq!(found_item.id, item.id);
            }
        }
    }

    #[test]
    fn test_unknown_item_is_not_found() {
        let index = EntityIndex::build(&session_checklists()).unwrap();
        let err = index.require("nope-99").unwrap_err();
        assert!(matches!(err, DomainError::ItemNotFound(id) if id == "nope-99"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let generator = ChecklistGenerator::new();
        let first = generator
            .generate(ImplementationType::Poc, PhaseType::Deployment)
            .unwrap();
        let second = first.clone();

        let err = EntityIndex::build(&[first, second]).unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[test]
    fn test_empty_index() {
        let index = EntityIndex::build(&[]).unwrap();
        assert!(index.is_empty());
        assert!(!index.contains("pre-01"));
    }
}
