use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::{PanelError, Result};
use crate::panel::{PanelCandidate, PanelHandle, SharedPanel};

/// Registry mapping panel names to their shared instances.
///
/// Built once; there is no runtime add or remove. Iteration follows
/// registration order.
#[derive(Debug, Default)]
pub struct PanelRegistry {
    entries: Vec<PanelHandle>,
    index: HashMap<String, usize>,
}

impl PanelRegistry {
    pub fn build<I>(panels: I) -> Result<Self>
    where
        I: IntoIterator<Item = SharedPanel>,
    {
        let mut registry = Self::default();
        for panel in panels {
            registry.insert(PanelHandle::new(panel)?)?;
        }
        Ok(registry)
    }

    /// Register only the candidates carrying `tag`.
    pub fn discover<I>(candidates: I, tag: &str) -> Result<Self>
    where
        I: IntoIterator<Item = PanelCandidate>,
    {
        Self::build(
            candidates
                .into_iter()
                .filter(|candidate| candidate.tag == tag)
                .map(|candidate| candidate.panel),
        )
    }

    fn insert(&mut self, handle: PanelHandle) -> Result<()> {
        match self.index.entry(handle.name().to_string()) {
            Entry::Occupied(entry) => Err(PanelError::DuplicatePanelName(entry.key().clone())),
            Entry::Vacant(vacant) => {
                vacant.insert(self.entries.len());
                self.entries.push(handle);
                Ok(())
            }
        }
    }

    pub fn resolve(&self, name: &str) -> Result<&PanelHandle> {
        self.get(name)
            .ok_or_else(|| PanelError::PanelNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&PanelHandle> {
        self.index.get(name).map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PanelHandle> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(PanelHandle::name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HookLog, ScriptedPanel};

    fn panel(name: &str) -> SharedPanel {
        ScriptedPanel::immediate(name, HookLog::new()).into_shared()
    }

    #[test]
    fn resolves_registered_names() {
        let registry = PanelRegistry::build([panel("PanelA"), panel("PanelB")]).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("PanelB").unwrap().name(), "PanelB");
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["PanelA", "PanelB"]);
    }

    #[test]
    fn unknown_name_is_reported() {
        let registry = PanelRegistry::build([panel("PanelA")]).unwrap();
        let err = registry.resolve("Missing").unwrap_err();
        assert!(matches!(err, PanelError::PanelNotFound(name) if name == "Missing"));
    }

    #[test]
    fn duplicate_names_fail_construction() {
        let err = PanelRegistry::build([panel("PanelA"), panel("PanelA")]).unwrap_err();
        assert!(matches!(err, PanelError::DuplicatePanelName(name) if name == "PanelA"));
    }

    #[test]
    fn discover_filters_by_tag() {
        let registry = PanelRegistry::discover(
            [
                PanelCandidate::new("UIPanel", panel("MainMenuPanel")),
                PanelCandidate::new("Decoration", panel("Background")),
                PanelCandidate::new("UIPanel", panel("SettingsPanel")),
            ],
            "UIPanel",
        )
        .unwrap();
        assert!(registry.contains("MainMenuPanel"));
        assert!(registry.contains("SettingsPanel"));
        assert!(!registry.contains("Background"));
    }
}
