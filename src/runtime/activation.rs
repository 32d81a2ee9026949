use crate::error::Result;
use crate::registry::PanelRegistry;

/// Turns every registered panel on or off, except one always-active panel.
///
/// Used to skip draw work for panels that are fully hidden, e.g. while the
/// whole UI layer is backgrounded. Has no effect on the input lock or any
/// in-flight transition.
#[derive(Debug, Clone, Default)]
pub struct ActiveSet {
    always_active: Option<String>,
}

impl ActiveSet {
    pub fn new(always_active: Option<String>) -> Self {
        Self { always_active }
    }

    pub fn always_active(&self) -> Option<&str> {
        self.always_active.as_deref()
    }

    /// Returns how many panels were toggled.
    pub fn apply(&self, registry: &PanelRegistry, active: bool) -> Result<usize> {
        let mut toggled = 0;
        for handle in registry.iter() {
            if self.always_active() == Some(handle.name()) {
                continue;
            }
            handle.lock()?.set_active(active);
            toggled += 1;
        }
        Ok(toggled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HookLog, ScriptedPanel};

    #[test]
    fn always_active_panel_is_skipped() {
        let log = HookLog::new();
        let registry = PanelRegistry::build([
            ScriptedPanel::immediate("MainMenuPanel", log.clone()).into_shared(),
            ScriptedPanel::immediate("GameScenePanel", log.clone()).into_shared(),
            ScriptedPanel::immediate("SettingsPanel", log).into_shared(),
        ])
        .unwrap();
        let set = ActiveSet::new(Some("GameScenePanel".into()));

        assert_eq!(set.apply(&registry, false).unwrap(), 2);
        let active: Vec<_> = registry
            .iter()
            .map(|handle| (handle.name().to_string(), handle.lock().unwrap().is_active()))
            .collect();
        assert_eq!(
            active,
            vec![
                ("MainMenuPanel".to_string(), false),
                ("GameScenePanel".to_string(), true),
                ("SettingsPanel".to_string(), false),
            ]
        );

        assert_eq!(set.apply(&registry, true).unwrap(), 2);
        assert!(registry.iter().all(|h| h.lock().unwrap().is_active()));
    }

    #[test]
    fn without_exemption_every_panel_toggles() {
        let registry = PanelRegistry::build([
            ScriptedPanel::immediate("PanelA", HookLog::new()).into_shared(),
        ])
        .unwrap();
        assert_eq!(ActiveSet::default().apply(&registry, false).unwrap(), 1);
    }
}
