use std::collections::{HashSet, VecDeque};

use serde_json::Value;

use super::{RecordStore, StoreError};

/// Record holding `{ appearance }` before grid appearance got its own key
pub const LEGACY_GRID_KEY: &str = "grid";

/// Independently persisted slices of the studio state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Settings,
    GridLayout,
    GridAppearance,
    AnimationControls,
    Preview,
    MenuAlignment,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Settings,
        Section::GridLayout,
        Section::GridAppearance,
        Section::AnimationControls,
        Section::Preview,
        Section::MenuAlignment,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Section::Settings => "settings",
            Section::GridLayout => "grid_layout",
            Section::GridAppearance => "grid_appearance",
            Section::AnimationControls => "animation_controls",
            Section::Preview => "preview",
            Section::MenuAlignment => "menu_window_alignment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistRequest {
    Save(Section),
    Delete(Section),
    Load(Section),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersistEvent {
    Saved(Section),
    Deleted(Section),
    /// A stored value was merged into memory
    Updated(Section),
    /// The section may render now
    LoadComplete(Section),
    Failed { section: Section, message: String },
}

/// Read and write one section of in-memory state as JSON
pub trait SectionState {
    fn section_value(&self, section: Section) -> Result<Value, serde_json::Error>;
    fn merge_section(&mut self, section: Section, value: &Value) -> Result<(), serde_json::Error>;
}

/// Copy the top-level keys of `incoming` that `target` already has
pub fn merge_known_keys(target: &mut Value, incoming: &Value) {
    let (Some(target), Some(incoming)) = (target.as_object_mut(), incoming.as_object()) else {
        return;
    };
    for (key, value) in incoming {
        if let Some(slot) = target.get_mut(key) {
            *slot = value.clone();
        }
    }
}

/// Queues persistence requests and resolves them on the next `process` pass
pub struct PersistenceBridge {
    store: Box<dyn RecordStore>,
    pending: VecDeque<PersistRequest>,
    loaded: HashSet<Section>,
}

impl PersistenceBridge {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self {
            store,
            pending: VecDeque::new(),
            loaded: HashSet::new(),
        }
    }

    pub fn request(&mut self, request: PersistRequest) {
        self.pending.push_back(request);
    }

    pub fn request_load_all(&mut self) {
        for section in Section::ALL {
            self.request(PersistRequest::Load(section));
        }
    }

    pub fn is_loaded(&self, section: Section) -> bool {
        self.loaded.contains(&section)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Resolve every queued request against `state`
    pub fn process(&mut self, state: &mut impl SectionState) -> Vec<PersistEvent> {
        let mut events = Vec::new();
        while let Some(request) = self.pending.pop_front() {
            match request {
                PersistRequest::Save(section) => {
                    events.push(self.save(section, &*state).unwrap_or_else(|e| failed(section, e)));
                }
                PersistRequest::Delete(section) => {
                    events.push(match self.store.delete(section.key()) {
                        Ok(()) => PersistEvent::Deleted(section),
                        Err(e) => failed(section, e),
                    });
                }
                PersistRequest::Load(section) => {
                    match self.load(section, state) {
                        Ok(true) => events.push(PersistEvent::Updated(section)),
                        Ok(false) => {}
                        Err(e) => events.push(failed(section, e)),
                    }
                    // Even a failed load lets the section render with defaults
                    self.loaded.insert(section);
                    events.push(PersistEvent::LoadComplete(section));
                }
            }
        }
        events
    }

    fn save(&mut self, section: Section, state: &impl SectionState) -> Result<PersistEvent, StoreError> {
        let value = state.section_value(section).map_err(|source| StoreError::Convert {
            key: section.key().to_string(),
            source,
        })?;
        self.store.set(section.key(), value)?;
        tracing::debug!(key = section.key(), "record saved");
        Ok(PersistEvent::Saved(section))
    }

    fn load(&mut self, section: Section, state: &mut impl SectionState) -> Result<bool, StoreError> {
        let value = match self.store.get(section.key()) {
            Some(value) => value,
            None if section == Section::GridAppearance => match self.migrate_legacy_grid()? {
                Some(value) => value,
                None => return Ok(false),
            },
            None => return Ok(false),
        };
        state.merge_section(section, &value).map_err(|source| StoreError::Convert {
            key: section.key().to_string(),
            source,
        })?;
        Ok(true)
    }

    /// Move `grid.appearance` into its own record
    fn migrate_legacy_grid(&mut self) -> Result<Option<Value>, StoreError> {
        let Some(appearance) = self
            .store
            .get(LEGACY_GRID_KEY)
            .and_then(|grid| grid.get("appearance").cloned())
        else {
            return Ok(None);
        };
        self.store.set(Section::GridAppearance.key(), appearance.clone())?;
        self.store.delete(LEGACY_GRID_KEY)?;
        tracing::info!("migrated legacy grid record");
        Ok(Some(appearance))
    }
}

fn failed(section: Section, error: StoreError) -> PersistEvent {
    tracing::warn!(key = section.key(), "persistence failed: {error}");
    PersistEvent::Failed {
        section,
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use serde_json::json;

    #[derive(Default)]
    struct Fake {
        settings: Value,
    }

    impl SectionState for Fake {
        fn section_value(&self, _section: Section) -> Result<Value, serde_json::Error> {
            Ok(self.settings.clone())
        }

        fn merge_section(&mut self, _section: Section, value: &Value) -> Result<(), serde_json::Error> {
            merge_known_keys(&mut self.settings, value);
            Ok(())
        }
    }

    fn fake() -> Fake {
        Fake {
            settings: json!({"theme": "Retro", "pixelated": true}),
        }
    }

    #[test]
    fn test_merge_ignores_unknown_keys() {
        let mut target = json!({"a": 1, "b": 2});
        merge_known_keys(&mut target, &json!({"b": 3, "c": 4}));
        assert_eq!(target, json!({"a": 1, "b": 3}));
    }

    #[test]
    fn test_requests_wait_for_process() {
        let mut bridge = PersistenceBridge::new(Box::new(MemoryStore::new()));
        let mut state = fake();
        bridge.request(PersistRequest::Load(Section::Settings));
        assert!(!bridge.is_loaded(Section::Settings));

        let events = bridge.process(&mut state);
        assert_eq!(events, vec![PersistEvent::LoadComplete(Section::Settings)]);
        assert!(bridge.is_loaded(Section::Settings));
        assert!(!bridge.has_pending());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let mut bridge = PersistenceBridge::new(Box::new(MemoryStore::new()));
        let mut state = fake();
        state.settings["theme"] = json!("Vivid");
        bridge.request(PersistRequest::Save(Section::Settings));
        bridge.process(&mut state);

        let mut fresh = fake();
        bridge.request(PersistRequest::Load(Section::Settings));
        let events = bridge.process(&mut fresh);
        assert_eq!(
            events,
            vec![PersistEvent::Updated(Section::Settings), PersistEvent::LoadComplete(Section::Settings)]
        );
        assert_eq!(fresh.settings["theme"], "Vivid");
    }

    #[test]
    fn test_delete_reverts_to_defaults_on_next_load() {
        let mut store = MemoryStore::new();
        store.set("settings", json!({"theme": "Light"})).unwrap();
        let mut bridge = PersistenceBridge::new(Box::new(store));
        bridge.request(PersistRequest::Delete(Section::Settings));
        bridge.request(PersistRequest::Load(Section::Settings));
        let mut state = fake();
        bridge.process(&mut state);
        assert_eq!(state.settings["theme"], "Retro");
    }

    #[test]
    fn test_legacy_grid_record_migrates() {
        let mut store = MemoryStore::new();
        store
            .set(LEGACY_GRID_KEY, json!({"appearance": {"theme": "Jetblack"}}))
            .unwrap();
        let mut bridge = PersistenceBridge::new(Box::new(store));
        let mut state = fake();
        bridge.request(PersistRequest::Load(Section::GridAppearance));
        let events = bridge.process(&mut state);
        assert_eq!(events[0], PersistEvent::Updated(Section::GridAppearance));
        assert_eq!(state.settings["theme"], "Jetblack");

        // The migrated record now lives under its own key
        let mut again = fake();
        bridge.request(PersistRequest::Load(Section::GridAppearance));
        bridge.process(&mut again);
        assert_eq!(again.settings["theme"], "Jetblack");
    }
}
