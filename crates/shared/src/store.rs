use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::category::Category;
use crate::error::{PinError, Result};
use crate::models::{Pin, PinPatch, Position};
use crate::persist::{KeyValueStore, PinRepository};

/// Source of creation timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// Most recent first.
    #[default]
    Recent,
    /// Grouped in [`Category::ALL`] order, most recent first within a group.
    ByCategory,
}

/// Conjunction of a text search and a category set.
#[derive(Debug, Clone, PartialEq)]
pub struct PinFilter {
    pub query: String,
    pub active: BTreeSet<Category>,
    pub order: ListOrder,
}

impl Default for PinFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            active: Category::ALL.into_iter().collect(),
            order: ListOrder::Recent,
        }
    }
}

impl PinFilter {
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn only(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.active = categories.into_iter().collect();
        self
    }

    pub fn order(mut self, order: ListOrder) -> Self {
        self.order = order;
        self
    }

    /// Flip one category in or out of the active set.
    pub fn toggle_category(&mut self, category: Category) {
        if !self.active.remove(&category) {
            self.active.insert(category);
        }
    }

    pub fn matches(&self, pin: &Pin) -> bool {
        self.active.contains(&pin.category())
            && pin.matches_text(&self.query.trim().to_lowercase())
    }
}

/// Owns the canonical pin list, the selected pin id and the repository that
/// persists them.
pub struct PinStore<S> {
    repo: PinRepository<S>,
    pins: Vec<Pin>,
    selected: Option<String>,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore> PinStore<S> {
    /// Load whatever the repository holds. Malformed data starts empty.
    pub fn open(repo: PinRepository<S>) -> Self {
        let pins = repo.load();
        Self {
            repo,
            pins,
            selected: None,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn repository(&self) -> &PinRepository<S> {
        &self.repo
    }

    /// Pins in insertion order.
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&Pin> {
        self.get(self.selected.as_deref()?)
    }

    /// Select `id`. A stale id clears the selection and reports
    /// [`PinError::NotFound`].
    pub fn select(&mut self, id: &str) -> Result<&Pin> {
        match self.pins.iter().position(|p| p.id == id) {
            Some(index) => {
                self.selected = Some(id.to_string());
                Ok(&self.pins[index])
            }
            None => {
                self.selected = None;
                Err(PinError::NotFound(id.to_string()))
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn create(
        &mut self,
        position: Position,
        title: &str,
        description: &str,
        category: Category,
    ) -> Result<Pin> {
        let title = validate_title(title)?;
        let pin = Pin {
            id: Uuid::new_v4().to_string(),
            position,
            title,
            description: description.to_string(),
            category: Some(category.as_str().to_string()),
            created_at: self
                .clock
                .now()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            is_completed: Some(false),
        };
        tracing::debug!(id = %pin.id, x = position.x, y = position.y, "Created pin");
        self.pins.push(pin.clone());
        self.selected = Some(pin.id.clone());
        self.persist();
        Ok(pin)
    }

    /// Merge `patch` into pin `id`. The pin stays selected.
    pub fn update(&mut self, id: &str, patch: PinPatch) -> Result<Pin> {
        let Some(index) = self.pins.iter().position(|p| p.id == id) else {
            if self.selected.as_deref() == Some(id) {
                self.selected = None;
            }
            return Err(PinError::NotFound(id.to_string()));
        };
        let mut patch = patch;
        if let Some(title) = patch.title.take() {
            patch.title = Some(validate_title(&title)?);
        }
        patch.apply(&mut self.pins[index]);
        let pin = self.pins[index].clone();
        self.selected = Some(pin.id.clone());
        self.persist();
        Ok(pin)
    }

    /// Remove pin `id`; absent ids are ignored. Returns whether a pin was
    /// removed.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        let before = self.pins.len();
        self.pins.retain(|p| p.id != id);
        if self.pins.len() == before {
            return false;
        }
        tracing::debug!(id, remaining = self.pins.len(), "Deleted pin");
        self.persist();
        true
    }

    pub fn toggle_completion(&mut self, id: &str) -> Result<Pin> {
        let pin = self
            .pins
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PinError::NotFound(id.to_string()))?;
        pin.is_completed = Some(!pin.is_completed());
        let pin = pin.clone();
        self.persist();
        Ok(pin)
    }

    /// Drop every pin and the storage key.
    pub fn clear(&mut self) {
        self.pins.clear();
        self.selected = None;
        self.persist();
    }

    pub fn list(&self, filter: &PinFilter) -> Vec<&Pin> {
        let mut entries: Vec<(usize, Option<DateTime<Utc>>, &Pin)> = self
            .pins
            .iter()
            .enumerate()
            .filter(|(_, pin)| filter.matches(pin))
            .map(|(index, pin)| (index, parse_created_at(&pin.created_at), pin))
            .collect();
        // Later insertions win ties; unparseable timestamps sort oldest.
        entries.sort_by(|a, b| {
            let by_group = match filter.order {
                ListOrder::ByCategory => a.2.category().cmp(&b.2.category()),
                ListOrder::Recent => std::cmp::Ordering::Equal,
            };
            by_group.then(b.1.cmp(&a.1)).then(b.0.cmp(&a.0))
        });
        entries.into_iter().map(|(_, _, pin)| pin).collect()
    }

    /// Filtered pins split into non-empty category groups.
    pub fn group_by_category(&self, filter: &PinFilter) -> Vec<(Category, Vec<&Pin>)> {
        let filter = filter.clone().order(ListOrder::ByCategory);
        let mut groups: Vec<(Category, Vec<&Pin>)> = Vec::new();
        for pin in self.list(&filter) {
            let category = pin.category();
            match groups.last_mut() {
                Some((current, members)) if *current == category => members.push(pin),
                _ => groups.push((category, vec![pin])),
            }
        }
        groups
    }

    /// A non-empty list is saved; a list emptied by a mutation removes the
    /// key so stale pins do not come back on reload.
    fn persist(&mut self) {
        let result = if self.pins.is_empty() {
            self.repo.clear()
        } else {
            self.repo.save(&self.pins)
        };
        if let Err(e) = result {
            tracing::warn!(key = %self.repo.key(), error = %e, "Failed to persist pins");
        }
    }
}

fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(PinError::Validation("title must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::persist::MemoryStore;

    /// Advances one second per call.
    struct StepClock {
        next: Rc<Cell<i64>>,
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            let secs = self.next.get();
            self.next.set(secs + 1);
            Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
        }
    }

    /// Always the same instant.
    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.timestamp_opt(1_700_000_000, 0).unwrap()
        }
    }

    fn store(key: &str) -> PinStore<MemoryStore> {
        PinStore::open(PinRepository::new(MemoryStore::new(), key)).with_clock(StepClock {
            next: Rc::new(Cell::new(0)),
        })
    }

    fn stored(store: &PinStore<MemoryStore>) -> Option<serde_json::Value> {
        let key = store.repository().key();
        store
            .repository()
            .store()
            .get(key)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[test]
    fn test_create_update_delete_scenario() {
        let mut store = store("pins");
        assert!(stored(&store).is_none());

        let camp = Category::parse("camp").unwrap();
        let pin = store
            .create(Position::new(50.0, 50.0), "Camp Site", "", camp)
            .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(pin.category.as_deref(), Some("camp"));
        assert!(!pin.is_completed());
        assert_eq!(store.selected_id(), Some(pin.id.as_str()));
        assert_eq!(stored(&store).unwrap().as_array().unwrap().len(), 1);

        let updated = store
            .update(&pin.id, PinPatch::default().title("Main Camp"))
            .unwrap();
        assert_eq!(updated.title, "Main Camp");
        assert_eq!(updated.description, "");
        assert_eq!(updated.category(), Category::Camp);
        assert_eq!(updated.created_at, pin.created_at);
        assert_eq!(stored(&store).unwrap()[0]["title"], "Main Camp");

        assert!(store.delete(&pin.id));
        assert!(store.is_empty());
        assert_eq!(store.selected_id(), None);
        // Emptied by a mutation: key removed rather than left stale.
        assert!(stored(&store).is_none());
    }

    #[test]
    fn test_opening_empty_store_never_writes() {
        let store = store("pins");
        assert!(store.is_empty());
        assert!(stored(&store).is_none());
    }

    #[test]
    fn test_open_malformed_storage_starts_empty() {
        let repo = PinRepository::new(MemoryStore::new().with_entry("pins", "]]"), "pins");
        let store = PinStore::open(repo);
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let mut store = store("pins");
        for title in ["", "   ", "\n\t"] {
            let result = store.create(Position::new(1.0, 1.0), title, "", Category::Default);
            assert!(matches!(result, Err(PinError::Validation(_))));
        }
        assert!(store.is_empty());
        assert!(stored(&store).is_none());
    }

    #[test]
    fn test_create_trims_title() {
        let mut store = store("pins");
        let pin = store
            .create(Position::new(1.0, 1.0), "  Well  ", "water", Category::Location)
            .unwrap();
        assert_eq!(pin.title, "Well");
    }

    #[test]
    fn test_ids_are_unique_within_same_instant() {
        let mut store =
            PinStore::open(PinRepository::new(MemoryStore::new(), "pins")).with_clock(FixedClock);
        let ids: BTreeSet<String> = (0..100)
            .map(|i| {
                store
                    .create(Position::new(1.0, 1.0), &format!("p{i}"), "", Category::Default)
                    .unwrap()
                    .id
            })
            .collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_created_at_is_iso_8601() {
        let mut store =
            PinStore::open(PinRepository::new(MemoryStore::new(), "pins")).with_clock(FixedClock);
        let pin = store
            .create(Position::new(1.0, 1.0), "a", "", Category::Default)
            .unwrap();
        assert_eq!(pin.created_at, "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn test_update_missing_pin_clears_stale_selection() {
        let mut store = store("pins");
        let pin = store
            .create(Position::new(1.0, 1.0), "a", "", Category::Default)
            .unwrap();
        store.delete(&pin.id);
        store.selected = Some(pin.id.clone());
        let result = store.update(&pin.id, PinPatch::default().title("b"));
        assert!(matches!(result, Err(PinError::NotFound(_))));
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn test_update_rejects_blank_title_without_changes() {
        let mut store = store("pins");
        let pin = store
            .create(Position::new(1.0, 1.0), "keep", "", Category::Default)
            .unwrap();
        let result = store.update(
            &pin.id,
            PinPatch::default().title(" ").position(Position::new(9.0, 9.0)),
        );
        assert!(matches!(result, Err(PinError::Validation(_))));
        let current = store.get(&pin.id).unwrap();
        assert_eq!(current.title, "keep");
        assert_eq!(current.position, Position::new(1.0, 1.0));
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let mut store = store("pins");
        let pin = store
            .create(Position::new(1.0, 1.0), "a", "", Category::Default)
            .unwrap();
        assert!(!store.delete("missing"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected_id(), Some(pin.id.as_str()));
    }

    #[test]
    fn test_delete_other_pin_keeps_selection() {
        let mut store = store("pins");
        let a = store
            .create(Position::new(1.0, 1.0), "a", "", Category::Default)
            .unwrap();
        let b = store
            .create(Position::new(2.0, 2.0), "b", "", Category::Default)
            .unwrap();
        store.delete(&a.id);
        assert_eq!(store.selected_id(), Some(b.id.as_str()));
        assert_eq!(stored(&store).unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_select_missing_clears_selection() {
        let mut store = store("pins");
        store
            .create(Position::new(1.0, 1.0), "a", "", Category::Default)
            .unwrap();
        assert!(matches!(store.select("nope"), Err(PinError::NotFound(_))));
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn test_toggle_completion_twice_restores() {
        let mut store = store("pins");
        let pin = store
            .create(Position::new(1.0, 1.0), "a", "", Category::Default)
            .unwrap();
        assert!(store.toggle_completion(&pin.id).unwrap().is_completed());
        assert_eq!(stored(&store).unwrap()[0]["isCompleted"], true);
        assert!(!store.toggle_completion(&pin.id).unwrap().is_completed());
        assert_eq!(stored(&store).unwrap()[0]["isCompleted"], false);
        assert!(matches!(
            store.toggle_completion("missing"),
            Err(PinError::NotFound(_))
        ));
    }

    #[test]
    fn test_toggle_legacy_pin_without_flag() {
        let raw = r#"[{"id":"old","position":{"x":1,"y":2},"title":"Old","createdAt":"2020-01-01T00:00:00Z"}]"#;
        let mut store =
            PinStore::open(PinRepository::new(MemoryStore::new().with_entry("pins", raw), "pins"));
        assert!(store.toggle_completion("old").unwrap().is_completed());
        assert!(!store.toggle_completion("old").unwrap().is_completed());
    }

    #[test]
    fn test_filter_is_conjunction() {
        let mut store = store("pins");
        let fort = store
            .create(Position::new(1.0, 1.0), "Fort", "", Category::Landmark)
            .unwrap();
        store
            .create(Position::new(2.0, 2.0), "Fortified Camp", "", Category::Camp)
            .unwrap();

        let filter = PinFilter::default()
            .query("fort")
            .only([Category::Landmark]);
        let result = store.list(&filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, fort.id);

        assert_eq!(store.list(&PinFilter::default().query("FORT")).len(), 2);
        assert!(store.list(&PinFilter::default().only([])).is_empty());
    }

    #[test]
    fn test_search_matches_description() {
        let mut store = store("pins");
        store
            .create(Position::new(1.0, 1.0), "Shack", "Hidden Stash inside", Category::Default)
            .unwrap();
        assert_eq!(store.list(&PinFilter::default().query("  stash ")).len(), 1);
        assert!(store.list(&PinFilter::default().query("gold")).is_empty());
    }

    #[test]
    fn test_unknown_category_filters_as_default() {
        let raw = r#"[
            {"id":"a","position":{"x":1,"y":2},"title":"A","category":"treasure","createdAt":"2020-01-01T00:00:00Z"},
            {"id":"b","position":{"x":1,"y":2},"title":"B","category":null,"createdAt":"2020-01-02T00:00:00Z"},
            {"id":"c","position":{"x":1,"y":2},"title":"C","createdAt":"2020-01-03T00:00:00Z"},
            {"id":"d","position":{"x":1,"y":2},"title":"D","category":"camp","createdAt":"2020-01-04T00:00:00Z"}
        ]"#;
        let store =
            PinStore::open(PinRepository::new(MemoryStore::new().with_entry("pins", raw), "pins"));
        let defaults = store.list(&PinFilter::default().only([Category::Default]));
        let ids: Vec<&str> = defaults.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
        // Stored record is untouched.
        assert_eq!(store.get("a").unwrap().category.as_deref(), Some("treasure"));
    }

    #[test]
    fn test_list_is_most_recent_first() {
        let mut store = store("pins");
        for title in ["first", "second", "third"] {
            store
                .create(Position::new(1.0, 1.0), title, "", Category::Default)
                .unwrap();
        }
        let titles: Vec<&str> = store
            .list(&PinFilter::default())
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, ["third", "second", "first"]);
    }

    #[test]
    fn test_same_timestamp_breaks_ties_by_insertion() {
        let mut store =
            PinStore::open(PinRepository::new(MemoryStore::new(), "pins")).with_clock(FixedClock);
        for title in ["a", "b", "c"] {
            store
                .create(Position::new(1.0, 1.0), title, "", Category::Default)
                .unwrap();
        }
        let titles: Vec<&str> = store
            .list(&PinFilter::default())
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, ["c", "b", "a"]);
    }

    #[test]
    fn test_group_by_category_keeps_recency_within_groups() {
        let mut store = store("pins");
        let specs = [
            ("camp 1", Category::Camp),
            ("landmark 1", Category::Landmark),
            ("camp 2", Category::Camp),
            ("default 1", Category::Default),
            ("landmark 2", Category::Landmark),
        ];
        for (title, category) in specs {
            store
                .create(Position::new(1.0, 1.0), title, "", category)
                .unwrap();
        }
        let groups = store.group_by_category(&PinFilter::default());
        let shape: Vec<(Category, Vec<&str>)> = groups
            .iter()
            .map(|(c, pins)| (*c, pins.iter().map(|p| p.title.as_str()).collect()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (Category::Default, vec!["default 1"]),
                (Category::Landmark, vec!["landmark 2", "landmark 1"]),
                (Category::Camp, vec!["camp 2", "camp 1"]),
            ]
        );

        let flat: Vec<&str> = store
            .list(&PinFilter::default().order(ListOrder::ByCategory))
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(
            flat,
            ["default 1", "landmark 2", "landmark 1", "camp 2", "camp 1"]
        );
    }

    #[test]
    fn test_toggle_category_in_filter() {
        let mut filter = PinFilter::default();
        assert_eq!(filter.active.len(), Category::ALL.len());
        filter.toggle_category(Category::Camp);
        assert!(!filter.active.contains(&Category::Camp));
        filter.toggle_category(Category::Camp);
        assert!(filter.active.contains(&Category::Camp));
    }

    #[test]
    fn test_clear_removes_key() {
        let mut store = store("pins");
        store
            .create(Position::new(1.0, 1.0), "a", "", Category::Default)
            .unwrap();
        store.clear();
        assert!(store.is_empty());
        assert!(stored(&store).is_none());
    }

    #[test]
    fn test_reopen_sees_persisted_pins() {
        let mut store = store("pins");
        let pin = store
            .create(Position::new(12.5, 87.5), "Well", "fresh", Category::Location)
            .unwrap();
        let raw = store.repository().store().get("pins").unwrap().unwrap();
        let reopened =
            PinStore::open(PinRepository::new(MemoryStore::new().with_entry("pins", &raw), "pins"));
        assert_eq!(reopened.pins(), &[pin]);
    }
}
