//! Workout store - custom workouts, selection/edit flow, current workout and favorites
//!
//! All state lives in memory and every mutation is written through to the
//! key-value store right away, one key per collection.

mod error;
mod workout;

pub use error::{StoreError, ValidationError};
pub use workout::{Committed, SaveOutcome, Workout, WorkoutId};

use std::collections::HashSet;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::{KeyValueStore, StorageError};
use crate::exercises::Exercise;

pub const WORKOUTS_KEY: &str = "NextTreinoWorkouts";
pub const FAVORITES_KEY: &str = "NextTreinoFavorites";
pub const CURRENT_KEY: &str = "NextTreinoCurrent";

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 50;

/// Workouts shown in the "recent" list
pub const RECENT_LIMIT: usize = 3;

/// Workout being composed, either new (`editing == None`) or an edit of an existing one
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Draft {
    pub name: String,
    pub selection: Vec<Exercise>,
    pub editing: Option<WorkoutId>,
}

impl Draft {
    pub fn is_selected(&self, exercise_id: &str) -> bool {
        self.selection.iter().any(|e| e.id == exercise_id)
    }
}

pub struct WorkoutStore<S: KeyValueStore> {
    storage: S,
    workouts: Vec<Workout>,
    current: Option<Workout>,
    favorites: Vec<Exercise>,
    /// `None` is the idle state, `Some` is composing
    draft: Option<Draft>,
    last_id: i64,
}

impl<S: KeyValueStore> WorkoutStore<S> {
    /// Load persisted state. Unreadable or corrupt values reset that collection to empty.
    pub fn open(storage: S) -> Self {
        let workouts: Vec<Workout> = read_key(&storage, WORKOUTS_KEY).unwrap_or_default();
        let mut favorites: Vec<Exercise> = read_key(&storage, FAVORITES_KEY).unwrap_or_default();
        let stored_current: Option<Workout> = read_key(&storage, CURRENT_KEY);

        let mut seen = HashSet::new();
        favorites.retain(|e| seen.insert(e.id.clone()));

        // Current must point into the collection; take the collection's copy
        let current = stored_current.and_then(|c| {
            let found = workouts.iter().find(|w| w.id == c.id).cloned();
            if found.is_none() {
                warn!("Current workout {} no longer exists, clearing", c.id);
            }
            found
        });

        let last_id = workouts
            .iter()
            .filter_map(|w| w.id.as_millis())
            .max()
            .unwrap_or(0);

        info!(
            "Loaded {} workouts, {} favorites, current: {}",
            workouts.len(),
            favorites.len(),
            current.as_ref().map(|w| w.name.as_str()).unwrap_or("-")
        );

        Self {
            storage,
            workouts,
            current,
            favorites,
            draft: None,
            last_id,
        }
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn get(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| &w.id == id)
    }

    /// Most recently created workouts
    pub fn recent(&self) -> &[Workout] {
        &self.workouts[..self.workouts.len().min(RECENT_LIMIT)]
    }

    pub fn current(&self) -> Option<&Workout> {
        self.current.as_ref()
    }

    pub fn favorites(&self) -> &[Exercise] {
        &self.favorites
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn is_composing(&self) -> bool {
        self.draft.is_some()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // --- Composing ---

    /// Start composing a new workout with an empty selection
    pub fn begin_create(&mut self) {
        self.draft = Some(Draft::default());
    }

    /// Start editing a saved workout. The original stays in the collection until a save commits.
    pub fn begin_edit(&mut self, id: &WorkoutId) -> Result<(), StoreError> {
        let workout = self.get(id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        self.draft = Some(Draft {
            name: workout.name.clone(),
            selection: workout.exercises.clone(),
            editing: Some(id.clone()),
        });
        debug!("Editing workout {}", id);
        Ok(())
    }

    /// Drop the draft. Saved workouts are untouched.
    pub fn cancel_edit(&mut self) {
        if let Some(draft) = self.draft.take() {
            debug!("Discarded draft with {} exercises", draft.selection.len());
        }
    }

    /// Add the exercise if absent, remove it otherwise. Returns whether it is now selected.
    /// Starts a new draft when idle.
    pub fn toggle_selection(&mut self, exercise: &Exercise) -> bool {
        let draft = self.draft.get_or_insert_with(Draft::default);
        match draft.selection.iter().position(|e| e.id == exercise.id) {
            Some(index) => {
                draft.selection.remove(index);
                false
            }
            None => {
                draft.selection.push(exercise.clone());
                true
            }
        }
    }

    /// Remove the exercise at `index` from the selection
    pub fn remove_selected(&mut self, index: usize) -> Option<Exercise> {
        let draft = self.draft.as_mut()?;
        (index < draft.selection.len()).then(|| draft.selection.remove(index))
    }

    /// Put a favorite exercise into the selection.
    /// `None` when it is not a favorite, `Some(false)` when already selected.
    pub fn select_favorite(&mut self, exercise_id: &str) -> Option<bool> {
        let exercise = self.favorites.iter().find(|e| e.id == exercise_id)?.clone();
        let draft = self.draft.get_or_insert_with(Draft::default);
        if draft.is_selected(exercise_id) {
            return Some(false);
        }
        draft.selection.push(exercise);
        Some(true)
    }

    pub fn set_pending_name(&mut self, name: &str) {
        self.draft.get_or_insert_with(Draft::default).name = name.to_string();
    }

    /// Save the current selection under `name`.
    ///
    /// Returns `NameConflict` instead of overwriting when another workout
    /// has the same name; `confirm_replace` finishes that case.
    pub fn save_workout(&mut self, name: &str) -> Result<SaveOutcome, StoreError> {
        let name = self.validate(name)?;

        if let Some(existing) = self.conflicting(&name) {
            info!("Workout named \"{}\" already exists ({})", name, existing);
            if let Some(draft) = self.draft.as_mut() {
                draft.name = name.clone();
            }
            return Ok(SaveOutcome::NameConflict { existing, name });
        }

        self.commit_draft(&name, None).map(SaveOutcome::Saved)
    }

    /// Save after the user agreed to replace the workout holding the same name
    pub fn confirm_replace(&mut self, name: &str) -> Result<Committed<Workout>, StoreError> {
        let name = self.validate(name)?;
        let replaced = self.conflicting(&name);
        self.commit_draft(&name, replaced)
    }

    fn validate(&self, name: &str) -> Result<String, ValidationError> {
        let name = name.trim();
        let len = name.chars().count();
        if len == 0 {
            return Err(ValidationError::EmptyName);
        }
        if len < MIN_NAME_LEN {
            return Err(ValidationError::NameTooShort { min: MIN_NAME_LEN });
        }
        if len > MAX_NAME_LEN {
            return Err(ValidationError::NameTooLong { max: MAX_NAME_LEN });
        }
        match &self.draft {
            Some(draft) if !draft.selection.is_empty() => Ok(name.to_string()),
            _ => Err(ValidationError::EmptySelection),
        }
    }

    /// Other workout with the same case-insensitive name; the one being edited doesn't count
    fn conflicting(&self, name: &str) -> Option<WorkoutId> {
        let editing = self.draft.as_ref().and_then(|d| d.editing.as_ref());
        let lower = name.to_lowercase();
        self.workouts
            .iter()
            .find(|w| Some(&w.id) != editing && w.name.to_lowercase() == lower)
            .map(|w| w.id.clone())
    }

    fn commit_draft(
        &mut self,
        name: &str,
        replaced: Option<WorkoutId>,
    ) -> Result<Committed<Workout>, StoreError> {
        let Some(draft) = self.draft.take() else {
            return Err(ValidationError::EmptySelection.into());
        };

        if let Some(editing) = &draft.editing
            && self.get(editing).is_none()
        {
            let id = editing.clone();
            self.draft = Some(draft);
            return Err(StoreError::NotFound(id));
        }

        if let Some(old) = &replaced {
            self.workouts.retain(|w| &w.id != old);
            if self.current.as_ref().is_some_and(|c| &c.id == old) {
                self.current = None;
            }
            info!("Replaced workout {}", old);
        }

        let saved = match draft.editing {
            Some(id) => self.apply_edit(&id, name, draft.selection)?,
            None => self.insert_new(name, draft.selection),
        };

        let writes = [self.persist_workouts(), self.persist_current()];
        Ok(Committed::new(saved, writes))
    }

    fn apply_edit(
        &mut self,
        id: &WorkoutId,
        name: &str,
        exercises: Vec<Exercise>,
    ) -> Result<Workout, StoreError> {
        let workout = self
            .workouts
            .iter_mut()
            .find(|w| &w.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        workout.name = name.to_string();
        workout.exercises = exercises;
        let updated = workout.clone();

        if self.current.as_ref().is_some_and(|c| &c.id == id) {
            self.current = Some(updated.clone());
        }
        info!("Updated workout \"{}\" ({} exercises)", updated.name, updated.exercises.len());
        Ok(updated)
    }

    fn insert_new(&mut self, name: &str, exercises: Vec<Exercise>) -> Workout {
        let workout = Workout {
            id: self.next_id(),
            name: name.to_string(),
            exercises,
            created_at: Utc::now(),
            last_used: None,
            is_favorite: false,
        };
        self.workouts.insert(0, workout.clone());
        self.current = Some(workout.clone());
        info!("Saved workout \"{}\" ({} exercises)", workout.name, workout.exercises.len());
        workout
    }

    /// Millisecond timestamp, bumped past the last issued id when the clock hasn't moved
    fn next_id(&mut self) -> WorkoutId {
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        WorkoutId::from_millis(id)
    }

    // --- Saved workouts ---

    /// Make `id` the current workout and stamp its last use
    pub fn load_workout(&mut self, id: &WorkoutId) -> Result<Committed<Workout>, StoreError> {
        let workout = self
            .workouts
            .iter_mut()
            .find(|w| &w.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        workout.last_used = Some(Utc::now());
        let loaded = workout.clone();
        self.current = Some(loaded.clone());
        info!("Loaded workout \"{}\"", loaded.name);

        let writes = [self.persist_current(), self.persist_workouts()];
        Ok(Committed::new(loaded, writes))
    }

    /// Remove a workout. Unknown ids are a no-op; the value tells whether anything was removed.
    pub fn delete_workout(&mut self, id: &WorkoutId) -> Committed<bool> {
        let before = self.workouts.len();
        self.workouts.retain(|w| &w.id != id);
        if self.workouts.len() == before {
            debug!("Delete of unknown workout {} ignored", id);
            return Committed::in_memory(false);
        }

        // A draft editing the deleted workout becomes a new-workout draft
        if let Some(draft) = self.draft.as_mut()
            && draft.editing.as_ref() == Some(id)
        {
            draft.editing = None;
        }

        let mut writes = vec![self.persist_workouts()];
        if self.current.as_ref().is_some_and(|c| &c.id == id) {
            self.current = None;
            writes.push(self.persist_current());
        }
        info!("Deleted workout {}", id);
        Committed::new(true, writes)
    }

    /// Current workout, falling back to the newest saved one when none is set
    pub fn ensure_current(&mut self) -> Option<Committed<Workout>> {
        if let Some(current) = &self.current {
            return Some(Committed::in_memory(current.clone()));
        }
        let first = self.workouts.first()?.clone();
        self.current = Some(first.clone());
        info!("Using workout \"{}\" as current", first.name);
        let writes = [self.persist_current()];
        Some(Committed::new(first, writes))
    }

    // --- Favorites ---

    /// Add to the front of the favorites unless an entry with the same id exists
    pub fn add_favorite(&mut self, exercise: &Exercise) -> Committed<bool> {
        if self.favorites.iter().any(|e| e.id == exercise.id) {
            return Committed::in_memory(false);
        }
        self.favorites.insert(0, exercise.clone());
        let writes = [self.persist_favorites()];
        Committed::new(true, writes)
    }

    pub fn clear_favorites(&mut self) -> Committed<()> {
        self.favorites.clear();
        let writes = [self.persist_favorites()];
        Committed::new((), writes)
    }

    // --- Persistence ---

    fn persist_workouts(&mut self) -> Result<(), StorageError> {
        write_key(&mut self.storage, WORKOUTS_KEY, &self.workouts)
    }

    fn persist_current(&mut self) -> Result<(), StorageError> {
        match &self.current {
            Some(workout) => write_key(&mut self.storage, CURRENT_KEY, workout),
            None => self.storage.remove(CURRENT_KEY),
        }
    }

    fn persist_favorites(&mut self) -> Result<(), StorageError> {
        if self.favorites.is_empty() {
            self.storage.remove(FAVORITES_KEY)
        } else {
            write_key(&mut self.storage, FAVORITES_KEY, &self.favorites)
        }
    }
}

fn read_key<S: KeyValueStore, T: DeserializeOwned>(storage: &S, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!("Failed to read {}: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding corrupt value for {}: {}", key, e);
            None
        }
    }
}

fn write_key<S: KeyValueStore, T: Serialize + ?Sized>(
    storage: &mut S,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    storage.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, MemoryStore};
    use crate::exercises::Catalog;

    fn exercise(id: &str) -> Exercise {
        Catalog::load().find(id).unwrap().clone()
    }

    fn store() -> WorkoutStore<MemoryStore> {
        WorkoutStore::open(MemoryStore::new())
    }

    fn saved(store: &mut WorkoutStore<MemoryStore>, name: &str, ids: &[&str]) -> Workout {
        store.begin_create();
        for id in ids {
            store.toggle_selection(&exercise(id));
        }
        match store.save_workout(name).unwrap() {
            SaveOutcome::Saved(committed) => committed.into_value(),
            SaveOutcome::NameConflict { .. } => panic!("unexpected name conflict"),
        }
    }

    /// Store whose writes always fail
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_toggle_selection() {
        let mut store = store();
        let supino = exercise("supino-reto");
        assert!(store.toggle_selection(&supino));
        assert!(store.draft().unwrap().is_selected("supino-reto"));
        assert!(!store.toggle_selection(&supino));
        assert!(store.draft().unwrap().selection.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut store = store();
        let workout = saved(&mut store, "Push Day", &["supino-reto", "triceps-pulley"]);

        let loaded = store.load_workout(&workout.id).unwrap().into_value();
        assert_eq!(loaded.id, workout.id);
        assert_eq!(loaded.name, "Push Day");
        assert_eq!(loaded.exercises, workout.exercises);
        assert_eq!(loaded.exercises.len(), 2);
        assert!(loaded.last_used.unwrap() >= loaded.created_at);
    }

    #[test]
    fn test_save_sets_current_and_clears_selection() {
        let mut store = store();
        let workout = saved(&mut store, "Costas", &["puxada-frente"]);
        assert_eq!(store.current().unwrap().id, workout.id);
        assert!(store.draft().is_none());
        assert!(workout.last_used.is_none());
        assert!(!workout.is_favorite);
    }

    #[test]
    fn test_newest_workout_first() {
        let mut store = store();
        saved(&mut store, "Primeiro", &["stiff"]);
        let second = saved(&mut store, "Segundo", &["stiff"]);
        assert_eq!(store.workouts()[0].id, second.id);
    }

    #[test]
    fn test_ids_unique_for_quick_saves() {
        let mut store = store();
        let a = saved(&mut store, "Treino A", &["stiff"]);
        let b = saved(&mut store, "Treino B", &["stiff"]);
        let c = saved(&mut store, "Treino C", &["stiff"]);
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_short_name_rejected() {
        let mut store = store();
        store.toggle_selection(&exercise("stiff"));
        let err = store.save_workout("ab").unwrap_err();
        assert_eq!(err, StoreError::Validation(ValidationError::NameTooShort { min: 3 }));
        assert!(store.workouts().is_empty());
        // draft survives the failed save
        assert_eq!(store.draft().unwrap().selection.len(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut store = store();
        store.toggle_selection(&exercise("stiff"));
        let err = store.save_workout("   ").unwrap_err();
        assert_eq!(err, StoreError::Validation(ValidationError::EmptyName));
    }

    #[test]
    fn test_long_name_rejected() {
        let mut store = store();
        store.toggle_selection(&exercise("stiff"));
        let err = store.save_workout(&"x".repeat(51)).unwrap_err();
        assert_eq!(err, StoreError::Validation(ValidationError::NameTooLong { max: 50 }));
    }

    #[test]
    fn test_empty_selection_rejected() {
        let mut store = store();
        assert_eq!(
            store.save_workout("Pernas").unwrap_err(),
            StoreError::Validation(ValidationError::EmptySelection)
        );
        store.begin_create();
        assert_eq!(
            store.save_workout("Pernas").unwrap_err(),
            StoreError::Validation(ValidationError::EmptySelection)
        );
    }

    #[test]
    fn test_name_trimmed() {
        let mut store = store();
        let workout = saved(&mut store, "  Ombros  ", &["desenvolvimento"]);
        assert_eq!(workout.name, "Ombros");
    }

    #[test]
    fn test_name_conflict_then_replace() {
        let mut store = store();
        let first = saved(&mut store, "Legs", &["agachamento"]);

        store.begin_create();
        store.toggle_selection(&exercise("leg-press"));
        store.toggle_selection(&exercise("stiff"));
        match store.save_workout("legs").unwrap() {
            SaveOutcome::NameConflict { existing, name } => {
                assert_eq!(existing, first.id);
                assert_eq!(name, "legs");
            }
            SaveOutcome::Saved(_) => panic!("expected conflict"),
        }
        // nothing written yet
        assert_eq!(store.workouts().len(), 1);
        assert_eq!(store.workouts()[0].name, "Legs");

        let replaced = store.confirm_replace("legs").unwrap().into_value();
        assert_eq!(store.workouts().len(), 1);
        assert_eq!(store.workouts()[0].name, "legs");
        assert_eq!(store.workouts()[0].id, replaced.id);
        let ids: Vec<_> = replaced.exercises.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["leg-press", "stiff"]);
    }

    #[test]
    fn test_edit_preserves_identity() {
        let mut store = store();
        let original = saved(&mut store, "Braços", &["rosca-direta"]);
        let _ = store.load_workout(&original.id).unwrap();
        let loaded = store.get(&original.id).unwrap().clone();

        store.begin_edit(&original.id).unwrap();
        store.toggle_selection(&exercise("triceps-pulley"));
        let outcome = store.save_workout("Braços Completo").unwrap();
        let SaveOutcome::Saved(committed) = outcome else {
            panic!("expected save");
        };
        let edited = committed.into_value();

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.created_at, original.created_at);
        assert_eq!(edited.last_used, loaded.last_used);
        assert_eq!(edited.is_favorite, original.is_favorite);
        assert_eq!(edited.name, "Braços Completo");
        assert_eq!(edited.exercises.len(), 2);
        assert_eq!(store.workouts().len(), 1);
        // current followed the edit
        assert_eq!(store.current().unwrap(), &edited);
    }

    #[test]
    fn test_edit_keeping_same_name_is_not_a_conflict() {
        let mut store = store();
        let original = saved(&mut store, "Peito", &["supino-reto"]);
        store.begin_edit(&original.id).unwrap();
        store.toggle_selection(&exercise("crucifixo"));
        assert!(matches!(store.save_workout("PEITO").unwrap(), SaveOutcome::Saved(_)));
        assert_eq!(store.workouts().len(), 1);
    }

    #[test]
    fn test_edit_into_other_name_conflicts() {
        let mut store = store();
        let a = saved(&mut store, "Treino A", &["stiff"]);
        let b = saved(&mut store, "Treino B", &["leg-press"]);
        store.begin_edit(&b.id).unwrap();
        match store.save_workout("treino a").unwrap() {
            SaveOutcome::NameConflict { existing, .. } => assert_eq!(existing, a.id),
            SaveOutcome::Saved(_) => panic!("expected conflict"),
        }
        let edited = store.confirm_replace("treino a").unwrap().into_value();
        assert_eq!(edited.id, b.id);
        assert_eq!(store.workouts().len(), 1);
    }

    #[test]
    fn test_cancel_edit_leaves_collection_untouched() {
        let mut store = store();
        let workout = saved(&mut store, "Costas", &["puxada-frente", "remada-curvada"]);
        let before = store.workouts().to_vec();

        store.begin_edit(&workout.id).unwrap();
        store.toggle_selection(&exercise("puxada-frente"));
        store.set_pending_name("Outro nome");
        store.cancel_edit();

        assert_eq!(store.workouts(), before.as_slice());
        assert!(store.draft().is_none());
        let persisted: Vec<Workout> =
            serde_json::from_str(&store.storage().get(WORKOUTS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, before);
    }

    #[test]
    fn test_begin_edit_unknown_id() {
        let mut store = store();
        let id = WorkoutId::new("42");
        assert_eq!(store.begin_edit(&id).unwrap_err(), StoreError::NotFound(id));
        assert!(store.draft().is_none());
    }

    #[test]
    fn test_load_unknown_id() {
        let mut store = store();
        let id = WorkoutId::new("missing");
        assert!(matches!(store.load_workout(&id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_delete_current_clears_pointer() {
        let mut store = store();
        let workout = saved(&mut store, "Pernas", &["agachamento"]);
        assert_eq!(store.current().unwrap().id, workout.id);

        assert!(store.delete_workout(&workout.id).value);
        assert!(store.current().is_none());
        assert!(store.storage().get(CURRENT_KEY).unwrap().is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = store();
        let workout = saved(&mut store, "Pernas", &["agachamento"]);
        assert!(store.delete_workout(&workout.id).value);
        let again = store.delete_workout(&workout.id);
        assert!(!again.value);
        assert!(again.is_durable());
    }

    #[test]
    fn test_delete_other_keeps_current() {
        let mut store = store();
        let a = saved(&mut store, "Treino A", &["stiff"]);
        let b = saved(&mut store, "Treino B", &["stiff"]);
        let _ = store.delete_workout(&a.id);
        assert_eq!(store.current().unwrap().id, b.id);
    }

    #[test]
    fn test_delete_while_editing_turns_draft_into_new() {
        let mut store = store();
        let workout = saved(&mut store, "Treino A", &["stiff"]);
        store.begin_edit(&workout.id).unwrap();
        let _ = store.delete_workout(&workout.id);
        assert!(store.draft().unwrap().editing.is_none());
        let outcome = store.save_workout("Treino A").unwrap();
        assert!(matches!(outcome, SaveOutcome::Saved(_)));
        assert_eq!(store.workouts().len(), 1);
    }

    #[test]
    fn test_favorites_dedupe() {
        let mut store = store();
        let stiff = exercise("stiff");
        assert!(store.add_favorite(&stiff).value);
        assert!(!store.add_favorite(&stiff).value);
        assert_eq!(store.favorites().len(), 1);
    }

    #[test]
    fn test_favorites_newest_first_and_clear() {
        let mut store = store();
        let _ = store.add_favorite(&exercise("stiff"));
        let _ = store.add_favorite(&exercise("rosca-direta"));
        assert_eq!(store.favorites()[0].id, "rosca-direta");

        let _ = store.clear_favorites();
        assert!(store.favorites().is_empty());
        assert!(store.storage().get(FAVORITES_KEY).unwrap().is_none());
    }

    #[test]
    fn test_select_favorite() {
        let mut store = store();
        let _ = store.add_favorite(&exercise("stiff"));
        assert_eq!(store.select_favorite("stiff"), Some(true));
        assert_eq!(store.select_favorite("stiff"), Some(false));
        assert_eq!(store.select_favorite("supino-reto"), None);
        assert_eq!(store.draft().unwrap().selection.len(), 1);
    }

    #[test]
    fn test_remove_selected() {
        let mut store = store();
        store.toggle_selection(&exercise("stiff"));
        store.toggle_selection(&exercise("leg-press"));
        assert_eq!(store.remove_selected(0).unwrap().id, "stiff");
        assert!(store.remove_selected(5).is_none());
        assert_eq!(store.draft().unwrap().selection[0].id, "leg-press");
    }

    #[test]
    fn test_recent_limited() {
        let mut store = store();
        for name in ["Treino 1", "Treino 2", "Treino 3", "Treino 4"] {
            saved(&mut store, name, &["stiff"]);
        }
        let recent: Vec<_> = store.recent().iter().map(|w| w.name.as_str()).collect();
        assert_eq!(recent, vec!["Treino 4", "Treino 3", "Treino 2"]);
    }

    #[test]
    fn test_state_survives_reopen() {
        let mut store = store();
        let workout = saved(&mut store, "Push Day", &["supino-reto", "desenvolvimento"]);
        let _ = store.add_favorite(&exercise("stiff"));

        let reopened = WorkoutStore::open(store.into_storage());
        assert_eq!(reopened.workouts().len(), 1);
        assert_eq!(reopened.workouts()[0], workout);
        assert_eq!(reopened.current().unwrap().id, workout.id);
        assert_eq!(reopened.favorites()[0].id, "stiff");
    }

    #[test]
    fn test_corrupt_workouts_reset_to_empty() {
        let storage = MemoryStore::new()
            .with_value(WORKOUTS_KEY, "{not json")
            .with_value(FAVORITES_KEY, "[]");
        let store = WorkoutStore::open(storage);
        assert!(store.workouts().is_empty());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_open_dedupes_stored_favorites() {
        let stiff = exercise("stiff");
        let blob = serde_json::to_string(&vec![stiff.clone(), exercise("rosca-direta"), stiff]).unwrap();
        let store = WorkoutStore::open(MemoryStore::new().with_value(FAVORITES_KEY, &blob));
        let ids: Vec<_> = store.favorites().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["stiff", "rosca-direta"]);
    }

    #[test]
    fn test_corrupt_favorites_reset_to_empty() {
        let mut source = store();
        saved(&mut source, "Pernas", &["agachamento"]);
        let storage = source.into_storage().with_value(FAVORITES_KEY, "[{\"id\": 7}]");
        let store = WorkoutStore::open(storage);
        assert!(store.favorites().is_empty());
        assert_eq!(store.workouts().len(), 1);
        assert!(store.current().is_some());
    }

    #[test]
    fn test_corrupt_current_dropped() {
        let mut source = store();
        saved(&mut source, "Pernas", &["agachamento"]);
        let _ = source.add_favorite(&exercise("stiff"));
        let storage = source.into_storage().with_value(CURRENT_KEY, "{\"id\":");
        let store = WorkoutStore::open(storage);
        assert!(store.current().is_none());
        assert_eq!(store.workouts().len(), 1);
        assert_eq!(store.favorites().len(), 1);
    }

    #[test]
    fn test_round_trip_over_sqlite() {
        let mut store = WorkoutStore::open(Database::open(":memory:").unwrap());
        store.begin_create();
        store.toggle_selection(&exercise("supino-reto"));
        store.toggle_selection(&exercise("crucifixo"));
        let SaveOutcome::Saved(committed) = store.save_workout("Push Day").unwrap() else {
            panic!("expected save");
        };
        assert!(committed.is_durable());
        let workout = committed.into_value();
        let _ = store.load_workout(&workout.id).unwrap();
        let _ = store.add_favorite(&exercise("crucifixo"));

        let reopened = WorkoutStore::open(store.into_storage());
        assert_eq!(reopened.workouts().len(), 1);
        assert_eq!(reopened.workouts()[0].id, workout.id);
        assert_eq!(reopened.workouts()[0].exercises, workout.exercises);
        assert!(reopened.workouts()[0].last_used.is_some());
        assert_eq!(reopened.current().unwrap().id, workout.id);
        assert_eq!(reopened.favorites()[0].id, "crucifixo");
    }

    #[test]
    fn test_dangling_current_cleared_on_open() {
        let mut source = store();
        let workout = saved(&mut source, "Pernas", &["agachamento"]);
        let current = serde_json::to_string(&workout).unwrap();
        let storage = MemoryStore::new().with_value(CURRENT_KEY, &current);
        let store = WorkoutStore::open(storage);
        assert!(store.current().is_none());
    }

    #[test]
    fn test_loads_browser_written_blob() {
        let blob = r#"[{
            "id": "1718000000000",
            "name": "Peito e Tríceps",
            "exercises": [{
                "id": "supino-reto", "name": "Supino Reto", "muscle": "Peito",
                "description": "", "image": "/assets/gif/supino-reto.gif",
                "sets": "4x8-10", "rest": "60-90s", "intensity": "Média-Alta",
                "icon": "fas fa-user", "category": "peito"
            }],
            "createdAt": "2024-06-10T06:13:20.000Z",
            "lastUsed": null,
            "isFavorite": false
        }]"#;
        let mut store = WorkoutStore::open(MemoryStore::new().with_value(WORKOUTS_KEY, blob));
        assert_eq!(store.workouts().len(), 1);
        assert_eq!(store.workouts()[0].exercises[0].rest_seconds, 60);
        // new ids never go backwards from stored ones
        let next = saved(&mut store, "Outro", &["stiff"]);
        assert!(next.id.as_millis().unwrap() > 1718000000000);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut store = WorkoutStore::open(FailingStore::default());
        store.toggle_selection(&exercise("stiff"));
        let SaveOutcome::Saved(committed) = store.save_workout("Posterior").unwrap() else {
            panic!("expected save");
        };
        assert!(!committed.is_durable());
        assert!(matches!(committed.storage_error, Some(StorageError::Unavailable(_))));
        assert_eq!(store.workouts().len(), 1);
        assert_eq!(store.current().unwrap().name, "Posterior");
    }

    #[test]
    fn test_ensure_current_falls_back_to_first() {
        let mut store = store();
        let a = saved(&mut store, "Treino A", &["stiff"]);
        let b = saved(&mut store, "Treino B", &["stiff"]);
        let _ = store.delete_workout(&b.id);
        assert!(store.current().is_none());

        let current = store.ensure_current().unwrap().into_value();
        assert_eq!(current.id, a.id);
        assert_eq!(store.current().unwrap().id, a.id);
    }

    #[test]
    fn test_ensure_current_without_workouts() {
        let mut store = store();
        assert!(store.ensure_current().is_none());
    }
}
