//! Training session - stepping through the current workout

use crate::db::{KeyValueStore, StorageError};
use crate::exercises::Exercise;
use crate::store::{Committed, Workout, WorkoutStore};

/// Where the quick start action leads
#[derive(Debug, Clone, PartialEq)]
pub enum QuickStart {
    /// A current workout exists, go straight to training it
    Train(Workout),
    /// Nothing selected yet, show the workout list
    ChooseWorkout,
}

pub fn quick_start<S: KeyValueStore>(store: &WorkoutStore<S>) -> QuickStart {
    match store.current() {
        Some(workout) => QuickStart::Train(workout.clone()),
        None => QuickStart::ChooseWorkout,
    }
}

/// Result of completing the exercise under the cursor
#[derive(Debug)]
pub struct Completion {
    pub exercise: Exercise,
    /// First time this exercise was completed (it is now a favorite)
    pub new_favorite: bool,
    pub storage_error: Option<StorageError>,
    /// Rest before the exercise now under the cursor; `None` when the workout is done
    pub rest_seconds: Option<u32>,
}

impl Completion {
    pub fn finished(&self) -> bool {
        self.rest_seconds.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct TrainingSession {
    workout: Workout,
    index: usize,
}

impl TrainingSession {
    pub fn new(workout: Workout) -> Self {
        Self { workout, index: 0 }
    }

    /// Session over the current workout, adopting the newest saved workout when none is current.
    /// `None` when there are no workouts at all.
    pub fn begin<S: KeyValueStore>(store: &mut WorkoutStore<S>) -> Option<Committed<Self>> {
        store
            .ensure_current()
            .map(|current| current.map(TrainingSession::new))
    }

    pub fn workout(&self) -> &Workout {
        &self.workout
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Exercise> {
        self.workout.exercises.get(self.index)
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.workout.exercises.len()
    }

    /// `3/5` style counter
    pub fn position_label(&self) -> String {
        format!("{}/{}", self.index + 1, self.workout.exercises.len())
    }

    pub fn prev(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn jump(&mut self, index: usize) -> bool {
        if index >= self.workout.exercises.len() || index == self.index {
            return false;
        }
        self.index = index;
        true
    }

    /// Mark the current exercise done: remember it as a favorite and move on
    pub fn complete<S: KeyValueStore>(&mut self, store: &mut WorkoutStore<S>) -> Option<Completion> {
        let exercise = self.current()?.clone();
        let favorite = store.add_favorite(&exercise);
        let rest_seconds = if self.next() {
            self.current().map(|e| e.rest_seconds)
        } else {
            None
        };
        Some(Completion {
            exercise,
            new_favorite: favorite.value,
            storage_error: favorite.storage_error,
            rest_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::exercises::Catalog;
    use crate::store::SaveOutcome;

    fn store_with_workout(ids: &[&str]) -> WorkoutStore<MemoryStore> {
        let catalog = Catalog::load();
        let mut store = WorkoutStore::open(MemoryStore::new());
        for id in ids {
            store.toggle_selection(catalog.find(id).unwrap());
        }
        assert!(matches!(store.save_workout("Treino Teste").unwrap(), SaveOutcome::Saved(_)));
        store
    }

    #[test]
    fn test_quick_start_with_current() {
        let store = store_with_workout(&["stiff"]);
        assert!(matches!(quick_start(&store), QuickStart::Train(w) if w.name == "Treino Teste"));
    }

    #[test]
    fn test_quick_start_without_current() {
        let store = WorkoutStore::open(MemoryStore::new());
        assert_eq!(quick_start(&store), QuickStart::ChooseWorkout);
    }

    #[test]
    fn test_begin_without_workouts() {
        let mut store = WorkoutStore::open(MemoryStore::new());
        assert!(TrainingSession::begin(&mut store).is_none());
    }

    #[test]
    fn test_navigation_clamped() {
        let mut store = store_with_workout(&["supino-reto", "stiff", "rosca-direta"]);
        let mut session = TrainingSession::begin(&mut store).unwrap().into_value();
        assert_eq!(session.position_label(), "1/3");
        assert!(!session.prev());
        assert!(session.next());
        assert!(session.next());
        assert!(!session.next());
        assert_eq!(session.position_label(), "3/3");
        assert!(session.jump(0));
        assert!(!session.jump(7));
        assert_eq!(session.current().unwrap().id, "supino-reto");
    }

    #[test]
    fn test_complete_adds_favorite_and_advances() {
        let mut store = store_with_workout(&["supino-reto", "stiff"]);
        let mut session = TrainingSession::begin(&mut store).unwrap().into_value();

        let done = session.complete(&mut store).unwrap();
        assert_eq!(done.exercise.id, "supino-reto");
        assert!(done.new_favorite);
        assert_eq!(done.rest_seconds, Some(90));
        assert!(!done.finished());
        assert_eq!(session.current().unwrap().id, "stiff");

        let last = session.complete(&mut store).unwrap();
        assert!(last.finished());
        assert_eq!(store.favorites().len(), 2);
        assert_eq!(store.favorites()[0].id, "stiff");
    }

    #[test]
    fn test_complete_twice_keeps_one_favorite() {
        let mut store = store_with_workout(&["stiff"]);
        let mut session = TrainingSession::begin(&mut store).unwrap().into_value();
        assert!(session.complete(&mut store).unwrap().new_favorite);
        assert!(!session.complete(&mut store).unwrap().new_favorite);
        assert_eq!(store.favorites().len(), 1);
    }
}
