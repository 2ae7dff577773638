use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use tasklist::storage::{load_tasks, TASKS_KEY};
use tasklist::{
    view, FileStorage, Filter, MemoryStorage, Persistence, Priority, SortKey, StatusFilter, StoreError,
    TaskDraft, TaskStore,
};

fn file_store(dir: &std::path::Path) -> TaskStore<FileStorage> {
    TaskStore::open(FileStorage::new(dir))
}

#[test]
fn test_create_round_trips_through_file() {
    let tmp = tempfile::tempdir().unwrap();
    let due = Utc.with_ymd_and_hms(2025, 12, 1, 9, 30, 0).unwrap();

    let created = {
        let mut store = file_store(tmp.path());
        store
            .create(
                TaskDraft::new("Write report")
                    .description("Q3 numbers")
                    .due(due)
                    .priority(Priority::High),
            )
            .unwrap()
    };

    let reopened = file_store(tmp.path());
    assert_eq!(reopened.tasks().len(), 1);
    let loaded = &reopened.tasks()[0];
    assert_eq!(loaded, &created);
    assert_eq!(loaded.title, "Write report");
    assert_eq!(loaded.description, "Q3 numbers");
    assert_eq!(loaded.due_date, Some(due));
    assert_eq!(loaded.priority, Priority::High);
    assert!(!loaded.completed);
}

#[test]
fn test_ids_are_fresh_and_unique() {
    let mut store = TaskStore::open(MemoryStorage::new());
    let ids: HashSet<String> = (0..50)
        .map(|i| store.create(TaskDraft::new(format!("task {}", i))).unwrap().id)
        .collect();
    assert_eq!(ids.len(), 50);
}

#[test]
fn test_whitespace_title_changes_nothing() {
    let mut store = TaskStore::open(MemoryStorage::new());
    store.create(TaskDraft::new("existing")).unwrap();
    let before = store.tasks().to_vec();
    let raw_before = store.backend().get(TASKS_KEY).unwrap();

    let err = store.create(TaskDraft::new(" \t\n ")).unwrap_err();

    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.tasks(), before.as_slice());
    assert_eq!(store.backend().get(TASKS_KEY).unwrap(), raw_before);
}

#[test]
fn test_toggle_twice_restores_state() {
    let mut store = TaskStore::open(MemoryStorage::new());
    let task = store.create(TaskDraft::new("flip me")).unwrap();
    assert!(store.toggle_complete(&task.id).unwrap());
    assert!(!store.toggle_complete(&task.id).unwrap());
    assert!(!store.get(&task.id).unwrap().completed);
}

#[test]
fn test_clear_completed_keeps_order() {
    let mut store = TaskStore::open(MemoryStorage::new());
    let ids: Vec<String> = (0..5)
        .map(|i| store.create(TaskDraft::new(format!("t{}", i))).unwrap().id)
        .collect();
    store.toggle_complete(&ids[1]).unwrap();
    store.toggle_complete(&ids[3]).unwrap();
    let expected: Vec<String> = store
        .tasks()
        .iter()
        .filter(|t| !t.completed)
        .map(|t| t.id.clone())
        .collect();

    assert_eq!(store.clear_completed().unwrap(), 2);

    let remaining: Vec<String> = store.tasks().iter().map(|t| t.id.clone()).collect();
    assert_eq!(remaining, expected);
    assert_eq!(remaining.len(), 3);
    assert_eq!(load_tasks(store.backend()).len(), 3);
}

#[test]
fn test_delete_missing_is_harmless() {
    let mut store = TaskStore::open(MemoryStorage::new());
    store.create(TaskDraft::new("stay")).unwrap();
    let before = store.tasks().to_vec();
    assert!(!store.delete("task_does_not_exist").unwrap());
    assert_eq!(store.tasks(), before.as_slice());
}

#[test]
fn test_delete_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let id = {
        let mut store = file_store(tmp.path());
        store.create(TaskDraft::new("keep")).unwrap();
        store.create(TaskDraft::new("drop")).unwrap().id
    };
    let mut store = file_store(tmp.path());
    assert!(store.delete(&id).unwrap());
    let reopened = file_store(tmp.path());
    assert_eq!(reopened.tasks().len(), 1);
    assert_eq!(reopened.tasks()[0].title, "keep");
}

#[test]
fn test_corrupt_file_loads_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(tmp.path());
    std::fs::write(storage.path_for(TASKS_KEY), "[{\"id\": 1,").unwrap();
    let store = TaskStore::open(storage);
    assert!(store.tasks().is_empty());
}

#[test]
fn test_pipeline_over_store() {
    let mut store = TaskStore::open(MemoryStorage::new());
    let a = store.create(TaskDraft::new("no date")).unwrap();
    let b = store
        .create(TaskDraft::new("january").due(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()))
        .unwrap();
    let c = store
        .create(TaskDraft::new("june").due(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()))
        .unwrap();
    store.toggle_complete(&c.id).unwrap();

    let by_due: Vec<&str> = view(store.tasks(), &Filter::default(), SortKey::DueDate)
        .into_iter()
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(by_due, [b.id.as_str(), c.id.as_str(), a.id.as_str()]);

    let pending = Filter { status: StatusFilter::Pending, ..Filter::default() };
    assert_eq!(view(store.tasks(), &pending, SortKey::DueDate).len(), 2);
}

#[test]
fn test_update_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let due = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
    let id = {
        let mut store = file_store(tmp.path());
        let id = store.create(TaskDraft::new("draft")).unwrap().id;
        store
            .update(&id, TaskDraft::new("final").description("done right").due(due).priority(Priority::Low))
            .unwrap();
        id
    };
    let reopened = file_store(tmp.path());
    let task = reopened.get(&id).unwrap();
    assert_eq!(task.title, "final");
    assert_eq!(task.description, "done right");
    assert_eq!(task.due_date, Some(due));
    assert_eq!(task.priority, Priority::Low);
}

#[test]
fn test_toggle_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let id = {
        let mut store = file_store(tmp.path());
        let id = store.create(TaskDraft::new("finish me")).unwrap().id;
        store.toggle_complete(&id).unwrap();
        id
    };
    assert!(file_store(tmp.path()).get(&id).unwrap().completed);

    let mut store = file_store(tmp.path());
    store.toggle_complete(&id).unwrap();
    assert!(!file_store(tmp.path()).get(&id).unwrap().completed);
}

#[test]
fn test_clear_completed_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let kept: Vec<String> = {
        let mut store = file_store(tmp.path());
        let ids: Vec<String> = (0..4)
            .map(|i| store.create(TaskDraft::new(format!("t{}", i))).unwrap().id)
            .collect();
        store.toggle_complete(&ids[0]).unwrap();
        store.toggle_complete(&ids[2]).unwrap();
        assert_eq!(store.clear_completed().unwrap(), 2);
        store.tasks().iter().map(|t| t.id.clone()).collect()
    };
    let reopened = file_store(tmp.path());
    let ids: Vec<String> = reopened.tasks().iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, kept);
    assert!(reopened.tasks().iter().all(|t| !t.completed));
}
