#![allow(clippy::unwrap_used, clippy::expect_used)]

use createmate_core::{Schedule, UserInput};
use createmate_storage::*;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

fn doc(value: serde_json::Value) -> Document {
    value.as_object().cloned().unwrap()
}

fn sample_input() -> UserInput {
    UserInput {
        area_of_interest: "AI".into(),
        content_type: "Blog Post".into(),
        keywords: vec!["agents".into(), "automation".into()],
        post_frequency: 2,
    }
}

/// Runs the same scenario against any backend.
async fn exercise(store: Arc<dyn DocumentStore>) {
    let session_id = Uuid::new_v4();
    let schedule = Schedule {
        session_id,
        posting_days: vec!["Monday".into(), "Thursday".into()],
    };

    store
        .insert("user_inputs", to_document(&sample_input()).unwrap())
        .await
        .unwrap();
    let schedule_id = store
        .insert("schedules", to_document(&schedule).unwrap())
        .await
        .unwrap();

    let found = store
        .find_one(
            "schedules",
            &doc(json!({"session_id": session_id.to_string()})),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found["_id"], json!(schedule_id));
    assert_eq!(found["posting_days"], json!(["Monday", "Thursday"]));

    let modified = store
        .update_one(
            "schedules",
            &doc(json!({"_id": schedule_id})),
            &doc(json!({"$set": {"posting_days": ["Tuesday", "Friday"]}})),
        )
        .await
        .unwrap();
    assert_eq!(modified, 1);

    let updated = store
        .find("schedules", &Document::new())
        .await
        .unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0]["posting_days"], json!(["Tuesday", "Friday"]));

    assert_eq!(
        store.collections().await.unwrap(),
        vec!["schedules".to_string(), "user_inputs".to_string()]
    );

    let deleted = store
        .delete_one("user_inputs", &doc(json!({"content_type": "Blog Post"})))
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(store.collections().await.unwrap(), vec!["schedules".to_string()]);
}

#[tokio::test]
async fn in_memory_store_scenario() {
    exercise(Arc::new(InMemoryDocumentStore::new())).await;
}

#[tokio::test]
async fn file_store_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileDocumentStore::new(dir.path().join("data")).await.unwrap();
    exercise(Arc::new(store)).await;
}

#[tokio::test]
async fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    {
        let store = FileDocumentStore::new(path.clone()).await.unwrap();
        store
            .insert("suggested_topics", doc(json!({"topics": ["Agents 101"]})))
            .await
            .unwrap();
    }

    let reopened = FileDocumentStore::new(path).await.unwrap();
    let topics = reopened
        .find("suggested_topics", &Document::new())
        .await
        .unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0]["topics"], json!(["Agents 101"]));
}

#[tokio::test]
async fn concurrent_inserts_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn DocumentStore> =
        Arc::new(FileDocumentStore::new(dir.path().to_path_buf()).await.unwrap());

    let mut tasks = tokio::task::JoinSet::new();
    for n in 0..10 {
        let store = store.clone();
        tasks.spawn(async move {
            store
                .insert("generated_content", doc(json!({"n": n})))
                .await
                .unwrap()
        });
    }
    while let Some(done) = tasks.join_next().await {
        done.unwrap();
    }

    let all = store
        .find("generated_content", &Document::new())
        .await
        .unwrap();
    assert_eq!(all.len(), 10);
}
