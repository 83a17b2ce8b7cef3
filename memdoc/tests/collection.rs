use bson::{Document, doc};
use memdoc::{
    memory::InMemoryStore,
    prelude::*,
};

async fn store() -> DocumentStore<InMemoryStore> {
    DocumentStore::new(InMemoryStore::builder().build().await.unwrap())
}

fn activities() -> Vec<Document> {
    vec![
        doc! {
            "_id": "Chess Club",
            "description": "Learn strategies and compete in chess tournaments",
            "schedule_details": { "days": ["Monday", "Friday"], "start_time": "15:15", "end_time": "16:45" },
            "max_participants": 12,
            "participants": ["michael@mergington.edu", "daniel@mergington.edu"],
            "difficulty": "Beginner",
        },
        doc! {
            "_id": "Programming Class",
            "description": "Learn programming fundamentals and build software projects",
            "schedule_details": { "days": ["Tuesday", "Thursday"], "start_time": "07:00", "end_time": "08:00" },
            "max_participants": 20,
            "participants": ["emma@mergington.edu", "sophia@mergington.edu"],
            "difficulty": "Intermediate",
        },
        doc! {
            "_id": "Manga Maniacs",
            "description": "Explore the stories of characters from Japanese Manga",
            "schedule_details": { "days": ["Tuesday"], "start_time": "19:00", "end_time": "20:00" },
            "max_participants": 15,
            "participants": [],
        },
    ]
}

async fn seeded() -> DocumentStore<InMemoryStore> {
    let store = store().await;
    let collection = store.collection("activities");

    for activity in activities() {
        collection.insert_one(activity).await.unwrap();
    }

    store
}

#[tokio::test]
async fn insert_then_find_by_identity_returns_body_with_key() {
    let store = store().await;
    let activities = store.collection("activities");

    let inserted = activities
        .insert_one(doc! { "_id": "Art Club", "max_participants": 15, "participants": ["amelia@mergington.edu"] })
        .await
        .unwrap();
    assert_eq!(inserted.inserted_id, "Art Club");

    let found = activities.find_one(doc! { "_id": "Art Club" }).await.unwrap();
    assert_eq!(
        found,
        Some(doc! { "_id": "Art Club", "max_participants": 15, "participants": ["amelia@mergington.edu"] })
    );
}

#[tokio::test]
async fn find_one_without_a_query_returns_the_first_document() {
    let store = seeded().await;
    let activities = store.collection("activities");

    let first = activities.find_one(doc! {}).await.unwrap().unwrap();
    assert_eq!(first.get_str("_id").unwrap(), "Chess Club");

    let empty = store.collection("teachers").find_one(doc! {}).await.unwrap();
    assert_eq!(empty, None);
}

#[tokio::test]
async fn find_one_reports_misses_as_none() {
    let store = seeded().await;
    let activities = store.collection("activities");

    assert_eq!(activities.find_one(doc! { "_id": "Soccer Team" }).await.unwrap(), None);
    assert_eq!(activities.find_one(doc! { "difficulty": "Expert" }).await.unwrap(), None);
}

#[tokio::test]
async fn find_one_scans_in_store_order() {
    let store = seeded().await;
    let activities = store.collection("activities");

    let found = activities
        .find_one(doc! { "schedule_details.days": { "$in": ["Tuesday"] } })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.get_str("_id").unwrap(), "Programming Class");
}

#[tokio::test]
async fn find_one_by_identity_also_checks_other_clauses() {
    let store = seeded().await;
    let activities = store.collection("activities");

    let hit = activities
        .find_one(doc! { "_id": "Chess Club", "difficulty": "Beginner" })
        .await
        .unwrap();
    assert!(hit.is_some());

    let miss = activities
        .find_one(doc! { "_id": "Chess Club", "difficulty": "Advanced" })
        .await
        .unwrap();
    assert_eq!(miss, None);
}

#[tokio::test]
async fn find_filters_with_operators() {
    let store = seeded().await;
    let activities = store.collection("activities");

    let ids = |documents: Vec<Document>| {
        documents
            .iter()
            .map(|document| document.get_str("_id").unwrap().to_string())
            .collect::<Vec<_>>()
    };

    assert_eq!(ids(activities.find(doc! {}).await.unwrap()), vec!["Chess Club", "Programming Class", "Manga Maniacs"]);
    assert_eq!(ids(activities.find(doc! { "difficulty": "Beginner" }).await.unwrap()), vec!["Chess Club"]);
    assert_eq!(
        ids(activities.find(doc! { "max_participants": { "$gte": 15 } }).await.unwrap()),
        vec!["Programming Class", "Manga Maniacs"]
    );
    assert_eq!(
        ids(activities.find(doc! { "schedule_details.start_time": { "$lte": "08:00" } }).await.unwrap()),
        vec!["Programming Class"]
    );
    assert_eq!(ids(activities.find(doc! { "difficulty": { "$exists": false } }).await.unwrap()), vec!["Manga Maniacs"]);
    assert_eq!(ids(activities.find(doc! { "_id": "Manga Maniacs" }).await.unwrap()), vec!["Manga Maniacs"]);
    assert!(activities.find(doc! { "difficulty": "Expert" }).await.unwrap().is_empty());
    assert!(store.collection("unknown").find(doc! {}).await.unwrap().is_empty());
}

#[tokio::test]
async fn in_matches_on_array_overlap() {
    let store = store().await;
    let collection = store.collection("tagged");
    collection.insert_one(doc! { "_id": "k", "tags": ["a", "b"] }).await.unwrap();

    assert_eq!(collection.find(doc! { "tags": { "$in": ["b", "z"] } }).await.unwrap().len(), 1);
    assert!(collection.find(doc! { "tags": { "$in": ["z"] } }).await.unwrap().is_empty());
}

#[tokio::test]
async fn insert_without_identity_is_rejected() {
    let store = store().await;
    let activities = store.collection("activities");

    let missing = activities.insert_one(doc! { "description": "no key" }).await;
    assert!(matches!(missing, Err(DocumentStoreError::InvalidDocument(_))));

    let numeric = activities.insert_one(doc! { "_id": 42, "description": "numeric key" }).await;
    assert!(matches!(numeric, Err(DocumentStoreError::InvalidDocument(_))));

    assert_eq!(activities.count_documents(doc! {}).await.unwrap(), 0);
}

#[tokio::test]
async fn insert_with_an_existing_key_overwrites() {
    let store = seeded().await;
    let activities = store.collection("activities");

    activities
        .insert_one(doc! { "_id": "Chess Club", "max_participants": 30 })
        .await
        .unwrap();

    assert_eq!(activities.count_documents(doc! {}).await.unwrap(), 3);
    assert_eq!(
        activities.find_one(doc! { "_id": "Chess Club" }).await.unwrap(),
        Some(doc! { "_id": "Chess Club", "max_participants": 30 })
    );

    let first = activities.find_one(doc! {}).await.unwrap().unwrap();
    assert_eq!(first.get_str("_id").unwrap(), "Chess Club");
}

#[tokio::test]
async fn count_documents_tracks_inserts() {
    let store = seeded().await;
    let activities = store.collection("activities");

    assert_eq!(activities.count_documents(doc! {}).await.unwrap(), 3);
    assert_eq!(activities.count_documents(doc! { "difficulty": { "$exists": true } }).await.unwrap(), 2);
    assert_eq!(activities.count_documents(doc! { "_id": "Chess Club" }).await.unwrap(), 1);
    assert_eq!(activities.count_documents(doc! { "_id": "Soccer Team" }).await.unwrap(), 0);
    assert_eq!(store.collection("unknown").count_documents(doc! {}).await.unwrap(), 0);
}

#[tokio::test]
async fn push_then_pull_restores_the_array() {
    let store = seeded().await;
    let activities = store.collection("activities");

    let pushed = activities
        .update_one(doc! { "_id": "Chess Club" }, doc! { "$push": { "participants": "x@y.edu" } })
        .await
        .unwrap();
    assert_eq!(pushed.modified_count, 1);

    let after_push = activities.find_one(doc! { "_id": "Chess Club" }).await.unwrap().unwrap();
    assert_eq!(
        after_push.get_array("participants").unwrap(),
        &vec![bson::Bson::from("michael@mergington.edu"), "daniel@mergington.edu".into(), "x@y.edu".into()]
    );

    let pulled = activities
        .update_one(doc! { "_id": "Chess Club" }, doc! { "$pull": { "participants": "x@y.edu" } })
        .await
        .unwrap();
    assert_eq!(pulled.modified_count, 1);

    let after_pull = activities.find_one(doc! { "_id": "Chess Club" }).await.unwrap().unwrap();
    assert_eq!(
        after_pull.get_array("participants").unwrap(),
        &vec![bson::Bson::from("michael@mergington.edu"), "daniel@mergington.edu".into()]
    );
}

#[tokio::test]
async fn push_and_pull_in_one_update() {
    let store = seeded().await;
    let activities = store.collection("activities");

    activities
        .update_one(
            doc! { "_id": "Programming Class" },
            doc! {
                "$push": { "participants": "liam@mergington.edu", "waitlist": "noah@mergington.edu" },
                "$pull": { "participants": "emma@mergington.edu" },
            },
        )
        .await
        .unwrap();

    let updated = activities.find_one(doc! { "_id": "Programming Class" }).await.unwrap().unwrap();
    assert_eq!(
        updated.get_array("participants").unwrap(),
        &vec![bson::Bson::from("sophia@mergington.edu"), "liam@mergington.edu".into()]
    );
    assert_eq!(
        updated.get_array("waitlist").unwrap(),
        &vec![bson::Bson::from("noah@mergington.edu")]
    );
}

#[tokio::test]
async fn update_of_a_missing_key_changes_nothing() {
    let store = seeded().await;
    let activities = store.collection("activities");
    let before = activities.find(doc! {}).await.unwrap();

    let result = activities
        .update_one(doc! { "_id": "missing" }, doc! { "$push": { "participants": "x@y.edu" } })
        .await
        .unwrap();

    assert_eq!(result.modified_count, 0);
    assert_eq!(result.matched_count, 0);
    assert_eq!(activities.find(doc! {}).await.unwrap(), before);
}

#[tokio::test]
async fn update_without_identity_filter_modifies_nothing() {
    let store = seeded().await;
    let activities = store.collection("activities");

    let result = activities
        .update_one(doc! { "difficulty": "Beginner" }, doc! { "$push": { "participants": "x@y.edu" } })
        .await
        .unwrap();

    assert_eq!(result.modified_count, 0);
    let chess = activities.find_one(doc! { "_id": "Chess Club" }).await.unwrap().unwrap();
    assert_eq!(chess.get_array("participants").unwrap().len(), 2);
}

#[tokio::test]
async fn failed_update_is_not_partially_applied() {
    let store = seeded().await;
    let activities = store.collection("activities");

    let result = activities
        .update_one(
            doc! { "_id": "Chess Club" },
            doc! { "$push": { "participants": "x@y.edu", "description": "appended" } },
        )
        .await;

    assert!(matches!(result, Err(DocumentStoreError::InvalidUpdate(_))));
    let chess = activities.find_one(doc! { "_id": "Chess Club" }).await.unwrap().unwrap();
    assert_eq!(chess.get_array("participants").unwrap().len(), 2);
}

#[tokio::test]
async fn updates_cannot_touch_the_identity_field() {
    let store = seeded().await;
    let activities = store.collection("activities");
    let before = activities.find(doc! {}).await.unwrap();

    for update in [
        doc! { "$push": { "_id": "x" } },
        doc! { "$pull": { "_id": "Chess Club" } },
        doc! { "$push": { "participants": "x@y.edu", "_id.aliases": "Chess" } },
    ] {
        let result = activities.update_one(doc! { "_id": "Chess Club" }, update).await;
        assert!(matches!(result, Err(DocumentStoreError::InvalidUpdate(_))));
    }

    assert_eq!(activities.find(doc! {}).await.unwrap(), before);
    assert!(activities.find_one(doc! { "_id": "Chess Club" }).await.unwrap().is_some());
}

#[tokio::test]
async fn non_finite_numbers_sort_and_group_consistently() {
    let store = store().await;
    let scores = store.collection("scores");

    for (key, value) in [("a", 2.0), ("b", f64::NAN), ("c", f64::INFINITY), ("d", 2.0), ("e", f64::NAN), ("f", -1.0)] {
        scores.insert_one(doc! { "_id": key, "value": value }).await.unwrap();
    }

    let sorted = scores.aggregate([doc! { "$sort": { "value": 1, "_id": 1 } }]).await.unwrap();
    let ids = sorted.iter().map(|document| document.get_str("_id").unwrap()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["b", "e", "f", "a", "d", "c"]);

    let groups = scores.aggregate([doc! { "$group": { "_id": "$value" } }]).await.unwrap();
    let values = groups.iter().map(|document| document.get_f64("_id").unwrap()).collect::<Vec<_>>();
    assert_eq!(values.len(), 4);
    assert!(values[0].is_nan());
    assert_eq!(&values[1..], &[-1.0, 2.0, f64::INFINITY]);
}

#[tokio::test]
async fn aggregate_lists_distinct_days() {
    let store = store().await;
    let activities = store.collection("activities");
    activities.insert_one(doc! { "_id": "A", "schedule_details": { "days": ["Mon", "Wed"] } }).await.unwrap();
    activities.insert_one(doc! { "_id": "B", "schedule_details": { "days": ["Tue"] } }).await.unwrap();

    let days = activities
        .aggregate([
            doc! { "$unwind": "$schedule_details.days" },
            doc! { "$group": { "_id": "$schedule_details.days" } },
            doc! { "$sort": { "_id": 1 } },
        ])
        .await
        .unwrap();

    assert_eq!(days, vec![doc! { "_id": "Mon" }, doc! { "_id": "Tue" }, doc! { "_id": "Wed" }]);
}

#[tokio::test]
async fn aggregate_unwind_attaches_identity() {
    let store = seeded().await;
    let activities = store.collection("activities");

    let unwound = activities
        .aggregate([doc! { "$unwind": "$participants" }, doc! { "$sort": { "participants": 1 } }])
        .await
        .unwrap();

    let pairs = unwound
        .iter()
        .map(|document| {
            (
                document.get_str("_id").unwrap().to_string(),
                document.get_str("participants").unwrap().to_string(),
            )
        })
        .collect::<Vec<_>>();

    assert_eq!(
        pairs,
        vec![
            ("Chess Club".to_string(), "daniel@mergington.edu".to_string()),
            ("Programming Class".to_string(), "emma@mergington.edu".to_string()),
            ("Chess Club".to_string(), "michael@mergington.edu".to_string()),
            ("Programming Class".to_string(), "sophia@mergington.edu".to_string()),
        ]
    );
}

#[tokio::test]
async fn aggregate_over_an_unknown_collection_is_empty() {
    let store = store().await;

    let results = store
        .collection("unknown")
        .aggregate([doc! { "$sort": { "_id": 1 } }])
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn returned_documents_do_not_alias_storage() {
    let store = seeded().await;
    let activities = store.collection("activities");

    let mut found = activities.find_one(doc! { "_id": "Chess Club" }).await.unwrap().unwrap();
    found.insert("max_participants", 99);
    found.get_array_mut("participants").unwrap().clear();

    let again = activities.find_one(doc! { "_id": "Chess Club" }).await.unwrap().unwrap();
    assert_eq!(again.get_i32("max_participants").unwrap(), 12);
    assert_eq!(again.get_array("participants").unwrap().len(), 2);
}

#[tokio::test]
async fn inserted_documents_do_not_alias_the_caller() {
    let store = store().await;
    let activities = store.collection("activities");

    let mut body = doc! { "_id": "Art Club", "participants": ["amelia@mergington.edu"] };
    activities.insert_one(body.clone()).await.unwrap();
    body.get_array_mut("participants").unwrap().push("harper@mergington.edu".into());

    let stored = activities.find_one(doc! { "_id": "Art Club" }).await.unwrap().unwrap();
    assert_eq!(stored.get_array("participants").unwrap().len(), 1);
}

#[tokio::test]
async fn collections_are_listed_once_created() {
    let store = DocumentStore::new(
        InMemoryStore::builder()
            .collection("teachers")
            .build()
            .await
            .unwrap(),
    );

    store.create_collection("activities").await.unwrap();
    store.create_collection("activities").await.unwrap();
    store.collection("rooms").insert_one(doc! { "_id": "101" }).await.unwrap();

    assert_eq!(store.list_collections().await.unwrap(), vec!["teachers", "activities", "rooms"]);
}
