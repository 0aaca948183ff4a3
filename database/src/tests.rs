#[cfg(test)]
mod database_tests {
    use crate::*;
    use serde_json::json;
    use types::{ExternalIdentity, Payload, SlotIndex};

    pub async fn setup_test_db() -> sqlx::sqlite::SqlitePool {
        let pool = DatabaseConfig::new("sqlite::memory:")
            .create_pool()
            .await
            .expect("Failed to create test database pool");

        run_migrations(&pool)
            .await
            .expect("Failed to run test migrations");

        pool
    }

    fn payload(value: serde_json::Value) -> Payload {
        match value {
            serde_json::Value::Object(map) => Payload::new(map),
            other => panic!("not an object: {other}"),
        }
    }

    fn index(i: i64) -> SlotIndex {
        SlotIndex::new(i).unwrap()
    }

    #[tokio::test]
    async fn test_new_player_gets_default_flags() {
        let pool = setup_test_db().await;
        let directory = PlayerDirectory::new(pool);

        let player = directory
            .resolve_or_create(&ExternalIdentity::new("account-1"))
            .await
            .expect("Failed to create player");

        assert_eq!(player.identity.as_str(), "account-1");
        assert!(!player.played_in_alpha);
        assert!(player.played_in_beta);
    }

    #[tokio::test]
    async fn test_resolve_or_create_is_idempotent() {
        let pool = setup_test_db().await;
        let directory = PlayerDirectory::new(pool.clone());
        let identity = ExternalIdentity::new("account-2");

        let first = directory.resolve_or_create(&identity).await.unwrap();
        let second = directory.resolve_or_create(&identity).await.unwrap();
        assert_eq!(first, second);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_existing_player_is_returned_unchanged() {
        let pool = setup_test_db().await;
        let directory = PlayerDirectory::new(pool.clone());
        let identity = ExternalIdentity::new("veteran");

        let created = directory.resolve_or_create(&identity).await.unwrap();
        sqlx::query("UPDATE players SET played_in_alpha = 1 WHERE id = ?")
            .bind(created.id)
            .execute(&pool)
            .await
            .unwrap();

        let resolved = directory.resolve_or_create(&identity).await.unwrap();
        assert_eq!(resolved.id, created.id);
        assert!(resolved.played_in_alpha);
    }

    #[tokio::test]
    async fn test_find_unknown_identity() {
        let pool = setup_test_db().await;
        let directory = PlayerDirectory::new(pool);

        let found = directory
            .find(&ExternalIdentity::new("nobody"))
            .await
            .expect("lookup");
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_slot_store_tri_state() {
        let pool = setup_test_db().await;
        let player = PlayerDirectory::new(pool.clone())
            .resolve_or_create(&ExternalIdentity::new("slots"))
            .await
            .unwrap();
        let store = SaveSlotStore::for_player(&player);
        let mut conn = pool.acquire().await.unwrap();

        let state = store.state(&mut conn, index(1)).await.unwrap();
        assert_eq!(state, SlotState::Absent);

        let slot = store.create(&mut conn, index(1)).await.unwrap();
        assert_eq!(slot.index, index(1));
        assert!(matches!(
            store.state(&mut conn, index(1)).await.unwrap(),
            SlotState::SlotOnly(_)
        ));

        SaveSlotDataStore
            .insert(&mut conn, &slot, payload(json!({"level": 3})))
            .await
            .unwrap();
        match store.state(&mut conn, index(1)).await.unwrap() {
            SlotState::Complete(found, data) => {
                assert_eq!(found.id, slot.id);
                assert_eq!(data.payload, payload(json!({"level": 3})));
            }
            other => panic!("expected complete slot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_slot_is_a_uniqueness_conflict() {
        let pool = setup_test_db().await;
        let player = PlayerDirectory::new(pool.clone())
            .resolve_or_create(&ExternalIdentity::new("dupe"))
            .await
            .unwrap();
        let store = SaveSlotStore::for_player(&player);
        let mut conn = pool.acquire().await.unwrap();

        store.create(&mut conn, index(2)).await.unwrap();
        let err = store.create(&mut conn, index(2)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UniquenessConflict);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_list_with_data_orders_by_index() {
        let pool = setup_test_db().await;
        let player = PlayerDirectory::new(pool.clone())
            .resolve_or_create(&ExternalIdentity::new("lister"))
            .await
            .unwrap();
        let store = SaveSlotStore::for_player(&player);
        let mut conn = pool.acquire().await.unwrap();

        let fifth = store.create(&mut conn, index(5)).await.unwrap();
        store.create(&mut conn, index(3)).await.unwrap();
        SaveSlotDataStore
            .insert(&mut conn, &fifth, payload(json!({"boss": "defeated"})))
            .await
            .unwrap();

        let listed = store.list_with_data(&mut conn).await.unwrap();
        let indices: Vec<u8> = listed.iter().map(|(s, _)| s.index.get()).collect();
        assert_eq!(indices, vec![3, 5]);
        assert!(listed[0].1.is_none());
        assert_eq!(
            listed[1].1.as_ref().map(|d| d.payload.clone()),
            Some(payload(json!({"boss": "defeated"})))
        );
    }

    #[tokio::test]
    async fn test_overwrite_replaces_payload() {
        let pool = setup_test_db().await;
        let player = PlayerDirectory::new(pool.clone())
            .resolve_or_create(&ExternalIdentity::new("overwriter"))
            .await
            .unwrap();
        let store = SaveSlotStore::for_player(&player);
        let mut conn = pool.acquire().await.unwrap();

        let slot = store.create(&mut conn, index(4)).await.unwrap();
        let first = SaveSlotDataStore
            .insert(&mut conn, &slot, payload(json!({"a": 1, "b": 2})))
            .await
            .unwrap();
        let second = SaveSlotDataStore
            .overwrite(&mut conn, first.clone(), payload(json!({"c": 3})))
            .await
            .unwrap();
        assert_eq!(second.created_at, first.created_at);

        let stored = SaveSlotDataStore
            .find(&mut conn, slot.id)
            .await
            .unwrap()
            .expect("payload row");
        assert_eq!(stored.payload, payload(json!({"c": 3})));
    }

    #[tokio::test]
    async fn test_noop_observer() {
        let observer = NoopObserver;
        let event = SlotSavedEvent {
            player_id: 1,
            identity: ExternalIdentity::new("x"),
            index: index(1),
            path: SavePath::Created,
            saved_at: chrono::Utc::now(),
        };

        observer
            .slot_saved(&event)
            .await
            .expect("NoopObserver should always succeed");
    }
}
