//! QA tests for the exhibition store and its persistence.
//!
//! Run with: `cargo test -p zaitouna-core --test qa_store`

use tempfile::TempDir;
use zaitouna_core::seed::{DEFAULT_EXHIBITION_ID, DEFAULT_NARRATIVE_COUNT};
use zaitouna_core::store::decode;
use zaitouna_core::testing::FailingStore;
use zaitouna_core::{
    ExhibitionId, ExhibitionPatch, ExhibitionStore, FileStore, KvStore, LayoutPolicy,
    MemoryStore, NarrativeId, StoreError, VillageContext, STORE_KEY,
};

// =============================================================================
// File-backed round trip
// =============================================================================

#[tokio::test]
async fn test_file_store_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let mut store = ExhibitionStore::load(FileStore::new(temp_dir.path())).await;
    let id = store
        .create("Testour", "Béja", "Andalusian terraces")
        .await
        .expect("create should persist");
    store
        .apply_layout(&id, LayoutPolicy::Rectangle)
        .await
        .expect("layout should persist");
    store
        .set_intro(&id, "Welcome to Testour".to_string())
        .await
        .expect("intro should persist");

    let reloaded = ExhibitionStore::load(FileStore::new(temp_dir.path())).await;
    assert_eq!(reloaded.all(), store.all());
    assert_eq!(reloaded.all()[0].id, id);
    assert_eq!(
        reloaded.get(&id).and_then(|ex| ex.intro.as_deref()),
        Some("Welcome to Testour")
    );
}

#[tokio::test]
async fn test_first_load_seeds_without_writing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let kv = FileStore::new(temp_dir.path());

    let store = ExhibitionStore::load(kv.clone()).await;
    assert_eq!(store.len(), 1);
    assert_eq!(store.all()[0].id.as_str(), DEFAULT_EXHIBITION_ID);
    assert_eq!(store.all()[0].items.len(), DEFAULT_NARRATIVE_COUNT);
    assert!(kv.get(STORE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_corrupt_file_falls_back_to_seed() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let kv = FileStore::new(temp_dir.path());
    kv.set(STORE_KEY, "{ not json").await.unwrap();

    let mut store = ExhibitionStore::load(kv.clone()).await;
    assert_eq!(store.len(), 1);
    assert_eq!(store.all()[0].id.as_str(), DEFAULT_EXHIBITION_ID);

    store.create_named("Mahdia").await.expect("writes continue after backup");

    let backups: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("exhibition_platform_data_backup_"))
        .collect();
    assert_eq!(backups.len(), 1);
    let saved = std::fs::read_to_string(temp_dir.path().join(&backups[0])).unwrap();
    assert_eq!(saved, "{ not json");
}

#[tokio::test]
async fn test_unreadable_store_refuses_writes() {
    let mut store = ExhibitionStore::load(FailingStore::new()).await;
    assert!(store.is_locked());
    assert_eq!(store.all()[0].id.as_str(), DEFAULT_EXHIBITION_ID);

    let id = store.all()[0].id.clone();
    assert!(matches!(store.create_named("Nabeul").await, Err(StoreError::Locked)));
    assert!(matches!(
        store.set_intro(&id, "text".to_string()).await,
        Err(StoreError::Locked)
    ));
    assert_eq!(store.len(), 1);
}

// =============================================================================
// Legacy narrative ids
// =============================================================================

const FRACTIONAL_ID_BLOB: &str = r#"[
    {
        "id": "ex-1712345678901",
        "slug": "el-jem",
        "context": { "name": "El Jem", "location": "Mahdia", "story": "Amphitheatre groves" },
        "items": [
            { "id": 0.4721, "title": "Press", "writer": "Amel", "image": "", "audioUrl": "", "description": "", "x": 85, "y": 50 },
            { "id": 3, "title": "Jar", "writer": "Hedi", "image": "", "audioUrl": "", "description": "", "x": 15, "y": 50 },
            { "id": "n-7", "title": "Tree", "writer": "Sonia", "image": "", "audioUrl": "", "description": "", "x": 50, "y": 15 }
        ],
        "createdAt": 1712345678901
    }
]"#;

#[tokio::test]
async fn test_fractional_ids_load_and_survive_writes() {
    let kv = MemoryStore::with_entry(STORE_KEY, FRACTIONAL_ID_BLOB);
    let mut store = ExhibitionStore::load(kv.clone()).await;

    assert!(!store.is_locked());
    assert_eq!(store.len(), 1);
    assert_eq!(store.all()[0].slug, "el-jem");
    assert_eq!(store.all()[0].items[0].id, "0.4721".parse::<NarrativeId>().unwrap());
    assert_eq!(store.all()[0].items[2].id, NarrativeId::from("n-7"));

    let el_jem = store.all()[0].id.clone();
    let added = store.add_narrative(&el_jem).await.unwrap();
    assert_eq!(added, Some(NarrativeId::new(4)));
    store.create_named("Gafsa").await.unwrap();

    let blob = kv.get(STORE_KEY).await.unwrap().expect("blob written");
    assert!(blob.contains("\"el-jem\""));
    assert!(blob.contains("\"id\":0.4721"));
    assert!(blob.contains("\"id\":\"n-7\""));

    let reloaded = ExhibitionStore::load(kv.clone()).await;
    assert_eq!(reloaded.all(), store.all());
    assert_eq!(kv.keys().await, vec![STORE_KEY.to_string()]);
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn test_newest_first() {
    let mut store = ExhibitionStore::load(MemoryStore::new()).await;
    let first = store.create_named("Tozeur").await.unwrap();
    let second = store.create_named("Kairouan").await.unwrap();

    let ids: Vec<&ExhibitionId> = store.all().iter().map(|ex| &ex.id).collect();
    assert_eq!(ids[0], &second);
    assert_eq!(ids[1], &first);
    assert_eq!(ids[2].as_str(), DEFAULT_EXHIBITION_ID);
    assert_eq!(store.find_by_slug("kairouan").map(|ex| &ex.id), Some(&second));
}

// =============================================================================
// Updates
// =============================================================================

#[tokio::test]
async fn test_update_unknown_id_changes_nothing() {
    let kv = MemoryStore::new();
    let mut store = ExhibitionStore::load(kv.clone()).await;
    let before = store.all().to_vec();

    let patch = ExhibitionPatch::context(VillageContext {
        name: "Nowhere".into(),
        location: "-".into(),
        story: "-".into(),
    });
    let changed = store
        .update(&ExhibitionId::from("ex-missing"), patch)
        .await
        .unwrap();

    assert!(!changed);
    assert_eq!(store.all(), before.as_slice());
    assert!(kv.is_empty().await, "nothing should be written");
}

#[tokio::test]
async fn test_update_rejects_duplicate_narrative_ids() {
    let mut store = ExhibitionStore::load(MemoryStore::new()).await;
    let id = store.all()[0].id.clone();

    let mut items = store.all()[0].items.clone();
    items[1].id = items[0].id.clone();
    let result = store.update(&id, ExhibitionPatch::items(items)).await;

    assert!(matches!(
        result,
        Err(StoreError::DuplicateNarrativeId(ref dup)) if *dup == NarrativeId::new(1)
    ));
    assert_eq!(store.all()[0].items[1].id, NarrativeId::new(2));
}

#[tokio::test]
async fn test_added_narrative_gets_fresh_id() {
    let mut store = ExhibitionStore::load(MemoryStore::new()).await;
    let id = store.all()[0].id.clone();

    let added = store.add_narrative(&id).await.unwrap();
    assert_eq!(added, Some(NarrativeId::new(DEFAULT_NARRATIVE_COUNT as u64 + 1)));

    let ex = store.get(&id).unwrap();
    assert_eq!(ex.items.len(), DEFAULT_NARRATIVE_COUNT + 1);
    assert_eq!(ex.items.last().map(|n| (n.x, n.y)), Some((50.0, 50.0)));
}

// =============================================================================
// Legacy blobs
// =============================================================================

#[test]
fn test_decode_camel_case_blob() {
    let blob = r#"[
        {
            "id": "ex-1712345678901",
            "slug": "el-jem",
            "context": { "name": "El Jem", "location": "Mahdia", "story": "Amphitheatre groves" },
            "items": [
                {
                    "id": 1712345679000,
                    "title": "Press",
                    "writer": "Amel",
                    "image": "data:image/png;base64,AAAA",
                    "audioUrl": "https://example.org/a.mp3",
                    "description": "Stone press",
                    "x": 85,
                    "y": 50
                }
            ],
            "createdAt": 1712345678901,
            "aiIntro": "Welcome"
        },
        {
            "id": "ex-2",
            "slug": "sfax",
            "context": { "name": "Sfax", "location": "Sfax", "story": "" },
            "items": [],
            "createdAt": 1712345600000
        }
    ]"#;

    let list = decode(blob).expect("blob should decode");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].items[0].id, NarrativeId::new(1712345679000));
    assert_eq!(list[0].items[0].audio_url, "https://example.org/a.mp3");
    assert_eq!(list[0].intro.as_deref(), Some("Welcome"));
    assert!(list[1].intro.is_none());

    let reencoded = serde_json::to_string(&list).unwrap();
    assert!(reencoded.contains("\"audioUrl\""));
    assert!(reencoded.contains("\"createdAt\""));
    assert!(reencoded.contains("\"aiIntro\""));
}
