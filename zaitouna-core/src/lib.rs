//! Spatial exhibition engine.
//!
//! This crate provides:
//! - Deterministic layout policies for placing narratives on a canvas
//! - The proximity engine that turns a pointer position into focus,
//!   visual weights and audio volumes
//! - A persisted exhibition store with transactional mutations
//! - Generate-once introductions via Claude
//! - `Gallery`, the interaction shell tying them together
//!
//! # Quick Start
//!
//! ```ignore
//! use zaitouna_core::{Gallery, GalleryConfig, FileStore, LayoutPolicy, MockGenerator, Role};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = GalleryConfig::new().with_data_dir("gallery-data");
//!     let kv = FileStore::new(&config.data_dir);
//!     let mut gallery = Gallery::open(config, kv, MockGenerator::always("Welcome")).await;
//!
//!     let id = gallery.create_exhibition("Sidi Bouzid").await.unwrap().unwrap();
//!     gallery.open_as(Role::Curator);
//!     gallery.apply_layout(LayoutPolicy::Square).await.unwrap();
//!
//!     assert_eq!(gallery.active().unwrap().id, id);
//! }
//! ```

pub mod config;
pub mod gallery;
pub mod intro;
pub mod layout;
pub mod media;
pub mod model;
pub mod persist;
pub mod playback;
pub mod proximity;
pub mod seed;
pub mod share;
pub mod store;
pub mod testing;

// Primary public API
pub use config::GalleryConfig;
pub use gallery::{AppState, Gallery, IntroRequest, Role, View, Viewport};
pub use intro::{ClaudeWriter, GenerateError, IntroGate, IntroGenerator, OfflineGenerator};
pub use layout::LayoutPolicy;
pub use model::{Exhibition, ExhibitionId, Narrative, NarrativeId, Point, VillageContext};
pub use persist::{FileStore, KvStore, MemoryStore, PersistError};
pub use playback::{AudioBackend, AudioDeck, PlaybackError};
pub use proximity::{Attention, ItemWeight};
pub use share::SharePayload;
pub use store::{ExhibitionPatch, ExhibitionStore, StoreError, STORE_KEY};
pub use testing::{MockGenerator, MockReply, RecordingAudio};
