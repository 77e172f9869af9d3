//! The exhibition collection and its mutation contracts.
//!
//! The store owns the only copy of the collection. Every mutation is
//! transactional: it is applied in memory, the whole collection is written
//! through the [`KvStore`], and if that write fails the in-memory change is
//! rolled back before the error is returned. When a mutating call returns,
//! memory and storage agree.

use crate::layout::{self, LayoutPolicy};
use crate::model::{slugify, Exhibition, ExhibitionId, Narrative, NarrativeId, VillageContext};
use crate::persist::{KvStore, PersistError};
use crate::seed;
use thiserror::Error;

/// Key the collection is stored under.
pub const STORE_KEY: &str = "exhibition_platform_data";

/// Errors from store mutations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write failed; the mutation was rolled back.
    #[error("Persist error: {0}")]
    Persist(#[from] PersistError),

    #[error("Narrative id {0} appears more than once")]
    DuplicateNarrativeId(NarrativeId),

    #[error("Cannot remove the last exhibition")]
    LastExhibition,

    /// The stored collection could not be read or backed up, so it is never
    /// overwritten.
    #[error("Stored collection is unreadable; refusing to overwrite it")]
    Locked,
}

/// A shallow update. Each present field replaces the old value wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExhibitionPatch {
    pub slug: Option<String>,
    pub context: Option<VillageContext>,
    pub items: Option<Vec<Narrative>>,
    pub intro: Option<String>,
}

impl ExhibitionPatch {
    pub fn context(context: VillageContext) -> Self {
        Self {
            context: Some(context),
            ..Self::default()
        }
    }

    pub fn items(items: Vec<Narrative>) -> Self {
        Self {
            items: Some(items),
            ..Self::default()
        }
    }

    pub fn intro(intro: impl Into<String>) -> Self {
        Self {
            intro: Some(intro.into()),
            ..Self::default()
        }
    }

    fn apply_to(self, ex: &mut Exhibition) {
        if let Some(slug) = self.slug {
            ex.slug = slug;
        }
        if let Some(context) = self.context {
            ex.context = context;
        }
        if let Some(items) = self.items {
            ex.items = items;
        }
        if let Some(intro) = self.intro {
            ex.intro = Some(intro);
        }
    }
}

/// In-memory exhibition collection, newest first, backed by a [`KvStore`].
pub struct ExhibitionStore<S: KvStore> {
    kv: S,
    key: String,
    exhibitions: Vec<Exhibition>,
    locked: bool,
}

impl<S: KvStore> ExhibitionStore<S> {
    /// Load the collection stored under [`STORE_KEY`].
    pub async fn load(kv: S) -> Self {
        Self::load_with_key(kv, STORE_KEY).await
    }

    /// Load the collection stored under `key`.
    ///
    /// Never fails and never comes back empty: a missing, unreadable,
    /// undecodable or empty blob yields the single seeded exhibition.
    ///
    /// An undecodable blob is copied to a `<key>_backup_<millis>` key before
    /// anything can overwrite it. If that copy fails, or the blob could not
    /// be read at all, the store is [locked](Self::is_locked).
    pub async fn load_with_key(kv: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let (exhibitions, locked) = match kv.get(&key).await {
            Ok(Some(blob)) => match decode(&blob) {
                Ok(list) if !list.is_empty() => {
                    tracing::info!(count = list.len(), "loaded exhibitions");
                    (list, false)
                }
                Ok(_) => {
                    tracing::info!("stored collection is empty, seeding default exhibition");
                    (vec![seed::default_exhibition()], false)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored collection is malformed, seeding default exhibition");
                    let kept = back_up(&kv, &key, &blob).await;
                    (vec![seed::default_exhibition()], !kept)
                }
            },
            Ok(None) => {
                tracing::info!("no stored collection, seeding default exhibition");
                (vec![seed::default_exhibition()], false)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored collection, seeding default exhibition with writes disabled");
                (vec![seed::default_exhibition()], true)
            }
        };

        Self {
            kv,
            key,
            exhibitions,
            locked,
        }
    }

    /// Whether mutations are refused to protect a stored blob that could not
    /// be loaded.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn all(&self) -> &[Exhibition] {
        &self.exhibitions
    }

    pub fn len(&self) -> usize {
        self.exhibitions.len()
    }

    /// Always false after `load`; kept for the usual `len` pairing.
    pub fn is_empty(&self) -> bool {
        self.exhibitions.is_empty()
    }

    pub fn get(&self, id: &ExhibitionId) -> Option<&Exhibition> {
        self.exhibitions.iter().find(|ex| &ex.id == id)
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Exhibition> {
        self.exhibitions.iter().find(|ex| ex.slug == slug)
    }

    pub fn contains(&self, id: &ExhibitionId) -> bool {
        self.get(id).is_some()
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Write the whole collection, replacing any previous blob.
    pub async fn persist(&self) -> Result<(), PersistError> {
        let blob = serde_json::to_string(&self.exhibitions)?;
        self.kv.set(&self.key, &blob).await
    }

    /// Create an exhibition with the seeded narratives and put it first.
    pub async fn create(
        &mut self,
        name: &str,
        location: &str,
        story: &str,
    ) -> Result<ExhibitionId, StoreError> {
        let exhibition = Exhibition {
            id: ExhibitionId::generate(),
            slug: slugify(name),
            context: VillageContext {
                name: name.to_string(),
                location: location.to_string(),
                story: story.to_string(),
            },
            items: seed::default_narratives(),
            created_at: chrono::Utc::now().timestamp_millis(),
            intro: None,
        };
        let id = exhibition.id.clone();

        self.transact(|list| {
            list.insert(0, exhibition);
            Ok(())
        })
        .await?;

        tracing::info!(exhibition = %id, name, "created exhibition");
        Ok(id)
    }

    /// Create with the default location and story.
    pub async fn create_named(&mut self, name: &str) -> Result<ExhibitionId, StoreError> {
        self.create(name, seed::DEFAULT_LOCATION, seed::DEFAULT_STORY)
            .await
    }

    /// Shallow-merge `patch` into the exhibition with `id`.
    ///
    /// Returns `Ok(false)` without touching anything when no exhibition
    /// matches.
    pub async fn update(
        &mut self,
        id: &ExhibitionId,
        patch: ExhibitionPatch,
    ) -> Result<bool, StoreError> {
        if !self.contains(id) {
            tracing::debug!(exhibition = %id, "update ignored, no such exhibition");
            return Ok(false);
        }
        if let Some(dup) = patch
            .items
            .as_deref()
            .and_then(Exhibition::duplicate_narrative_id)
        {
            return Err(StoreError::DuplicateNarrativeId(dup));
        }

        self.with_exhibition(id, |ex| {
            patch.apply_to(ex);
            Ok(())
        })
        .await?;
        Ok(true)
    }

    /// Append a template narrative at the canvas center.
    pub async fn add_narrative(
        &mut self,
        id: &ExhibitionId,
    ) -> Result<Option<NarrativeId>, StoreError> {
        let Some(ex) = self.get(id) else {
            tracing::debug!(exhibition = %id, "add ignored, no such exhibition");
            return Ok(None);
        };
        let narrative_id = ex.next_narrative_id();
        let template = seed::new_narrative(narrative_id.clone());

        self.with_exhibition(id, |ex| {
            ex.items.push(template);
            Ok(())
        })
        .await?;
        Ok(Some(narrative_id))
    }

    /// Replace the narrative with the same id as `narrative`.
    pub async fn update_narrative(
        &mut self,
        id: &ExhibitionId,
        narrative: Narrative,
    ) -> Result<bool, StoreError> {
        let found = self
            .get(id)
            .is_some_and(|ex| ex.narrative(&narrative.id).is_some());
        if !found {
            tracing::debug!(exhibition = %id, narrative = %narrative.id, "narrative update ignored");
            return Ok(false);
        }

        self.with_exhibition(id, |ex| {
            if let Some(slot) = ex.narrative_mut(&narrative.id) {
                *slot = narrative;
            }
            Ok(())
        })
        .await?;
        Ok(true)
    }

    /// Re-position every narrative with `policy`.
    pub async fn apply_layout(
        &mut self,
        id: &ExhibitionId,
        policy: LayoutPolicy,
    ) -> Result<bool, StoreError> {
        if !self.contains(id) {
            tracing::debug!(exhibition = %id, "layout ignored, no such exhibition");
            return Ok(false);
        }

        self.with_exhibition(id, |ex| {
            layout::apply(policy, &mut ex.items);
            Ok(())
        })
        .await?;
        tracing::info!(exhibition = %id, %policy, "applied layout");
        Ok(true)
    }

    /// Cache a generated introduction.
    pub async fn set_intro(&mut self, id: &ExhibitionId, intro: String) -> Result<bool, StoreError> {
        self.update(id, ExhibitionPatch::intro(intro)).await
    }

    /// Remove an exhibition. The last remaining one cannot be removed.
    pub async fn remove(&mut self, id: &ExhibitionId) -> Result<bool, StoreError> {
        if !self.contains(id) {
            return Ok(false);
        }
        if self.exhibitions.len() == 1 {
            return Err(StoreError::LastExhibition);
        }

        self.transact(|list| {
            list.retain(|ex| &ex.id != id);
            Ok(())
        })
        .await?;
        tracing::info!(exhibition = %id, "removed exhibition");
        Ok(true)
    }

    async fn with_exhibition<F>(&mut self, id: &ExhibitionId, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Exhibition) -> Result<(), StoreError>,
    {
        self.transact(|list| match list.iter_mut().find(|ex| &ex.id == id) {
            Some(ex) => f(ex),
            None => Ok(()),
        })
        .await
    }

    /// Apply `f`, persist, and roll back if either step fails.
    async fn transact<F, T>(&mut self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Vec<Exhibition>) -> Result<T, StoreError>,
    {
        if self.locked {
            tracing::warn!("mutation refused, stored collection is locked");
            return Err(StoreError::Locked);
        }
        let snapshot = self.exhibitions.clone();

        let value = match f(&mut self.exhibitions) {
            Ok(value) => value,
            Err(e) => {
                self.exhibitions = snapshot;
                return Err(e);
            }
        };

        if let Err(e) = self.persist().await {
            tracing::warn!(error = %e, "persist failed, rolling back");
            self.exhibitions = snapshot;
            return Err(e.into());
        }
        Ok(value)
    }
}

/// Copy an undecodable blob aside. Returns whether the copy was written.
async fn back_up<S: KvStore>(kv: &S, key: &str, blob: &str) -> bool {
    let backup = format!("{key}_backup_{}", chrono::Utc::now().timestamp_millis());
    match kv.set(&backup, blob).await {
        Ok(()) => {
            tracing::warn!(backup = %backup, "kept undecodable collection");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to back up undecodable collection");
            false
        }
    }
}

/// Decode a stored collection.
pub fn decode(blob: &str) -> Result<Vec<Exhibition>, serde_json::Error> {
    serde_json::from_str(blob)
}
