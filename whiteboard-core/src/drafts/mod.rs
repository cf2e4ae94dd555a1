//! # Drafts
//!
//! Named, timestamped saves of the whiteboard's pixels, persisted as a single JSON list under
//! [`DRAFTS_KEY`], newest first. Every mutation rewrites the whole list.
//!
//! Loading a draft back onto the surface is owned by [`crate::state::WhiteboardState`], as it has
//! to sequence the asynchronous decode against everything else touching the surface. See
//! [`load`].

pub mod load;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    color::Color,
    storage::{KeyValueStore, StorageError, DRAFTS_KEY},
    surface::{PixelSurface, SurfaceError},
};

pub const DEFAULT_NAME_PREFIX: &str = "Draft";

#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDraft {
    pub id: String,
    pub name: String,
    /// `data:image/png;base64,...`
    pub data_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SaveOutcome {
    Saved(SavedDraft),
    /// Nothing but background on the surface, so nothing was stored.
    EmptyCanvas,
}

#[derive(thiserror::Error, Debug)]
pub enum DraftError {
    #[error("no draft with id {0:?}")]
    NotFound(String),
    #[error("couldn't encode the canvas: {0}")]
    Surface(#[from] SurfaceError),
    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("couldn't serialize drafts: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("image decode was abandoned")]
    LoadAbandoned,
}

/// `"<prefix> YYYY-MM-DD HH:MM:SS"`, in UTC.
#[must_use]
pub fn default_draft_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix} {}", now.format("%Y-%m-%d %H:%M:%S"))
}

/// `whiteboard-<ISO-8601>.png`, with `:` and `.` replaced by `-` to be filesystem friendly.
#[must_use]
pub fn download_file_name(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("whiteboard-{stamp}.png")
}

/// A rendered PNG of the surface, ready to be written out.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DownloadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
pub fn export_png(surface: &PixelSurface, now: DateTime<Utc>) -> Result<DownloadFile, DraftError> {
    Ok(DownloadFile {
        file_name: download_file_name(now),
        bytes: surface.encode_png()?,
    })
}

/// Owns the in-memory draft list and keeps the store in sync with it.
pub struct DraftGateway<Store> {
    store: Store,
    drafts: Vec<SavedDraft>,
}
impl<Store: KeyValueStore> DraftGateway<Store> {
    /// Read the persisted list. Unreadable or corrupt data is discarded, yielding an empty list;
    /// it'll be overwritten by the next successful save.
    pub fn new(store: Store) -> Self {
        let drafts = match store.get(DRAFTS_KEY) {
            Ok(None) => Vec::new(),
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Discarding corrupt draft list: {e}");
                Vec::new()
            }),
            Err(e) => {
                log::warn!("Couldn't read draft list: {e}");
                Vec::new()
            }
        };
        log::debug!("Loaded {} drafts", drafts.len());
        Self { store, drafts }
    }
    /// Newest first.
    #[must_use]
    pub fn drafts(&self) -> &[SavedDraft] {
        &self.drafts
    }
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SavedDraft> {
        self.drafts.iter().find(|draft| draft.id == id)
    }
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }
    /// Save the surface as a new draft at the front of the list.
    ///
    /// A surface holding nothing but `background` (or no pixels at all) is reported as
    /// [`SaveOutcome::EmptyCanvas`] and not stored. On error, neither the list nor the store
    /// changes.
    pub fn save(
        &mut self,
        surface: &PixelSurface,
        background: Color,
        name: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, DraftError> {
        if !surface.is_initialized() || surface.is_blank(background) {
            log::debug!("Not saving a blank canvas");
            return Ok(SaveOutcome::EmptyCanvas);
        }
        let data_url = surface.serialize_to_image()?;
        let draft = SavedDraft {
            id: self.unique_id(now),
            name: name.unwrap_or_else(|| default_draft_name(DEFAULT_NAME_PREFIX, now)),
            data_url,
            created_at: now,
        };

        let mut drafts = Vec::with_capacity(self.drafts.len() + 1);
        drafts.push(draft.clone());
        drafts.extend(self.drafts.iter().cloned());
        self.persist(drafts)?;

        log::info!("Saved draft {:?} ({})", draft.name, draft.id);
        Ok(SaveOutcome::Saved(draft))
    }
    /// Remove a draft. Unknown ids are a no-op, returning `Ok(None)`.
    pub fn delete(&mut self, id: &str) -> Result<Option<SavedDraft>, DraftError> {
        let Some(index) = self.drafts.iter().position(|draft| draft.id == id) else {
            log::debug!("Delete of unknown draft {id:?} ignored");
            return Ok(None);
        };
        let mut drafts = self.drafts.clone();
        let removed = drafts.remove(index);
        self.persist(drafts)?;
        Ok(Some(removed))
    }
    /// Write the whole list, adopting it in memory only once the store accepted it.
    fn persist(&mut self, drafts: Vec<SavedDraft>) -> Result<(), DraftError> {
        let json = serde_json::to_string(&drafts)?;
        self.store.set(DRAFTS_KEY, &json)?;
        self.drafts = drafts;
        Ok(())
    }
    /// Millisecond timestamp, suffixed if that's already taken.
    fn unique_id(&self, now: DateTime<Utc>) -> String {
        let base = now.timestamp_millis().to_string();
        let mut id = base.clone();
        let mut suffix = 1;
        while self.get(&id).is_some() {
            id = format!("{base}-{suffix}");
            suffix += 1;
        }
        id
    }
}

#[cfg(test)]
mod test {
    use super::{
        default_draft_name, download_file_name, DraftError, DraftGateway, SaveOutcome,
    };
    use crate::{
        color::Color,
        storage::{KeyValueStore, MemoryStore, StorageError, DRAFTS_KEY},
        surface::{PixelSurface, Point},
    };
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }
    fn drawn() -> PixelSurface {
        let mut surface = PixelSurface::new(20, 20);
        surface.fill_background(Color::WHITE);
        surface.stroke_segment(Point::new(2.0, 2.0), Point::new(15.0, 15.0), Color::BLACK, 2);
        surface
    }

    #[test]
    fn blank_is_not_saved() {
        let mut surface = PixelSurface::new(20, 20);
        surface.fill_background(Color::WHITE);
        let mut drafts = DraftGateway::new(MemoryStore::new());
        let outcome = drafts.save(&surface, Color::WHITE, None, at(0)).unwrap();
        assert_eq!(outcome, SaveOutcome::EmptyCanvas);
        assert!(drafts.drafts().is_empty());
        assert_eq!(drafts.store().get(DRAFTS_KEY).unwrap(), None);

        let outcome = drafts
            .save(&PixelSurface::default(), Color::WHITE, None, at(0))
            .unwrap();
        assert_eq!(outcome, SaveOutcome::EmptyCanvas);
    }
    #[test]
    fn newest_first_and_persisted() {
        let surface = drawn();
        let mut drafts = DraftGateway::new(MemoryStore::new());
        drafts.save(&surface, Color::WHITE, None, at(0)).unwrap();
        drafts
            .save(&surface, Color::WHITE, Some("second".into()), at(1))
            .unwrap();
        assert_eq!(drafts.drafts()[0].name, "second");
        assert_eq!(drafts.drafts()[1].name, default_draft_name("Draft", at(0)));

        // A fresh gateway over the same store sees the same list.
        let reopened = DraftGateway::new(drafts.store().clone());
        assert_eq!(reopened.drafts(), drafts.drafts());
    }
    #[test]
    fn json_shape() {
        let mut drafts = DraftGateway::new(MemoryStore::new());
        drafts.save(&drawn(), Color::WHITE, None, at(0)).unwrap();
        let json = drafts.store().get(DRAFTS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value[0];
        assert_eq!(first["id"], "1700000000000");
        assert!(first["dataUrl"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
        assert_eq!(first["createdAt"], "2023-11-14T22:13:20Z");
    }
    #[test]
    fn ids_unique_within_same_millisecond() {
        let surface = drawn();
        let mut drafts = DraftGateway::new(MemoryStore::new());
        for _ in 0..3 {
            drafts.save(&surface, Color::WHITE, None, at(0)).unwrap();
        }
        let ids: Vec<_> = drafts.drafts().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["1700000000000-2", "1700000000000-1", "1700000000000"]);
    }
    #[test]
    fn corrupt_list_falls_back_to_empty() {
        let mut store = MemoryStore::new();
        store.set(DRAFTS_KEY, "{not json").unwrap();
        let mut drafts = DraftGateway::new(store);
        assert!(drafts.drafts().is_empty());
        // And is overwritten by the next save.
        drafts.save(&drawn(), Color::WHITE, None, at(0)).unwrap();
        let reopened = DraftGateway::new(drafts.store().clone());
        assert_eq!(reopened.drafts().len(), 1);
    }
    #[test]
    fn write_failure_keeps_memory() {
        let mut drafts = DraftGateway::new(MemoryStore::with_quota(16));
        let result = drafts.save(&drawn(), Color::WHITE, None, at(0));
        assert!(matches!(
            result,
            Err(DraftError::Storage(StorageError::QuotaExceeded))
        ));
        assert!(drafts.drafts().is_empty());
    }
    #[test]
    fn delete() {
        let mut drafts = DraftGateway::new(MemoryStore::new());
        drafts.save(&drawn(), Color::WHITE, None, at(0)).unwrap();
        drafts.save(&drawn(), Color::WHITE, None, at(1)).unwrap();
        let removed = drafts.delete("1700000000000").unwrap().unwrap();
        assert_eq!(removed.created_at, at(0));
        assert_eq!(drafts.drafts().len(), 1);
        assert!(drafts.delete("1700000000000").unwrap().is_none());
        let reopened = DraftGateway::new(drafts.store().clone());
        assert_eq!(reopened.drafts().len(), 1);
    }
    #[test]
    fn download_name() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            download_file_name(now),
            "whiteboard-2023-11-14T22-13-20-123Z.png"
        );
    }
}
