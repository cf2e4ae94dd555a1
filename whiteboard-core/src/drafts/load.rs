//! Asynchronous draft decoding.
//!
//! Decoding a PNG can take a while, so it is done on the rayon pool and the result delivered
//! through a oneshot channel. Each request carries a [`LoadId`]; the state applies a result only
//! if its id is still the latest requested, silently dropping superseded ones.

use image::RgbaImage;

use super::{DraftError, SavedDraft};
use crate::{id::UniqueId, surface::decode_data_url};

/// Namespace for [`LoadId`].
pub struct LoadTicket;
pub type LoadId = UniqueId<LoadTicket>;

/// A decode in flight.
pub struct PendingLoad {
    id: LoadId,
    draft: SavedDraft,
    receiver: tokio::sync::oneshot::Receiver<Result<RgbaImage, DraftError>>,
}
impl PendingLoad {
    /// Begin decoding `draft` in the background.
    pub(crate) fn spawn(id: LoadId, draft: SavedDraft) -> Self {
        let (sender, receiver) = tokio::sync::oneshot::channel();
        let data_url = draft.data_url.clone();
        rayon::spawn(move || {
            let decoded = decode_data_url(&data_url).map_err(DraftError::from);
            // Receiver gone means nobody cares anymore.
            let _ = sender.send(decoded);
        });
        Self {
            id,
            draft,
            receiver,
        }
    }
    #[must_use]
    pub fn id(&self) -> LoadId {
        self.id
    }
    /// Wait for the decode to complete.
    pub async fn finish(self) -> LoadedDraft {
        let image = self
            .receiver
            .await
            .unwrap_or(Err(DraftError::LoadAbandoned));
        LoadedDraft {
            id: self.id,
            draft: self.draft,
            image,
        }
    }
    /// Block the current thread until the decode completes.
    ///
    /// # Panics
    /// If called from within an async runtime.
    #[must_use]
    pub fn blocking_finish(self) -> LoadedDraft {
        let image = self
            .receiver
            .blocking_recv()
            .unwrap_or(Err(DraftError::LoadAbandoned));
        LoadedDraft {
            id: self.id,
            draft: self.draft,
            image,
        }
    }
}

/// A completed decode, to be handed back to the state that requested it.
#[derive(Debug)]
pub struct LoadedDraft {
    pub id: LoadId,
    pub draft: SavedDraft,
    pub image: Result<RgbaImage, DraftError>,
}

/// What became of a completed load.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LoadOutcome {
    /// Painted onto the surface; history now starts here.
    Applied(SavedDraft),
    /// A newer load was requested in the meantime; this one was dropped.
    Superseded,
    /// Decoded, but there was no surface to paint onto.
    Discarded(SavedDraft),
}
