//! # Session
//!
//! The user-facing side of a whiteboard: wires the [`WhiteboardState`] to draft and theme
//! storage, and turns every outcome into a notification. Nothing here returns an error; failures
//! are reported to the [`Notifier`] and the session carries on.

use chrono::{DateTime, Utc};

use crate::{
    drafts::{
        default_draft_name,
        load::{LoadOutcome, LoadedDraft, PendingLoad},
        DownloadFile, DraftError, DraftGateway, SaveOutcome, SavedDraft,
    },
    notify::{EnglishCatalog, Notification, Notifier, Translator},
    state::WhiteboardState,
    storage::{KeyValueStore, THEME_KEY},
    theme::Theme,
};

pub struct Session<Store, Notify, Translate = EnglishCatalog> {
    state: WhiteboardState,
    drafts: DraftGateway<Store>,
    notifier: Notify,
    translator: Translate,
}
impl<Store, Notify, Translate> Session<Store, Notify, Translate>
where
    Store: KeyValueStore,
    Notify: Notifier,
    Translate: Translator,
{
    /// Open a session over `store`, restoring the persisted theme and draft list.
    pub fn new(
        store: Store,
        notifier: Notify,
        translator: Translate,
        width: u32,
        height: u32,
    ) -> Self {
        let theme = read_theme(&store);
        Self {
            state: WhiteboardState::with_size(width, height, theme),
            drafts: DraftGateway::new(store),
            notifier,
            translator,
        }
    }
    #[must_use]
    pub fn state(&self) -> &WhiteboardState {
        &self.state
    }
    /// Direct access for pointer, tool, text and undo input.
    pub fn state_mut(&mut self) -> &mut WhiteboardState {
        &mut self.state
    }
    /// Newest first.
    #[must_use]
    pub fn drafts(&self) -> &[SavedDraft] {
        self.drafts.drafts()
    }
    #[must_use]
    pub fn notifier(&self) -> &Notify {
        &self.notifier
    }
    #[must_use]
    pub fn store(&self) -> &Store {
        self.drafts.store()
    }

    /// Apply and remember a theme.
    pub fn set_theme(&mut self, theme: Theme) {
        self.state.apply_theme(theme);
        if let Err(e) = self.drafts.store_mut().set(THEME_KEY, theme.id()) {
            log::warn!("Couldn't persist theme {theme}: {e}");
            self.notify_error(
                "whiteboard.themeSaveErrorTitle",
                "whiteboard.themeSaveErrorDescription",
                &[],
            );
        }
    }
    /// Save the canvas as a new draft, named after the current time unless `name` is given.
    pub fn save_draft(&mut self, name: Option<String>, now: DateTime<Utc>) -> Option<SavedDraft> {
        let name = name.unwrap_or_else(|| {
            default_draft_name(&self.translator.t("whiteboard.draftNamePrefix", &[]), now)
        });
        match self.state.save_draft(&mut self.drafts, Some(name), now) {
            Ok(SaveOutcome::Saved(draft)) => {
                self.notify_info(
                    "whiteboard.draftSavedTitle",
                    "whiteboard.draftSavedDescription",
                    &[("draftName", &draft.name)],
                );
                Some(draft)
            }
            Ok(SaveOutcome::EmptyCanvas) => {
                self.notify_info(
                    "whiteboard.emptyCanvasTitle",
                    "whiteboard.emptyCanvasDescription",
                    &[],
                );
                None
            }
            Err(e) => {
                log::error!("Failed to save draft: {e}");
                self.notify_error(
                    "whiteboard.draftSaveErrorTitle",
                    "whiteboard.draftSaveErrorDescription",
                    &[],
                );
                None
            }
        }
    }
    /// Start loading a draft. Unknown ids are ignored - the draft is already gone.
    pub fn begin_load_draft(&mut self, id: &str) -> Option<PendingLoad> {
        let Some(draft) = self.drafts.get(id).cloned() else {
            log::debug!("{}", DraftError::NotFound(id.to_owned()));
            return None;
        };
        Some(self.state.begin_load(draft))
    }
    /// Hand a completed load back. Returns whether it was applied.
    pub fn finish_load(&mut self, loaded: LoadedDraft) -> bool {
        match self.state.finish_load(loaded) {
            Ok(LoadOutcome::Applied(draft)) => {
                self.notify_info(
                    "whiteboard.draftLoadedTitle",
                    "whiteboard.draftLoadedDescription",
                    &[("draftName", &draft.name)],
                );
                true
            }
            Ok(LoadOutcome::Superseded) => false,
            Ok(LoadOutcome::Discarded(_)) => {
                self.notify_error(
                    "whiteboard.draftLoadErrorTitle",
                    "whiteboard.draftLoadErrorSpecificDescription",
                    &[],
                );
                false
            }
            Err(e) => {
                log::error!("Failed to load draft: {e}");
                self.notify_error(
                    "whiteboard.draftLoadErrorTitle",
                    "whiteboard.draftLoadErrorSpecificDescription",
                    &[],
                );
                false
            }
        }
    }
    /// Give up on a load started with [`Self::begin_load_draft`].
    pub fn cancel_load(&mut self, pending: PendingLoad) {
        self.state.cancel_load(pending);
    }
    /// Load a draft and wait for it. Returns whether it was applied.
    pub async fn load_draft(&mut self, id: &str) -> bool {
        let Some(pending) = self.begin_load_draft(id) else {
            return false;
        };
        let loaded = pending.finish().await;
        self.finish_load(loaded)
    }
    /// Delete a draft. Returns whether one was removed.
    pub fn delete_draft(&mut self, id: &str) -> bool {
        match self.drafts.delete(id) {
            Ok(Some(draft)) => {
                self.notify_info(
                    "whiteboard.draftDeletedTitle",
                    "whiteboard.draftDeletedDescription",
                    &[("draftName", &draft.name)],
                );
                true
            }
            Ok(None) => false,
            Err(e) => {
                log::error!("Failed to delete draft {id:?}: {e}");
                self.notify_error(
                    "whiteboard.draftDeleteErrorTitle",
                    "whiteboard.draftDeleteErrorDescription",
                    &[],
                );
                false
            }
        }
    }
    /// Render the canvas as a PNG file for download.
    pub fn download(&mut self, now: DateTime<Utc>) -> Option<DownloadFile> {
        match self.state.export_png(now) {
            Ok(file) => {
                self.notify_info(
                    "toast.downloadedTitle",
                    "toast.downloadedDescription",
                    &[("filename", &file.file_name)],
                );
                Some(file)
            }
            Err(e) => {
                log::error!("Failed to export canvas: {e}");
                self.notify_error(
                    "toast.downloadErrorTitle",
                    "toast.downloadErrorDescription",
                    &[],
                );
                None
            }
        }
    }

    fn notify_info(&mut self, title: &str, description: &str, params: &[(&str, &str)]) {
        let notification = Notification::info(
            self.translator.t(title, params),
            self.translator.t(description, params),
        );
        self.notifier.notify(notification);
    }
    fn notify_error(&mut self, title: &str, description: &str, params: &[(&str, &str)]) {
        let notification = Notification::error(
            self.translator.t(title, params),
            self.translator.t(description, params),
        );
        self.notifier.notify(notification);
    }
}

/// The persisted theme, or the default if missing or unrecognized.
fn read_theme(store: &impl KeyValueStore) -> Theme {
    match store.get(THEME_KEY) {
        Ok(Some(id)) => id.trim().parse().unwrap_or_else(|_| {
            log::warn!("Unknown theme {id:?}, using default");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(e) => {
            log::warn!("Couldn't read theme: {e}");
            Theme::default()
        }
    }
}

#[cfg(test)]
mod test {
    use super::Session;
    use crate::{
        color::Color,
        notify::{EnglishCatalog, Notification, Variant},
        storage::{KeyValueStore, MemoryStore, StorageError, DRAFTS_KEY, THEME_KEY},
        stroke::PointerButton,
        surface::Point,
        theme::Theme,
    };
    use chrono::{TimeZone, Utc};

    type TestSession<Store = MemoryStore> = Session<Store, Vec<Notification>, EnglishCatalog>;

    fn session(store: MemoryStore) -> TestSession {
        Session::new(store, Vec::new(), EnglishCatalog, 80, 60)
    }
    fn scribble(session: &mut TestSession<impl KeyValueStore>) {
        let state = session.state_mut();
        state.pointer_down(Point::new(5.0, 5.0), PointerButton::Primary);
        state.pointer_move(Point::new(70.0, 50.0));
        state.pointer_up();
    }
    fn last(session: &TestSession<impl KeyValueStore>) -> &Notification {
        session.notifier().last().unwrap()
    }

    /// Accepts reads, refuses every write.
    struct ReadOnly(MemoryStore);
    impl KeyValueStore for ReadOnly {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }
        fn set(&mut self, _: &str, _: &str) -> Result<(), StorageError> {
            Err(StorageError::QuotaExceeded)
        }
    }

    #[test]
    fn theme_restored_and_persisted() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "eyecare").unwrap();
        let mut session = session(store);
        assert_eq!(session.state().theme(), Theme::Eyecare);
        session.set_theme(Theme::Reading);
        assert_eq!(
            session.store().get(THEME_KEY).unwrap().as_deref(),
            Some("reading")
        );
        assert!(session.notifier().is_empty());
    }
    #[test]
    fn unknown_theme_falls_back() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "neon").unwrap();
        assert_eq!(session(store).state().theme(), Theme::Whiteboard);
    }
    #[test]
    fn save_names_and_notifies() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut session = session(MemoryStore::new());
        assert!(session.save_draft(None, now).is_none());
        assert_eq!(last(&session).title, "Empty Canvas");

        scribble(&mut session);
        let draft = session.save_draft(None, now).unwrap();
        assert_eq!(draft.name, "Draft 2023-11-14 22:13:20");
        assert_eq!(last(&session).title, "Draft Saved");
        assert_eq!(
            last(&session).description,
            "Draft 'Draft 2023-11-14 22:13:20' has been saved."
        );
    }
    #[test]
    fn storage_failure_is_reported() {
        let mut session: TestSession<ReadOnly> =
            Session::new(ReadOnly(MemoryStore::new()), Vec::new(), EnglishCatalog, 80, 60);
        scribble(&mut session);
        assert!(session.save_draft(None, Utc::now()).is_none());
        assert_eq!(last(&session).variant, Variant::Destructive);
        assert_eq!(last(&session).title, "Save Error");
        assert!(session.drafts().is_empty());

        session.set_theme(Theme::Blackboard);
        assert_eq!(session.state().theme(), Theme::Blackboard);
        assert_eq!(last(&session).variant, Variant::Destructive);
    }
    #[test]
    fn load_round_trip() {
        let mut session = session(MemoryStore::new());
        scribble(&mut session);
        let saved = session.surface_copy();
        let draft = session.save_draft(Some("mine".into()), Utc::now()).unwrap();

        session.state_mut().clear_canvas();
        assert!(session.state().surface().is_blank(Color::WHITE));

        let pending = session.begin_load_draft(&draft.id).unwrap();
        assert!(session.finish_load(pending.blocking_finish()));
        assert_eq!(session.surface_copy(), saved);
        assert_eq!(session.state().history().len(), 1);
        assert_eq!(last(&session).description, "Draft 'mine' has been loaded.");
    }
    #[test]
    fn corrupt_draft_reports_load_error() {
        let mut store = MemoryStore::new();
        store
            .set(
                DRAFTS_KEY,
                r#"[{"id":"7","name":"bad","dataUrl":"data:image/png;base64,AAAA","createdAt":"2024-01-01T00:00:00Z"}]"#,
            )
            .unwrap();
        let mut session = session(store);
        assert_eq!(session.drafts().len(), 1);
        let pending = session.begin_load_draft("7").unwrap();
        assert!(!session.finish_load(pending.blocking_finish()));
        assert_eq!(last(&session).title, "Load Error");
        assert!(session.state().surface().is_blank(Color::WHITE));
    }
    #[test]
    fn cancel_and_collapse_are_not_successes() {
        let mut session = session(MemoryStore::new());
        scribble(&mut session);
        let draft = session.save_draft(None, Utc::now()).unwrap();

        let pending = session.begin_load_draft(&draft.id).unwrap();
        session.cancel_load(pending);
        assert!(!session.state().is_load_pending());
        assert_eq!(last(&session).title, "Draft Saved");

        let pending = session.begin_load_draft(&draft.id).unwrap();
        session.state_mut().resize(0, 0);
        assert!(!session.finish_load(pending.blocking_finish()));
        assert_eq!(last(&session).title, "Load Error");
        assert_eq!(last(&session).variant, Variant::Destructive);
    }
    #[test]
    fn unknown_ids_are_silent() {
        let mut session = session(MemoryStore::new());
        assert!(session.begin_load_draft("missing").is_none());
        assert!(!session.delete_draft("missing"));
        assert!(session.notifier().is_empty());
    }
    #[test]
    fn delete_notifies() {
        let mut session = session(MemoryStore::new());
        scribble(&mut session);
        let draft = session.save_draft(Some("gone".into()), Utc::now()).unwrap();
        assert!(session.delete_draft(&draft.id));
        assert!(session.drafts().is_empty());
        assert_eq!(last(&session).title, "Draft Deleted");
    }
    #[test]
    fn download() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_500).unwrap();
        let mut session = session(MemoryStore::new());
        let file = session.download(now).unwrap();
        assert_eq!(file.file_name, "whiteboard-2023-11-14T22-13-20-500Z.png");
        assert!(file.bytes.starts_with(b"\x89PNG"));
        assert_eq!(
            last(&session).description,
            "whiteboard-2023-11-14T22-13-20-500Z.png will be downloaded."
        );
    }

    impl<Store: KeyValueStore> TestSession<Store> {
        fn surface_copy(&self) -> crate::surface::RegionData {
            self.state().surface().read_all().unwrap()
        }
    }
}
