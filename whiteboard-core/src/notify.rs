//! # Collaborators
//!
//! The whiteboard doesn't present anything itself. User-facing outcomes are handed to a
//! [`Notifier`] as a short title plus an actionable description, with strings looked up through a
//! [`Translator`].

use std::time::Duration;

/// How long a notification stays up before it is dismissed.
pub const NOTIFICATION_DURATION: Duration = Duration::from_secs(5);

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum Variant {
    #[default]
    Default,
    /// A failure the user should know about.
    Destructive,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
    pub duration: Duration,
}
impl Notification {
    #[must_use]
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
            duration: NOTIFICATION_DURATION,
        }
    }
    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: Variant::Destructive,
            ..Self::info(title, description)
        }
    }
}

/// Fire-and-forget sink for notifications.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}
impl<N: Notifier + ?Sized> Notifier for &mut N {
    fn notify(&mut self, notification: Notification) {
        (**self).notify(notification);
    }
}
/// Collects notifications, newest last.
impl Notifier for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Forwards notifications to the log.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogNotifier;
impl Notifier for LogNotifier {
    fn notify(&mut self, notification: Notification) {
        match notification.variant {
            Variant::Default => {
                log::info!("{}: {}", notification.title, notification.description);
            }
            Variant::Destructive => {
                log::error!("{}: {}", notification.title, notification.description);
            }
        }
    }
}

/// Localized string lookup. `{name}` placeholders are substituted from `params`.
pub trait Translator {
    fn t(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// Built-in English strings. Unknown keys translate to themselves.
#[derive(Default, Debug, Clone, Copy)]
pub struct EnglishCatalog;
impl EnglishCatalog {
    fn lookup(key: &str) -> Option<&'static str> {
        Some(match key {
            "whiteboard.draftSavedTitle" => "Draft Saved",
            "whiteboard.draftSavedDescription" => "Draft '{draftName}' has been saved.",
            "whiteboard.draftLoadedTitle" => "Draft Loaded",
            "whiteboard.draftLoadedDescription" => "Draft '{draftName}' has been loaded.",
            "whiteboard.draftDeletedTitle" => "Draft Deleted",
            "whiteboard.draftDeletedDescription" => "Draft '{draftName}' has been deleted.",
            "whiteboard.emptyCanvasTitle" => "Empty Canvas",
            "whiteboard.emptyCanvasDescription" => "Draw something before saving a draft.",
            "whiteboard.draftSaveErrorTitle" => "Save Error",
            "whiteboard.draftSaveErrorDescription" => "Could not save draft to storage.",
            "whiteboard.draftDeleteErrorTitle" => "Delete Error",
            "whiteboard.draftDeleteErrorDescription" => "Could not update saved drafts in storage.",
            "whiteboard.draftLoadErrorTitle" => "Load Error",
            "whiteboard.draftLoadErrorSpecificDescription" => {
                "Could not load the selected draft. It might be corrupted."
            }
            "whiteboard.draftNamePrefix" => "Draft",
            "whiteboard.themeSaveErrorTitle" => "Theme Not Saved",
            "whiteboard.themeSaveErrorDescription" => {
                "The theme was applied but could not be remembered for next time."
            }
            "toast.downloadedTitle" => "Download Started",
            "toast.downloadedDescription" => "{filename} will be downloaded.",
            "toast.downloadErrorTitle" => "Download Error",
            "toast.downloadErrorDescription" => "Could not export the canvas as an image.",
            _ => return None,
        })
    }
}
impl Translator for EnglishCatalog {
    fn t(&self, key: &str, params: &[(&str, &str)]) -> String {
        let Some(template) = Self::lookup(key) else {
            log::warn!("Missing translation for {key:?}");
            return key.to_owned();
        };
        params
            .iter()
            .fold(template.to_owned(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}

#[cfg(test)]
mod test {
    use super::{EnglishCatalog, Notification, Notifier, Translator, Variant};
    #[test]
    fn substitutes_params() {
        let text = EnglishCatalog.t(
            "whiteboard.draftSavedDescription",
            &[("draftName", "Draft 1")],
        );
        assert_eq!(text, "Draft 'Draft 1' has been saved.");
    }
    #[test]
    fn unknown_key_is_identity() {
        assert_eq!(EnglishCatalog.t("nope.nothing", &[]), "nope.nothing");
    }
    #[test]
    fn vec_collects() {
        let mut sink = Vec::new();
        sink.notify(Notification::error("t", "d"));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].variant, Variant::Destructive);
    }
}
