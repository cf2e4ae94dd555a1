//! # Scripts
//!
//! A script is a TOML list of `[[action]]` tables, replayed in order against a session:
//!
//! ```toml
//! [[action]]
//! kind = "stroke"
//! points = [[10, 10], [200, 120]]
//!
//! [[action]]
//! kind = "save"
//! name = "sketch"
//! ```

use std::path::Path;

use whiteboard_core::{
    color::Color,
    notify::{Notifier, Translator},
    session::Session,
    storage::KeyValueStore,
    stroke::PointerButton,
    surface::Point,
    theme::Theme,
    tools::Tool,
};

#[derive(serde::Deserialize, Clone, PartialEq, Debug, Default)]
pub struct Script {
    #[serde(default, rename = "action")]
    pub actions: Vec<Action>,
}
impl std::str::FromStr for Script {
    type Err = toml::de::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

#[derive(serde::Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum PointerEvent {
    Down,
    Move,
    Up,
    Leave,
    Context,
}

#[derive(serde::Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TextEvent {
    Open,
    Type,
    Confirm,
    Blur,
    Cancel,
}

#[derive(serde::Deserialize, strum::AsRefStr, Clone, PartialEq, Debug)]
#[serde(tag = "kind", rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Pointer {
        event: PointerEvent,
        #[serde(default)]
        at: [f32; 2],
        #[serde(default)]
        button: PointerButton,
    },
    /// A full primary-button stroke through every point.
    Stroke { points: Vec<[f32; 2]> },
    Tool { tool: Tool },
    Width { width: u32 },
    /// No color resets the pen to the theme's ink.
    Color { color: Option<Color> },
    Theme { theme: Theme },
    Undo,
    Clear,
    Resize { width: u32, height: u32 },
    Text {
        event: TextEvent,
        #[serde(default)]
        at: [f32; 2],
        #[serde(default)]
        text: String,
    },
    Save { name: Option<String> },
    /// By `id`, or by `index` into the newest-first list.
    Load {
        id: Option<String>,
        index: Option<usize>,
    },
    Delete {
        id: Option<String>,
        index: Option<usize>,
    },
    Download,
}

/// Replay every action. Failed actions are logged and skipped. Returns the number that failed.
pub async fn run<Store, Notify, Translate>(
    session: &mut Session<Store, Notify, Translate>,
    script: &Script,
    output_dir: &Path,
) -> usize
where
    Store: KeyValueStore,
    Notify: Notifier,
    Translate: Translator,
{
    let mut failures = 0;
    for (index, action) in script.actions.iter().enumerate() {
        log::trace!("Action {index}: {}", action.as_ref());
        if let Err(e) = execute(session, action, output_dir).await {
            log::error!("Action {index} ({}) failed: {e:#}", action.as_ref());
            failures += 1;
        }
    }
    failures
}

async fn execute<Store, Notify, Translate>(
    session: &mut Session<Store, Notify, Translate>,
    action: &Action,
    output_dir: &Path,
) -> anyhow::Result<()>
where
    Store: KeyValueStore,
    Notify: Notifier,
    Translate: Translator,
{
    let now = chrono::Utc::now();
    let state = session.state_mut();
    match action {
        Action::Pointer { event, at, button } => {
            let at = Point::from(*at);
            match event {
                PointerEvent::Down => state.pointer_down(at, *button),
                PointerEvent::Move => state.pointer_move(at),
                PointerEvent::Up => state.pointer_up(),
                PointerEvent::Leave => state.pointer_leave(),
                PointerEvent::Context => state.context_menu(at),
            }
        }
        Action::Stroke { points } => {
            let Some((first, rest)) = points.split_first() else {
                anyhow::bail!("stroke has no points");
            };
            state.pointer_down(Point::from(*first), PointerButton::Primary);
            for point in rest {
                state.pointer_move(Point::from(*point));
            }
            state.pointer_up();
        }
        Action::Tool { tool } => state.select_tool(*tool),
        Action::Width { width } => state.set_pen_width(*width),
        Action::Color { color } => state.set_pen_color(*color),
        Action::Theme { theme } => session.set_theme(*theme),
        Action::Undo => {
            state.undo();
        }
        Action::Clear => state.clear_canvas(),
        Action::Resize { width, height } => state.resize(*width, *height),
        Action::Text { event, at, text } => match event {
            TextEvent::Open => state.context_menu(Point::from(*at)),
            TextEvent::Type => state.text_input(text),
            TextEvent::Confirm => {
                state.text_confirm();
            }
            TextEvent::Blur => {
                state.text_blur();
            }
            TextEvent::Cancel => state.text_cancel(),
        },
        Action::Save { name } => {
            session.save_draft(name.clone(), now);
        }
        Action::Load { id, index } => {
            let id = resolve_draft(session, id.as_deref(), *index)?;
            session.load_draft(&id).await;
        }
        Action::Delete { id, index } => {
            let id = resolve_draft(session, id.as_deref(), *index)?;
            session.delete_draft(&id);
        }
        Action::Download => {
            if let Some(file) = session.download(now) {
                let path = output_dir.join(&file.file_name);
                std::fs::write(&path, &file.bytes)?;
                log::info!("Wrote {path:?}");
            }
        }
    }
    Ok(())
}

fn resolve_draft<Store, Notify, Translate>(
    session: &Session<Store, Notify, Translate>,
    id: Option<&str>,
    index: Option<usize>,
) -> anyhow::Result<String>
where
    Store: KeyValueStore,
    Notify: Notifier,
    Translate: Translator,
{
    match (id, index) {
        (Some(id), None) => Ok(id.to_owned()),
        (None, Some(index)) => session
            .drafts()
            .get(index)
            .map(|draft| draft.id.clone())
            .ok_or_else(|| anyhow::anyhow!("no draft at index {index}")),
        _ => anyhow::bail!("expected exactly one of `id` or `index`"),
    }
}
