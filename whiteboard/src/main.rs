mod script;
mod settings;

use anyhow::{Context, Result as AnyResult};
use whiteboard_core::{
    notify::{EnglishCatalog, LogNotifier},
    session::Session,
    storage::FileStore,
};

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let settings = settings::Settings::load();
    if let Err(e) = settings.save() {
        log::warn!("Failed to save settings:\n{e:?}");
    }

    let store = FileStore::open(&settings.storage_dir)
        .with_context(|| format!("opening storage at {:?}", settings.storage_dir))?;
    let mut session = Session::new(
        store,
        LogNotifier,
        EnglishCatalog,
        settings.canvas_width,
        settings.canvas_height,
    );
    session.state_mut().set_pen_width(settings.pen_width);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("starting runtime")?;

    // Args are a list of scripts, replayed in order against the same session.
    let paths: Vec<std::path::PathBuf> = std::env::args_os().skip(1).map(Into::into).collect();
    let mut unreadable = 0usize;
    for path in &paths {
        let parsed: AnyResult<script::Script> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            Ok(string.parse::<script::Script>()?)
        };
        match parsed {
            Err(e) => {
                log::error!("failed to read script {path:?}: {e:#}");
                unreadable += 1;
            }
            Ok(script) => {
                let failures =
                    runtime.block_on(script::run(&mut session, &script, &settings.output_dir));
                if failures > 0 {
                    log::warn!("{failures} actions in {path:?} failed");
                }
            }
        }
    }
    log::info!("{} drafts saved", session.drafts().len());

    if unreadable > 0 {
        anyhow::bail!("{unreadable} of {} scripts couldn't be read", paths.len());
    }
    Ok(())
}
