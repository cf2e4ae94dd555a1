use std::path::{Path, PathBuf};

const DOCUMENTATION: &str = r#"# Whiteboard settings. You may edit this file, but be aware that formatting and comments will not
# be preserved.

# canvas_width, canvas_height: size of the drawing surface in pixels.
# pen_width: initial pen width, clamped to 1..=20.
# storage_dir: where drafts and the selected theme are kept.
# output_dir: where downloaded PNGs are written.

"#;

#[must_use]
pub fn preferences_dir() -> Option<PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(default)]
pub struct Settings {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub pen_width: u32,
    pub storage_dir: PathBuf,
    pub output_dir: PathBuf,
}
impl Default for Settings {
    fn default() -> Self {
        let storage_dir = dirs::data_dir().map_or_else(
            || PathBuf::from("whiteboard-data"),
            |mut dir| {
                dir.push(env!("CARGO_PKG_NAME"));
                dir
            },
        );
        Self {
            canvas_width: 800,
            canvas_height: 600,
            pen_width: whiteboard_core::tools::DEFAULT_PEN_WIDTH,
            storage_dir,
            output_dir: PathBuf::from("."),
        }
    }
}
impl Settings {
    const FILENAME: &'static str = "settings.toml";
    /// Settings from user preferences, or defaulted if unavailable for some reason.
    #[must_use]
    pub fn load() -> Self {
        match preferences_dir() {
            None => {
                log::warn!("No preferences dir, defaulting settings.");
                Self::default()
            }
            Some(mut dir) => {
                dir.push(Self::FILENAME);
                Self::load_or_default(&dir)
            }
        }
    }
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        let settings: anyhow::Result<Self> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let settings: Self = toml::from_str(&string)?;
            Ok(settings)
        };
        settings.unwrap_or_else(|e| {
            log::warn!("Settings at {path:?} weren't available, defaulting: {e}");
            Self::default()
        })
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let mut preferences =
            preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Not recursive. A missing parent is the user's business.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        self.save_to(&preferences)
    }
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let string = DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(self)?;
        std::fs::write(path, string)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Settings;

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let settings = Settings {
            canvas_width: 320,
            pen_width: 7,
            output_dir: "out".into(),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Whiteboard settings."));
        assert_eq!(Settings::load_or_default(&path), settings);
    }
    #[test]
    fn missing_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "canvas_height = 100\n").unwrap();
        let settings = Settings::load_or_default(&path);
        assert_eq!(settings.canvas_height, 100);
        assert_eq!(settings.canvas_width, Settings::default().canvas_width);
    }
    #[test]
    fn bad_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        assert_eq!(Settings::load_or_default(&path), Settings::default());
        std::fs::write(&path, "canvas_width = \"wide\"").unwrap();
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }
}
