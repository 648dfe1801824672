use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use crate::config::OutputConfig;
use crate::sky::SkyColors;

type JsonObject = Map<String, Value>;

/// The two color keys inside one section of a JSON settings file.
///
/// The file must be strict JSON. Comments and trailing commas, which some
/// editors accept in their settings, make the file unreadable here and every
/// write fails until they are removed. Writes go through a temp file in the
/// same directory and a rename, so an interrupted write never truncates the
/// existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorCustomizations {
    path: PathBuf,
    section: String,
    background_key: String,
    foreground_key: String,
}

impl ColorCustomizations {
    pub fn from_config(output: &OutputConfig) -> Self {
        Self {
            path: output.settings_path.clone(),
            section: output.section.clone(),
            background_key: output.background_key.clone(),
            foreground_key: output.foreground_key.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, colors: &SkyColors) -> Result<()> {
        let mut root = self.load_root()?;
        let section = section_mut(&mut root, &self.section)?;
        section.insert(
            self.background_key.clone(),
            Value::String(colors.background_hex()),
        );
        section.insert(
            self.foreground_key.clone(),
            Value::String(colors.foreground_hex()),
        );
        self.store_root(&root)?;
        log::debug!(
            "wrote {}={}, {}={} to {}",
            self.background_key,
            colors.background_hex(),
            self.foreground_key,
            colors.foreground_hex(),
            self.path.display()
        );
        Ok(())
    }

    /// Removes both color keys, leaving the rest of the file untouched.
    pub fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut root = self.load_root()?;
        let Some(section) = root.get_mut(&self.section) else {
            return Ok(());
        };
        let Some(section) = section.as_object_mut() else {
            bail!("{} in {} is not an object", self.section, self.path.display());
        };
        let removed_bg = section.remove(&self.background_key).is_some();
        let removed_fg = section.remove(&self.foreground_key).is_some();
        if removed_bg || removed_fg {
            self.store_root(&root)?;
            log::info!("cleared sky colors from {}", self.path.display());
        }
        Ok(())
    }

    fn load_root(&self) -> Result<JsonObject> {
        if !self.path.exists() {
            return Ok(JsonObject::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(JsonObject::new());
        }
        let value: Value = serde_json::from_str(&contents)
            .with_context(|| {
                format!(
                    "failed to parse {} (comments and trailing commas are not supported)",
                    self.path.display()
                )
            })?;
        match value {
            Value::Object(root) => Ok(root),
            _ => bail!("{} does not contain a JSON object", self.path.display()),
        }
    }

    fn store_root(&self, root: &JsonObject) -> Result<()> {
        let json = serde_json::to_string_pretty(root)?;
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, json)
            .with_context(|| format!("failed to write {}", temp_path.display()))?;
        if let Err(err) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(err)
                .with_context(|| format!("failed to replace {}", self.path.display()));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".sky-color.tmp");
        self.path.with_file_name(name)
    }
}

fn section_mut<'a>(root: &'a mut JsonObject, name: &str) -> Result<&'a mut JsonObject> {
    let section = root
        .entry(name.to_string())
        .or_insert_with(|| Value::Object(JsonObject::new()));
    match section {
        Value::Object(map) => Ok(map),
        _ => bail!("{name} is not an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sky::Rgb;

    fn temp_store(name: &str) -> ColorCustomizations {
        let path = std::env::temp_dir().join(format!(
            "sky-color-store-{name}-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        ColorCustomizations::from_config(&OutputConfig {
            settings_path: path,
            ..OutputConfig::default()
        })
    }

    fn read_json(store: &ColorCustomizations) -> Value {
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap()
    }

    fn sunrise_colors() -> SkyColors {
        SkyColors {
            background: Rgb::from_u24(0xff7d75),
            foreground: Rgb::BLACK,
        }
    }

    #[test]
    fn write_creates_missing_file() {
        let store = temp_store("create");
        store.write(&sunrise_colors()).unwrap();
        let json = read_json(&store);
        let section = &json["workbench.colorCustomizations"];
        assert_eq!(section["statusBar.background"], "#ff7d75");
        assert_eq!(section["statusBar.foreground"], "#000000");
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn write_preserves_unrelated_settings() {
        let store = temp_store("preserve");
        std::fs::write(
            store.path(),
            r##"{"editor.fontSize":14,"workbench.colorCustomizations":{"editor.background":"#000000","statusBar.background":"#ffffff"}}"##,
        )
        .unwrap();

        store.write(&sunrise_colors()).unwrap();
        let json = read_json(&store);
        assert_eq!(json["editor.fontSize"], 14);
        let section = &json["workbench.colorCustomizations"];
        assert_eq!(section["editor.background"], "#000000");
        assert_eq!(section["statusBar.background"], "#ff7d75");
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn clear_removes_only_sky_keys() {
        let store = temp_store("clear");
        store.write(&sunrise_colors()).unwrap();
        let mut json = read_json(&store);
        json["workbench.colorCustomizations"]["titleBar.activeBackground"] = "#123456".into();
        std::fs::write(store.path(), json.to_string()).unwrap();

        store.clear().unwrap();
        let json = read_json(&store);
        let section = json["workbench.colorCustomizations"].as_object().unwrap();
        assert!(!section.contains_key("statusBar.background"));
        assert!(!section.contains_key("statusBar.foreground"));
        assert_eq!(section["titleBar.activeBackground"], "#123456");
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn clear_without_file_is_noop() {
        let store = temp_store("clear-missing");
        store.clear().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn write_replaces_file_without_leaving_temp() {
        let store = temp_store("replace");
        std::fs::write(store.path(), r#"{"editor.fontSize":12}"#).unwrap();
        store.write(&sunrise_colors()).unwrap();
        assert!(!store.temp_path().exists());
        assert_eq!(store.temp_path().parent(), store.path().parent());
        let json = read_json(&store);
        assert_eq!(json["editor.fontSize"], 12);
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn commented_settings_are_rejected_untouched() {
        let store = temp_store("comments");
        let original = "{\n  // font\n  \"editor.fontSize\": 14,\n}\n";
        std::fs::write(store.path(), original).unwrap();
        assert!(store.write(&sunrise_colors()).is_err());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), original);
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn non_object_section_is_an_error() {
        let store = temp_store("bad-section");
        std::fs::write(store.path(), r#"{"workbench.colorCustomizations":[1,2]}"#).unwrap();
        assert!(store.write(&sunrise_colors()).is_err());
        std::fs::write(store.path(), "[]").unwrap();
        assert!(store.write(&sunrise_colors()).is_err());
        let _ = std::fs::remove_file(store.path());
    }
}
