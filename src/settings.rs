use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::edit::EditPolicy;
use crate::syntax::Syntax;

pub const CONFIG_FILE: &str = ".setconf.toml";
pub const CONFIG_FILE_LOCAL: &str = ".setconf.local.toml";

/// Overrides for the default [`EditPolicy`]. Unset fields keep the default.
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct EditSettings {
    pub skip_commented: Option<bool>,
    pub uncomment: Option<bool>,
    pub trim_key: Option<bool>,
    pub trim_value: Option<bool>,
    pub min_one_space_after_key: Option<bool>,
    pub min_one_space_before_value: Option<bool>,
}

impl EditSettings {
    fn merge(&mut self, other: EditSettings) {
        let fields = [
            (&mut self.skip_commented, other.skip_commented),
            (&mut self.uncomment, other.uncomment),
            (&mut self.trim_key, other.trim_key),
            (&mut self.trim_value, other.trim_value),
            (&mut self.min_one_space_after_key, other.min_one_space_after_key),
            (&mut self.min_one_space_before_value, other.min_one_space_before_value),
        ];
        for (field, value) in fields {
            if value.is_some() {
                *field = value;
            }
        }
    }
}

/// Settings read from `.setconf.toml` and `.setconf.local.toml`
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Comment markers in addition to the built-in ones (e.g. ";" for ini files)
    #[serde(default)]
    pub comment_markers: Vec<String>,
    /// Definition prefixes in addition to `#define`
    #[serde(default)]
    pub define_prefixes: Vec<String>,
    #[serde(default)]
    pub edit: EditSettings,
}

impl Settings {
    /// Merge another Settings into this one (other takes precedence for set values)
    pub fn merge(&mut self, other: Settings) {
        for marker in other.comment_markers {
            if !self.comment_markers.contains(&marker) {
                self.comment_markers.push(marker);
            }
        }
        for prefix in other.define_prefixes {
            if !self.define_prefixes.contains(&prefix) {
                self.define_prefixes.push(prefix);
            }
        }
        self.edit.merge(other.edit);
    }

    /// The built-in vocabulary extended with the configured markers and prefixes
    pub fn syntax(&self) -> Syntax {
        let mut syntax = Syntax::default();
        for marker in &self.comment_markers {
            syntax.register_comment_marker(marker);
        }
        for prefix in &self.define_prefixes {
            syntax.register_define_prefix(prefix);
        }
        syntax
    }

    /// The default edit policy with the configured overrides applied
    pub fn edit_policy(&self) -> EditPolicy {
        let defaults = EditPolicy::default();
        EditPolicy {
            skip_commented: self.edit.skip_commented.unwrap_or(defaults.skip_commented),
            uncomment: self.edit.uncomment.unwrap_or(defaults.uncomment),
            trim_key: self.edit.trim_key.unwrap_or(defaults.trim_key),
            trim_value: self.edit.trim_value.unwrap_or(defaults.trim_value),
            min_one_space_after_key: self
                .edit
                .min_one_space_after_key
                .unwrap_or(defaults.min_one_space_after_key),
            min_one_space_before_value: self
                .edit
                .min_one_space_before_value
                .unwrap_or(defaults.min_one_space_before_value),
        }
    }
}

/// Load settings from config files in a directory
/// Priority: defaults < .setconf.toml < .setconf.local.toml
pub fn load_settings_from_path(root: &Path) -> Settings {
    let mut settings = Settings::default();

    for name in [CONFIG_FILE, CONFIG_FILE_LOCAL] {
        let path = root.join(name);
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        match toml::from_str::<Settings>(&content) {
            Ok(file_settings) => {
                debug!(path = %path.display(), "loaded settings");
                settings.merge(file_settings);
            }
            Err(e) => warn!(path = %path.display(), "ignoring invalid settings: {e}"),
        }
    }

    settings
}

/// Load settings from current working directory
pub fn load_settings() -> Settings {
    let cwd = std::env::current_dir().unwrap_or_default();
    load_settings_from_path(&cwd)
}
