use std::collections::HashMap;
use std::path::Path;
use std::{fs, io};

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

pub const MSG_UNAUTHORIZED: &str = "error.unauthorized";
pub const MSG_FORBIDDEN: &str = "error.forbidden";
pub const MSG_NOT_FOUND: &str = "error.not_found";
pub const MSG_BAD_REQUEST: &str = "error.bad_request";
pub const MSG_VALIDATION: &str = "error.validation";
pub const MSG_INTERNAL: &str = "error.internal";
pub const MSG_ROUTE_NOT_FOUND: &str = "error.route_not_found";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct I18nConfig {
    /// Languages to load bundles for, e.g. `["en", "vi"]`.
    #[serde(default = "I18nConfig::default_langs")]
    pub langs: Vec<String>,

    /// Directory holding `<name>.<lang>.json` bundles.
    /// Default: {config_path}/i18n
    #[serde(default = "I18nConfig::default_dir")]
    pub dir: String,

    #[serde(default = "I18nConfig::default_lang")]
    pub default_lang: String,
}

impl CommonConfig for I18nConfig {
    fn default() -> Self {
        Self {
            langs: Self::default_langs(),
            dir: Self::default_dir(),
            default_lang: Self::default_lang(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.default_lang = self.default_lang.trim().to_lowercase();
        if self.default_lang.is_empty() {
            bail!("default_lang cannot be empty");
        }

        let mut langs = Vec::with_capacity(self.langs.len());
        for lang in self.langs.iter() {
            let lang = lang.trim().to_lowercase();
            if lang.is_empty() {
                bail!("langs cannot contain an empty language");
            }
            if !langs.contains(&lang) {
                langs.push(lang);
            }
        }
        if !langs.contains(&self.default_lang) {
            langs.push(self.default_lang.clone());
        }
        self.langs = langs;

        self.dir = expandenv("dir", &self.dir)?;
        if self.dir.is_empty() {
            let dir = ps.config_path.join("i18n");
            self.dir = format!("{}", dir.display());
        }

        Ok(())
    }
}

impl I18nConfig {
    fn default_langs() -> Vec<String> {
        vec![String::from("en"), String::from("vi")]
    }

    fn default_dir() -> String {
        String::new()
    }

    fn default_lang() -> String {
        String::from("en")
    }
}

/// Message bundles per language, read-only after startup.
pub struct I18n {
    bundles: HashMap<String, HashMap<String, String>>,
    default_lang: String,
}

impl I18n {
    pub fn load(cfg: &I18nConfig) -> Result<Self> {
        let dir = Path::new(&cfg.dir);
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries.collect::<io::Result<Vec<_>>>()?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(
                    "I18n directory {} not found, using built-in messages",
                    dir.display()
                );
                vec![]
            }
            Err(err) => {
                return Err(err).context(format!("read i18n directory: {}", dir.display()))
            }
        };

        let mut bundles = HashMap::with_capacity(cfg.langs.len());
        for lang in cfg.langs.iter() {
            let suffix = format!(".{lang}.json");
            let mut bundle: HashMap<String, String> = HashMap::new();
            for entry in entries.iter() {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let name = entry.file_name();
                let matched = name
                    .to_str()
                    .map(|name| name.ends_with(&suffix))
                    .unwrap_or(false);
                if !matched {
                    continue;
                }

                let data = fs::read_to_string(&path)
                    .with_context(|| format!("read i18n bundle: {}", path.display()))?;
                let messages: HashMap<String, String> = serde_json::from_str(&data)
                    .with_context(|| format!("parse i18n bundle: {}", path.display()))?;
                debug!(
                    "Loaded {} messages for '{lang}' from {}",
                    messages.len(),
                    path.display()
                );
                bundle.extend(messages);
            }
            info!("I18n language '{lang}' has {} messages", bundle.len());
            bundles.insert(lang.clone(), bundle);
        }

        Ok(Self::new(bundles, cfg.default_lang.clone()))
    }

    pub fn new(bundles: HashMap<String, HashMap<String, String>>, default_lang: String) -> Self {
        Self {
            bundles,
            default_lang,
        }
    }

    /// Picks the language from an `Accept-Language` value: the primary
    /// subtag of its first tag when that language is loaded, otherwise the
    /// default language.
    pub fn select_lang(&self, accept_language: Option<&str>) -> &str {
        let lang = accept_language
            .and_then(|value| value.split(',').next())
            .and_then(|tag| tag.split(';').next())
            .and_then(|tag| tag.trim().split(['-', '_']).next())
            .map(|lang| lang.trim().to_lowercase());

        match lang {
            Some(lang) => match self.bundles.get_key_value(&lang) {
                Some((lang, _)) => lang,
                None => &self.default_lang,
            },
            None => &self.default_lang,
        }
    }

    /// Looks the message up in `lang`, then in the default language. Falls
    /// back to `default_msg`, then to the id itself.
    pub fn localize(
        &self,
        lang: &str,
        id: &str,
        data: &[(&str, &str)],
        default_msg: Option<&str>,
    ) -> String {
        let found = self
            .bundles
            .get(lang)
            .and_then(|bundle| bundle.get(id))
            .or_else(|| {
                self.bundles
                    .get(&self.default_lang)
                    .and_then(|bundle| bundle.get(id))
            });

        match found.map(String::as_str).or(default_msg) {
            Some(template) => render(template, data),
            None => id.to_string(),
        }
    }
}

/// Replaces `{{.Key}}` placeholders. Unknown keys render empty, a template
/// with an unclosed placeholder is returned unchanged.
fn render(template: &str, data: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start..].find("}}") else {
            return template.to_string();
        };
        out.push_str(&rest[..start]);

        let expr = rest[start + 2..start + len].trim();
        match expr.strip_prefix('.') {
            Some(key) => {
                if let Some((_, value)) = data.iter().find(|(name, _)| *name == key) {
                    out.push_str(value);
                }
            }
            None => out.push_str(&rest[start..start + len + 2]),
        }
        rest = &rest[start + len + 2..];
    }
    out.push_str(rest);
    out
}
