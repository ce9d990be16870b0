//! Keyword lists and canned response templates.
//!
//! The catalog is plain data: changing it changes message text, links and
//! trigger words, never the decision logic. A built-in copy is embedded in the
//! binary; deployments can replace it with their own JSON file.

use std::{collections::HashSet, path::Path};

use serde::Deserialize;
use serde_json::Value;
use slack_morphism::prelude::SlackBlock;

use super::types::{Res, Void};

/// The built-in catalog.
pub const DEFAULT_CATALOG: &str = include_str!("../../assets/catalog.json");

/// The canned responses the bot can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    UnlockGuidance,
    PasswordReset,
    DuoReenroll,
    WeekendCombined,
    UrgentInfo,
    ThanksAck,
    HelpAck,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 7] = [
        TemplateKind::UnlockGuidance,
        TemplateKind::PasswordReset,
        TemplateKind::DuoReenroll,
        TemplateKind::WeekendCombined,
        TemplateKind::UrgentInfo,
        TemplateKind::ThanksAck,
        TemplateKind::HelpAck,
    ];
}

/// The keyword categories, each answered by exactly one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    Lock,
    Password,
    Duo,
}

impl KeywordCategory {
    /// Categories in precedence order; the first match wins.
    pub const PRIORITY: [KeywordCategory; 3] = [KeywordCategory::Lock, KeywordCategory::Password, KeywordCategory::Duo];

    pub fn template(self) -> TemplateKind {
        match self {
            KeywordCategory::Lock => TemplateKind::UnlockGuidance,
            KeywordCategory::Password => TemplateKind::PasswordReset,
            KeywordCategory::Duo => TemplateKind::DuoReenroll,
        }
    }
}

/// Lowercase substrings that select a keyword category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeywordSets {
    pub lock: Vec<String>,
    pub password: Vec<String>,
    pub duo: Vec<String>,
}

impl KeywordSets {
    pub fn get(&self, category: KeywordCategory) -> &[String] {
        match category {
            KeywordCategory::Lock => &self.lock,
            KeywordCategory::Password => &self.password,
            KeywordCategory::Duo => &self.duo,
        }
    }
}

/// A static message payload.
///
/// `text` is the whole message for plain replies, and the notification
/// fallback for block messages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseTemplate {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Value>,
}

impl ResponseTemplate {
    /// Convert the block JSON into Slack blocks.
    pub fn slack_blocks(&self) -> Res<Vec<SlackBlock>> {
        self.blocks
            .iter()
            .map(|block| serde_json::from_value::<SlackBlock>(block.clone()).map_err(|e| anyhow::anyhow!("Invalid Slack block in template: {}", e)))
            .collect()
    }
}

/// One template per [`TemplateKind`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Templates {
    pub unlock_guidance: ResponseTemplate,
    pub password_reset: ResponseTemplate,
    pub duo_reenroll: ResponseTemplate,
    pub weekend_combined: ResponseTemplate,
    pub urgent_info: ResponseTemplate,
    pub thanks_ack: ResponseTemplate,
    pub help_ack: ResponseTemplate,
}

impl Templates {
    pub fn get(&self, kind: TemplateKind) -> &ResponseTemplate {
        match kind {
            TemplateKind::UnlockGuidance => &self.unlock_guidance,
            TemplateKind::PasswordReset => &self.password_reset,
            TemplateKind::DuoReenroll => &self.duo_reenroll,
            TemplateKind::WeekendCombined => &self.weekend_combined,
            TemplateKind::UrgentInfo => &self.urgent_info,
            TemplateKind::ThanksAck => &self.thanks_ack,
            TemplateKind::HelpAck => &self.help_ack,
        }
    }
}

/// Immutable keyword and template data, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub keywords: KeywordSets,
    pub templates: Templates,
}

impl Catalog {
    /// Load the catalog from `path`, or the built-in copy when no path is given.
    pub fn load(path: Option<&Path>) -> Res<Self> {
        let raw = match path {
            Some(p) => std::fs::read_to_string(p).map_err(|e| anyhow::anyhow!("Failed to read catalog `{}`: {}", p.display(), e))?,
            None => DEFAULT_CATALOG.to_string(),
        };

        Self::from_json(&raw)
    }

    /// Parse and validate a catalog.
    pub fn from_json(raw: &str) -> Res<Self> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validate()?;

        Ok(catalog)
    }

    pub fn template(&self, kind: TemplateKind) -> &ResponseTemplate {
        self.templates.get(kind)
    }

    /// Find the first keyword category (in priority order) contained in `text`.
    pub fn match_keywords(&self, text: &str) -> Option<KeywordCategory> {
        let text = text.to_lowercase();

        KeywordCategory::PRIORITY
            .into_iter()
            .find(|category| self.keywords.get(*category).iter().any(|keyword| text.contains(keyword.as_str())))
    }

    fn validate(&self) -> Void {
        for kind in TemplateKind::ALL {
            let template = self.template(kind);

            if template.text.as_deref().is_none_or(str::is_empty) && template.blocks.is_empty() {
                return Err(anyhow::anyhow!("Template `{:?}` has neither text nor blocks.", kind));
            }

            template.slack_blocks().map_err(|e| anyhow::anyhow!("Template `{:?}`: {}", kind, e))?;
        }

        let mut seen = HashSet::new();

        for category in KeywordCategory::PRIORITY {
            let keywords = self.keywords.get(category);

            if keywords.is_empty() {
                return Err(anyhow::anyhow!("Keyword set `{:?}` is empty.", category));
            }

            for keyword in keywords {
                if keyword.is_empty() || keyword.trim() != keyword || keyword.to_lowercase() != *keyword {
                    return Err(anyhow::anyhow!("Keyword `{}` must be non-empty, trimmed and lowercase.", keyword));
                }

                if !seen.insert(keyword.as_str()) {
                    return Err(anyhow::anyhow!("Keyword `{}` appears in more than one set.", keyword));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_catalog() -> Catalog {
        Catalog::load(None).unwrap()
    }

    /// Build a catalog from the default one with the keyword sets replaced.
    fn with_keywords(keywords: Value) -> Res<Catalog> {
        let mut raw: Value = serde_json::from_str(DEFAULT_CATALOG).unwrap();
        raw["keywords"] = keywords;
        Catalog::from_json(&raw.to_string())
    }

    #[test]
    fn default_catalog_is_valid() {
        let catalog = default_catalog();

        for kind in TemplateKind::ALL {
            let _ = catalog.template(kind);
        }

        assert_eq!(catalog.template(TemplateKind::ThanksAck).text.as_deref(), Some("Resolved"));
        assert!(catalog.template(TemplateKind::ThanksAck).blocks.is_empty());
        assert!(!catalog.template(TemplateKind::UnlockGuidance).blocks.is_empty());
    }

    #[test]
    fn matches_case_insensitively() {
        let catalog = default_catalog();

        assert_eq!(catalog.match_keywords("I'm LOCKED out"), Some(KeywordCategory::Lock));
        assert_eq!(catalog.match_keywords("my Password expired"), Some(KeywordCategory::Password));
        assert_eq!(catalog.match_keywords("new phone, need DUO"), Some(KeywordCategory::Duo));
        assert_eq!(catalog.match_keywords("printer is jammed"), None);
    }

    #[test]
    fn lock_wins_over_password_wins_over_duo() {
        let catalog = default_catalog();

        assert_eq!(catalog.match_keywords("locked out, password expired"), Some(KeywordCategory::Lock));
        assert_eq!(catalog.match_keywords("password expired and duo broken"), Some(KeywordCategory::Password));
    }

    #[test]
    fn matches_substrings() {
        let catalog = default_catalog();

        // `vpn` is a lock keyword, and `login` is contained in `logins`.
        assert_eq!(catalog.match_keywords("vpnclient fails"), Some(KeywordCategory::Lock));
        assert_eq!(catalog.match_keywords("all my logins fail"), Some(KeywordCategory::Lock));
    }

    #[test]
    fn rejects_missing_template() {
        let mut raw: Value = serde_json::from_str(DEFAULT_CATALOG).unwrap();
        raw["templates"].as_object_mut().unwrap().remove("help_ack");

        assert!(Catalog::from_json(&raw.to_string()).is_err());
    }

    #[test]
    fn default_blocks_convert_to_slack_blocks() {
        let catalog = default_catalog();

        for kind in TemplateKind::ALL {
            let template = catalog.template(kind);
            let blocks = template.slack_blocks().unwrap();

            assert_eq!(blocks.len(), template.blocks.len(), "{:?}", kind);
        }
    }

    #[test]
    fn rejects_malformed_block() {
        let mut raw: Value = serde_json::from_str(DEFAULT_CATALOG).unwrap();
        raw["templates"]["urgent_info"]["blocks"] = serde_json::json!([{ "type": "header" }]);

        assert!(Catalog::from_json(&raw.to_string()).is_err());
    }

    #[test]
    fn rejects_malformed_block_in_catalog_file() {
        let mut raw: Value = serde_json::from_str(DEFAULT_CATALOG).unwrap();
        raw["templates"]["unlock_guidance"]["blocks"] = serde_json::json!([{ "type": "section", "text": 42 }]);

        let path = std::env::temp_dir().join(format!("helpdesk-bot-bad-catalog-{}.json", std::process::id()));
        std::fs::write(&path, raw.to_string()).unwrap();

        let result = Catalog::load(Some(&path));
        let _ = std::fs::remove_file(&path);

        assert!(result.is_err());
    }

    #[test]
    fn rejects_overlapping_keywords() {
        let result = with_keywords(serde_json::json!({
            "lock": ["lock"],
            "password": ["password", "lock"],
            "duo": ["duo"],
        }));

        assert!(result.is_err());
    }

    #[test]
    fn rejects_uppercase_keywords() {
        let result = with_keywords(serde_json::json!({
            "lock": ["Lock"],
            "password": ["password"],
            "duo": ["duo"],
        }));

        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_sets() {
        let result = with_keywords(serde_json::json!({
            "lock": ["lock"],
            "password": [],
            "duo": ["duo"],
        }));

        assert!(result.is_err());
    }

    #[test]
    fn loads_catalog_file() {
        let path = std::env::temp_dir().join(format!("helpdesk-bot-catalog-{}.json", std::process::id()));
        std::fs::write(&path, DEFAULT_CATALOG).unwrap();

        let catalog = Catalog::load(Some(&path)).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(catalog.keywords, default_catalog().keywords);
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        assert!(Catalog::load(Some(Path::new("/nonexistent/helpdesk-catalog.json"))).is_err());
    }
}
