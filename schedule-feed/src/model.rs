use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Text that is either a plain string or a map of locale code to
/// translation. Resolution order: exact locale, `en`, any available
/// translation, empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    ByLocale(BTreeMap<String, String>),
}

impl LocalizedText {
    pub fn resolve(&self, locale: Option<&str>) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::ByLocale(translations) => locale
                .and_then(|locale| translations.get(locale))
                .or_else(|| translations.get("en"))
                .or_else(|| translations.values().next())
                .map_or("", String::as_str),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(text: &str) -> Self {
        LocalizedText::Plain(text.to_string())
    }
}

/// Language tag attached to a sub-event through the organizer backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "deen")]
    Bilingual,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "none")]
    Unset,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Bilingual => "deen",
            Language::German => "de",
            Language::English => "en",
            Language::Unset => "none",
        }
    }

    /// Blank and unknown values normalize to `Unset` rather than failing.
    pub fn from_code(code: &str) -> Language {
        match code.trim() {
            "deen" => Language::Bilingual,
            "de" => Language::German,
            "en" => Language::English,
            _ => Language::Unset,
        }
    }

    pub fn is_set(self) -> bool {
        self != Language::Unset
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub organizer: String,
    pub slug: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub has_subevents: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubEvent {
    pub id: i64,
    pub name: LocalizedText,
    #[serde(default)]
    pub location: Option<LocalizedText>,
    #[serde(default)]
    pub date_from: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub date_to: Option<DateTime<FixedOffset>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localized_text_resolution_chain() {
        let text = LocalizedText::ByLocale(
            [("de".to_string(), "Führung".to_string()), ("en".to_string(), "Tour".to_string())]
                .into_iter()
                .collect(),
        );

        assert_eq!(text.resolve(Some("de")), "Führung");
        assert_eq!(text.resolve(Some("fr")), "Tour");
        assert_eq!(text.resolve(None), "Tour");

        let german_only =
            LocalizedText::ByLocale([("de".to_string(), "Führung".to_string())].into_iter().collect());
        assert_eq!(german_only.resolve(Some("fr")), "Führung");

        assert_eq!(LocalizedText::from("plain").resolve(Some("de")), "plain");
    }

    #[test]
    fn language_codes_survive_serde() {
        let json = serde_json::to_string(&Language::Bilingual).unwrap();
        assert_eq!(json, "\"deen\"");
        assert_eq!(serde_json::from_str::<Language>("\"de\"").unwrap(), Language::German);
    }

    #[test]
    fn unknown_language_normalizes_to_unset() {
        assert_eq!(Language::from_code(""), Language::Unset);
        assert_eq!(Language::from_code("  "), Language::Unset);
        assert_eq!(Language::from_code("fr"), Language::Unset);
        assert_eq!(Language::from_code("deen"), Language::Bilingual);
    }
}
