use serde::{Deserialize, Serialize};
use tracing::debug;

use schedule_feed::Language;

use crate::store::{Store, StoreError, LANGUAGE_PROPERTY};

/// Single-choice language form attached to the sub-event editing UI.
/// Blank submissions normalize to the `none` marker instead of failing.
pub struct SubEventLanguageForm {
    pub organizer: String,
    pub event: String,
    pub subevent: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

/// Serialized form state handed to the host UI: title, choices and the
/// pre-filled current value.
#[derive(Debug, Serialize)]
pub struct FormState {
    pub title: &'static str,
    pub field: &'static str,
    pub choices: Vec<Choice>,
    pub current: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageInput {
    #[serde(default)]
    pub language: Option<String>,
}

impl SubEventLanguageForm {
    pub fn title() -> &'static str {
        "Language"
    }

    pub fn choices() -> Vec<Choice> {
        vec![
            Choice { value: "deen", label: "Bilingual" },
            Choice { value: "de", label: "German" },
            Choice { value: "en", label: "English" },
        ]
    }

    /// Form state for display, pre-filled from existing metadata.
    pub async fn state(&self, store: &Store) -> FormState {
        FormState {
            title: Self::title(),
            field: "language",
            choices: Self::choices(),
            current: store.meta_value(self.subevent, LANGUAGE_PROPERTY).await,
        }
    }

    /// Normalizes the submitted value and upserts the metadata record.
    pub async fn save(&self, store: &Store, input: LanguageInput) -> Result<Language, StoreError> {
        let language = Language::from_code(input.language.as_deref().unwrap_or(""));

        debug!(
            organizer = %self.organizer,
            event = %self.event,
            subevent = self.subevent,
            language = %language,
            "saving sub-event language"
        );

        store
            .set_language(&self.organizer, self.subevent, language)
            .await?;

        Ok(language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // metadata is keyed by sub-event id alone, so an empty store suffices
    fn store() -> Store {
        Store::from_records(vec![])
    }

    #[tokio::test]
    async fn blank_submission_saves_the_none_marker() {
        let store = store();
        let form = SubEventLanguageForm {
            organizer: "ccc".to_string(),
            event: "tours".to_string(),
            subevent: 1,
        };

        let saved = form.save(&store, LanguageInput { language: None }).await.unwrap();
        assert_eq!(saved, Language::Unset);
        assert_eq!(
            store.meta_value(1, LANGUAGE_PROPERTY).await.as_deref(),
            Some("none")
        );
    }

    #[tokio::test]
    async fn state_prefills_from_metadata() {
        let store = store();
        let form = SubEventLanguageForm {
            organizer: "ccc".to_string(),
            event: "tours".to_string(),
            subevent: 1,
        };

        assert!(form.state(&store).await.current.is_none());

        form.save(
            &store,
            LanguageInput {
                language: Some("deen".to_string()),
            },
        )
        .await
        .unwrap();

        let state = form.state(&store).await;
        assert_eq!(state.current.as_deref(), Some("deen"));
        assert_eq!(state.title, "Language");
        assert_eq!(state.choices.len(), 3);
    }
}
