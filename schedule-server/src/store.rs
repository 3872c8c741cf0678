use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use schedule_feed::{Event, Language, SubEvent};

/// Well-known metadata property carrying the per-sub-event language tag.
pub const LANGUAGE_PROPERTY: &str = "congressschedule_language";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One event series as the host application hands it over: the event
/// itself plus its sub-events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(flatten)]
    pub event: Event,
    #[serde(default)]
    pub subevents: Vec<SubEvent>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SeedFile {
    #[serde(default)]
    events: Vec<EventRecord>,
}

/// Metadata property definition, scoped to one organizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaProperty {
    pub name: String,
    pub organizer: String,
    #[serde(default)]
    pub default: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MetaValue {
    subevent: i64,
    property: String,
    value: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MetaFile {
    #[serde(default)]
    properties: Vec<MetaProperty>,
    #[serde(default)]
    values: Vec<MetaValue>,
}

#[derive(Debug, Default)]
struct MetaState {
    properties: Vec<MetaProperty>,
    values: HashMap<(i64, String), String>,
}

impl MetaState {
    fn to_file(&self) -> MetaFile {
        let mut values: Vec<MetaValue> = self
            .values
            .iter()
            .map(|((subevent, property), value)| MetaValue {
                subevent: *subevent,
                property: property.clone(),
                value: value.clone(),
            })
            .collect();
        values.sort_by(|a, b| (a.subevent, &a.property).cmp(&(b.subevent, &b.property)));

        MetaFile {
            properties: self.properties.clone(),
            values,
        }
    }
}

/// In-process stand-in for the host application's database. Event and
/// sub-event records are read-only after load; only metadata values are
/// ever written, mirroring the plugin's contract with its host.
pub struct Store {
    events: Vec<EventRecord>,
    meta: RwLock<MetaState>,
    meta_path: Option<PathBuf>,
}

impl Store {
    pub fn load(data_path: &Path, meta_path: Option<PathBuf>) -> Result<Store, StoreError> {
        let data = fs::read_to_string(data_path).map_err(|source| StoreError::Io {
            path: data_path.to_path_buf(),
            source,
        })?;
        let seed: SeedFile = serde_json::from_str(&data).map_err(|source| StoreError::Parse {
            path: data_path.to_path_buf(),
            source,
        })?;

        let meta = match &meta_path {
            Some(path) if path.exists() => {
                let data = fs::read_to_string(path).map_err(|source| StoreError::Io {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str(&data).map_err(|source| StoreError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            _ => MetaFile::default(),
        };

        Ok(Store::from_parts(seed.events, meta, meta_path))
    }

    /// Builds a store from already-shaped records, used by tests.
    pub fn from_records(events: Vec<EventRecord>) -> Store {
        Store::from_parts(events, MetaFile::default(), None)
    }

    fn from_parts(mut events: Vec<EventRecord>, meta: MetaFile, meta_path: Option<PathBuf>) -> Store {
        // The host hands sub-events back ordered by start; keep that
        // promise regardless of seed file order.
        for record in &mut events {
            record.subevents.sort_by_key(|se| se.date_from);
        }

        let values = meta
            .values
            .into_iter()
            .map(|value| ((value.subevent, value.property), value.value))
            .collect();

        Store {
            events,
            meta: RwLock::new(MetaState {
                properties: meta.properties,
                values,
            }),
            meta_path,
        }
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn event(&self, organizer: &str, slug: &str) -> Option<&EventRecord> {
        self.events
            .iter()
            .find(|record| record.event.organizer == organizer && record.event.slug == slug)
    }

    /// Raw metadata value for one sub-event, if any.
    pub async fn meta_value(&self, subevent: i64, property: &str) -> Option<String> {
        self.meta
            .read()
            .await
            .values
            .get(&(subevent, property.to_string()))
            .cloned()
    }

    /// Snapshot of the language tags for all sub-events of one record,
    /// so schedule building can stay synchronous.
    pub async fn languages_for(&self, record: &EventRecord) -> HashMap<i64, Language> {
        let meta = self.meta.read().await;

        record
            .subevents
            .iter()
            .filter_map(|se| {
                meta.values
                    .get(&(se.id, LANGUAGE_PROPERTY.to_string()))
                    .map(|value| (se.id, Language::from_code(value)))
            })
            .collect()
    }

    /// Upserts the language value: creates the property definition for
    /// the organizer when missing, then updates or creates the value.
    pub async fn set_language(
        &self,
        organizer: &str,
        subevent: i64,
        language: Language,
    ) -> Result<(), StoreError> {
        let mut meta = self.meta.write().await;

        if !meta
            .properties
            .iter()
            .any(|property| property.name == LANGUAGE_PROPERTY && property.organizer == organizer)
        {
            debug!(organizer, property = LANGUAGE_PROPERTY, "creating meta property");
            meta.properties.push(MetaProperty {
                name: LANGUAGE_PROPERTY.to_string(),
                organizer: organizer.to_string(),
                default: String::new(),
            });
        }

        meta.values.insert(
            (subevent, LANGUAGE_PROPERTY.to_string()),
            language.code().to_string(),
        );

        if let Some(path) = &self.meta_path {
            let file = meta.to_file();
            let data = serde_json::to_string_pretty(&file).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;
            fs::write(path, data).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        }

        Ok(())
    }
}
