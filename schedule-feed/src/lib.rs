mod markdown;
mod model;
mod schedule;
mod slug;
mod xml;

pub use model::{Event, Language, LocalizedText, SubEvent};
pub use schedule::{build_schedule, Conference, Day, Room, Schedule, ScheduleEvent, DEFAULT_ROOM};
pub use slug::{acronym, slugify};
pub use xml::{error_document, Error, GENERATOR_NAME, GENERATOR_VERSION};
