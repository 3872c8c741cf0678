use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event as XmlEvent};
use quick_xml::Writer;
use thiserror::Error;

use crate::schedule::{Schedule, EVENT_TYPE};

pub const GENERATOR_NAME: &str = "congress-schedule";
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to write schedule XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("schedule XML was not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Minimal `<error>` body used for the 404/400 responses.
pub fn error_document(message: &str) -> String {
    format!("<?xml version=\"1.0\"?><error>{}</error>", escape(message))
}

fn text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(XmlEvent::Start(BytesStart::new(name)))?;
    writer.write_event(XmlEvent::Text(BytesText::new(text)))?;
    writer.write_event(XmlEvent::End(BytesEnd::new(name)))
}

impl Schedule {
    /// Serializes the tree as a UTF-8 schedule document with declaration.
    pub fn to_xml(&self) -> Result<String, Error> {
        let mut writer = Writer::new(Vec::new());

        writer.write_event(XmlEvent::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(XmlEvent::Start(BytesStart::new("schedule")))?;

        let mut generator = BytesStart::new("generator");
        generator.push_attribute(("name", GENERATOR_NAME));
        generator.push_attribute(("version", GENERATOR_VERSION));
        writer.write_event(XmlEvent::Empty(generator))?;

        if let Some(url) = &self.url {
            text_element(&mut writer, "url", url)?;
        }
        text_element(&mut writer, "version", &self.version)?;

        writer.write_event(XmlEvent::Start(BytesStart::new("conference")))?;
        text_element(&mut writer, "title", &self.conference.title)?;
        text_element(&mut writer, "acronym", &self.conference.acronym)?;
        if let Some(start) = self.conference.start {
            text_element(&mut writer, "start", &start.to_rfc3339())?;
        }
        if let Some(end) = self.conference.end {
            text_element(&mut writer, "end", &end.to_rfc3339())?;
        }
        if self.conference.day_count > 0 {
            text_element(&mut writer, "days", &self.conference.day_count.to_string())?;
        }
        if let Some(time_zone_name) = &self.conference.time_zone_name {
            text_element(&mut writer, "time_zone_name", time_zone_name)?;
        }
        writer.write_event(XmlEvent::End(BytesEnd::new("conference")))?;

        for day in &self.days {
            let mut day_element = BytesStart::new("day");
            day_element.push_attribute(("date", day.date.to_string().as_str()));
            day_element.push_attribute(("start", day.start.to_rfc3339().as_str()));
            day_element.push_attribute(("end", day.end.to_rfc3339().as_str()));
            day_element.push_attribute(("index", day.index.to_string().as_str()));
            writer.write_event(XmlEvent::Start(day_element))?;

            for room in &day.rooms {
                let mut room_element = BytesStart::new("room");
                room_element.push_attribute(("name", room.name.as_str()));
                room_element.push_attribute(("guid", room.guid.to_string().as_str()));
                writer.write_event(XmlEvent::Start(room_element))?;

                for event in &room.events {
                    let mut event_element = BytesStart::new("event");
                    event_element.push_attribute(("id", event.id.to_string().as_str()));
                    event_element.push_attribute(("guid", event.guid.to_string().as_str()));
                    writer.write_event(XmlEvent::Start(event_element))?;

                    text_element(&mut writer, "room", &event.room)?;
                    text_element(&mut writer, "title", &event.title)?;
                    text_element(&mut writer, "subtitle", "")?;
                    text_element(&mut writer, "type", EVENT_TYPE)?;
                    text_element(&mut writer, "date", &event.date.to_rfc3339())?;
                    text_element(&mut writer, "start", &event.start)?;
                    text_element(&mut writer, "duration", &event.duration)?;
                    text_element(&mut writer, "abstract", "")?;
                    text_element(&mut writer, "slug", &event.slug)?;
                    text_element(&mut writer, "track", &event.track)?;
                    if let Some(language) = &event.language {
                        text_element(&mut writer, "language", language)?;
                    }

                    writer.write_event(XmlEvent::End(BytesEnd::new("event")))?;
                }

                writer.write_event(XmlEvent::End(BytesEnd::new("room")))?;
            }

            writer.write_event(XmlEvent::End(BytesEnd::new("day")))?;
        }

        writer.write_event(XmlEvent::End(BytesEnd::new("schedule")))?;

        Ok(String::from_utf8(writer.into_inner())?)
    }
}
