use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate};
use uuid::Uuid;

use crate::model::{Event, Language, SubEvent};
use crate::slug::{acronym, event_slug, track_name};

pub const DEFAULT_ROOM: &str = "Main";
pub const EVENT_TYPE: &str = "subevent";

/// Fully derived schedule tree, ready for rendering. Building it never
/// touches the store again; every value is resolved up front.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub version: String,
    pub url: Option<String>,
    pub conference: Conference,
    pub days: Vec<Day>,
}

#[derive(Debug, Clone)]
pub struct Conference {
    pub title: String,
    pub acronym: String,
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub day_count: usize,
    pub time_zone_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Day {
    pub index: usize,
    pub date: NaiveDate,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub name: String,
    pub guid: Uuid,
    pub events: Vec<ScheduleEvent>,
}

#[derive(Debug, Clone)]
pub struct ScheduleEvent {
    pub id: i64,
    pub guid: Uuid,
    pub room: String,
    pub title: String,
    pub date: DateTime<FixedOffset>,
    pub start: String,
    pub duration: String,
    pub slug: String,
    pub track: String,
    pub language: Option<String>,
}

/// Stable identifier for a room within one event series.
fn room_guid(organizer: &str, event: &str, room: &str) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_DNS,
        format!("room:{organizer}:{event}:{room}").as_bytes(),
    )
}

/// Stable identifier for a sub-event within its parent event.
fn subevent_guid(event_id: i64, subevent_id: i64) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_DNS,
        format!("subevent:{event_id}:{subevent_id}").as_bytes(),
    )
}

/// `HH:MM`, or `HH:MM:SS` when a seconds remainder exists. A missing or
/// backwards end collapses to `00:00`.
fn format_duration(
    start: DateTime<FixedOffset>,
    end: Option<DateTime<FixedOffset>>,
) -> String {
    let Some(end) = end.filter(|end| *end >= start) else {
        return "00:00".to_string();
    };

    let total = (end - start).num_seconds();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if seconds == 0 {
        format!("{hours:02}:{minutes:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

fn room_name(subevent: &SubEvent, locale: Option<&str>) -> String {
    let resolved = subevent
        .location
        .as_ref()
        .map(|location| location.resolve(locale).trim().to_string())
        .unwrap_or_default();

    if resolved.is_empty() {
        DEFAULT_ROOM.to_string()
    } else {
        resolved
    }
}

/// Derives the whole schedule tree for one event series. `language_of`
/// looks up the per-sub-event language tag; sub-events without a start
/// timestamp are skipped.
pub fn build_schedule(
    event: &Event,
    subevents: &[SubEvent],
    language_of: impl Fn(i64) -> Option<Language>,
    url: Option<String>,
) -> Schedule {
    let locale = event.locale.as_deref();

    let title = {
        let resolved = event.name.resolve(locale);
        if resolved.is_empty() {
            event.slug.clone()
        } else {
            resolved.to_string()
        }
    };

    let start = subevents.iter().filter_map(|se| se.date_from).min();
    let end = subevents.iter().filter_map(|se| se.date_to).max();

    // date -> room name -> (start, sub-event), keeping the start next to
    // the record so later passes need no refiltering
    let mut grouped: BTreeMap<NaiveDate, HashMap<String, Vec<(DateTime<FixedOffset>, &SubEvent)>>> =
        BTreeMap::new();
    for subevent in subevents {
        let Some(date_from) = subevent.date_from else {
            continue;
        };

        grouped
            .entry(date_from.date_naive())
            .or_default()
            .entry(room_name(subevent, locale))
            .or_default()
            .push((date_from, subevent));
    }

    let days = grouped
        .into_iter()
        .enumerate()
        .filter_map(|(idx, (date, rooms))| {
            let starts = rooms.values().flatten().map(|(start, _)| *start).min()?;
            let ends = rooms
                .values()
                .flatten()
                .filter_map(|(_, se)| se.date_to)
                .max();

            let mut rooms = rooms
                .into_iter()
                .map(|(name, mut in_room)| {
                    in_room.sort_by_key(|(start, _)| *start);

                    let events = in_room
                        .into_iter()
                        .map(|(date, se)| {
                            let event_title = se.name.resolve(locale).to_string();
                            let language = language_of(se.id)
                                .filter(|language| language.is_set())
                                .map(|language| language.code().to_string())
                                .or_else(|| event.locale.clone());

                            ScheduleEvent {
                                id: se.id,
                                guid: subevent_guid(event.id, se.id),
                                room: name.clone(),
                                title: event_title.clone(),
                                date,
                                start: date.format("%H:%M").to_string(),
                                duration: format_duration(date, se.date_to),
                                slug: event_slug(
                                    &event.organizer,
                                    &event.slug,
                                    &event_title,
                                    se.id,
                                ),
                                track: track_name(&name),
                                language,
                            }
                        })
                        .collect();

                    Room {
                        guid: room_guid(&event.organizer, &event.slug, &name),
                        name,
                        events,
                    }
                })
                .collect::<Vec<_>>();

            rooms.sort_by_key(|room| room.name.to_lowercase());

            Some(Day {
                index: idx + 1,
                date,
                start: starts,
                end: ends.unwrap_or(starts),
                rooms,
            })
        })
        .collect::<Vec<_>>();

    Schedule {
        version: format!("{}-v1", event.slug),
        url,
        conference: Conference {
            title,
            acronym: acronym(&event.organizer, &event.slug),
            start,
            end,
            day_count: days.len(),
            time_zone_name: event.timezone.clone(),
        },
        days,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::LocalizedText;

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        offset().with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn event() -> Event {
        Event {
            id: 7,
            organizer: "ccc".to_string(),
            slug: "tours".to_string(),
            name: LocalizedText::from("Hackertours"),
            locale: Some("de".to_string()),
            timezone: Some("Europe/Berlin".to_string()),
            has_subevents: true,
        }
    }

    fn subevent(id: i64, title: &str, location: Option<&str>) -> SubEvent {
        SubEvent {
            id,
            name: LocalizedText::from(title),
            location: location.map(LocalizedText::from),
            date_from: None,
            date_to: None,
        }
    }

    #[test]
    fn days_are_indexed_chronologically() {
        let mut first = subevent(1, "Harbor Walk", Some("Pier"));
        first.date_from = Some(at(2024, 1, 2, 10, 0));
        let mut second = subevent(2, "City Tour", Some("Plaza"));
        second.date_from = Some(at(2024, 1, 1, 9, 0));

        let schedule = build_schedule(&event(), &[first, second], |_| None, None);

        assert_eq!(schedule.days.len(), 2);
        assert_eq!(schedule.conference.day_count, 2);
        assert_eq!(schedule.days[0].index, 1);
        assert_eq!(schedule.days[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(schedule.days[1].index, 2);
        assert_eq!(schedule.days[1].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn same_room_same_day_shares_one_block() {
        let mut early = subevent(1, "Morning Tour", Some("Pier"));
        early.date_from = Some(at(2024, 1, 1, 9, 0));
        let mut late = subevent(2, "Evening Tour", Some("Pier"));
        late.date_from = Some(at(2024, 1, 1, 18, 0));

        let schedule = build_schedule(&event(), &[late, early], |_| None, None);

        assert_eq!(schedule.days[0].rooms.len(), 1);
        let room = &schedule.days[0].rooms[0];
        assert_eq!(room.name, "Pier");
        assert_eq!(room.events[0].title, "Morning Tour");
        assert_eq!(room.events[1].title, "Evening Tour");
    }

    #[test]
    fn rooms_sort_case_insensitively() {
        let mut a = subevent(1, "One", Some("atrium"));
        a.date_from = Some(at(2024, 1, 1, 9, 0));
        let mut b = subevent(2, "Two", Some("Basement"));
        b.date_from = Some(at(2024, 1, 1, 10, 0));

        let schedule = build_schedule(&event(), &[b, a], |_| None, None);

        let names: Vec<_> = schedule.days[0].rooms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["atrium", "Basement"]);
    }

    #[test]
    fn blank_location_falls_back_to_main() {
        let mut se = subevent(1, "Tour", Some("   "));
        se.date_from = Some(at(2024, 1, 1, 9, 0));
        let mut missing = subevent(2, "Walk", None);
        missing.date_from = Some(at(2024, 1, 1, 11, 0));

        let schedule = build_schedule(&event(), &[se, missing], |_| None, None);

        assert_eq!(schedule.days[0].rooms.len(), 1);
        assert_eq!(schedule.days[0].rooms[0].name, "Main");
    }

    #[test]
    fn duration_formats_with_and_without_seconds() {
        let start = at(2024, 1, 1, 10, 0);
        assert_eq!(format_duration(start, Some(at(2024, 1, 1, 11, 30))), "01:30");
        assert_eq!(
            format_duration(start, Some(start + chrono::Duration::seconds(5445))),
            "01:30:45"
        );
        assert_eq!(format_duration(start, None), "00:00");
        assert_eq!(format_duration(start, Some(at(2024, 1, 1, 9, 0))), "00:00");
    }

    #[test]
    fn missing_day_ends_fall_back_to_day_start() {
        let mut se = subevent(1, "Open End", Some("Pier"));
        se.date_from = Some(at(2024, 1, 1, 9, 0));

        let schedule = build_schedule(&event(), &[se], |_| None, None);

        assert_eq!(schedule.days[0].start, at(2024, 1, 1, 9, 0));
        assert_eq!(schedule.days[0].end, at(2024, 1, 1, 9, 0));
    }

    #[test]
    fn identifiers_are_deterministic() {
        let mut se = subevent(1, "Tour", Some("Pier"));
        se.date_from = Some(at(2024, 1, 1, 9, 0));
        let subevents = [se];

        let first = build_schedule(&event(), &subevents, |_| None, None);
        let second = build_schedule(&event(), &subevents, |_| None, None);

        assert_eq!(first.days[0].rooms[0].guid, second.days[0].rooms[0].guid);
        assert_eq!(
            first.days[0].rooms[0].events[0].guid,
            second.days[0].rooms[0].events[0].guid
        );
    }

    #[test]
    fn subevent_language_wins_over_event_locale() {
        let mut tagged = subevent(1, "Tagged", Some("Pier"));
        tagged.date_from = Some(at(2024, 1, 1, 9, 0));
        let mut untagged = subevent(2, "Untagged", Some("Pier"));
        untagged.date_from = Some(at(2024, 1, 1, 10, 0));

        let schedule = build_schedule(
            &event(),
            &[tagged, untagged],
            |id| (id == 1).then_some(Language::Bilingual),
            None,
        );

        let events = &schedule.days[0].rooms[0].events;
        assert_eq!(events[0].language.as_deref(), Some("deen"));
        assert_eq!(events[1].language.as_deref(), Some("de"));
    }

    #[test]
    fn subevents_without_start_are_skipped() {
        let mut dated = subevent(1, "Dated", Some("Pier"));
        dated.date_from = Some(at(2024, 1, 1, 9, 0));
        let undated = subevent(2, "Undated", Some("Pier"));

        let schedule = build_schedule(&event(), &[dated, undated], |_| None, None);

        assert_eq!(schedule.days.len(), 1);
        assert_eq!(schedule.days[0].rooms[0].events.len(), 1);
    }

    #[test]
    fn conference_span_covers_all_subevents() {
        let mut a = subevent(1, "A", Some("Pier"));
        a.date_from = Some(at(2024, 1, 1, 9, 0));
        a.date_to = Some(at(2024, 1, 1, 10, 0));
        let mut b = subevent(2, "B", Some("Pier"));
        b.date_from = Some(at(2024, 1, 2, 9, 0));
        b.date_to = Some(at(2024, 1, 2, 12, 0));

        let schedule = build_schedule(&event(), &[a, b], |_| None, None);

        assert_eq!(schedule.conference.start, Some(at(2024, 1, 1, 9, 0)));
        assert_eq!(schedule.conference.end, Some(at(2024, 1, 2, 12, 0)));
        assert_eq!(schedule.conference.acronym, "ccc_tours");
        assert_eq!(schedule.version, "tours-v1");
    }
}
