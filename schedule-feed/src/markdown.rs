use std::fmt::Write;

use crate::schedule::Schedule;

impl Schedule {
    /// Human-readable rendition of the same grouped tree, served on the
    /// `schedule.md` route.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# {}", self.conference.title);

        for day in &self.days {
            let _ = writeln!(out, "\n## Day {}: {}", day.index, day.date);

            for room in &day.rooms {
                let _ = writeln!(out, "\n### {}", room.name);
                let _ = writeln!(out);

                for event in &room.events {
                    let _ = write!(out, "- {} ({}) {}", event.start, event.duration, event.title);
                    if let Some(language) = &event.language {
                        let _ = write!(out, " [{language}]");
                    }
                    let _ = writeln!(out);
                }
            }
        }

        out
    }
}
