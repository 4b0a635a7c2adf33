//! Class schedule questions
//!
//! Lessons come from a [`ScheduleSource`]; the calendar feed itself lives
//! outside this crate. All phrases are computed against the injected
//! [`Clock`].

use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};
use robbot_core::{CallbackFeature, CommandCategory, CommandSubcategory, KeywordParser, Pronoun};
use serde::{Deserialize, Serialize};

use crate::{Clock, Event, SourceError, snapshot, weekday_name};

/// Discord refuses messages longer than this.
pub const MESSAGE_LIMIT: usize = 2000;

const CURRICULUM_DAYS: i64 = 7;
const CURRICULUM_HEADER: &str = "Här är schemat 7 veckodagar framåt :slight_smile:\n";
const LESSON_ALARM_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub name: String,
    pub location: String,
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Lesson {
    fn summary(&self) -> String {
        format!(
            "{}, {} - {} i {}",
            self.name,
            self.begin.format("%H:%M"),
            self.end.format("%H:%M"),
            self.location
        )
    }
}

pub trait ScheduleSource: Send + Sync {
    /// Every known lesson, in any order.
    fn lessons(&self) -> Result<Vec<Lesson>, SourceError>;
}

/// A fixed list of lessons, e.g. exported from the calendar once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonList {
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl LessonList {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self { lessons }
    }

    pub fn load(path: &Path) -> Result<Self, SourceError> {
        snapshot::load_toml(path)
    }
}

impl ScheduleSource for LessonList {
    fn lessons(&self) -> Result<Vec<Lesson>, SourceError> {
        Ok(self.lessons.clone())
    }
}

pub struct Schedule {
    source: Arc<dyn ScheduleSource>,
    clock: Arc<dyn Clock>,
}

impl Schedule {
    pub fn new(source: Arc<dyn ScheduleSource>, clock: Arc<dyn Clock>) -> Self {
        Self { source, clock }
    }

    fn sorted_lessons(&self) -> Result<Vec<Lesson>, SourceError> {
        let mut lessons = self.source.lessons()?;
        lessons.sort_by_key(|l| l.begin);
        Ok(lessons)
    }

    pub fn lessons_on(&self, date: NaiveDate) -> Result<Vec<Lesson>, SourceError> {
        Ok(self
            .sorted_lessons()?
            .into_iter()
            .filter(|l| l.begin.date() == date)
            .collect())
    }

    /// The first lesson starting after now.
    pub fn next_lesson(&self) -> Result<Option<Lesson>, SourceError> {
        let now = self.clock.now();
        Ok(self.sorted_lessons()?.into_iter().find(|l| l.begin > now))
    }

    pub fn next_lesson_phrase(&self) -> Result<String, SourceError> {
        Ok(match self.next_lesson()? {
            Some(lesson) => format!(
                "Nästa lektion är i {}, {}, kl {} :slight_smile:",
                lesson.location,
                lesson.begin.date(),
                lesson.begin.format("%H:%M")
            ),
            None => "Jag hittar inga fler lektioner på schemat.".to_string(),
        })
    }

    pub fn todays_lessons_phrase(&self) -> Result<String, SourceError> {
        let lessons = self.lessons_on(self.clock.today())?;
        if lessons.is_empty() {
            return Ok("Det finns inga lektioner på schemat idag :sunglasses:".to_string());
        }
        Ok(format!("Schemat för dagen:\n{}", summaries(&lessons)))
    }

    pub fn tomorrows_lessons_phrase(&self) -> Result<String, SourceError> {
        let tomorrow = self.clock.today() + TimeDelta::days(1);
        let lessons = self.lessons_on(tomorrow)?;
        if lessons.is_empty() {
            return Ok("Det finns inga lektioner på schemat imorgon :sunglasses:".to_string());
        }
        Ok(format!("Schemat för imorgon:\n{}", summaries(&lessons)))
    }

    /// Lessons for the coming week, grouped under weekday headers and cut
    /// to fit in one chat message.
    pub fn curriculum_phrase(&self) -> Result<String, SourceError> {
        let today = self.clock.today();
        let mut remaining = MESSAGE_LIMIT - CURRICULUM_HEADER.chars().count();
        let mut last_date = None;
        let mut entries = Vec::new();

        for lesson in self.sorted_lessons()? {
            let date = lesson.begin.date();
            if date < today {
                continue;
            }
            if (date - today).num_days() > CURRICULUM_DAYS {
                break;
            }

            let line = format!(
                "{} i {}, kl. {} - {}",
                lesson.name,
                lesson.location,
                lesson.begin.format("%H:%M"),
                lesson.end.format("%H:%M")
            );
            let entry = if last_date == Some(date) {
                line
            } else {
                format!("\n**{} {}**\n{}", weekday_name(date.weekday()), date, line)
            };

            let length = entry.chars().count() + 1;
            if remaining.saturating_sub(length) <= 10 {
                break;
            }
            remaining -= length;
            last_date = Some(date);
            entries.push(entry);
        }

        if entries.is_empty() {
            return Ok("Just nu ser det tomt ut på schemat...".to_string());
        }
        Ok(format!("{CURRICULUM_HEADER}{}", entries.join("\n")))
    }

    /// Reminder events for the lessons on `date`, alarmed an hour ahead.
    pub fn lesson_reminders(&self, date: NaiveDate) -> Result<Vec<Event>, SourceError> {
        Ok(self
            .lessons_on(date)?
            .into_iter()
            .map(|lesson| {
                Event::at(lesson.name, lesson.begin)
                    .with_location(lesson.location)
                    .with_alarm(TimeDelta::minutes(LESSON_ALARM_MINUTES))
                    .as_curriculum()
            })
            .collect())
    }

    pub fn feature(self: Arc<Self>) -> CallbackFeature {
        let parser = KeywordParser::new(CommandCategory::Schedule)
            .keywords(["schema", "schemat", "lektion", "lektioner", "klassrum", "sal"])
            .words(["nästa", "klassrum"], CommandSubcategory::ScheduleNextLesson)
            .words(["idag"], CommandSubcategory::ScheduleTodaysLessons)
            .words(
                ["imorgon", "imorn", "imorrn"],
                CommandSubcategory::ScheduleTomorrowsLessons,
            )
            .words(["schema", "schemat"], CommandSubcategory::ScheduleCurriculum);

        let next = Arc::clone(&self);
        let today = Arc::clone(&self);
        let tomorrow = Arc::clone(&self);
        let curriculum = self;

        CallbackFeature::builder("schedule", parser)
            .pronouns([Pronoun::Interrogative])
            .on(CommandSubcategory::ScheduleNextLesson, move || {
                Ok(next.next_lesson_phrase()?)
            })
            .on(CommandSubcategory::ScheduleTodaysLessons, move || {
                Ok(today.todays_lessons_phrase()?)
            })
            .on(CommandSubcategory::ScheduleTomorrowsLessons, move || {
                Ok(tomorrow.tomorrows_lessons_phrase()?)
            })
            .on(CommandSubcategory::ScheduleCurriculum, move || {
                Ok(curriculum.curriculum_phrase()?)
            })
            .build()
    }
}

fn summaries(lessons: &[Lesson]) -> String {
    lessons
        .iter()
        .map(Lesson::summary)
        .collect::<Vec<_>>()
        .join("\n")
}
