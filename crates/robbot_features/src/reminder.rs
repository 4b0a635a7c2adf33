//! Reminders saved from chat, plus the lessons and weekly events the bot
//! announces on its own

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Weekday};
use parking_lot::Mutex;
use robbot_core::{
    CallbackFeature, CommandCategory, CommandSubcategory, KeywordParser, Message, Pronoun,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{Clock, ReminderError};

/// Reminders must be at least this far ahead when created from chat.
pub const MINIMUM_LEAD_MINUTES: i64 = 30;

const DATE_FORMAT: &str = "%Y-%m-%d-%H:%M";
const DEFAULT_ALARM_MINUTES: i64 = 30;

const INVALID_FORMAT: &str = "Ogiltigt format, försök igen. Exempel:\n\n**rob, kan du komma \
     ihåg; Nyår!, 2020-12-31-00:00\n\nDet är viktigt att ange ett semikolon och sedan \
     separera med mellanslag och kommatecken. Datumformatet måste vara \
     ÅR-MÅNAD-DAG-TIMME:MINUT.";
const INVALID_DATE: &str = "Du måste skapa en påminnelse minst 30 minuter i framtiden.";
const SUCCESS: &str = "Det kommer en påminnelse en halvtimme innan :slight_smile:";
const NOTHING_SAVED: &str = "Inga sparade händelser :cry:";

/// Something to be reminded of.
///
/// Dated events happen once. Events without a date recur on each of their
/// `weekdays`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub time: NaiveTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekdays: Vec<Weekday>,
    /// Minutes before `time` at which the reminder fires.
    #[serde(default)]
    pub alarm_minutes: i64,
    /// Generated from the class schedule rather than saved by a user.
    #[serde(default)]
    pub curriculum_event: bool,
}

impl Event {
    pub fn at(body: impl Into<String>, when: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            body: body.into(),
            location: None,
            date: Some(when.date()),
            time: when.time(),
            weekdays: Vec::new(),
            alarm_minutes: 0,
            curriculum_event: false,
        }
    }

    pub fn recurring(
        body: impl Into<String>,
        time: NaiveTime,
        weekdays: impl IntoIterator<Item = Weekday>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            body: body.into(),
            location: None,
            date: None,
            time,
            weekdays: weekdays.into_iter().collect(),
            alarm_minutes: 0,
            curriculum_event: false,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_alarm(mut self, ahead: TimeDelta) -> Self {
        self.alarm_minutes = ahead.num_minutes();
        self
    }

    pub fn as_curriculum(mut self) -> Self {
        self.curriculum_event = true;
        self
    }

    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        self.date.map(|d| d.and_time(self.time))
    }

    pub fn alarm_at(&self) -> Option<NaiveDateTime> {
        self.starts_at()?
            .checked_sub_signed(TimeDelta::try_minutes(self.alarm_minutes)?)
    }

    /// Whether the alarm fires during the minute containing `now`.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        let now = truncate_to_minute(now);
        if self.date.is_some() {
            return self.alarm_at().map(truncate_to_minute) == Some(now);
        }
        // A weekly alarm can fall on the day before the event.
        let Some(event_at) = TimeDelta::try_minutes(self.alarm_minutes)
            .and_then(|ahead| now.checked_add_signed(ahead))
        else {
            return false;
        };
        self.weekdays.contains(&event_at.weekday())
            && event_at.hour() == self.time.hour()
            && event_at.minute() == self.time.minute()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self.time.format("%H:%M");
        writeln!(f, "Vad: {}", self.body)?;
        match self.date {
            Some(date) => writeln!(f, "När: {date} - {time}")?,
            None => writeln!(f, "När: {time}")?,
        }
        writeln!(f, "Var: {}", self.location.as_deref().unwrap_or("-"))
    }
}

fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// The text posted when an event's alarm fires.
pub fn announcement(event: &Event) -> String {
    format!("Påminnelse! :alarm_clock:\n{event}")
}

#[derive(Debug, Default)]
struct Entries {
    events: Vec<Event>,
    recurring: Vec<Event>,
}

/// Shared store of reminders.
#[derive(Debug, Default)]
pub struct ReminderBook {
    entries: Mutex<Entries>,
}

impl ReminderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, event: Event) -> Uuid {
        let id = event.id;
        debug!("Saved reminder {} for {:?}", id, event.starts_at());
        self.entries.lock().events.push(event);
        id
    }

    pub fn add_recurring(&self, event: Event) -> Uuid {
        let id = event.id;
        self.entries.lock().recurring.push(event);
        id
    }

    /// Dated events, soonest first.
    pub fn events(&self) -> Vec<Event> {
        let mut events = self.entries.lock().events.clone();
        events.sort_by_key(Event::starts_at);
        events
    }

    pub fn recurring(&self) -> Vec<Event> {
        self.entries.lock().recurring.clone()
    }

    pub fn remove(&self, id: Uuid) -> Option<Event> {
        let mut entries = self.entries.lock();
        let position = entries.events.iter().position(|e| e.id == id)?;
        Some(entries.events.remove(position))
    }

    /// Events whose alarm fires in the current minute.
    pub fn due(&self, now: NaiveDateTime) -> Vec<Event> {
        let entries = self.entries.lock();
        entries
            .events
            .iter()
            .chain(entries.recurring.iter())
            .filter(|e| e.is_due(now))
            .cloned()
            .collect()
    }

    /// Drop dated events that have already started.
    pub fn purge(&self, now: NaiveDateTime) -> Vec<Event> {
        let mut entries = self.entries.lock();
        let (past, upcoming): (Vec<_>, Vec<_>) = entries
            .events
            .drain(..)
            .partition(|e| e.starts_at().is_some_and(|t| t < now));
        entries.events = upcoming;
        if !past.is_empty() {
            info!("Purged {} past reminders", past.len());
        }
        past
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock();
        entries.events.len() + entries.recurring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The chat side of the reminder book.
pub struct Reminders {
    book: Arc<ReminderBook>,
    clock: Arc<dyn Clock>,
}

impl Reminders {
    pub fn new(book: Arc<ReminderBook>, clock: Arc<dyn Clock>) -> Self {
        Self { book, clock }
    }

    pub fn book(&self) -> &Arc<ReminderBook> {
        &self.book
    }

    /// Save the reminder described after the `;` in `message`.
    ///
    /// The payload is `<what>, YYYY-MM-DD-HH:MM`, optionally followed by
    /// `, <where>`.
    pub fn remember(&self, message: &Message) -> Result<Event, ReminderError> {
        let text = message.text();
        let invalid = || ReminderError::InvalidFormat {
            input: text.clone(),
        };

        let payload = text.rsplit(';').next().ok_or_else(invalid)?;
        let mut fields = payload.split(',').map(str::trim);
        let body = fields.next().filter(|b| !b.is_empty()).ok_or_else(invalid)?;
        let when = fields
            .next()
            .and_then(|d| NaiveDateTime::parse_from_str(d, DATE_FORMAT).ok())
            .ok_or_else(invalid)?;
        let location = fields.next().filter(|l| !l.is_empty());

        let now = self.clock.now();
        if when - now < TimeDelta::minutes(MINIMUM_LEAD_MINUTES) {
            return Err(ReminderError::TooSoon {
                at: when,
                minimum_minutes: MINIMUM_LEAD_MINUTES,
            });
        }

        let mut event =
            Event::at(body, when).with_alarm(TimeDelta::minutes(DEFAULT_ALARM_MINUTES));
        if let Some(location) = location {
            event = event.with_location(location);
        }
        self.book.add(event.clone());
        Ok(event)
    }

    pub fn remember_phrase(&self, message: &Message) -> String {
        match self.remember(message) {
            Ok(_) => SUCCESS.to_string(),
            Err(ReminderError::InvalidFormat { .. }) => INVALID_FORMAT.to_string(),
            Err(ReminderError::TooSoon { .. }) => INVALID_DATE.to_string(),
        }
    }

    /// Reminders saved by users, soonest first.
    pub fn show_events_phrase(&self) -> String {
        let saved: Vec<String> = self
            .book
            .events()
            .iter()
            .filter(|e| !e.curriculum_event)
            .map(|e| {
                let when = e
                    .starts_at()
                    .map(|t| t.format(DATE_FORMAT).to_string())
                    .unwrap_or_default();
                format!(
                    "**Händelse**: {}\n**När**: {}\n**Var**: {}\n",
                    e.body,
                    when,
                    e.location.as_deref().unwrap_or("-")
                )
            })
            .collect();

        if saved.is_empty() {
            NOTHING_SAVED.to_string()
        } else {
            saved.join("\n")
        }
    }

    pub fn feature(self: Arc<Self>) -> CallbackFeature {
        let parser = KeywordParser::new(CommandCategory::Reminder)
            .keywords([
                "ihåg",
                "memorera",
                "spara",
                "påminna",
                "påminnelse",
                "event",
                "events",
                "påminnelser",
            ])
            .ignore(';')
            .words(
                ["ihåg", "memorera", "påminna", "spara"],
                CommandSubcategory::ReminderRememberEvent,
            )
            .words(
                ["event", "events", "påminnelser", "påminnelse", "aktiviteter"],
                CommandSubcategory::ReminderShowEvents,
            );

        let remember = Arc::clone(&self);
        let show = self;

        CallbackFeature::builder("reminder", parser)
            .pronouns([Pronoun::Interrogative, Pronoun::Personal, Pronoun::Possessive])
            .on_message(CommandSubcategory::ReminderRememberEvent, move |message| {
                Ok(remember.remember_phrase(message))
            })
            .on(CommandSubcategory::ReminderShowEvents, move || {
                Ok(show.show_events_phrase())
            })
            .build()
    }
}
