//! Background reminder announcements
//!
//! Every tick checks the reminder book for alarms in the current minute and
//! announces each one once. On the first tick of a day past events are
//! purged and the day's lessons are added as reminders.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use robbot_core::PollCache;
use robbot_features::{Clock, ReminderBook, Schedule, announcement};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::output::Output;

pub struct ReminderTicker {
    book: Arc<ReminderBook>,
    schedule: Schedule,
    clock: Arc<dyn Clock>,
    announced: PollCache<Uuid, NaiveDateTime>,
    refreshed_on: Option<NaiveDate>,
}

impl ReminderTicker {
    pub fn new(book: Arc<ReminderBook>, schedule: Schedule, clock: Arc<dyn Clock>) -> Self {
        Self {
            book,
            schedule,
            clock,
            announced: PollCache::new(false),
            refreshed_on: None,
        }
    }

    /// Announcements due now. Each alarm minute is announced at most once.
    pub fn tick(&mut self) -> Vec<String> {
        let now = self.clock.now();
        if self.refreshed_on != Some(now.date()) {
            self.refresh(now);
        }

        let minute = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);
        self.book
            .due(now)
            .into_iter()
            .filter(|event| self.announced.poll(event.id, minute).is_some())
            .map(|event| announcement(&event))
            .collect()
    }

    fn refresh(&mut self, now: NaiveDateTime) {
        let purged = self.book.purge(now);
        for event in &purged {
            self.announced.forget(&event.id);
        }

        match self.schedule.lesson_reminders(now.date()) {
            Ok(lessons) => {
                let count = lessons.len();
                for lesson in lessons.into_iter().filter(|l| l.starts_at() > Some(now)) {
                    self.book.add(lesson);
                }
                debug!("Scheduled reminders for {} lessons on {}", count, now.date());
            }
            Err(e) => warn!("Could not read today's lessons: {}", e),
        }
        self.refreshed_on = Some(now.date());
    }

    /// Tick every `period` until the task is aborted.
    pub fn spawn(mut self, period: Duration, output: Output) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            info!("Reminder ticker started, checking every {:?}", period);

            loop {
                interval.tick().await;
                for text in self.tick() {
                    output.bot_message("RobBot", &text);
                    output.prompt();
                }
            }
        })
    }
}
