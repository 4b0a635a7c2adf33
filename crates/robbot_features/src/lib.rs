//! RobBot Features
//!
//! The Swedish chat features RobBot answers with. Each feature owns its
//! keyword table and reaches its data through a narrow source trait, so the
//! calendar, menu, joke and statistics feeds can be swapped for offline
//! snapshots.

pub mod clock;
pub mod corona;
pub mod error;
pub mod joke;
pub mod lunch;
pub mod ranking;
pub mod reminder;
pub mod schedule;
pub mod snapshot;
pub mod time_now;

use std::sync::Arc;

use robbot_core::CommandProcessor;
use tracing::info;

pub use clock::{Clock, FixedClock, SystemClock, weekday_name};
pub use corona::{CoronaSpread, CountryStats, Measure, PandemicStats, StatsSnapshot, Translations};
pub use error::{ReminderError, SourceError};
pub use joke::{Joke, JokeList, JokeSource, Jokes};
pub use lunch::{LunchMenu, MenuSource, WeekMenu};
pub use ranking::Rankings;
pub use reminder::{Event, ReminderBook, Reminders, announcement};
pub use schedule::{Lesson, LessonList, Schedule, ScheduleSource};

/// Data sources shared by the standard feature set.
#[derive(Clone)]
pub struct Sources {
    pub clock: Arc<dyn Clock>,
    pub schedule: Arc<dyn ScheduleSource>,
    pub menu: Arc<dyn MenuSource>,
    pub jokes: Arc<dyn JokeSource>,
    pub stats: Arc<dyn PandemicStats>,
    pub reminders: Arc<ReminderBook>,
}

impl Sources {
    /// Empty offline sources on the system clock.
    pub fn offline() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            schedule: Arc::new(LessonList::default()),
            menu: Arc::new(WeekMenu::default()),
            jokes: Arc::new(JokeList::default()),
            stats: Arc::new(StatsSnapshot::default()),
            reminders: Arc::new(ReminderBook::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::new(Arc::clone(&self.schedule), Arc::clone(&self.clock))
    }
}

/// Register every feature, in the order they are tried.
pub fn register_all(processor: &mut CommandProcessor, sources: &Sources) {
    processor.register(time_now::feature(Arc::clone(&sources.clock)));
    processor.register(Arc::new(sources.schedule()).feature());
    processor.register(
        Arc::new(LunchMenu::new(
            Arc::clone(&sources.menu),
            Arc::clone(&sources.clock),
        ))
        .feature(),
    );
    processor.register(
        Arc::new(Reminders::new(
            Arc::clone(&sources.reminders),
            Arc::clone(&sources.clock),
        ))
        .feature(),
    );
    processor.register(Arc::new(Jokes::new(Arc::clone(&sources.jokes))).feature());
    processor.register(Arc::new(CoronaSpread::new(Arc::clone(&sources.stats))).feature());
    processor.register(Arc::new(Rankings::new()).feature());

    info!("Registered {} features", processor.features().count());
}

/// A processor with the Swedish pronoun table, default phrases and every
/// feature registered.
pub fn standard_processor(sources: &Sources) -> CommandProcessor {
    let mut processor = CommandProcessor::default();
    register_all(&mut processor, sources);
    processor
}
