//! Command categories and subcategories.
//!
//! A category names the feature domain a message belongs to, a subcategory
//! names the operation inside that domain. Both are closed sets so they can
//! key dispatch tables for the whole process lifetime.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Feature domain a message was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandCategory {
    Schedule,
    LunchMenu,
    Reminder,
    TellJoke,
    CoronaSpread,
    Ranking,
    TimeNow,
    Unidentified,
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Schedule => "schedule",
            Self::LunchMenu => "lunch_menu",
            Self::Reminder => "reminder",
            Self::TellJoke => "tell_joke",
            Self::CoronaSpread => "corona_spread",
            Self::Ranking => "ranking",
            Self::TimeNow => "time_now",
            Self::Unidentified => "unidentified",
        };
        f.write_str(name)
    }
}

/// Operation requested within a feature domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandSubcategory {
    ScheduleNextLesson,
    ScheduleTodaysLessons,
    ScheduleTomorrowsLessons,
    ScheduleCurriculum,

    LunchYesterday,
    LunchToday,
    LunchTomorrow,
    LunchDayAfterTomorrow,
    LunchForWeek,

    ReminderRememberEvent,
    ReminderShowEvents,

    TellJoke,
    TimeNow,

    CoronaDataTimestamp,
    CoronaSpreadTotalDeaths,
    CoronaSpreadTotalRecoveries,
    CoronaSpreadTotalInfections,
    CoronaSpreadMostDeaths,
    CoronaSpreadMostRecoveries,
    CoronaSpreadMostInfections,
    CoronaSpreadLeastDeaths,
    CoronaSpreadLeastRecoveries,
    CoronaSpreadLeastInfections,
    CoronaInfectionsByQuery,
    CoronaDeathsByQuery,
    CoronaRecoveriesByQuery,

    RankingUp,
    RankingDown,
    RankingForMember,
    RankingForAll,

    Unidentified,
}

impl CommandSubcategory {
    pub fn is_unidentified(self) -> bool {
        self == Self::Unidentified
    }
}

impl fmt::Display for CommandSubcategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug names are stable and already descriptive
        write!(f, "{self:?}")
    }
}
