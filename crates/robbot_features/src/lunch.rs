//! School restaurant menu

use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, TimeDelta, Weekday};
use robbot_core::{CallbackFeature, CommandCategory, CommandSubcategory, KeywordParser, Pronoun};
use serde::{Deserialize, Serialize};

use crate::{Clock, SourceError, snapshot, weekday_name};

const SCHOOL_DAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

pub trait MenuSource: Send + Sync {
    /// Dishes served on `weekday`, or `None` when the restaurant is closed or
    /// the menu is unknown.
    fn menu_for_weekday(&self, weekday: Weekday) -> Result<Option<Vec<String>>, SourceError>;

    /// Dishes for Monday through Friday.
    fn menu_for_week(&self) -> Result<Vec<Vec<String>>, SourceError> {
        SCHOOL_DAYS
            .iter()
            .map(|day| Ok(self.menu_for_weekday(*day)?.unwrap_or_default()))
            .collect()
    }
}

/// One week of dishes, keyed by weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekMenu {
    pub monday: Vec<String>,
    pub tuesday: Vec<String>,
    pub wednesday: Vec<String>,
    pub thursday: Vec<String>,
    pub friday: Vec<String>,
}

impl WeekMenu {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        snapshot::load_toml(path)
    }

    pub fn day(&self, weekday: Weekday) -> &[String] {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat | Weekday::Sun => &[],
        }
    }
}

impl MenuSource for WeekMenu {
    fn menu_for_weekday(&self, weekday: Weekday) -> Result<Option<Vec<String>>, SourceError> {
        let dishes = self.day(weekday);
        Ok((!dishes.is_empty()).then(|| dishes.to_vec()))
    }
}

pub struct LunchMenu {
    source: Arc<dyn MenuSource>,
    clock: Arc<dyn Clock>,
}

impl LunchMenu {
    pub fn new(source: Arc<dyn MenuSource>, clock: Arc<dyn Clock>) -> Self {
        Self { source, clock }
    }

    /// The menu for a day relative to today.
    ///
    /// `when` must be one of the single-day lunch subcategories; anything else
    /// is treated as today.
    pub fn menu_for_day_phrase(&self, when: CommandSubcategory) -> Result<String, SourceError> {
        let (offset, tempus, tense) = match when {
            CommandSubcategory::LunchYesterday => (-1, "igår", "ades"),
            CommandSubcategory::LunchTomorrow => (1, "imorgon", "as"),
            CommandSubcategory::LunchDayAfterTomorrow => (2, "i övermorgon", "as"),
            _ => (0, "idag", "as"),
        };
        let day = self.clock.today() + TimeDelta::days(offset);

        Ok(match self.source.menu_for_weekday(day.weekday())? {
            Some(dishes) if !dishes.is_empty() => {
                format!("Detta server{tense} {tempus}!\n\n{}", dishes.join("\n"))
            }
            _ => format!("Jag ser inget på menyn för {tempus}."),
        })
    }

    pub fn menu_for_week_phrase(&self) -> Result<String, SourceError> {
        let week = self.source.menu_for_week()?;
        let days: Vec<String> = SCHOOL_DAYS
            .iter()
            .zip(week.iter().map(Some).chain(std::iter::repeat(None)))
            .map(|(weekday, dishes)| {
                let dishes = match dishes {
                    Some(d) if !d.is_empty() => d.join("\n"),
                    _ => "Meny inte tillgänglig.".to_string(),
                };
                format!("**{}**\n{}\n", weekday_name(*weekday), dishes)
            })
            .collect();
        Ok(format!(
            "Här är veckans meny :slight_smile:\n\n{}",
            days.join("\n")
        ))
    }

    pub fn feature(self: Arc<Self>) -> CallbackFeature {
        let parser = KeywordParser::new(CommandCategory::LunchMenu)
            .keywords([
                "lunch", "mat", "käk", "krubb", "föda", "tugg", "matsedel", "meny",
            ])
            .words(["igår"], CommandSubcategory::LunchYesterday)
            .words(["idag"], CommandSubcategory::LunchToday)
            .words(
                ["imor", "imorn", "imorgon", "imoron", "imorron", "imorrn"],
                CommandSubcategory::LunchTomorrow,
            )
            .words(
                ["övermorgon", "övermorn", "övermorrn"],
                CommandSubcategory::LunchDayAfterTomorrow,
            )
            .words(
                ["vecka", "veckan", "veckans"],
                CommandSubcategory::LunchForWeek,
            )
            .fallback(CommandSubcategory::LunchToday);

        let mut builder =
            CallbackFeature::builder("lunch_menu", parser).pronouns([Pronoun::Interrogative]);
        for when in [
            CommandSubcategory::LunchYesterday,
            CommandSubcategory::LunchToday,
            CommandSubcategory::LunchTomorrow,
            CommandSubcategory::LunchDayAfterTomorrow,
        ] {
            let menu = Arc::clone(&self);
            builder = builder.on(when, move || Ok(menu.menu_for_day_phrase(when)?));
        }
        builder
            .on(CommandSubcategory::LunchForWeek, move || {
                Ok(self.menu_for_week_phrase()?)
            })
            .build()
    }
}
