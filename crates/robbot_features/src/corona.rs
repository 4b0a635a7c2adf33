//! Pandemic statistics per country
//!
//! Questions are told apart by composite keys: "totalt dött" and "flest
//! dött" share the companion word and only the anchor decides.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use robbot_core::{
    CallbackFeature, CommandCategory, CommandSubcategory, IGNORED_CHARS, KeywordParser, Message,
    Pronoun,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{SourceError, snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Infections,
    Deaths,
    Recoveries,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryStats {
    /// English country name.
    pub country_name: String,
    #[serde(default)]
    pub cases: u64,
    #[serde(default)]
    pub deaths: u64,
    #[serde(default)]
    pub total_recovered: u64,
}

impl CountryStats {
    pub fn get(&self, measure: Measure) -> u64 {
        match measure {
            Measure::Infections => self.cases,
            Measure::Deaths => self.deaths,
            Measure::Recoveries => self.total_recovered,
        }
    }
}

pub trait PandemicStats: Send + Sync {
    fn countries(&self) -> Result<Vec<CountryStats>, SourceError>;

    /// When the statistics were collected, as reported by the source.
    fn taken_at(&self) -> Result<String, SourceError>;

    /// English name for a Swedish country name.
    fn to_english(&self, _swedish: &str) -> Option<String> {
        None
    }

    /// Swedish name for an English country name.
    fn to_swedish(&self, _english: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translations {
    #[serde(default)]
    pub swe_to_eng: HashMap<String, String>,
    #[serde(default)]
    pub eng_to_swe: HashMap<String, String>,
}

/// Statistics captured at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub statistic_taken_at: String,
    #[serde(default)]
    pub countries_stat: Vec<CountryStats>,
    #[serde(default)]
    pub translations: Translations,
}

impl StatsSnapshot {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        snapshot::load_toml(path)
    }
}

impl PandemicStats for StatsSnapshot {
    fn countries(&self) -> Result<Vec<CountryStats>, SourceError> {
        Ok(self.countries_stat.clone())
    }

    fn taken_at(&self) -> Result<String, SourceError> {
        Ok(self.statistic_taken_at.clone())
    }

    fn to_english(&self, swedish: &str) -> Option<String> {
        self.translations
            .swe_to_eng
            .get(&swedish.to_lowercase())
            .cloned()
    }

    fn to_swedish(&self, english: &str) -> Option<String> {
        self.translations
            .eng_to_swe
            .get(&english.to_lowercase())
            .cloned()
    }
}

pub struct CoronaSpread {
    stats: Arc<dyn PandemicStats>,
}

impl CoronaSpread {
    pub fn new(stats: Arc<dyn PandemicStats>) -> Self {
        Self { stats }
    }

    pub fn total(&self, measure: Measure) -> Result<u64, SourceError> {
        Ok(self.stats.countries()?.iter().map(|c| c.get(measure)).sum())
    }

    /// The country with the highest (or lowest) figure, named in Swedish
    /// when a translation exists.
    pub fn extreme(&self, measure: Measure, most: bool) -> Result<(String, u64), SourceError> {
        let countries = self.stats.countries()?;
        let pick = if most {
            countries.iter().max_by_key(|c| c.get(measure))
        } else {
            countries.iter().min_by_key(|c| c.get(measure))
        };
        let country = pick.ok_or(SourceError::Empty {
            source_name: "pandemic statistics",
        })?;
        let name = self
            .stats
            .to_swedish(&country.country_name)
            .unwrap_or_else(|| country.country_name.clone());
        Ok((name, country.get(measure)))
    }

    /// Figure for one country given by its Swedish (or English) name.
    pub fn by_country(&self, measure: Measure, country: &str) -> Result<u64, SourceError> {
        let english = self
            .stats
            .to_english(country)
            .unwrap_or_else(|| country.to_string())
            .to_lowercase();
        debug!("Looking up {:?} for '{}'", measure, english);
        self.stats
            .countries()?
            .iter()
            .find(|c| c.country_name.to_lowercase() == english)
            .map(|c| c.get(measure))
            .ok_or_else(|| SourceError::UnknownCountry {
                country: country.to_string(),
            })
    }

    pub fn timestamp_phrase(&self) -> Result<String, SourceError> {
        Ok(format!("Statistiken är från {}", self.stats.taken_at()?))
    }

    pub fn total_phrase(&self, measure: Measure) -> Result<String, SourceError> {
        let total = self.total(measure)?;
        Ok(match measure {
            Measure::Deaths => format!("Totalt har {total} omkommit globalt"),
            Measure::Recoveries => format!("Totalt har {total} tillfrisknat globalt"),
            Measure::Infections => format!("Totalt har {total} insjuknat globalt"),
        })
    }

    pub fn extreme_phrase(&self, measure: Measure, most: bool) -> Result<String, SourceError> {
        let (country, count) = self.extreme(measure, most)?;
        Ok(match (measure, most) {
            (Measure::Deaths, true) => format!("Flest har omkommit i {country}: {count}"),
            (Measure::Recoveries, true) => format!("Flest har tillfrisknat i {country}: {count}"),
            (Measure::Infections, true) => format!("Flest har insjuknat i {country}: {count}"),
            (Measure::Deaths, false) => format!("Minst antal dödsfall har {country}: {count}"),
            (Measure::Recoveries, false) => format!("Minst tillfrisknade: {country}: {count}"),
            (Measure::Infections, false) => {
                format!("Minst antal insjuknade har {country}: {count}")
            }
        })
    }

    /// Answer for the country named by the last word of the message.
    pub fn by_country_phrase(
        &self,
        measure: Measure,
        message: &Message,
    ) -> Result<String, SourceError> {
        let country = message
            .content
            .last()
            .map(|w| w.trim_matches(|c: char| IGNORED_CHARS.contains(c)))
            .unwrap_or_default();

        match self.by_country(measure, country) {
            Ok(count) => Ok(match measure {
                Measure::Infections => format!("{count} har smittats av corona i {country}"),
                Measure::Deaths => format!("{count} har omkommit i corona i {country}"),
                Measure::Recoveries => format!("{count} har tillfrisknat i corona i {country}"),
            }),
            Err(SourceError::UnknownCountry { country }) => {
                Ok(format!("Ogiltigt land: \"{country}\""))
            }
            Err(err) => Err(err),
        }
    }

    pub fn feature(self: Arc<Self>) -> CallbackFeature {
        use CommandSubcategory::*;

        let deaths = ["döda", "dödsfall", "omkommit", "omkomna", "dött"];
        let parser = KeywordParser::new(CommandCategory::CoronaSpread)
            .keywords(["land", "många", "corona", "coronafall"])
            .composite(
                "när",
                ["uppdaterad", "uppdaterades", "statistik", "statistiken"],
                CoronaDataTimestamp,
            )
            .composite("hur", ["gammal", "data", "datan"], CoronaDataTimestamp)
            .composite("totalt", ["dött", "omkommit", "döda"], CoronaSpreadTotalDeaths)
            .composite(
                "totalt",
                ["friska", "tillfrisknat", "återhämtat"],
                CoronaSpreadTotalRecoveries,
            )
            .composite(
                "totalt",
                ["smittade", "smittats", "sjuka"],
                CoronaSpreadTotalInfections,
            )
            .composite("flest", deaths, CoronaSpreadMostDeaths)
            .composite("flest", ["friska", "tillfrisknat"], CoronaSpreadMostRecoveries)
            .composite("flest", ["smittade", "sjuka"], CoronaSpreadMostInfections)
            .composite("minst", ["smittade", "sjuka"], CoronaSpreadLeastInfections)
            .composite("minst", deaths, CoronaSpreadLeastDeaths)
            .composite("minst", ["friska", "tillfrisknat"], CoronaSpreadLeastRecoveries)
            .composite("har", ["smittats", "sjuka"], CoronaInfectionsByQuery)
            .composite("är", ["smittade", "sjuka"], CoronaInfectionsByQuery)
            .composite("har", ["dött", "omkommit"], CoronaDeathsByQuery)
            .composite("har", ["friska", "tillfrisknat"], CoronaRecoveriesByQuery);

        let mut builder =
            CallbackFeature::builder("corona_spread", parser).pronouns([Pronoun::Interrogative]);

        let timestamp = Arc::clone(&self);
        builder = builder.on(CoronaDataTimestamp, move || Ok(timestamp.timestamp_phrase()?));

        for (subcategory, measure) in [
            (CoronaSpreadTotalDeaths, Measure::Deaths),
            (CoronaSpreadTotalRecoveries, Measure::Recoveries),
            (CoronaSpreadTotalInfections, Measure::Infections),
        ] {
            let spread = Arc::clone(&self);
            builder = builder.on(subcategory, move || Ok(spread.total_phrase(measure)?));
        }

        for (subcategory, measure, most) in [
            (CoronaSpreadMostDeaths, Measure::Deaths, true),
            (CoronaSpreadMostRecoveries, Measure::Recoveries, true),
            (CoronaSpreadMostInfections, Measure::Infections, true),
            (CoronaSpreadLeastDeaths, Measure::Deaths, false),
            (CoronaSpreadLeastRecoveries, Measure::Recoveries, false),
            (CoronaSpreadLeastInfections, Measure::Infections, false),
        ] {
            let spread = Arc::clone(&self);
            builder = builder.on(subcategory, move || {
                Ok(spread.extreme_phrase(measure, most)?)
            });
        }

        for (subcategory, measure) in [
            (CoronaInfectionsByQuery, Measure::Infections),
            (CoronaDeathsByQuery, Measure::Deaths),
            (CoronaRecoveriesByQuery, Measure::Recoveries),
        ] {
            let spread = Arc::clone(&self);
            builder = builder.on_message(subcategory, move |message| {
                Ok(spread.by_country_phrase(measure, message)?)
            });
        }

        builder.build()
    }
}
