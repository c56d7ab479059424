// continent.rs
use crate::error::{QuizError, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    NorthAmerica,
    Oceania,
    SouthAmerica,
}

impl Continent {
    pub const ALL: [Continent; 6] = [
        Continent::Africa,
        Continent::Asia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::Oceania,
        Continent::SouthAmerica,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "NorthAmerica",
            Continent::Oceania => "Oceania",
            Continent::SouthAmerica => "SouthAmerica",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Continent {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self> {
        Continent::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| QuizError::UnknownContinent(s.to_string()))
    }
}

/// Which continents contribute countries to the active pool.
///
/// Every continent always has an entry, and at least one entry is `true`.
/// Changes that would disable the last continent are rejected and leave the
/// filter untouched. On the wire a filter is the list of enabled continents,
/// and an empty list does not deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "BTreeSet<Continent>", into = "BTreeSet<Continent>")]
pub struct ContinentFilter {
    enabled: BTreeMap<Continent, bool>,
}

impl Default for ContinentFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl ContinentFilter {
    pub fn all() -> Self {
        Self {
            enabled: Continent::ALL.iter().map(|&c| (c, true)).collect(),
        }
    }

    pub fn from_set(continents: &BTreeSet<Continent>) -> Result<Self> {
        let mut filter = Self::all();
        filter.set_enabled_set(continents)?;
        Ok(filter)
    }

    pub fn is_enabled(&self, continent: Continent) -> bool {
        self.enabled[&continent]
    }

    pub fn enabled(&self) -> BTreeSet<Continent> {
        self.enabled
            .iter()
            .filter(|(_, on)| **on)
            .map(|(c, _)| *c)
            .collect()
    }

    pub fn set_enabled(&mut self, continent: Continent, enabled: bool) -> Result<()> {
        if !enabled && self.is_enabled(continent) && self.enabled().len() == 1 {
            return Err(QuizError::InvalidFilterChange);
        }
        self.enabled.insert(continent, enabled);
        Ok(())
    }

    pub fn set_enabled_set(&mut self, continents: &BTreeSet<Continent>) -> Result<()> {
        if continents.is_empty() {
            return Err(QuizError::InvalidFilterChange);
        }
        for continent in Continent::ALL {
            self.enabled.insert(continent, continents.contains(&continent));
        }
        Ok(())
    }

    /// Human readable list of enabled continents, e.g. "Africa, Europe".
    pub fn label(&self) -> String {
        self.enabled().iter().map(|c| c.name()).join(", ")
    }
}

impl TryFrom<BTreeSet<Continent>> for ContinentFilter {
    type Error = QuizError;

    fn try_from(continents: BTreeSet<Continent>) -> Result<Self> {
        ContinentFilter::from_set(&continents)
    }
}

impl From<ContinentFilter> for BTreeSet<Continent> {
    fn from(filter: ContinentFilter) -> Self {
        filter.enabled()
    }
}
