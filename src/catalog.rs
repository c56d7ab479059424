// catalog.rs
use crate::continent::{Continent, ContinentFilter};
use crate::country::Country;
use crate::error::{QuizError, Result};
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub const MIN_COUNTRIES_PER_CONTINENT: usize = 4;

lazy_static! {
    static ref ISO_CODE: Regex = Regex::new(r"^[A-Z]{2}$").unwrap();
}

/// Read-only list of every country the quiz can ask about.
///
/// A catalog is only built through [`Catalog::new`], which guarantees unique
/// ISO codes and at least four countries on every continent, so any non-empty
/// continent filter yields a pool large enough for a round.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    countries: Vec<Country>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(countries: Vec<Country>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for country in &countries {
            if !ISO_CODE.is_match(&country.iso_code) {
                return Err(QuizError::InvalidCatalog(format!(
                    "'{}' has malformed ISO code '{}'",
                    country.full_name, country.iso_code
                )));
            }
            if !seen.insert(country.iso_code.as_str()) {
                duplicates.push(country.iso_code.clone());
            }
        }
        if !duplicates.is_empty() {
            return Err(QuizError::InvalidCatalog(format!(
                "Duplicate ISO codes: {}",
                duplicates.iter().join(", ")
            )));
        }

        let per_continent = countries.iter().map(|c| c.continent).counts();
        for continent in Continent::ALL {
            let count = per_continent.get(&continent).copied().unwrap_or(0);
            if count < MIN_COUNTRIES_PER_CONTINENT {
                return Err(QuizError::InvalidCatalog(format!(
                    "{} has {} countries, at least {} required",
                    continent, count, MIN_COUNTRIES_PER_CONTINENT
                )));
            }
        }

        let index = countries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.iso_code.clone(), i))
            .collect();

        Ok(Self { countries, index })
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn get_country(&self, iso_code: &str) -> Option<&Country> {
        self.index
            .get(&iso_code.to_ascii_uppercase())
            .map(|&i| &self.countries[i])
    }

    pub fn countries_in(&self, continent: Continent) -> impl Iterator<Item = &Country> {
        self.countries.iter().filter(move |c| c.continent == continent)
    }

    /// Countries whose continent is enabled in `filter`, in catalog order.
    pub fn active_countries(&self, filter: &ContinentFilter) -> Vec<&Country> {
        self.countries
            .iter()
            .filter(|c| filter.is_enabled(c.continent))
            .collect()
    }
}
