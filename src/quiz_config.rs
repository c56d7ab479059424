// quiz_config.rs
use crate::catalog::Catalog;
use crate::continent::{Continent, ContinentFilter};
use crate::country::Country;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const DEFAULT_CATALOG: &str = include_str!("countries.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    pub countries: Vec<CountryConfig>,
    #[serde(default)]
    pub enabled_continents: Option<Vec<Continent>>,
    #[serde(default = "default_session_seconds")]
    pub session_seconds: u32,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryConfig {
    pub name: String,
    pub iso_code: String,
    pub continent: Continent,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub fun_fact: Option<String>,
}

fn default_session_seconds() -> u32 {
    QuizConfig::DEFAULT_SESSION_SECONDS
}

impl CountryConfig {
    pub fn to_country(&self) -> Country {
        let mut country = Country::new(&self.name, &self.iso_code.to_ascii_uppercase(), self.continent);
        country.capital = self.capital.clone();
        country.fun_fact = self.fun_fact.clone();
        country
    }
}

impl QuizConfig {
    pub const DEFAULT_SESSION_SECONDS: u32 = 60;

    /// The catalog compiled into the binary.
    pub fn default_catalog() -> Result<Self> {
        let config: QuizConfig = serde_json::from_str(DEFAULT_CATALOG)?;
        Ok(config)
    }

    pub fn load_from_file(filename: &str) -> Result<Self> {
        let data = std::fs::read_to_string(filename)?;
        let config: QuizConfig = serde_json::from_str(&data)?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn to_catalog(&self) -> Result<Catalog> {
        Catalog::new(self.countries.iter().map(CountryConfig::to_country).collect())
    }

    pub fn continent_filter(&self) -> Result<ContinentFilter> {
        match &self.enabled_continents {
            Some(continents) => {
                let set: BTreeSet<Continent> = continents.iter().copied().collect();
                ContinentFilter::from_set(&set)
            }
            None => Ok(ContinentFilter::all()),
        }
    }
}
