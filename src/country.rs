// country.rs
use crate::continent::Continent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub full_name: String,
    pub iso_code: String,
    pub continent: Continent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_fact: Option<String>,
}

impl Country {
    pub fn new(full_name: &str, iso_code: &str, continent: Continent) -> Self {
        Self {
            full_name: full_name.to_string(),
            iso_code: iso_code.to_string(),
            continent,
            capital: None,
            fun_fact: None,
        }
    }

    pub fn with_capital(mut self, capital: &str) -> Self {
        self.capital = Some(capital.to_string());
        self
    }

    pub fn with_fun_fact(mut self, fun_fact: &str) -> Self {
        self.fun_fact = Some(fun_fact.to_string());
        self
    }

    pub fn is(&self, iso_code: &str) -> bool {
        self.iso_code.eq_ignore_ascii_case(iso_code)
    }
}

// Countries are the same country when their ISO codes match, regardless of
// where the value came from.
impl PartialEq for Country {
    fn eq(&self, other: &Self) -> bool {
        self.is(&other.iso_code)
    }
}

impl Eq for Country {}
