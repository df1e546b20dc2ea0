//! Country rule dataset used for IBAN validation and correction.
//!
//! The dataset maps a two-letter country code to the IBAN length used by that
//! country and, optionally, the list of bank codes that may follow the check
//! digits. It is built once and then only borrowed.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUNDLED_COUNTRIES: &str = include_str!("../data/countries.json");

/// Shortest and longest IBAN accepted anywhere.
pub const MIN_IBAN_LENGTH: usize = 5;
pub const MAX_IBAN_LENGTH: usize = 34;

/// IBAN rules for a single country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRule {
    /// Human readable country name.
    #[serde(rename = "country")]
    pub name: String,

    /// ISO 3166-1 alpha-2 code.
    #[serde(rename = "code")]
    pub country_code: String,

    /// Total IBAN length, country code and check digits included.
    #[serde(rename = "length")]
    pub iban_length: usize,

    /// Valid bank codes. Empty means bank codes are not checked.
    #[serde(rename = "bank_codes")]
    pub bank_code_prefixes: Vec<String>,
}

impl CountryRule {
    /// Width of the bank-code field, taken from the first listed prefix.
    pub fn bank_code_length(&self) -> Option<usize> {
        self.bank_code_prefixes.first().map(|code| code.len())
    }

    /// Whether `code` is one of the listed bank codes.
    pub fn has_bank_code(&self, code: &str) -> bool {
        self.bank_code_prefixes.iter().any(|known| known == code)
    }
}

/// Read-only mapping of country code to [`CountryRule`].
///
/// Keys are kept sorted so that every lookup that iterates countries sees
/// them in the same order on every platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDataset {
    countries: BTreeMap<String, CountryRule>,
}

impl ReferenceDataset {
    /// Parse a dataset from any source implementing `Read`.
    ///
    /// The source must be a JSON array of records with `country`, `code`,
    /// `length` and `bank_codes`. Nothing is returned unless every record is
    /// valid.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use payme_core::reference::ReferenceDataset;
    ///
    /// let mut file = File::open("countries.json")?;
    /// let dataset = ReferenceDataset::from_read(&mut file)?;
    /// println!("{} countries", dataset.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        let rules: Vec<CountryRule> = serde_json::from_reader(reader)?;
        Self::from_rules(rules)
    }

    /// Load a dataset from a JSON file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        Self::from_read(&mut file)
    }

    /// Parse a dataset from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Vec<CountryRule> = serde_json::from_str(json)?;
        Self::from_rules(rules)
    }

    /// The SEPA country table compiled into the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_COUNTRIES)
    }

    /// Build a dataset from already deserialized rules.
    pub fn from_rules(rules: Vec<CountryRule>) -> Result<Self> {
        let mut countries = BTreeMap::new();

        for rule in rules {
            Self::check_rule(&rule)?;
            let code = rule.country_code.clone();
            if countries.insert(code.clone(), rule).is_some() {
                return Err(Error::DataFormat(format!("duplicate country code {}", code)));
            }
        }

        log::info!("loaded IBAN rules for {} countries", countries.len());

        Ok(Self { countries })
    }

    fn check_rule(rule: &CountryRule) -> Result<()> {
        let code = &rule.country_code;
        if code.len() != 2 || !code.chars().all(|ch| ch.is_ascii_uppercase()) {
            return Err(Error::DataFormat(format!("invalid country code {:?}", code)));
        }

        if !(MIN_IBAN_LENGTH..=MAX_IBAN_LENGTH).contains(&rule.iban_length) {
            return Err(Error::DataFormat(format!(
                "IBAN length {} for {} is outside {}..={}",
                rule.iban_length, code, MIN_IBAN_LENGTH, MAX_IBAN_LENGTH
            )));
        }

        if rule.bank_code_prefixes.iter().any(|prefix| prefix.is_empty()) {
            return Err(Error::DataFormat(format!("empty bank code for {}", code)));
        }

        Ok(())
    }

    /// Rule for a country, looked up case-insensitively.
    pub fn get(&self, country_code: &str) -> Option<&CountryRule> {
        self.countries.get(&country_code.to_ascii_uppercase())
    }

    /// Whether the country is present in the dataset.
    pub fn contains(&self, country_code: &str) -> bool {
        self.get(country_code).is_some()
    }

    /// Expected IBAN length for a country.
    pub fn iban_length(&self, country_code: &str) -> Option<usize> {
        self.get(country_code).map(|rule| rule.iban_length)
    }

    /// Known country codes in ascending order.
    pub fn country_codes(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    /// All rules in ascending country-code order.
    pub fn rules(&self) -> impl Iterator<Item = &CountryRule> {
        self.countries.values()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}
