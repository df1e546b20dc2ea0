//! Payment transaction assembled from the form.

use crate::error::{Error, Result};
use crate::validation::payment_amount;
use chrono::{Local, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A single payment order, built once when the user confirms the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Amount to pay.
    pub amount: Decimal,

    /// Currency code (e.g., EUR, CZK).
    pub currency: String,

    /// Beneficiary IBAN.
    pub iban: String,

    /// Beneficiary name.
    pub beneficiary_name: String,

    /// Payment identifier, usually empty.
    pub payment_id: String,

    /// Variable symbol, up to 10 digits.
    pub variable_symbol: String,

    /// Constant symbol, up to 4 digits.
    pub constant_symbol: String,

    /// Specific symbol, up to 10 digits.
    pub specific_symbol: String,

    /// Free text note for the beneficiary.
    pub note: String,

    /// Beneficiary bank SWIFT/BIC.
    pub swift: String,

    /// Standing order flag.
    pub is_recurring: bool,

    /// Direct debit flag.
    pub is_incasso: bool,

    /// First line of the beneficiary address.
    pub beneficiary_address_1: String,

    /// Second line of the beneficiary address.
    pub beneficiary_address_2: String,

    /// Due date, the day the transaction was created.
    pub date: NaiveDate,
}

impl Transaction {
    /// Create a transaction dated today with every optional field empty.
    pub fn new(amount: Decimal, currency: String, iban: String, beneficiary_name: String) -> Self {
        Self {
            amount,
            currency,
            iban,
            beneficiary_name,
            payment_id: String::new(),
            variable_symbol: String::new(),
            constant_symbol: String::new(),
            specific_symbol: String::new(),
            note: String::new(),
            swift: String::new(),
            is_recurring: false,
            is_incasso: false,
            beneficiary_address_1: String::new(),
            beneficiary_address_2: String::new(),
            date: Local::now().date_naive(),
        }
    }

    /// Build a transaction from form values keyed by field name.
    ///
    /// `amount` is required; `currency` defaults to EUR and every other
    /// field to the empty string. Recognised keys: `amount`, `currency`,
    /// `iban`, `beneficiary name`, `variable symbol`, `constant symbol`,
    /// `specific symbol`, `note`, `beneficiary address 1`,
    /// `beneficiary address 2`.
    pub fn from_form_fields(fields: &HashMap<String, String>) -> Result<Self> {
        let field = |name: &str| fields.get(name).cloned().unwrap_or_default();

        let raw_amount = fields
            .get("amount")
            .ok_or_else(|| Error::MissingField("amount".to_string()))?;
        let amount =
            payment_amount(raw_amount).ok_or_else(|| Error::InvalidAmount(raw_amount.clone()))?;

        let currency = fields
            .get("currency")
            .filter(|currency| !currency.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| Currency::Eur.as_str().to_string());

        let mut transaction = Self::new(amount, currency, field("iban"), field("beneficiary name"));
        transaction.variable_symbol = field("variable symbol");
        transaction.constant_symbol = field("constant symbol");
        transaction.specific_symbol = field("specific symbol");
        transaction.note = field("note");
        transaction.beneficiary_address_1 = field("beneficiary address 1");
        transaction.beneficiary_address_2 = field("beneficiary address 2");
        Ok(transaction)
    }

    /// Date as `YYYYMMDD`.
    pub fn date_string(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// Amount rounded half-up to exactly two decimal places.
    pub fn formatted_amount(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{:.2}", rounded)
    }
}

/// Currencies offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    Eur,
    Czk,
    Usd,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Eur, Currency::Czk, Currency::Usd];

    /// ISO 4217 code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Czk => "CZK",
            Currency::Usd => "USD",
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "CZK" => Ok(Currency::Czk),
            "USD" => Ok(Currency::Usd),
            _ => Err(format!("Unsupported currency: {}", s)),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
