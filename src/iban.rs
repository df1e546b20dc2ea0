//! IBAN validation and OCR error correction.
//!
//! Both [`IbanValidator`] and [`IbanCorrector`] borrow a
//! [`ReferenceDataset`]; they hold no other state and can be shared freely
//! between threads.

use crate::levenshtein::closest_match;
use crate::reference::{ReferenceDataset, MAX_IBAN_LENGTH, MIN_IBAN_LENGTH};
use thiserror::Error;

/// Reason an IBAN was rejected by [`IbanValidator::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IbanRejection {
    /// Length outside the range any country uses.
    #[error("IBAN must be between 5 and 34 characters, got {0}")]
    Length(usize),

    /// Contains something other than ASCII letters and digits.
    #[error("IBAN may only contain letters and digits")]
    Characters,

    /// Country code is not in the dataset.
    #[error("unsupported country code")]
    UnknownCountry,

    /// Length does not match the country's IBAN length.
    #[error("IBAN for this country must have {expected} characters, got {actual}")]
    CountryLength { expected: usize, actual: usize },

    /// Characters 3 and 4 are not digits.
    #[error("check digits must be numeric")]
    ChecksumDigits,

    /// Bank code is not listed for the country.
    #[error("unknown bank code")]
    BankCode,

    /// The mod-97 remainder is not 1.
    #[error("checksum does not match")]
    Checksum,
}

/// Validates IBANs against a [`ReferenceDataset`].
#[derive(Debug, Clone, Copy)]
pub struct IbanValidator<'a> {
    dataset: &'a ReferenceDataset,
}

impl<'a> IbanValidator<'a> {
    pub fn new(dataset: &'a ReferenceDataset) -> Self {
        Self { dataset }
    }

    /// Validate an IBAN, reporting the first failed check.
    ///
    /// The empty string is valid: it stands for a field that has not been
    /// filled in yet. Letters are accepted in either case.
    ///
    /// # Examples
    ///
    /// ```
    /// use payme_core::iban::{IbanRejection, IbanValidator};
    /// use payme_core::reference::ReferenceDataset;
    ///
    /// let dataset = ReferenceDataset::bundled()?;
    /// let validator = IbanValidator::new(&dataset);
    /// assert!(validator.validate("SK4609000000005030099075").is_ok());
    /// assert_eq!(validator.validate("SK641234"), Err(IbanRejection::CountryLength { expected: 24, actual: 8 }));
    /// # Ok::<(), payme_core::Error>(())
    /// ```
    pub fn validate(&self, iban: &str) -> Result<(), IbanRejection> {
        if iban.is_empty() {
            return Ok(());
        }

        let length = iban.chars().count();
        if !(MIN_IBAN_LENGTH..=MAX_IBAN_LENGTH).contains(&length) {
            return Err(IbanRejection::Length(length));
        }

        if !iban.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(IbanRejection::Characters);
        }

        // ASCII from here on, byte offsets are character offsets.
        let country_code = iban[..2].to_ascii_uppercase();
        let rule = self
            .dataset
            .get(&country_code)
            .ok_or(IbanRejection::UnknownCountry)?;

        if length != rule.iban_length {
            return Err(IbanRejection::CountryLength {
                expected: rule.iban_length,
                actual: length,
            });
        }

        let check = &iban[2..4];
        if !check.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IbanRejection::ChecksumDigits);
        }

        if let Some(width) = rule.bank_code_length() {
            let bank_code = iban.get(4..4 + width).ok_or(IbanRejection::BankCode)?;
            if !rule.has_bank_code(bank_code) {
                return Err(IbanRejection::BankCode);
            }
        }

        let rearranged = format!("{}{}{}", &iban[4..], country_code, check);
        match mod97(&rearranged) {
            Some(1) => Ok(()),
            _ => Err(IbanRejection::Checksum),
        }
    }

    /// Boolean view of [`validate`](Self::validate).
    pub fn is_valid(&self, iban: &str) -> bool {
        self.validate(iban).is_ok()
    }

    /// Whether the bank code inside `iban` is listed for its country.
    ///
    /// Countries without a bank-code list always pass. Unknown countries and
    /// IBANs too short to hold a bank code fail.
    pub fn has_valid_bank_code(&self, iban: &str) -> bool {
        let Some(country) = iban_country(iban) else {
            return false;
        };
        let Some(rule) = self.dataset.get(country) else {
            return false;
        };
        match rule.bank_code_length() {
            None => true,
            Some(width) => iban
                .get(4..4 + width)
                .map(|code| rule.has_bank_code(code))
                .unwrap_or(false),
        }
    }

    /// Expected IBAN length for the country the IBAN starts with.
    pub fn expected_length(&self, iban: &str) -> Option<usize> {
        iban_country(iban).and_then(|country| self.dataset.iban_length(country))
    }
}

/// Best-effort repair of IBANs read by OCR.
#[derive(Debug, Clone, Copy)]
pub struct IbanCorrector<'a> {
    dataset: &'a ReferenceDataset,
}

impl<'a> IbanCorrector<'a> {
    pub fn new(dataset: &'a ReferenceDataset) -> Self {
        Self { dataset }
    }

    /// Repair common OCR mistakes in an IBAN.
    ///
    /// `O` becomes `0`, everything except ASCII letters and digits is
    /// dropped, the country code is replaced by the nearest known one and,
    /// when the country lists bank codes, the bank code by the nearest listed
    /// one. The result is not guaranteed to be valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use payme_core::iban::IbanCorrector;
    /// use payme_core::reference::ReferenceDataset;
    ///
    /// let dataset = ReferenceDataset::bundled()?;
    /// let corrector = IbanCorrector::new(&dataset);
    /// assert_eq!(corrector.fix("SK46 0900 0ooO O050 3009 9075"), "SK4609000000005030099075");
    /// # Ok::<(), payme_core::Error>(())
    /// ```
    pub fn fix(&self, raw: &str) -> String {
        let cleaned: String = raw
            .chars()
            .map(|ch| if ch == 'o' || ch == 'O' { '0' } else { ch })
            .filter(|ch| ch.is_ascii_alphanumeric())
            .map(|ch| ch.to_ascii_uppercase())
            .collect();

        if cleaned.len() < 2 {
            return cleaned;
        }

        let country = closest_match(&cleaned[..2], self.dataset.country_codes());
        let Some(rule) = self.dataset.get(&country) else {
            return cleaned;
        };

        let fixed = match (cleaned.len(), rule.bank_code_length()) {
            (2, _) => country,
            (len, Some(width)) if len >= 4 + width => {
                let check = &cleaned[2..4];
                let bank_code = &cleaned[4..4 + width];
                let closest_bank_code = closest_match(bank_code, &rule.bank_code_prefixes);
                format!("{}{}{}{}", country, check, closest_bank_code, &cleaned[4 + width..])
            }
            _ => format!("{}{}", country, &cleaned[2..]),
        };

        if fixed != raw {
            log::debug!("corrected IBAN {:?} to {:?}", raw, fixed);
        }

        fixed
    }
}

/// Country part of an IBAN, or `None` when fewer than two non-blank
/// characters are present.
pub fn iban_country(iban: &str) -> Option<&str> {
    let end = iban.char_indices().nth(2).map(|(idx, _)| idx).unwrap_or(iban.len());
    let country = &iban[..end];
    if country.trim().chars().count() == 2 {
        Some(country)
    } else {
        None
    }
}

/// Remainder modulo 97 of an alphanumeric string read as a number, with
/// letters expanded to two digits (`A` = 10 ... `Z` = 35).
///
/// Returns `None` if the input contains anything but ASCII letters and
/// digits.
pub fn mod97(value: &str) -> Option<u32> {
    let mut remainder: u32 = 0;
    for ch in value.chars() {
        let digit = ch.to_digit(36)?;
        remainder = if digit < 10 {
            (remainder * 10 + digit) % 97
        } else {
            (remainder * 100 + digit) % 97
        };
    }
    Some(remainder)
}

/// Compute the two check digits for a country code and BBAN.
pub fn check_digits(country: &str, bban: &str) -> Option<String> {
    if country.len() != 2 || !country.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return None;
    }
    let remainder = mod97(&format!("{}{}00", bban, country.to_ascii_uppercase()))?;
    Some(format!("{:02}", 98 - remainder))
}

/// Format an IBAN in groups of four characters for display.
pub fn format_iban(iban: &str) -> String {
    iban.chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<Vec<char>>()
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const VALID_SK: &str = "SK4609000000005030099075";

    fn dataset() -> ReferenceDataset {
        ReferenceDataset::bundled().unwrap()
    }

    #[test]
    fn test_empty_iban_is_valid() {
        let dataset = dataset();
        assert!(IbanValidator::new(&dataset).is_valid(""));
    }

    #[test]
    fn test_length_bounds() {
        let dataset = dataset();
        let validator = IbanValidator::new(&dataset);
        assert_eq!(validator.validate("SK12"), Err(IbanRejection::Length(4)));
        let long = "SK".to_string() + &"1".repeat(33);
        assert_eq!(validator.validate(&long), Err(IbanRejection::Length(35)));
    }

    #[test]
    fn test_invalid_characters() {
        let dataset = dataset();
        let validator = IbanValidator::new(&dataset);
        assert_eq!(
            validator.validate("SK46 0900 0000 0050 3009 9075"),
            Err(IbanRejection::Characters)
        );
        assert_eq!(validator.validate("SK46-09000"), Err(IbanRejection::Characters));
    }

    #[test]
    fn test_unknown_country() {
        let dataset = dataset();
        let validator = IbanValidator::new(&dataset);
        assert_eq!(
            validator.validate("AR000000000000000000"),
            Err(IbanRejection::UnknownCountry)
        );
    }

    #[test]
    fn test_wrong_length_for_country() {
        let dataset = dataset();
        let validator = IbanValidator::new(&dataset);
        assert!(!validator.is_valid("SK641234"));
    }

    #[test]
    fn test_non_numeric_check_digits() {
        let dataset = dataset();
        let validator = IbanValidator::new(&dataset);
        assert_eq!(
            validator.validate("SKA609000000005030099075"),
            Err(IbanRejection::ChecksumDigits)
        );
    }

    #[test]
    fn test_unknown_bank_code() {
        let dataset = dataset();
        let validator = IbanValidator::new(&dataset);
        assert_eq!(
            validator.validate("SK4699990000005030099075"),
            Err(IbanRejection::BankCode)
        );
    }

    #[test]
    fn test_bad_checksum() {
        let dataset = dataset();
        let validator = IbanValidator::new(&dataset);
        assert_eq!(
            validator.validate("SK5609000000005030099075"),
            Err(IbanRejection::Checksum)
        );
    }

    #[test]
    fn test_valid_ibans() {
        let dataset = dataset();
        let validator = IbanValidator::new(&dataset);
        assert!(validator.is_valid(VALID_SK));
        assert!(validator.is_valid("sk4609000000005030099075"));
        assert!(validator.is_valid("CZ6508000000192000145399"));
        assert!(validator.is_valid("DE89370400440532013000"));
    }

    #[test]
    fn test_has_valid_bank_code() {
        let dataset = dataset();
        let validator = IbanValidator::new(&dataset);
        assert!(validator.has_valid_bank_code(VALID_SK));
        assert!(!validator.has_valid_bank_code("SK4699990000005030099075"));
        assert!(!validator.has_valid_bank_code("SK46"));
        assert!(validator.has_valid_bank_code("DE89370400440532013000"));
        assert!(!validator.has_valid_bank_code("AR00"));
    }

    #[test]
    fn test_expected_length() {
        let dataset = dataset();
        let validator = IbanValidator::new(&dataset);
        assert_eq!(validator.expected_length("sk46"), Some(24));
        assert_eq!(validator.expected_length("S"), None);
        assert_eq!(validator.expected_length("AR"), None);
    }

    #[test]
    fn test_fix_replaces_letter_o() {
        let dataset = dataset();
        let corrector = IbanCorrector::new(&dataset);
        assert_eq!(corrector.fix("SK4609000ooOO05030099075"), VALID_SK);
    }

    #[test]
    fn test_fix_country_code() {
        let dataset = dataset();
        let corrector = IbanCorrector::new(&dataset);
        assert_eq!(corrector.fix("KK"), "DK");
        assert_eq!(corrector.fix("5Z6508000000192000145399"), "CZ6508000000192000145399");
    }

    #[test]
    fn test_fix_bank_code() {
        let dataset = dataset();
        let corrector = IbanCorrector::new(&dataset);
        assert_eq!(corrector.fix("SK001900"), "SK000900");
    }

    #[test]
    fn test_fix_short_inputs() {
        let dataset = dataset();
        let corrector = IbanCorrector::new(&dataset);
        assert_eq!(corrector.fix(""), "");
        assert_eq!(corrector.fix("s"), "S");
        assert_eq!(corrector.fix("-"), "");
        // Too short for a bank code: only the country is corrected.
        assert_eq!(corrector.fix("SK46090"), "SK46090");
    }

    #[test]
    fn test_fix_strips_separators() {
        let dataset = dataset();
        let corrector = IbanCorrector::new(&dataset);
        assert_eq!(corrector.fix("sk46 0900-0000.0050/3009 9075"), VALID_SK);
    }

    #[test]
    fn test_fix_then_validate_is_stable() {
        let dataset = dataset();
        let corrector = IbanCorrector::new(&dataset);
        let validator = IbanValidator::new(&dataset);
        for raw in ["SK4609000ooOO05030099075", "KK", "SK001900", "xx12 3456", "CZ65 O8OO 0000 1920 0014 5399"] {
            let once = corrector.fix(raw);
            let twice = corrector.fix(&once);
            assert_eq!(validator.is_valid(&twice), validator.is_valid(&corrector.fix(&twice)));
        }
    }

    #[test]
    fn test_with_fixture_dataset() {
        let dataset = ReferenceDataset::from_json(
            r#"[{"country": "Testland", "code": "TT", "length": 8, "bank_codes": ["AB"]}]"#,
        )
        .unwrap();
        let corrector = IbanCorrector::new(&dataset);
        assert_eq!(corrector.fix("XX12AC34"), "TT12AB34");
    }

    #[test]
    fn test_bank_code_case_agrees_with_validation() {
        let dataset = ReferenceDataset::from_json(
            r#"[{"country": "Testland", "code": "TT", "length": 8, "bank_codes": ["AB"]}]"#,
        )
        .unwrap();
        let validator = IbanValidator::new(&dataset);
        assert!(validator.has_valid_bank_code("TT12AB34"));
        assert_ne!(validator.validate("TT12AB34"), Err(IbanRejection::BankCode));
        assert!(!validator.has_valid_bank_code("tt12ab34"));
        assert_eq!(validator.validate("tt12ab34"), Err(IbanRejection::BankCode));
    }

    proptest! {
        #[test]
        fn prop_fix_validity_is_stable(raw in r"[A-Za-z0-9oO \-]{0,30}") {
            let dataset = dataset();
            let corrector = IbanCorrector::new(&dataset);
            let validator = IbanValidator::new(&dataset);
            let twice = corrector.fix(&corrector.fix(&raw));
            prop_assert_eq!(validator.is_valid(&twice), validator.is_valid(&corrector.fix(&twice)));
        }
    }

    #[test]
    fn test_iban_country() {
        assert_eq!(iban_country("SK46"), Some("SK"));
        assert_eq!(iban_country("S"), None);
        assert_eq!(iban_country("S "), None);
        assert_eq!(iban_country(""), None);
    }

    #[test]
    fn test_mod97() {
        assert_eq!(mod97("09000000005030099075SK46"), Some(1));
        assert_eq!(mod97("12"), Some(12));
        assert_eq!(mod97("A"), Some(10));
        assert_eq!(mod97("1-2"), None);
    }

    #[test]
    fn test_check_digits() {
        assert_eq!(check_digits("SK", "09000000005030099075").as_deref(), Some("46"));
        assert_eq!(check_digits("de", "370400440532013000").as_deref(), Some("89"));
        assert_eq!(check_digits("S", "1234"), None);
    }

    #[test]
    fn test_format_iban() {
        assert_eq!(format_iban(VALID_SK), "SK46 0900 0000 0050 3009 9075");
        assert_eq!(format_iban("SK46 09"), "SK46 09");
    }
}
