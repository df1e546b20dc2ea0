//! payme core library
//!
//! Validation, OCR correction and encoding of payment orders for Slovak and
//! SEPA payments.
//!
//! # Features
//!
//! - IBAN validation against a country rule dataset (length, bank code, mod-97)
//! - Repair of OCR-damaged IBANs by nearest match on country and bank code
//! - Validation of amounts and payment symbols entered in a form
//! - payme.sk payment links
//! - QR payloads in the by-square format (CRC-32 + raw LZMA1 + base-32)
//!
//! # Examples
//!
//! ## Fixing and validating an IBAN
//!
//! ```
//! use payme_core::{IbanCorrector, IbanValidator, ReferenceDataset};
//!
//! let dataset = ReferenceDataset::bundled()?;
//! let fixed = IbanCorrector::new(&dataset).fix("SK46 O900 0000 0050 3009 9075");
//! assert!(IbanValidator::new(&dataset).is_valid(&fixed));
//! # Ok::<(), payme_core::Error>(())
//! ```
//!
//! ## Encoding a payment
//!
//! ```
//! use payme_core::{compressed_data, payment_link, Transaction};
//! use rust_decimal::Decimal;
//!
//! let tx = Transaction::new(
//!     Decimal::new(1550, 2),
//!     "EUR".into(),
//!     "SK4609000000005030099075".into(),
//!     "Jana Novakova".into(),
//! );
//! println!("{}", payment_link(&tx));
//! println!("{}", compressed_data(&tx)?);
//! # Ok::<(), payme_core::Error>(())
//! ```

pub mod error;
pub mod reference;
pub mod levenshtein;
pub mod iban;
pub mod validation;
pub mod types;
pub mod payment_link;
pub mod encoding;
pub mod logging;

// Re-export commonly used types
pub use encoding::{compressed_data, decode_compressed_data};
pub use error::{Error, Result};
pub use iban::{IbanCorrector, IbanRejection, IbanValidator};
pub use payment_link::payment_link;
pub use reference::{CountryRule, ReferenceDataset};
pub use types::{Currency, Transaction};
