//! payme.sk payment links.

use crate::types::Transaction;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const PAYME_BASE: &str = "https://payme.sk";
const PAYME_VERSION: &str = "1";

/// Characters left unescaped in query values: letters, digits and `-_.!~*'()`.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Payment reference in the `/VS.../SS.../KS...` form used by the `PI` parameter.
pub fn payment_reference(transaction: &Transaction) -> String {
    format!(
        "/VS{}/SS{}/KS{}",
        transaction.variable_symbol, transaction.specific_symbol, transaction.constant_symbol
    )
}

/// Build the payme.sk link for a transaction.
///
/// Values are not validated here; an invalid transaction still yields a
/// well-formed URL.
///
/// # Examples
///
/// ```
/// use payme_core::payment_link::payment_link;
/// use payme_core::Transaction;
/// use rust_decimal::Decimal;
///
/// let tx = Transaction::new(Decimal::new(1550, 2), "EUR".into(), "SK4609000000005030099075".into(), "Jan".into());
/// let link = payment_link(&tx);
/// assert!(link.starts_with("https://payme.sk?V=1&IBAN=SK4609000000005030099075&AM=15.50&CC=EUR"));
/// ```
pub fn payment_link(transaction: &Transaction) -> String {
    let amount = transaction.amount.to_string();
    let date = transaction.date_string();
    let reference = payment_reference(transaction);

    let params: [(&str, &str); 8] = [
        ("V", PAYME_VERSION),
        ("IBAN", transaction.iban.as_str()),
        ("AM", amount.as_str()),
        ("CC", transaction.currency.as_str()),
        ("DT", date.as_str()),
        ("PI", reference.as_str()),
        ("CN", transaction.beneficiary_name.as_str()),
        ("MSG", transaction.note.as_str()),
    ];

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, utf8_percent_encode(value, QUERY_VALUE)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", PAYME_BASE, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn transaction() -> Transaction {
        let mut tx = Transaction::new(
            Decimal::new(1550, 2),
            "EUR".into(),
            "SK4609000000005030099075".into(),
            "Jana Nováková".into(),
        );
        tx.variable_symbol = "123".into();
        tx.constant_symbol = "0308".into();
        tx.note = "Rent & fees".into();
        tx.date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        tx
    }

    #[test]
    fn test_payment_reference() {
        assert_eq!(payment_reference(&transaction()), "/VS123/SS/KS0308");
    }

    #[test]
    fn test_payment_link() {
        assert_eq!(
            payment_link(&transaction()),
            "https://payme.sk?V=1&IBAN=SK4609000000005030099075&AM=15.50&CC=EUR&DT=20240307\
             &PI=%2FVS123%2FSS%2FKS0308&CN=Jana%20Nov%C3%A1kov%C3%A1&MSG=Rent%20%26%20fees"
        );
    }

    #[test]
    fn test_payment_link_keeps_unreserved_marks() {
        let mut tx = transaction();
        tx.note = "a-b_c.d!e~f*g'h(i)".into();
        assert!(payment_link(&tx).ends_with("&MSG=a-b_c.d!e~f*g'h(i)"));
    }

    #[test]
    fn test_payment_link_empty_fields() {
        let tx = Transaction {
            iban: String::new(),
            beneficiary_name: String::new(),
            note: String::new(),
            ..transaction()
        };
        let link = payment_link(&tx);
        assert!(link.contains("&IBAN=&AM="));
        assert!(link.ends_with("&CN=&MSG="));
    }
}
