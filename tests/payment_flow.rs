use chrono::NaiveDate;
use payme_core::validation::{is_valid_amount, is_valid_variable_symbol};
use payme_core::{
    compressed_data, decode_compressed_data, payment_link, IbanCorrector, IbanValidator,
    ReferenceDataset, Transaction,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn ocr_fields() -> HashMap<String, String> {
    [
        ("amount", "42,10"),
        ("currency", "EUR"),
        ("iban", "SK46 0900 0ooO O050 3009 9075"),
        ("beneficiary name", "Jana Novakova"),
        ("variable symbol", "20240001"),
        ("note", "Invoice 1"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[test]
fn ocr_text_to_qr_payload() {
    let dataset = ReferenceDataset::bundled().unwrap();
    let corrector = IbanCorrector::new(&dataset);
    let validator = IbanValidator::new(&dataset);

    let mut fields = ocr_fields();
    assert!(!validator.is_valid(&fields["iban"]));

    let fixed = corrector.fix(&fields["iban"]);
    assert_eq!(fixed, "SK4609000000005030099075");
    assert!(validator.is_valid(&fixed));
    fields.insert("iban".to_string(), fixed);

    assert!(is_valid_amount(&fields["amount"]));
    assert!(is_valid_variable_symbol(&fields["variable symbol"]));

    let mut transaction = Transaction::from_form_fields(&fields).unwrap();
    transaction.date = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();

    assert_eq!(
        payment_link(&transaction),
        "https://payme.sk?V=1&IBAN=SK4609000000005030099075&AM=42.10&CC=EUR&DT=20240531\
         &PI=%2FVS20240001%2FSS%2FKS&CN=Jana%20Novakova&MSG=Invoice%201"
    );

    let encoded = compressed_data(&transaction).unwrap();
    let record = decode_compressed_data(&encoded).unwrap();
    assert_eq!(
        record,
        "\t1\t1\t42.10\tEUR\t20240531\t20240001\t\t\t\tInvoice 1\t1\t\
         SK4609000000005030099075\t\t0\t0\tJana Novakova\t\t\t"
    );
}

#[test]
fn fixture_dataset_from_reader() {
    let json = r#"[
        {"country": "Slovakia", "code": "SK", "length": 24, "bank_codes": ["0900", "1100"]},
        {"country": "Czech Republic", "code": "CZ", "length": 24, "bank_codes": ["0800"]}
    ]"#;
    let dataset = ReferenceDataset::from_read(&mut json.as_bytes()).unwrap();
    let validator = IbanValidator::new(&dataset);
    let corrector = IbanCorrector::new(&dataset);

    assert!(validator.is_valid("SK4609000000005030099075"));
    assert!(validator.is_valid("CZ6508000000192000145399"));
    assert!(!validator.is_valid("DE89370400440532013000"));
    assert_eq!(corrector.fix("CZ65O8I0"), "CZ650800");
}

#[test]
fn validators_share_dataset_across_threads() {
    let dataset = ReferenceDataset::bundled().unwrap();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let validator = IbanValidator::new(&dataset);
                assert!(validator.is_valid("SK4609000000005030099075"));
                assert!(!validator.is_valid("SK5609000000005030099075"));
            });
        }
    });
}
