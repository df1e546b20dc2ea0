//! QR payload encoding for payment orders (by-square convention).
//!
//! A transaction is written as one tab separated record, prefixed with its
//! CRC-32, compressed as a raw LZMA1 stream and framed with a four byte
//! header. The framed bytes are finally spelled out five bits at a time in
//! the `0-9A-V` alphabet.
//!
//! ```text
//! +------+------+--------------+----------------------------------------+
//! | 0x00 | 0x00 | len (u16 LE) | LZMA1( crc32 (u32 LE) || record UTF-8 ) |
//! +------+------+--------------+----------------------------------------+
//! ```
//!
//! `len` is the size of the checksum plus the record before compression.

use crate::error::{Error, Result};
use crate::types::Transaction;
use std::io::Read;
use liblzma::read::{XzDecoder, XzEncoder};
use liblzma::stream::{Filters, LzmaOptions, Stream};

/// Output alphabet, one character per five bits.
pub const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHIJKLMNOPQRSTUV";

const HEADER: [u8; 2] = [0x00, 0x00];
const PAYMENT_TYPE: &str = "1";
const SEPA_FORMAT: &str = "";
const TARGET_ACCOUNT_TYPE: &str = "1";

const LZMA_PRESET: u32 = 6;
const LZMA_DICT_SIZE: u32 = 128 * 1024;
const LZMA_LITERAL_CONTEXT_BITS: u32 = 3;
const LZMA_LITERAL_POSITION_BITS: u32 = 0;
const LZMA_POSITION_BITS: u32 = 2;

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Tab separated record of a transaction, including the trailing tab.
pub fn serialize_record(transaction: &Transaction) -> String {
    let amount = transaction.formatted_amount();
    let date = transaction.date_string();

    let fields: [&str; 19] = [
        transaction.payment_id.as_str(),
        PAYMENT_TYPE,
        PAYMENT_TYPE,
        amount.as_str(),
        transaction.currency.as_str(),
        date.as_str(),
        transaction.variable_symbol.as_str(),
        transaction.constant_symbol.as_str(),
        transaction.specific_symbol.as_str(),
        SEPA_FORMAT,
        transaction.note.as_str(),
        TARGET_ACCOUNT_TYPE,
        transaction.iban.as_str(),
        transaction.swift.as_str(),
        flag(transaction.is_recurring),
        flag(transaction.is_incasso),
        transaction.beneficiary_name.as_str(),
        transaction.beneficiary_address_1.as_str(),
        transaction.beneficiary_address_2.as_str(),
    ];

    let mut record = fields.join("\t");
    record.push('\t');
    record
}

/// Checksummed, compressed and framed bytes for a transaction.
pub fn framed_payload(transaction: &Transaction) -> Result<Vec<u8>> {
    let record = serialize_record(transaction);
    let payload = record.as_bytes();
    let checksum = crc32fast::hash(payload);

    let mut total = Vec::with_capacity(4 + payload.len());
    total.extend_from_slice(&checksum.to_le_bytes());
    total.extend_from_slice(payload);

    log::debug!("record bytes: {}", hex_bytes(payload));
    log::debug!("record checksum: {}", hex_bytes(&checksum.to_le_bytes()));

    let length = u16::try_from(total.len()).map_err(|_| {
        Error::Compression(format!("payload of {} bytes does not fit the header", total.len()))
    })?;

    let compressed = lzma_compress(&total)?;
    log::debug!(
        "compressed {} bytes into {} bytes",
        total.len(),
        compressed.len()
    );

    let mut framed = Vec::with_capacity(4 + compressed.len());
    framed.extend_from_slice(&HEADER);
    framed.extend_from_slice(&length.to_le_bytes());
    framed.extend_from_slice(&compressed);

    Ok(framed)
}

/// Encoded QR payload for a transaction.
///
/// A failure here means the compressor itself broke; callers should treat
/// it as fatal rather than show it to the user.
///
/// # Examples
///
/// ```
/// use payme_core::encoding::{compressed_data, ALPHABET};
/// use payme_core::Transaction;
/// use rust_decimal::Decimal;
///
/// let tx = Transaction::new(Decimal::new(1550, 2), "EUR".into(), "SK4609000000005030099075".into(), "Jan".into());
/// let encoded = compressed_data(&tx)?;
/// assert!(encoded.bytes().all(|b| ALPHABET.contains(&b)));
/// # Ok::<(), payme_core::Error>(())
/// ```
pub fn compressed_data(transaction: &Transaction) -> Result<String> {
    let framed = framed_payload(transaction)?;
    let encoded = to_base32(&framed);
    log::debug!("encoded {} bytes into {} characters", framed.len(), encoded.len());
    Ok(encoded)
}

/// Recover the tab separated record from an encoded QR payload.
///
/// The header, the declared length and the CRC-32 are all checked.
pub fn decode_compressed_data(text: &str) -> Result<String> {
    let bytes = from_base32(text)?;
    if bytes.len() < 4 {
        return Err(Error::Decode(format!("payload of {} bytes is too short", bytes.len())));
    }
    if bytes[..2] != HEADER {
        return Err(Error::Decode(format!(
            "unsupported header {:02X}{:02X}",
            bytes[0], bytes[1]
        )));
    }

    let length = u16::from_le_bytes([bytes[2], bytes[3]]) as usize;
    let total = lzma_decompress(&bytes[4..])?;
    if total.len() != length {
        return Err(Error::Decode(format!(
            "header declares {} bytes, decompressed {}",
            length,
            total.len()
        )));
    }
    if total.len() < 4 {
        return Err(Error::Decode("missing checksum".to_string()));
    }

    let expected = u32::from_le_bytes([total[0], total[1], total[2], total[3]]);
    let payload = &total[4..];
    let actual = crc32fast::hash(payload);
    if expected != actual {
        return Err(Error::ChecksumMismatch { expected, actual });
    }

    String::from_utf8(payload.to_vec()).map_err(|err| Error::Decode(err.to_string()))
}

/// Spell bytes out five bits at a time, most significant bit first.
///
/// The last group is padded with zero bits.
pub fn to_base32(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8 + 4) / 5);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(char::from(ALPHABET[((buffer >> bits) & 0x1F) as usize]));
        }
        buffer &= (1 << bits) - 1;
    }

    if bits > 0 {
        out.push(char::from(ALPHABET[((buffer << (5 - bits)) & 0x1F) as usize]));
    }

    out
}

/// Inverse of [`to_base32`]. Trailing padding bits are dropped.
pub fn from_base32(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for ch in text.chars() {
        let value = ch
            .to_digit(32)
            .ok_or_else(|| Error::Decode(format!("invalid character {:?}", ch)))?;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(((buffer >> bits) & 0xFF) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    Ok(out)
}

fn raw_lzma_filters() -> Result<Filters> {
    let mut options = LzmaOptions::new_preset(LZMA_PRESET)?;
    options
        .dict_size(LZMA_DICT_SIZE)
        .literal_context_bits(LZMA_LITERAL_CONTEXT_BITS)
        .literal_position_bits(LZMA_LITERAL_POSITION_BITS)
        .position_bits(LZMA_POSITION_BITS);

    let mut filters = Filters::new();
    filters.lzma1(&options);
    Ok(filters)
}

fn lzma_compress(data: &[u8]) -> Result<Vec<u8>> {
    let stream = Stream::new_raw_encoder(&raw_lzma_filters()?)?;
    let mut encoder = XzEncoder::new_stream(data, stream);
    let mut out = Vec::new();
    encoder
        .read_to_end(&mut out)
        .map_err(|err| Error::Compression(err.to_string()))?;
    Ok(out)
}

fn lzma_decompress(data: &[u8]) -> Result<Vec<u8>> {
    let stream = Stream::new_raw_decoder(&raw_lzma_filters()?)?;
    let mut decoder = XzDecoder::new_stream(data, stream);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|err| Error::Compression(err.to_string()))?;
    Ok(out)
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
