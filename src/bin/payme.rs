//! payme - CLI tool for checking IBANs and encoding payment orders.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use payme_core::logging::{init_logging, LogSettings};
use payme_core::validation::{
    is_valid_constant_symbol, is_valid_specific_symbol, is_valid_variable_symbol, payment_amount,
};
use payme_core::{
    compressed_data, payment_link, Error, IbanCorrector, IbanValidator, ReferenceDataset, Result,
    Transaction,
};

#[derive(Parser)]
#[command(name = "payme")]
#[command(about = "Validate IBANs and build payme.sk links and by-square QR payloads", long_about = None)]
struct Cli {
    /// Country rules JSON file (the bundled SEPA table if not provided)
    #[arg(long)]
    countries: Option<String>,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check an IBAN and explain why it is rejected
    Validate {
        /// IBAN to check
        iban: String,
    },
    /// Repair an IBAN read by OCR
    Fix {
        /// Raw text as recognised
        text: String,
    },
    /// Print the payme.sk link for a payment
    Link(PaymentArgs),
    /// Print the QR payload for a payment
    Qr(PaymentArgs),
}

#[derive(Args)]
struct PaymentArgs {
    /// Amount, `.` or `,` as decimal separator
    #[arg(long)]
    amount: String,

    /// Currency code
    #[arg(long, default_value = "EUR")]
    currency: String,

    /// Beneficiary IBAN
    #[arg(long, default_value = "")]
    iban: String,

    /// Beneficiary name
    #[arg(long, default_value = "")]
    name: String,

    /// Variable symbol
    #[arg(long, default_value = "")]
    vs: String,

    /// Constant symbol
    #[arg(long, default_value = "")]
    ks: String,

    /// Specific symbol
    #[arg(long, default_value = "")]
    ss: String,

    /// Note for the beneficiary
    #[arg(long, default_value = "")]
    note: String,

    /// First address line
    #[arg(long, default_value = "")]
    address1: String,

    /// Second address line
    #[arg(long, default_value = "")]
    address2: String,

    /// Due date as YYYY-MM-DD (today if not provided)
    #[arg(long)]
    date: Option<NaiveDate>,
}

fn main() {
    let cli = Cli::parse();

    let settings = LogSettings::from_env().with_verbosity(cli.verbose);
    if let Err(e) = init_logging("payme", &settings) {
        eprintln!("Warning: {}", e);
    }

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let dataset = match cli.countries {
        Some(ref path) => ReferenceDataset::from_path(path)?,
        None => ReferenceDataset::bundled()?,
    };
    let validator = IbanValidator::new(&dataset);

    match cli.command {
        Command::Validate { iban } => match validator.validate(&iban) {
            Ok(()) => {
                println!("valid");
                Ok(true)
            }
            Err(reason) => {
                println!("invalid: {}", reason);
                Ok(false)
            }
        },
        Command::Fix { text } => {
            let fixed = IbanCorrector::new(&dataset).fix(&text);
            let status = if validator.is_valid(&fixed) { "valid" } else { "invalid" };
            println!("{}\t{}", fixed, status);
            Ok(true)
        }
        Command::Link(args) => {
            let transaction = build_transaction(args, &validator)?;
            println!("{}", payment_link(&transaction));
            Ok(true)
        }
        Command::Qr(args) => {
            let transaction = build_transaction(args, &validator)?;
            println!("{}", compressed_data(&transaction)?);
            Ok(true)
        }
    }
}

fn build_transaction(args: PaymentArgs, validator: &IbanValidator) -> Result<Transaction> {
    let amount =
        payment_amount(&args.amount).ok_or_else(|| Error::InvalidAmount(args.amount.clone()))?;

    if let Err(reason) = validator.validate(&args.iban) {
        log::warn!("encoding payment with invalid IBAN {:?}: {}", args.iban, reason);
    }
    if !is_valid_variable_symbol(&args.vs)
        || !is_valid_constant_symbol(&args.ks)
        || !is_valid_specific_symbol(&args.ss)
    {
        log::warn!("encoding payment with malformed payment symbols");
    }

    let mut transaction = Transaction::new(amount, args.currency, args.iban, args.name);
    transaction.variable_symbol = args.vs;
    transaction.constant_symbol = args.ks;
    transaction.specific_symbol = args.ss;
    transaction.note = args.note;
    transaction.beneficiary_address_1 = args.address1;
    transaction.beneficiary_address_2 = args.address2;
    if let Some(date) = args.date {
        transaction.date = date;
    }

    Ok(transaction)
}
