//! M-Koba Report - CLI tool for summarizing SACCOS transaction messages.

use chrono::Local;
use clap::Parser;
use mkoba_sms::{
    aggregate::{self, BatchReport},
    csv_export::CsvExport,
    sms_backup::SmsBackup,
    InputFormat, Result,
};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mkoba_report")]
#[command(about = "Classify SACCOS SMS messages and summarize the transactions", long_about = None)]
struct Cli {
    /// Input file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Input format (xml, text); guessed from the file extension if omitted
    #[arg(long = "input-format")]
    input_format: Option<String>,

    /// Only keep messages from this sender address
    #[arg(long)]
    sender: Option<String>,

    /// Sender address assigned to plain-text messages
    #[arg(long, default_value = "unknown")]
    address: String,

    /// Write every outcome to this CSV file
    #[arg(short, long)]
    output: Option<String>,

    /// Process messages on all cores
    #[arg(long)]
    parallel: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    banner("REPORT STARTED");
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    banner("REPORT COMPLETED");
}

fn banner(label: &str) {
    info!(
        "{} {} [{}] {}",
        "=".repeat(20),
        label,
        Local::now().format("%Y-%m-%d, %H:%M:%S"),
        "=".repeat(20)
    );
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let format = match (&cli.input_format, &cli.input) {
        (Some(format), _) => format.parse::<InputFormat>()?,
        (None, Some(path)) => InputFormat::from_path(Path::new(path))?,
        (None, None) => InputFormat::PlainText,
    };

    let backup = if let Some(ref input_path) = cli.input {
        let mut file = File::open(input_path)?;
        read_input(&mut file, format, &cli.address)?
    } else {
        let mut stdin = io::stdin();
        read_input(&mut stdin, format, &cli.address)?
    };

    let backup = match cli.sender {
        Some(ref sender) => backup.filter_sender(sender),
        None => backup,
    };
    info!(count = backup.messages.len(), ?format, "messages loaded");

    if cli.parallel && cli.output.is_none() {
        println!("{}", aggregate::process_parallel(&backup.messages));
        return Ok(());
    }

    let BatchReport { statistics, outcomes } = aggregate::process_with_records(&backup.messages);
    if let Some(ref output_path) = cli.output {
        let mut file = File::create(output_path)?;
        CsvExport::new(outcomes).write_to(&mut file)?;
        info!(path = %output_path, "outcomes exported");
    }

    println!("{}", statistics);
    Ok(())
}

fn read_input<R: Read>(reader: &mut R, format: InputFormat, address: &str) -> Result<SmsBackup> {
    match format {
        InputFormat::SmsBackupXml => SmsBackup::from_read(reader),
        InputFormat::PlainText => SmsBackup::from_text(reader, address),
    }
}
