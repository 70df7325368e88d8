use clap::{
    ArgAction,
    Parser,
};
use njaxi::{
    prelude::*,
    session,
};
use std::{
    num::ParseIntError,
    process::ExitCode,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "njaxi",
    about = "Issue a single AXI read or write through a NextJTAG server and hex dump the result"
)]
struct Args {
    /// Read Not Write
    #[arg(long = "readNotWrite", default_value_t = true, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    read_not_write: bool,

    /// Target address, must be 4 byte aligned
    #[arg(long, default_value = "0xc0000000", value_parser = parse_u64)]
    addr: u64,

    /// Size of read data or size of write data element (4 or 8)
    #[arg(long, default_value = "4", value_parser = parse_u64)]
    size: u64,

    /// Bufferable cache attribute
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    bufferable: bool,

    /// Modifiable cache attribute
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    modifiable: bool,

    /// Read allocate cache attribute
    #[arg(long = "read_alloc", default_value_t = true, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    read_alloc: bool,

    /// Write allocate cache attribute
    #[arg(long = "write_alloc", default_value_t = true, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    write_alloc: bool,

    /// Incrementing (true) or fixed (false) burst mode
    #[arg(long = "incr_mode", default_value_t = true, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    incr_mode: bool,

    /// Board ID, empty picks any available board
    #[arg(long, default_value = "")]
    board: String,

    /// FPGA index on the board
    #[arg(long, default_value_t = 0)]
    fpga: usize,

    /// NextJTAG server API
    #[arg(long, default_value = "http://127.0.0.1:19080")]
    uri: String,

    /// Number of columns to display
    #[arg(long = "num_columns", default_value_t = 1)]
    num_columns: usize,

    /// Column size in bytes. Options: 1,2,4,8
    #[arg(long = "column_size", default_value = "4", value_parser = parse_u64)]
    column_size: u64,

    /// Write data, can be up to 64 bits
    #[arg(long = "write_data", default_value = "0", value_parser = parse_u64)]
    write_data: u64,

    /// Log more, repeat for even more. `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Parse an unsigned integer with an optional `0x`, `0o`, or `0b` radix prefix
fn parse_u64(s: &str) -> Result<u64, ParseIntError> {
    let s = s.replace('_', "");
    let (digits, radix) = match s.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => (&s[2..], 16),
        Some("0o") => (&s[2..], 8),
        Some("0b") => (&s[2..], 2),
        _ => (s.as_str(), 10),
    };
    u64::from_str_radix(digits, radix)
}

/// Target of the message that ends a failed run
const FATAL: &str = "njaxi::fatal";

/// Filter directives from `RUST_LOG` (or the verbosity default), with [`FATAL`] always on
fn log_directives(env: Option<String>, verbose: u8) -> String {
    let base = env.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
        .to_owned()
    });
    format!("{base},{FATAL}=error")
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::new(log_directives(std::env::var("RUST_LOG").ok(), verbose));
    // Fatal messages share stdout with the dump
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let request = Request {
        addr: args.addr,
        read_not_write: args.read_not_write,
        size: args.size,
        attributes: CacheAttributes::new(
            args.bufferable,
            args.modifiable,
            args.read_alloc,
            args.write_alloc,
        ),
        incrementing: args.incr_mode,
        write_data: args.write_data,
    };
    let transaction = request.build()?;
    // Display settings are checked against the read length before anything is issued
    let dump = if args.read_not_write {
        let dump = HexDump::new(args.addr, args.num_columns, args.column_size)?;
        dump.check_len(transaction.options().byte_len())?;
        Some(dump)
    } else {
        None
    };

    let mut transport = NextJtag::connect(&args.uri, &Config::default())?;
    let target = Target {
        board: (!args.board.is_empty()).then_some(args.board.as_str()),
        fpga: args.fpga,
    };
    if let (Outcome::Read(words), Some(dump)) =
        (session::run(&mut transport, &target, &transaction)?, dump)
    {
        print!("{}", dump.render_words(&words)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: FATAL, "{err:#}");
            ExitCode::FAILURE
        }
    }
}
