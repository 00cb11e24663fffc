//! ChainABI CLI: decode EVM ABI payloads from the shell.
//!
//! # Commands
//! ```text
//! chainabi parse-type   <descriptor>
//! chainabi decode       --types <t>... --data <hex>
//! chainabi decode-batch --types <t>... --input <file>
//! chainabi decode-call  --abi <path.json> --function <name> --calldata <hex>
//! chainabi decode-log   --abi <path.json> --event <name> --topics <...> --data <hex>
//! chainabi manifest     validate <file.yaml>
//! ```

use anyhow::Result;
use chainabi_observability::{init_tracing, LogConfig};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod cmd_decode;
mod cmd_manifest;
mod cmd_parse;

#[derive(Parser)]
#[command(
    name = "chainabi",
    about = "EVM ABI decoder, ChainABI CLI",
    long_about = "
ChainABI CLI: decode ABI-encoded calldata, return data, event logs and raw
payloads against type descriptors, contract ABI JSON or decode manifests.

Type descriptors use Solidity syntax: uint256, bytes32, string[],
(uint256 value,string key)[2], fixed128x18 ...
",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level: trace | debug | info | warn | error
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a type descriptor and show its layout
    #[command(name = "parse-type")]
    ParseType {
        /// e.g. "(uint256,string)[]"
        descriptor: String,
    },

    /// Decode a raw ABI payload against a list of types
    Decode {
        /// Field types in order; `name:type` names the column
        #[arg(long, num_args = 1.., required = true)]
        types: Vec<String>,
        /// ABI payload (hex, 0x prefix optional)
        #[arg(long)]
        data: String,
    },

    /// Decode a file of payloads, one hex string per line, in parallel
    #[command(name = "decode-batch")]
    DecodeBatch {
        /// Field types in order; `name:type` names the column
        #[arg(long, num_args = 1.., required = true)]
        types: Vec<String>,
        /// File with one hex payload per line
        #[arg(long)]
        input: PathBuf,
        /// Number of Rayon threads (0 = default pool)
        #[arg(long, default_value_t = 0)]
        threads: usize,
        /// Records per chunk
        #[arg(long, default_value_t = chainabi_batch::request::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// What to do with records that fail to decode
        #[arg(long, value_enum, default_value_t = ErrorModeArg::Collect)]
        error_mode: ErrorModeArg,
    },

    /// Decode function calldata or return data using an ABI JSON file
    #[command(name = "decode-call")]
    DecodeCall {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: PathBuf,
        /// Function name
        #[arg(long)]
        function: String,
        /// Calldata or return data (hex)
        #[arg(long)]
        calldata: String,
        /// The data starts with the 4-byte selector
        #[arg(long)]
        has_selector: bool,
        /// Decode as return data instead of call arguments
        #[arg(long, conflicts_with = "has_selector")]
        returns: bool,
    },

    /// Decode an event log using an ABI JSON file
    #[command(name = "decode-log")]
    DecodeLog {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: PathBuf,
        /// Event name
        #[arg(long)]
        event: String,
        /// All log topics, topic0 first for non-anonymous events
        #[arg(long, num_args = 0..)]
        topics: Vec<String>,
        /// Log data (hex)
        #[arg(long, default_value = "0x")]
        data: String,
    },

    /// Decode manifest tools
    Manifest {
        #[command(subcommand)]
        action: ManifestAction,
    },
}

#[derive(Subcommand)]
enum ManifestAction {
    /// Parse a manifest and list its decode targets
    Validate {
        /// Path to the YAML manifest
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ErrorModeArg {
    Skip,
    Collect,
    Throw,
}

impl From<ErrorModeArg> for chainabi_core::ErrorMode {
    fn from(mode: ErrorModeArg) -> Self {
        match mode {
            ErrorModeArg::Skip => Self::Skip,
            ErrorModeArg::Collect => Self::Collect,
            ErrorModeArg::Throw => Self::Throw,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug".to_string() } else { cli.log_level.clone() };
    init_tracing(&LogConfig {
        level,
        json: cli.json_logs,
        ..LogConfig::default()
    })?;

    let json = cli.json;
    match cli.command {
        Commands::ParseType { descriptor } => cmd_parse::run(&descriptor, json),

        Commands::Decode { types, data } => cmd_decode::decode(&types, &data, json),

        Commands::DecodeBatch { types, input, threads, chunk_size, error_mode } => {
            cmd_decode::decode_batch(&types, &input, threads, chunk_size, error_mode.into(), json)
        }

        Commands::DecodeCall { abi, function, calldata, has_selector, returns } => {
            let part = if returns {
                cmd_decode::CallPart::Output
            } else if has_selector {
                cmd_decode::CallPart::Calldata
            } else {
                cmd_decode::CallPart::Input
            };
            cmd_decode::decode_call(&abi, &function, &calldata, part, json)
        }

        Commands::DecodeLog { abi, event, topics, data } => {
            cmd_decode::decode_log(&abi, &event, &topics, &data, json)
        }

        Commands::Manifest { action } => match action {
            ManifestAction::Validate { file } => cmd_manifest::validate(&file, json),
        },
    }
}
