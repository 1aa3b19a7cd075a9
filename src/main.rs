use bitify::cli::{
    compare_files, default_output_path, embed_file, extract_to_dir, show_capacity, EmbedOptions,
    ExtractOptions,
};
use bitify::Placement;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Version info from build.rs
const VERSION: &str = env!("BITIFY_VERSION");
const BUILD: &str = env!("BITIFY_BUILD");
const PROFILE: &str = env!("BITIFY_PROFILE");
const GIT_HASH: &str = env!("BITIFY_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING
        .get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "bitify")]
#[command(
    author,
    about = "Hide files in the least significant bits of WAV audio",
    long_about = None
)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a file inside a WAV cover
    #[command(alias = "e")]
    Embed {
        /// Stego key; required for --encrypt and keyed placements
        #[arg(long, default_value = "")]
        password: String,

        /// Low-order bits used per sample (1-8)
        #[arg(long = "lsb")]
        lsb_depth: Option<u8>,

        /// Encipher the frame with the password keystream
        #[arg(long)]
        encrypt: bool,

        /// Sample order: sequential, random-start or scatter
        #[arg(long, value_parser = parse_placement)]
        placement: Option<Placement>,

        /// JSON file with default embed settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Cover WAV file
        cover: PathBuf,

        /// File to hide
        secret: PathBuf,

        /// Output WAV file (default: <cover>.stego.wav)
        output: Option<PathBuf>,
    },

    /// Recover a hidden file from a stego WAV
    #[command(alias = "x")]
    Extract {
        /// Stego key used when embedding
        #[arg(long)]
        password: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Stego WAV file
        input: PathBuf,

        /// Directory to write the recovered file into
        #[arg(default_value = ".")]
        out_dir: PathBuf,
    },

    /// Show how much a cover can hold
    #[command(alias = "c")]
    Capacity {
        /// Only report this LSB depth
        #[arg(long = "lsb")]
        lsb_depth: Option<u8>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Cover WAV file
        file: PathBuf,
    },

    /// Measure the distortion between two WAV files
    #[command(alias = "p")]
    Psnr {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Reference WAV file
        original: PathBuf,

        /// Modified WAV file
        modified: PathBuf,
    },
}

fn parse_placement(s: &str) -> Result<Placement, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn print_report<T: Serialize + std::fmt::Display>(report: &T, json: bool) -> bitify::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if cli.version {
        println!("bitify {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if let Err(e) = Cli::command().print_help() {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    let result = match command {
        Commands::Embed {
            password,
            lsb_depth,
            encrypt,
            placement,
            config,
            json,
            cover,
            secret,
            output,
        } => {
            let options = EmbedOptions {
                password,
                lsb_depth,
                encrypt,
                placement,
                config_file: config,
            };
            let output = output.unwrap_or_else(|| default_output_path(&cover));
            embed_file(&cover, &secret, &output, &options)
                .and_then(|report| print_report(&report, json))
        }

        Commands::Extract {
            password,
            json,
            input,
            out_dir,
        } => {
            let options = ExtractOptions { password };
            extract_to_dir(&input, &out_dir, &options)
                .and_then(|report| print_report(&report, json))
        }

        Commands::Capacity {
            lsb_depth,
            json,
            file,
        } => show_capacity(&file, lsb_depth).and_then(|report| print_report(&report, json)),

        Commands::Psnr {
            json,
            original,
            modified,
        } => compare_files(&original, &modified).and_then(|report| print_report(&report, json)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
