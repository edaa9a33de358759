// Use jemalloc for better memory allocation performance on Unix-like systems
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

// Use mimalloc on Windows for better performance
#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;

use tabsalvage_lib::config as tabsalvage_config;
use tabsalvage_lib::config::Config;
use tabsalvage_lib::exit_codes::exit;
use tabsalvage_lib::input::read_input;
use tabsalvage_lib::recover;

mod file_processor;

use file_processor::{OutputPaths, RunInputs};

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = ["auto", "always", "never"], help = "Control colored output: auto, always, never")]
    color: String,

    /// Path to configuration file
    #[arg(long, global = true, help = "Path to configuration file")]
    config: Option<String>,

    /// Ignore all configuration files and use built-in defaults
    #[arg(
        long,
        global = true,
        help = "Ignore all configuration files and use built-in defaults"
    )]
    no_config: bool,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Recover tab groups and grouped tabs from a session file
    Recover(RecoverArgs),
    /// Initialize a new configuration file
    Init,
    /// Show the effective configuration
    Config {
        /// Show only the default configuration values
        #[arg(long, help = "Show only the default configuration values")]
        defaults: bool,
        #[arg(long, help = "Output format (e.g. toml, json)")]
        output: Option<String>,
    },
    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
struct RecoverArgs {
    /// Session file to recover from
    #[arg(short, long)]
    session: Option<PathBuf>,

    /// Tabs file used to confirm group membership
    #[arg(short, long)]
    tabs: Option<PathBuf>,

    /// Directory in which the dated output folder is created
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Exact number of times a tag must occur in the tab-group block
    #[arg(long)]
    repeat_count: Option<usize>,

    /// Tag length in characters
    #[arg(long)]
    tag_length: Option<usize>,

    /// Replacement character for non-printable bytes
    #[arg(long)]
    sentinel: Option<char>,

    /// Summary format: text writes output files, json prints the recovery to stdout
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else if quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Load configuration, reporting errors and exiting on failure.
fn load_config_with_cli_error_handling(config_path: Option<&str>, no_config: bool) -> Config {
    let search_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match Config::load_with_discovery(config_path, &search_dir, no_config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Config error".red().bold(), e);
            exit::tool_error();
        }
    }
}

fn apply_overrides(config: &mut Config, args: &RecoverArgs) {
    if let Some(repeat_count) = args.repeat_count {
        config.scan.repeat_count = repeat_count;
    }
    if let Some(tag_length) = args.tag_length {
        config.scan.tag_length = tag_length;
    }
    if let Some(sentinel) = args.sentinel {
        config.scan.sentinel = sentinel;
    }
}

fn run_recover(args: &RecoverArgs, config_path: Option<&str>, no_config: bool, quiet: bool) -> Result<()> {
    let mut config = load_config_with_cli_error_handling(config_path, no_config);
    apply_overrides(&mut config, args);
    config.scan.validate()?;

    let session = args.session.as_deref().map(|p| read_input(p, "session")).transpose()?;
    let tabs = args.tabs.as_deref().map(|p| read_input(p, "tabs")).transpose()?;
    if session.is_none() {
        log::warn!("No session file given; nothing can be recovered");
    }

    let recovery = recover(session.as_deref().unwrap_or_default(), tabs.as_deref(), &config)?;
    let inputs = RunInputs {
        session: args.session.as_deref(),
        tabs: args.tabs.as_deref(),
    };

    if args.format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&recovery.report()).context("Failed to serialize recovery")?;
        println!("{json}");
        return Ok(());
    }

    let date = file_processor::date_prefix(inputs.session);
    let paths = OutputPaths::new(&args.output_dir, &date, inputs.session, inputs.tabs);
    let written = file_processor::write_outputs(&recovery, inputs, &paths, &config)?;
    if !quiet {
        file_processor::print_summary(&recovery, inputs, &written);
    }
    Ok(())
}

fn handle_config_command(config_path: Option<&str>, no_config: bool, defaults: bool, output: Option<&str>) {
    let config = if defaults {
        Config::default()
    } else {
        load_config_with_cli_error_handling(config_path, no_config)
    };

    let rendered = match output.unwrap_or("toml") {
        "toml" => toml::to_string_pretty(&config).map_err(|e| e.to_string()),
        "json" => serde_json::to_string_pretty(&config).map_err(|e| e.to_string()),
        other => {
            eprintln!(
                "{}: Unknown output format '{}' (expected toml or json)",
                "Error".red().bold(),
                other
            );
            exit::tool_error();
        }
    };

    match rendered {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => {
            eprintln!("{}: Failed to render configuration: {}", "Error".red().bold(), e);
            exit::tool_error();
        }
    }
}

fn main() {
    // Reset SIGPIPE to default behavior on Unix so piping to `head` etc. works correctly.
    #[cfg(unix)]
    {
        // SAFETY: restoring the default SIGPIPE disposition before any output is written.
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    let cli = Cli::parse();

    // Set color override globally based on --color flag
    match cli.color.as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::unset_override(),
    }

    init_logging(cli.verbose, cli.quiet);

    match &cli.command {
        Commands::Recover(args) => {
            if let Err(e) = run_recover(args, cli.config.as_deref(), cli.no_config, cli.quiet) {
                eprintln!("{}: {:#}", "Error".red().bold(), e);
                exit::tool_error();
            }
        }
        Commands::Init => {
            let path = tabsalvage_config::CONFIG_FILE_NAME;
            match tabsalvage_config::create_default_config(path) {
                Ok(()) => println!("Created default configuration file: {path}"),
                Err(e) => {
                    eprintln!("{}: Failed to create config file: {}", "Error".red().bold(), e);
                    exit::tool_error();
                }
            }
        }
        Commands::Config { defaults, output } => {
            handle_config_command(cli.config.as_deref(), cli.no_config, *defaults, output.as_deref());
        }
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
    }
}
