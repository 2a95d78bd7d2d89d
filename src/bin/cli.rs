use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use lintbridge::config::Config;
use lintbridge::output::OutputFormat;
use lintbridge::rules::RuleCatalog;
use lintbridge::AnalyzeOptions;

#[derive(Parser)]
#[command(
    name = "lintbridge",
    about = "Bridges external command-line analyzers into a quality platform",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every configured analyzer over a module directory
    Run {
        /// Path to the module directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file path (defaults to lintbridge.toml in the module dir)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Tool timeout in seconds (overrides config)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List the rules defined in a rule-definition document
    ListRules {
        /// Path to the rule-definition XML document
        rules: PathBuf,

        /// Repository key to load the catalog under
        #[arg(long, default_value = "repo")]
        repository: String,

        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter lintbridge.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            path,
            config,
            format,
            timeout_secs,
            output,
        } => cmd_run(path, config, format, timeout_secs, output),
        Commands::ListRules {
            rules,
            repository,
            format,
        } => cmd_list_rules(rules, repository, format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn cmd_run(
    path: PathBuf,
    config: Option<PathBuf>,
    format_str: String,
    timeout_secs: Option<u64>,
    output_path: Option<PathBuf>,
) -> Result<i32, lintbridge::error::BridgeError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    let options = AnalyzeOptions {
        config_path: config,
        timeout_override: timeout_secs.map(Duration::from_secs),
        ..AnalyzeOptions::default()
    };

    let reports = lintbridge::analyze(&path, &options)?;
    let rendered = lintbridge::output::render(&reports, format)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = all analyzers ran or were configured off, 1 = at least
    // one analyzer failed. Issues found are not a failure for a bridge.
    Ok(if reports.iter().any(|r| r.failed()) {
        1
    } else {
        0
    })
}

fn cmd_list_rules(
    rules: PathBuf,
    repository: String,
    format_str: String,
) -> Result<i32, lintbridge::error::BridgeError> {
    let catalog = RuleCatalog::load_file(&repository, &rules)?;

    match format_str.as_str() {
        "json" => {
            let rules: Vec<_> = catalog.iter().collect();
            let json = serde_json::to_string_pretty(&rules)?;
            println!("{}", json);
        }
        _ => {
            println!("{:<12} {:<40} {:<10} ACTIVE", "ID", "NAME", "SEVERITY");
            println!("{}", "-".repeat(72));
            for rule in catalog.iter() {
                println!(
                    "{:<12} {:<40} {:<10} {}",
                    rule.id,
                    rule.name,
                    rule.default_severity.to_string(),
                    if rule.default_active { "yes" } else { "no" },
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, lintbridge::error::BridgeError> {
    let path = PathBuf::from("lintbridge.toml");

    if path.exists() && !force {
        eprintln!("lintbridge.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created lintbridge.toml");

    Ok(0)
}
