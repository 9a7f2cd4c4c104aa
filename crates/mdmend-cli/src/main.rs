//! CLI binary: fix Markdown lint issues and check MCP server configuration.

mod discover;
mod fix;
mod report;
mod settings;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mdmend_probe::{
    check_token_format, default_registry_in, inject_token, mask_token, McpConfig, ProbeEvent, TokenFormat,
    DEFAULT_CONFIG_PATH, GITHUB_SERVER, GITHUB_TOKEN_ENV,
};
use mdmend_rules::{Pipeline, RuleId};
use tracing_subscriber::EnvFilter;

use crate::discover::Discovery;
use crate::fix::{FileOutcome, FixMode};
use crate::report::ReportStyle;
use crate::settings::{under_root, Overrides, Settings};

#[derive(Parser)]
#[command(name = "mdmend", version, about = "Markdown lint auto-fixer and MCP configuration health check")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Project root (default: current directory)
    #[arg(short = 'C', long = "root", global = true, value_name = "DIR")]
    root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fix Markdown lint issues in place
    Fix {
        /// Files or directories to process (default: project root)
        paths: Vec<PathBuf>,

        /// Report what would change without writing
        #[arg(long)]
        check: bool,

        /// Also expand aliases in PowerShell scripts (*.ps1)
        #[arg(long)]
        powershell: bool,

        /// Maximum line length before rewrapping
        #[arg(long, value_name = "N")]
        max_line_length: Option<usize>,

        /// Run only these rules (comma-separated ids, e.g. MD009,MD013)
        #[arg(long, value_delimiter = ',', value_name = "IDS")]
        only: Vec<RuleId>,

        /// Skip these rules (comma-separated ids)
        #[arg(long, value_delimiter = ',', value_name = "IDS")]
        disable: Vec<RuleId>,

        /// Settings file (default: .mdmend.json under the root, if present)
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,
    },

    /// Check the health of configured MCP servers
    Health {
        /// MCP configuration file (default: .cursor/mcp.json)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Add an access token to a server entry in the MCP configuration
    AddToken {
        /// The token to store
        token: Option<String>,

        /// MCP configuration file (default: .cursor/mcp.json)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Server entry to update
        #[arg(long, default_value = GITHUB_SERVER)]
        server: String,

        /// Environment variable name to set
        #[arg(long, default_value = GITHUB_TOKEN_ENV)]
        env_key: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let style = ReportStyle::detect(cli.no_color);
    match run(cli, &style) {
        Ok(code) => code,
        Err(err) => {
            println!("{}", report::failure(&style, &format!("{err:#}")));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, style: &ReportStyle) -> anyhow::Result<ExitCode> {
    let root = cli.root.unwrap_or_else(|| PathBuf::from("."));
    match cli.command {
        Commands::Fix {
            paths,
            check,
            powershell,
            max_line_length,
            only,
            disable,
            settings,
        } => {
            let overrides = Overrides {
                max_line_length,
                only,
                disable,
            };
            let mode = if check { FixMode::Check } else { FixMode::Write };
            cmd_fix(&root, &paths, mode, powershell, settings.as_deref(), &overrides, style)
        }
        Commands::Health { config } => cmd_health(&root, config.as_deref(), style),
        Commands::AddToken {
            token,
            config,
            server,
            env_key,
        } => cmd_add_token(&root, token.as_deref(), config.as_deref(), &server, &env_key, style),
    }
}

fn config_path(root: &Path, config: Option<&Path>) -> PathBuf {
    under_root(root, config.unwrap_or(Path::new(DEFAULT_CONFIG_PATH)))
}

/// Path shown in report lines: relative to the root when it is under it.
fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

// ---------------------------------------------------------------------------
// fix
// ---------------------------------------------------------------------------

fn cmd_fix(
    root: &Path,
    paths: &[PathBuf],
    mode: FixMode,
    powershell: bool,
    settings_file: Option<&Path>,
    overrides: &Overrides,
    style: &ReportStyle,
) -> anyhow::Result<ExitCode> {
    let settings = Settings::load(root, settings_file).context("loading settings")?;
    let (config, rules, exclude_dirs) = settings.resolve(overrides)?;
    let pipeline = Pipeline::with_rules(config, rules);

    let extensions: &[&str] = if powershell { &["md", "ps1"] } else { &["md"] };
    let discovery = Discovery::new(&exclude_dirs, extensions)?;
    let inputs: Vec<PathBuf> = if paths.is_empty() {
        vec![root.to_path_buf()]
    } else {
        paths.iter().map(|p| under_root(root, p)).collect()
    };
    let files = discovery.collect(&inputs).context("discovering documents")?;

    println!("{}", report::header(style, "Markdown Lint Fixer"));
    if files.is_empty() {
        println!("{}", report::info(style, "No matching files found"));
        return Ok(ExitCode::SUCCESS);
    }
    tracing::debug!(files = files.len(), mode = ?mode, "Processing documents");

    let summary = fix::fix_files(&files, &pipeline, mode, |path, outcome| {
        let shown = display_path(root, path);
        println!("{}", report::file_line(style, &shown, outcome));
        if let FileOutcome::WouldChange { diagnostics } = outcome {
            for diagnostic in diagnostics {
                println!("{}", report::diagnostic_line(&shown, diagnostic));
            }
        }
    });
    println!("{}", report::fix_summary(style, &summary, mode));

    if mode == FixMode::Check && summary.fixed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// health
// ---------------------------------------------------------------------------

fn cmd_health(root: &Path, config: Option<&Path>, style: &ReportStyle) -> anyhow::Result<ExitCode> {
    println!("{}", report::header(style, "MCP Server Health Check"));
    println!("{}", report::info(style, &format!("Project root: {}", root.display())));
    let checked_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    println!("{}", report::info(style, &format!("Checked at: {checked_at}")));

    let path = config_path(root, config);
    let mcp = McpConfig::load(&path)?;
    println!("{}", report::success(style, &format!("Loaded configuration from {}", path.display())));

    let registry = default_registry_in(root);
    let report = registry.run_all_with(&mcp, |event| match event {
        ProbeEvent::Started { name } => println!("\n{}", report::info(style, &format!("Testing {name}..."))),
        ProbeEvent::Detail { line, .. } => println!("   {line}"),
        ProbeEvent::Finished { result } => println!("{}", report::probe_line(style, result)),
    });

    println!("{}", report::header(style, "Health Report"));
    println!("{}", report::health_table(&report));
    println!("{}", report::health_summary(style, &report.summary()));
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// add-token
// ---------------------------------------------------------------------------

fn cmd_add_token(
    root: &Path,
    token: Option<&str>,
    config: Option<&Path>,
    server: &str,
    env_key: &str,
    style: &ReportStyle,
) -> anyhow::Result<ExitCode> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        println!("{}", report::info(style, "Usage: mdmend add-token <TOKEN>"));
        println!("   Create a token at https://github.com/settings/tokens");
        anyhow::bail!(mdmend_types::MendError::MissingToken);
    };

    if check_token_format(token) == TokenFormat::Unrecognized {
        println!(
            "{}",
            report::warning(style, "Token format not recognized (expected a ghp_ or github_pat_ prefix)")
        );
    }

    let path = config_path(root, config);
    inject_token(&path, server, env_key, token).with_context(|| format!("adding token to {}", path.display()))?;

    println!("{}", report::success(style, &format!("Token added to the {server} server in {}", path.display())));
    println!("{}", report::info(style, &format!("Token: {}", mask_token(token))));
    println!("\nNext steps:");
    println!("1. Restart your editor so the MCP servers reload");
    println!("2. Run `mdmend health` to verify the {server} server");
    Ok(ExitCode::SUCCESS)
}
