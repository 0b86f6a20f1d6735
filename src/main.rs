//! vsxreg - extension registry client.
//!
//! Searches an Open VSX style registry, shows extension details and readmes,
//! and reconciles a set of installed plugin ids against the registry.

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vsx_registry::registry::{ReqwestTransport, VSCODE_ENGINE};
use vsx_registry::{
    Config, ExtensionDetails, ExtensionId, ExtensionSummary, ExtensionUri, MemoryPluginHost,
    PluginHost, RegistryClient, RegistryService, SearchParam,
};

/// Extension registry client
#[derive(Parser)]
#[command(name = "vsxreg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Registry base URL (overrides configuration)
    #[arg(long, global = true)]
    registry: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the registry (no query lists the default page)
    Search {
        /// Search text
        query: Option<String>,
    },

    /// Show the registry record of an extension
    Show {
        /// Extension identifier (publisher.name)
        id: String,
    },

    /// Render an extension's readme to sanitized HTML
    Readme {
        /// Extension identifier (publisher.name)
        id: String,
    },

    /// Convert between extension identifiers and vscode:extension URIs
    Uri {
        /// Extension identifier (publisher.name)
        #[arg(required_unless_present = "parse", conflicts_with = "parse")]
        id: Option<String>,

        /// Parse a URI and print its identifier instead
        #[arg(long, value_name = "URI")]
        parse: Option<String>,
    },

    /// Resolve installed plugin ids against the registry
    Reconcile {
        /// Installed plugin identifiers (publisher.name)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(url) = &cli.registry {
        config.registry.url.clone_from(url);
    }

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Search { query } => cmd_search(&config, query, cli.format),
        Commands::Show { id } => cmd_show(&config, &id, cli.format),
        Commands::Readme { id } => cmd_readme(&config, &id),
        Commands::Uri { id, parse } => cmd_uri(id.as_deref(), parse.as_deref()),
        Commands::Reconcile { ids } => cmd_reconcile(&config, ids, cli.format),
        Commands::Config { path } => cmd_config(&config, path),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

fn build_client(config: &Config) -> Result<Arc<RegistryClient>> {
    let transport = match &config.registry.user_agent {
        Some(agent) => ReqwestTransport::with_user_agent(agent)?,
        None => ReqwestTransport::new()?,
    };
    Ok(Arc::new(RegistryClient::with_transport(config.registry.url.clone(), Arc::new(transport))))
}

fn parse_id(id: &str) -> Result<ExtensionId> {
    id.parse().map_err(|_| anyhow::anyhow!("'{}' is not a publisher.name identifier", id))
}

fn print_summary(extension: &ExtensionSummary) {
    println!("  {} v{}  {}", extension.id(), extension.version, extension.label());
    if let Some(ref desc) = extension.description {
        println!("      {}", desc);
    }
}

/// Handle `search`.
fn cmd_search(config: &Config, query: Option<String>, format: OutputFormat) -> Result<()> {
    let client = build_client(config)?;
    let service = RegistryService::new(client, Arc::new(MemoryPluginHost::new()));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(service.search(query.clone().map(SearchParam::query)))?;
    let results = service.search_result();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        match query.as_deref().filter(|q| !q.is_empty()) {
            Some(q) => println!("No extensions found for '{}'.", q),
            None => println!("The registry returned no extensions."),
        }
        return Ok(());
    }

    for extension in &results {
        print_summary(extension);
    }
    println!("\nTotal: {} extension(s)", results.len());
    Ok(())
}

/// Handle `show`.
fn cmd_show(config: &Config, id: &str, format: OutputFormat) -> Result<()> {
    let id = parse_id(id)?;
    let client = build_client(config)?;

    let rt = tokio::runtime::Runtime::new()?;
    let details = match rt.block_on(client.get_extension(&id)) {
        Ok(details) => details,
        Err(e) if e.is_not_found() => anyhow::bail!("Extension '{}' not found in registry", id),
        Err(e) => return Err(e.into()),
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        print_details(&details);
    }
    Ok(())
}

fn print_details(details: &ExtensionDetails) {
    let summary = &details.summary;
    println!("{} v{}", summary.label(), summary.version);
    println!("  Id:         {}", details.id());
    println!("  URI:        {}", ExtensionUri::from_id(details.id()));
    if let Some(ref desc) = summary.description {
        println!("  About:      {}", desc);
    }
    if let Some(ref license) = details.license {
        println!("  License:    {}", license);
    }
    if let Some(ref repository) = details.repository {
        println!("  Repository: {}", repository);
    }
    if let Some(count) = summary.download_count {
        println!("  Downloads:  {}", count);
    }
    if !details.categories.is_empty() {
        println!("  Categories: {}", details.categories.join(", "));
    }
}

/// Handle `readme`.
fn cmd_readme(config: &Config, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let client = build_client(config)?;
    let service = RegistryService::new(client, Arc::new(MemoryPluginHost::new()));

    let rt = tokio::runtime::Runtime::new()?;
    let html = rt.block_on(async {
        let details = service.get_extension(&id).await?;
        service.compile_documentation(&details).await
    })?;

    if html.is_empty() {
        eprintln!("Extension '{}' has no readme.", id);
    } else {
        println!("{}", html);
    }
    Ok(())
}

/// Handle `uri`.
fn cmd_uri(id: Option<&str>, parse: Option<&str>) -> Result<()> {
    if let Some(uri) = parse {
        let uri = ExtensionUri::parse(uri)?;
        println!("{}", uri.id());
        return Ok(());
    }

    let id = id.ok_or_else(|| anyhow::anyhow!("An identifier or --parse <URI> is required"))?;
    println!("{}", ExtensionUri::from_id(parse_id(id)?));
    Ok(())
}

/// Handle `reconcile`.
fn cmd_reconcile(config: &Config, ids: Vec<String>, format: OutputFormat) -> Result<()> {
    let client = build_client(config)?;
    let host = Arc::new(MemoryPluginHost::with_plugins(ids));
    let service = RegistryService::new(client, host.clone());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(service.refresh_installed());
    let installed = service.installed();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&installed)?);
        return Ok(());
    }

    let resolved: Vec<ExtensionId> = installed.iter().map(ExtensionDetails::id).collect();
    for plugin in host.plugins().iter().filter(|p| p.engine == VSCODE_ENGINE) {
        let found = plugin.id.parse::<ExtensionId>().is_ok_and(|id| resolved.contains(&id));
        let mark = if found { "✓" } else { "✗" };
        println!("  {} {}", mark, plugin.id);
    }
    println!("\nResolved: {} of {} plugin(s)", installed.len(), host.plugins().len());
    Ok(())
}

/// Handle `config`.
fn cmd_config(config: &Config, show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_dir() {
            println!("{}", path.join("config.toml").display());
        }
        return Ok(());
    }

    let toml = toml::to_string_pretty(config)?;
    println!("{toml}");
    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "vsxreg", &mut io::stdout());
}
