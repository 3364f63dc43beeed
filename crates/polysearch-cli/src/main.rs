//! Polysearch CLI - keyword search across registered object types

use clap::{Args, Parser, Subcommand};
use polysearch_core::config::Config;
use polysearch_core::domain::metadata::CatalogDefinition;
use polysearch_core::domain::search::{
    FieldFilter, ObjectRecord, SearchRequest, SearchResult, SearchResults, SearchService,
    SortOrder,
};
use polysearch_core::domain::security::StaticOrganizationalContext;
use polysearch_core::infrastructure::search::SqliteObjectStore;
use polysearch_core::storage::Database;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "polysearch")]
#[command(author, version, about = "Keyword search across registered object types", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog definition file (defaults to catalog.toml in the config directory)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// SQLite database (defaults to database.path from the config)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Search on behalf of an organization instead of a user
    #[arg(long, global = true)]
    organization: bool,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List searchable objects
    Objects,

    /// Import a JSON array of records for a backing class
    Import {
        /// Backing class of the records
        class: String,
        /// JSON file holding `[{"id": ..., "data": {...}, "translations": {...}}]`
        file: PathBuf,
    },

    /// Search every searchable object, or the ones given with --object
    Search {
        /// Keywords
        query: String,
        /// Restrict the search to these objects
        #[arg(short, long = "object")]
        objects: Vec<String>,
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Search a single object
    Show {
        /// Object name
        object: String,
        /// Keywords
        query: String,
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Default)]
struct RequestArgs {
    /// Page number
    #[arg(long)]
    page: Option<u32>,
    /// Page size
    #[arg(long)]
    limit: Option<u32>,
    /// Ordering, e.g. `amount:desc`
    #[arg(long = "sort", value_name = "FIELD[:asc|desc]")]
    sort: Vec<String>,
    /// Field filter, e.g. `status=paid` or `amount>=10` (single object only)
    #[arg(long = "filter", value_name = "EXPR")]
    filters: Vec<String>,
    /// Locale for translatable objects
    #[arg(long)]
    locale: Option<String>,
    /// Only match keywords against these fields
    #[arg(long = "field", value_name = "PATH")]
    fields: Vec<String>,
}

impl RequestArgs {
    fn to_request(&self) -> anyhow::Result<SearchRequest> {
        let mut request = SearchRequest::new();
        request.page = self.page;
        request.limit = self.limit;
        request.locale = self.locale.clone();
        request.query_fields = self.fields.clone();
        for sort in &self.sort {
            request.sort.push(sort.parse::<SortOrder>()?);
        }
        for filter in &self.filters {
            request.filters.push(filter.parse::<FieldFilter>()?);
        }
        Ok(request)
    }
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so that --format json stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("polysearch=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Objects => cmd_objects(&cli).await,
        Commands::Import { class, file } => cmd_import(&cli, class, file).await,
        Commands::Search {
            query,
            objects,
            request,
        } => cmd_search(&cli, query, objects, request).await,
        Commands::Show {
            object,
            query,
            request,
        } => cmd_show(&cli, object, query, request).await,
        Commands::Config { action } => cmd_config(action, cli.quiet),
    }
}

fn catalog_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match &cli.catalog {
        Some(path) => Ok(path.clone()),
        None => Ok(Config::config_dir()?.join("catalog.toml")),
    }
}

async fn open_database(cli: &Cli, config: &Config) -> anyhow::Result<Database> {
    let path = cli
        .database
        .clone()
        .unwrap_or_else(|| config.database.path.clone());
    Database::open(path).await
}

async fn open_service(cli: &Cli) -> anyhow::Result<SearchService> {
    let config = Config::load()?;
    let definition = CatalogDefinition::load(&catalog_path(cli)?)?;
    let db = open_database(cli, &config).await?;

    let service = SearchService::builder()
        .catalog(Arc::new(definition.catalog()))
        .authorization(Arc::new(definition.authorization()))
        .permissions(Arc::new(definition.permissions()))
        .organization(Arc::new(StaticOrganizationalContext::new(cli.organization)))
        .store(Arc::new(SqliteObjectStore::new(db.pool().clone())))
        .config(config.search)
        .build()?;
    Ok(service)
}

async fn cmd_objects(cli: &Cli) -> anyhow::Result<()> {
    let service = open_service(cli).await?;
    let objects = service.eligible_objects().await;

    match cli.format {
        OutputFormat::Json => {
            let list: Vec<_> = objects
                .iter()
                .map(|(name, class)| json!({"name": name, "class": class}))
                .collect();
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        OutputFormat::Text => {
            if objects.is_empty() {
                println!("No searchable objects.");
                if !cli.quiet {
                    println!("\nDeclare objects in the catalog file passed with --catalog.");
                }
                return Ok(());
            }
            if !cli.quiet {
                println!("Searchable objects:");
            }
            for (name, class) in objects.iter() {
                println!("  {:<20} {}", name, class);
            }
        }
    }
    Ok(())
}

async fn cmd_import(cli: &Cli, class: &str, file: &Path) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;
    let records: Vec<ObjectRecord> = serde_json::from_str(&contents)?;

    let config = Config::load()?;
    let db = open_database(cli, &config).await?;
    let store = SqliteObjectStore::new(db.pool().clone());
    let imported = store.insert_many(class, &records).await?;
    db.close().await;

    info!(class = %class, imported, "Records imported");
    match cli.format {
        OutputFormat::Json => println!("{}", json!({"class": class, "imported": imported})),
        OutputFormat::Text => {
            if !cli.quiet {
                println!("Imported {} record(s) into '{}'.", imported, class);
            }
        }
    }
    Ok(())
}

async fn cmd_search(
    cli: &Cli,
    query: &str,
    objects: &[String],
    args: &RequestArgs,
) -> anyhow::Result<()> {
    let request = args.to_request()?;
    let service = open_service(cli).await?;
    let names: Vec<&str> = objects.iter().map(String::as_str).collect();
    let results = service.search(&request, query, &names).await?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => print_results(&results, cli.quiet),
    }
    Ok(())
}

async fn cmd_show(
    cli: &Cli,
    object: &str,
    query: &str,
    args: &RequestArgs,
) -> anyhow::Result<()> {
    let request = args.to_request()?;
    let service = open_service(cli).await?;
    let result = service.search_one(&request, object, query).await?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_result(&result),
    }
    Ok(())
}

fn print_result(result: &SearchResult) {
    println!(
        "{} ({} found, page {}/{}, {} per page)",
        result.name, result.total, result.page, result.pages, result.limit
    );
    for item in &result.items {
        println!("  {:<12} {}", item.id, item.data);
    }
}

fn print_results(results: &SearchResults, quiet: bool) {
    if results.is_empty() {
        println!("No searchable objects matched the request.");
        return;
    }
    for result in results.objects() {
        print_result(result);
    }
    if !quiet {
        println!("\nTotal: {}", results.total());
    }
}

fn cmd_config(action: &ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(key, value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}
