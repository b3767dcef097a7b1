use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orkg_mapping::{
    resource_link, resource_link_from_iri, OrkgConfig, Processor, Questionnaire, TemplateMapping,
    TemplateQuery, DEFAULT_API_BASE, DEFAULT_RESOURCES_LIMIT, DEFAULT_SPARQL_ENDPOINT,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

/// ORKG Template Mapping Processor
/// Resolves ORKG template graphs into nested form mappings enriched with
/// live value types
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output for detailed processing information
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Base URL of the ORKG REST API
    #[arg(long, global = true, default_value = DEFAULT_API_BASE, value_name = "URL")]
    api_base: String,

    /// URL of the ORKG SPARQL endpoint
    #[arg(long, global = true, default_value = DEFAULT_SPARQL_ENDPOINT, value_name = "URL")]
    sparql_endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a template graph and write its questionnaire mapping
    Resolve {
        /// Id of the root template to resolve (e.g. R144097)
        #[arg(short, long, value_name = "TEMPLATE ID")]
        template: String,

        /// Output directory for the questionnaire file
        #[arg(short, long, value_name = "OUTPUT DIRECTORY PATH")]
        output: Option<PathBuf>,

        /// Skip value-type enrichment and write the raw mapping
        #[arg(long)]
        raw: bool,
    },
    /// Search the template catalog
    Search {
        /// Search string to filter template labels
        #[arg(short, long, value_name = "QUERY")]
        query: Option<String>,

        /// Result page to fetch
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Number of results per page
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    /// Enrich an existing mapping file with live value types
    Preprocess {
        /// Path to a questionnaire or bare mapping JSON file
        #[arg(short, long, value_name = "PATH TO MAPPING")]
        mapping: PathBuf,

        /// Output directory for the enriched file
        #[arg(short, long, value_name = "OUTPUT DIRECTORY PATH")]
        output: Option<PathBuf>,
    },
    /// List resources observed as values of a predicate
    Resources {
        /// Predicate id to look up (e.g. P181002)
        #[arg(short, long, value_name = "PREDICATE ID")]
        predicate: String,

        /// Class id to narrow the listing to instances of (e.g. C121018)
        #[arg(short, long, value_name = "CLASS ID")]
        class: Option<String>,

        /// Maximum number of resources to list
        #[arg(long, default_value_t = DEFAULT_RESOURCES_LIMIT)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with appropriate level
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("ORKG template mapping processor starting up...");

    let config = OrkgConfig::new()
        .with_api_base(cli.api_base.clone())
        .with_sparql_endpoint(cli.sparql_endpoint.clone());

    match &cli.command {
        Commands::Resolve {
            template,
            output,
            raw,
        } => resolve_command(config, template, output, *raw).await,
        Commands::Search { query, page, size } => {
            search_command(config, query.as_deref(), *page, *size).await
        }
        Commands::Preprocess { mapping, output } => {
            preprocess_command(config, mapping, output).await
        }
        Commands::Resources {
            predicate,
            class,
            limit,
        } => resources_command(config, predicate, class.as_deref(), *limit).await,
    }
}

async fn resolve_command(
    config: OrkgConfig,
    template_id: &str,
    output: &Option<PathBuf>,
    raw: bool,
) -> Result<()> {
    let processor = Processor::from_config(config).context("Failed to initialize clients")?;

    info!("Resolving template {}", template_id);
    let questionnaire = if raw {
        info!("Skipping value-type enrichment");
        processor.resolve(template_id).await
    } else {
        processor.process(template_id).await
    }
    .context("Failed to resolve template graph")?;

    let output_dir = output.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir).context(format!(
        "Failed to create output directory: {}",
        output_dir.display()
    ))?;
    let file_path = output_dir.join(format!("questionnaire-{}.json", questionnaire.template_id));

    let json = serde_json::to_string_pretty(&questionnaire)
        .context("Failed to serialize questionnaire")?;
    fs::write(&file_path, json).context(format!(
        "Failed to write questionnaire to: {}",
        file_path.display()
    ))?;

    info!(
        "Questionnaire '{}' has {} top-level field(s)",
        questionnaire.label,
        questionnaire.mapping.len()
    );
    info!("Successfully wrote questionnaire to: {}", file_path.display());
    Ok(())
}

async fn search_command(
    config: OrkgConfig,
    query: Option<&str>,
    page: u32,
    size: u32,
) -> Result<()> {
    let processor = Processor::from_config(config).context("Failed to initialize clients")?;

    // The public API rejects oversized pages; stay within its cap.
    let template_query = TemplateQuery {
        q: query.map(str::to_string),
        page,
        size: size.min(50),
        target_class: None,
    };

    info!("Searching template catalog...");
    let results = processor
        .templates()
        .list_templates(&template_query)
        .await
        .context("Failed to query the template catalog")?;

    if results.items.is_empty() {
        info!("No templates matched");
        return Ok(());
    }

    info!("{} template(s) total, page {}:", results.total, page);
    for item in &results.items {
        let link = resource_link(&item.id).unwrap_or_else(|| item.id.clone());
        match &item.description {
            Some(description) => info!("{} - {} ({})", link, item.label, description),
            None => info!("{} - {}", link, item.label),
        }
    }
    Ok(())
}

async fn preprocess_command(
    config: OrkgConfig,
    mapping_path: &PathBuf,
    output: &Option<PathBuf>,
) -> Result<()> {
    // Verify mapping file exists
    if !mapping_path.exists() {
        anyhow::bail!("Mapping file not found: {}", mapping_path.display());
    }

    info!("Loading mapping from {}", mapping_path.display());
    let content = fs::read_to_string(mapping_path).context("Failed to read mapping file")?;
    let (questionnaire, mapping) = parse_mapping_input(&content)?;

    let processor = Processor::from_config(config).context("Failed to initialize clients")?;
    info!("Enriching {} top-level field(s)...", mapping.len());
    let enriched = processor.enrich(mapping).await;

    let base_dir = mapping_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let output_dir = output.clone().unwrap_or(base_dir);
    fs::create_dir_all(&output_dir).context(format!(
        "Failed to create output directory: {}",
        output_dir.display()
    ))?;
    let stem = mapping_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("mapping");
    let file_path = output_dir.join(format!("{}-enriched.json", stem));

    let json = match questionnaire {
        Some(mut questionnaire) => {
            questionnaire.mapping = enriched;
            serde_json::to_string_pretty(&questionnaire)
        }
        None => serde_json::to_string_pretty(&enriched),
    }
    .context("Failed to serialize enriched mapping")?;
    fs::write(&file_path, json).context(format!(
        "Failed to write enriched mapping to: {}",
        file_path.display()
    ))?;

    info!(
        "Successfully wrote enriched mapping to: {}",
        file_path.display()
    );
    Ok(())
}

/// Accepts either a full questionnaire file or a bare mapping object, so
/// the output of `resolve` can be fed straight back in.
fn parse_mapping_input(content: &str) -> Result<(Option<Questionnaire>, TemplateMapping)> {
    if let Ok(questionnaire) = serde_json::from_str::<Questionnaire>(content) {
        let mapping = questionnaire.mapping.clone();
        return Ok((Some(questionnaire), mapping));
    }
    let mapping = serde_json::from_str::<TemplateMapping>(content)
        .context("File is neither a questionnaire nor a mapping object")?;
    Ok((None, mapping))
}

async fn resources_command(
    config: OrkgConfig,
    predicate: &str,
    class: Option<&str>,
    limit: usize,
) -> Result<()> {
    let processor = Processor::from_config(config).context("Failed to initialize clients")?;

    info!("Listing resources used with predicate {}...", predicate);
    let options = processor.sparql().resources(predicate, class, limit).await;

    if options.is_empty() {
        info!("No resources found");
        return Ok(());
    }

    info!("{} resource(s):", options.len());
    for option in &options {
        match resource_link_from_iri(&option.id) {
            Some(link) => info!("{} - {}", option.label, link),
            None => info!("{} - {}", option.label, option.id),
        }
    }
    Ok(())
}
