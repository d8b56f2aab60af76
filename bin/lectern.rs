use anyhow::{Context, Result};
use clap::Parser;
use lectern::corpus::{
    collection_schema, query_schema, read_collection, read_queries, SECTION_FIELDS,
};
use lectern::{EngineConfig, SearchEngine};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "Index a Cranfield corpus and run its queries", long_about = None)]
struct Args {
    /// Cranfield query file (.I/.W records)
    #[arg(long, env = "LECTERN_QUERIES")]
    queries: PathBuf,

    /// Cranfield collection file; when absent the queries themselves are indexed
    #[arg(long, env = "LECTERN_COLLECTION")]
    collection: Option<PathBuf>,

    /// Comma-separated list of fields to search (default: every section of the
    /// collection, or `query` when only queries are indexed)
    #[arg(long, env = "LECTERN_FIELDS", value_delimiter = ',')]
    fields: Vec<String>,

    /// Maximum number of results per query
    #[arg(long, env = "LECTERN_LIMIT", default_value = "10")]
    limit: usize,

    /// Print stored values without highlight markup
    #[arg(long, env = "LECTERN_NO_HIGHLIGHT")]
    no_highlight: bool,

    /// Stop after this many queries
    #[arg(long, env = "LECTERN_MAX_QUERIES")]
    max_queries: Option<usize>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Starting lectern v{}", lectern::VERSION);

    let queries = read_queries(&args.queries)
        .with_context(|| format!("reading queries from {:?}", args.queries))?;

    let (schema, documents, default_fields) = match &args.collection {
        Some(path) => {
            let documents = read_collection(path)
                .with_context(|| format!("reading collection from {:?}", path))?;
            (collection_schema()?, documents, SECTION_FIELDS.to_vec())
        }
        None => (query_schema()?, queries.clone(), vec!["query"]),
    };

    let fields: Vec<String> = if args.fields.is_empty() {
        default_fields.into_iter().map(String::from).collect()
    } else {
        args.fields.clone()
    };

    let config = EngineConfig::default().with_default_limit(args.limit);
    let engine = SearchEngine::new(schema, config);
    engine.index_documents(documents)?;

    println!("Indexed {} documents", engine.index_size()?);

    let max_queries = args.max_queries.unwrap_or(usize::MAX);
    for query in queries.iter().take(max_queries) {
        let text = query.get_str("query").unwrap_or_default();
        println!("Query:: {}", text);

        match engine.query(text, fields.as_slice(), !args.no_highlight) {
            Ok(results) => println!("\t {}", serde_json::to_string(&results)?),
            Err(e) if e.is_query_error() => println!("\t skipped: {}", e),
            Err(e) => return Err(e.into()),
        }
        println!("{}", "-".repeat(70));
    }

    engine.close();
    Ok(())
}
