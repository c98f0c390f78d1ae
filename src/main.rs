//! Command-line interface for index-cluster
//!
//! # Usage Examples
//!
//! ## Collections
//! ```bash
//! # Create a collection with 8 cores over the default hash ranges
//! index-cluster --cluster-url 10.0.0.5 create-collection files
//!
//! # Create with 4 cores and explicit ranges
//! index-cluster create-collection files --num-cores 4 \
//!   --ranges 0-1fffffff,20000000-3fffffff,40000000-5fffffff,60000000-7fffffff
//!
//! # Delete every core of a collection
//! index-cluster delete-collection files
//! ```
//!
//! ## Data
//! ```bash
//! # Push 100000 generated file records with 4 workers and content
//! index-cluster bulk-push files --total-docs 100000 --workers 4 --with-content
//!
//! # Search with filters and a projection
//! index-cluster search files --eq FileExtension=pdf --any ClientId,CommcellNumber=1,2 \
//!   --fl FileName,Size --param rows=10
//! ```
//!
//! ## Cluster state
//! ```bash
//! index-cluster routes
//! index-cluster stats
//! index-cluster inventory volumes
//! index-cluster random-load --count 3 --search --parallel
//! ```

use anyhow::{anyhow, Context};
use bulk_ingest::{BulkIngestor, BulkPushOptions};
use clap::{Args, Parser, Subcommand};
use cluster_client::{
    ClientConfig, ClusterClient, CollectionLoader, CollectionSpec, Inventory, PartitionRouter,
    StatsAggregator, DEFAULT_CONFIG_SET, DEFAULT_NUM_CORES,
};
use document_generator::{ContentOptions, DocumentType};
use index_cluster::{parse_duration, ClusterOpts};
use index_query::{Filter, Query};
use serde::Serialize;
use std::time::Duration;
use tracing::info_span;

#[derive(Parser)]
#[command(name = "index-cluster")]
#[command(about = "Control and data plane client for a sharded search index cluster")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    cluster: ClusterOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create one core per hash range and publish the collection's routes
    CreateCollection {
        /// Collection name
        collection: String,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Delete every core currently routed to a collection
    DeleteCollection {
        /// Collection name
        collection: String,
    },

    /// Unload a collection from its servers
    UnloadCollection {
        /// Collection name
        collection: String,
    },

    /// Rebuild the routing entry of a collection
    UpdateRoutes {
        /// Collection name
        collection: String,
    },

    /// Print the routing table
    Routes,

    /// Print the names of all routed collections
    Collections,

    /// Print per-collection stats of loaded collections
    LoadedStats,

    /// Check that a core answers a match-all select
    PingCore {
        /// Core name
        core: String,
    },

    /// Ping a collection, optionally followed by a match-all search
    PingCollection {
        /// Collection name
        collection: String,

        /// Run a match-all search after the ping
        #[arg(long)]
        search: bool,
    },

    /// Run a select request against a collection
    Search {
        /// Collection name
        collection: String,

        #[command(flatten)]
        query: SearchArgs,
    },

    /// Commit a collection
    Commit {
        /// Collection name
        collection: String,
    },

    /// Generate and push synthetic records into a collection
    BulkPush {
        /// Collection name
        collection: String,

        #[command(flatten)]
        args: BulkPushArgs,
    },

    /// Ping a random sample of routed collections
    RandomLoad {
        /// Number of collections to sample
        #[arg(long)]
        count: usize,

        /// Run a match-all search on each sampled collection
        #[arg(long)]
        search: bool,

        /// Ping the sample concurrently
        #[arg(long)]
        parallel: bool,
    },

    /// Print aggregated volume and document statistics
    Stats,

    /// Print a raw inventory listing
    Inventory {
        /// One of cores, servers, volumes, routes
        #[arg(value_parser = clap::value_parser!(Inventory))]
        kind: Inventory,
    },
}

/// Core layout of a new collection
#[derive(Args, Clone, Debug)]
struct LayoutArgs {
    /// Number of cores to create
    #[arg(long, default_value_t = DEFAULT_NUM_CORES)]
    num_cores: usize,

    /// Config set of the created cores
    #[arg(long, default_value = DEFAULT_CONFIG_SET)]
    config_set: String,

    /// Core name prefix (defaults to the collection name)
    #[arg(long)]
    core_prefix: Option<String>,

    /// Hash ranges, one per core (defaults to the built-in 8-range table)
    #[arg(long, value_delimiter = ',')]
    ranges: Option<Vec<String>>,
}

impl LayoutArgs {
    fn spec(&self, collection: &str) -> CollectionSpec {
        let mut spec = CollectionSpec::new(collection)
            .with_num_cores(self.num_cores)
            .with_config_set(self.config_set.clone());
        if let Some(prefix) = &self.core_prefix {
            spec = spec.with_core_prefix(prefix.clone());
        }
        if let Some(ranges) = &self.ranges {
            spec = spec.with_ranges(ranges.clone());
        }
        spec
    }
}

/// Select query options
#[derive(Args, Clone, Debug)]
struct SearchArgs {
    /// Equality clause `field=value` (repeatable)
    #[arg(long = "eq", value_name = "FIELD=VALUE", value_parser = parse_key_value)]
    equals: Vec<(String, String)>,

    /// Disjunction `f1,f2=v1,v2` over every field/value pair (repeatable)
    #[arg(long = "any", value_name = "FIELDS=VALUES", value_parser = parse_key_value)]
    any: Vec<(String, String)>,

    /// Raw filter expression; replaces every other clause
    #[arg(long)]
    raw: Option<String>,

    /// Projected fields
    #[arg(long, value_delimiter = ',')]
    fl: Vec<String>,

    /// Extra request parameter `key=value`, or `key` alone (repeatable)
    #[arg(long = "param", value_name = "KEY[=VALUE]")]
    params: Vec<String>,
}

impl SearchArgs {
    fn query(&self) -> Query {
        let mut clauses = Vec::new();
        if let Some(raw) = &self.raw {
            clauses.push(Filter::raw(raw.clone()));
        }
        for (field, value) in &self.equals {
            clauses.push(Filter::equals(field.clone(), value));
        }
        for (fields, values) in &self.any {
            clauses.push(Filter::one_of(split_list(fields), split_list(values)));
        }

        let mut query = Query::new();
        if !clauses.is_empty() {
            query = query.filter(Filter::and(clauses));
        }
        query = query.fields(self.fl.iter().cloned());
        for param in &self.params {
            query = match param.split_once('=') {
                Some((key, value)) => query.param(key, value),
                None => query.flag(param.clone()),
            };
        }
        query
    }
}

/// Bulk push options
#[derive(Args, Clone, Debug)]
struct BulkPushArgs {
    /// Number of records to generate
    #[arg(long)]
    total_docs: usize,

    /// Record type
    #[arg(long, default_value = "File")]
    doc_type: DocumentType,

    /// Records per push request
    #[arg(long, default_value = "50")]
    batch_size: usize,

    /// Concurrent push workers
    #[arg(long, default_value = "1")]
    workers: usize,

    /// Create the collection before pushing
    #[arg(long)]
    create_collection: bool,

    #[command(flatten)]
    layout: LayoutArgs,

    /// Attach generated text content to every record
    #[arg(long)]
    with_content: bool,

    /// Interval of the background commit
    #[arg(long, default_value = "900s", value_parser = parse_duration)]
    commit_interval: Duration,

    /// Attempts per batch before the push fails
    #[arg(long, default_value = "3")]
    push_attempts: u32,

    /// Pause between batch attempts
    #[arg(long, default_value = "60s", value_parser = parse_duration)]
    push_backoff: Duration,

    /// Rebuild the text caches every N batches
    #[arg(long, default_value = "100")]
    cache_refresh_batches: usize,

    /// JSON object merged into every record
    #[arg(long, value_name = "JSON")]
    extra_fields: Option<String>,

    /// Seed for reproducible records
    #[arg(long)]
    seed: Option<u64>,
}

impl BulkPushArgs {
    fn options(&self) -> anyhow::Result<BulkPushOptions> {
        let mut options = BulkPushOptions::default()
            .with_batch_size(self.batch_size)
            .with_workers(self.workers)
            .with_create_collection(self.create_collection)
            .with_num_cores(self.layout.num_cores)
            .with_config_set(self.layout.config_set.clone())
            .with_commit_interval(self.commit_interval)
            .with_push_retry(self.push_attempts, self.push_backoff)
            .with_cache_refresh_batches(self.cache_refresh_batches);

        if let Some(ranges) = &self.layout.ranges {
            options = options.with_ranges(ranges.clone());
        }
        if self.with_content {
            options = options.with_content(ContentOptions::default());
        }
        if let Some(extra) = &self.extra_fields {
            let value: serde_json::Value =
                serde_json::from_str(extra).context("Failed to parse --extra-fields")?;
            let map = value
                .as_object()
                .cloned()
                .ok_or_else(|| anyhow!("--extra-fields must be a JSON object"))?;
            options = options.with_extra_fields(map);
        }
        if let Some(seed) = self.seed {
            options = options.with_seed(seed);
        }
        Ok(options)
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected KEY=VALUE, got '{s}'"))?;
    if key.trim().is_empty() || value.trim().is_empty() {
        return Err(format!("Expected KEY=VALUE, got '{s}'"));
    }
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from(&cli.cluster);
    let client = ClusterClient::new(&config).context("Failed to build the cluster client")?;
    let router = PartitionRouter::new(client.clone()).with_span(info_span!("router"));

    match cli.command {
        Commands::CreateCollection { collection, layout } => {
            let cores = router
                .create_collection(&layout.spec(&collection))
                .await
                .with_context(|| format!("Failed to create collection {collection}"))?;
            print_json(&cores)?;
        }
        Commands::DeleteCollection { collection } => {
            let deleted = router
                .delete_collection(&collection)
                .await
                .with_context(|| format!("Failed to delete collection {collection}"))?;
            tracing::info!("Deleted {deleted} cores of collection {collection}");
        }
        Commands::UnloadCollection { collection } => {
            router
                .unload_collection(&collection)
                .await
                .with_context(|| format!("Failed to unload collection {collection}"))?;
        }
        Commands::UpdateRoutes { collection } => {
            router
                .update_routes(&collection)
                .await
                .with_context(|| format!("Failed to update routes of {collection}"))?;
        }
        Commands::Routes => {
            let routes = router
                .get_routing_table()
                .await
                .context("Failed to read the routing table")?;
            print_json(&routes)?;
        }
        Commands::Collections => {
            let names = router
                .get_all_collection_names()
                .await
                .context("Failed to list collections")?;
            print_json(&names)?;
        }
        Commands::LoadedStats => {
            let stats = StatsAggregator::new(client)
                .with_span(info_span!("stats"))
                .loaded_collection_stats(true)
                .await
                .context("Failed to collect loaded collection stats")?;
            print_json(&stats)?;
        }
        Commands::PingCore { core } => {
            router
                .ping_core(&core)
                .await
                .with_context(|| format!("Ping of core {core} failed"))?;
        }
        Commands::PingCollection { collection, search } => {
            router
                .ping_collection(&collection, search)
                .await
                .with_context(|| format!("Ping of collection {collection} failed"))?;
        }
        Commands::Search { collection, query } => {
            let response = client
                .with_span(info_span!("search", collection = %collection))
                .search_collection(&collection, &query.query())
                .await
                .with_context(|| format!("Search on {collection} failed"))?;
            print_json(&response)?;
        }
        Commands::Commit { collection } => {
            client
                .commit(&collection)
                .await
                .with_context(|| format!("Commit of {collection} failed"))?;
        }
        Commands::BulkPush { collection, args } => {
            let options = args.options()?;
            let report = BulkIngestor::new(client)
                .with_span(info_span!("bulk_push", collection = %collection))
                .bulk_push(&collection, args.total_docs, args.doc_type, options)
                .await
                .with_context(|| format!("Bulk push into {collection} failed"))?;
            println!("=== Bulk push complete ===");
            println!("Collection:        {}", report.collection);
            println!("Requested:         {}", report.requested);
            println!("Pushed:            {}", report.pushed);
            println!("Dropped remainder: {}", report.dropped);
            println!("Workers:           {}", report.workers);
            println!("Batches:           {}", report.batches);
            println!("Periodic commits:  {}", report.periodic_commits);
            println!("Duration:          {:?}", report.elapsed);
            println!("Rate:              {:.1} docs/sec", report.docs_per_second());
        }
        Commands::RandomLoad {
            count,
            search,
            parallel,
        } => {
            let loaded = CollectionLoader::new(router)
                .with_span(info_span!("random_load"))
                .random_load(count, search, parallel)
                .await
                .context("Random load failed")?;
            print_json(&loaded)?;
        }
        Commands::Stats => {
            let stats = StatsAggregator::new(client)
                .with_span(info_span!("stats"))
                .cluster_stats()
                .await
                .context("Failed to collect cluster stats")?;
            print_json(&stats.summary())?;
        }
        Commands::Inventory { kind } => {
            let listing = client
                .inventory(kind)
                .await
                .with_context(|| format!("Failed to read {kind} inventory"))?;
            print_json(&listing)?;
        }
    }

    Ok(())
}
