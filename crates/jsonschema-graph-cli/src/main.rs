#![doc = include_str!("../README.md")]

use std::process::ExitCode;

use bpaf::Bpaf;
use jsonschema_graph::{Dialect, GraphError, SchemaGraph};
use jsonschema_graph_cache::SchemaCache;
use tracing_subscriber::prelude::*;
use url::Url;

mod commands;
mod config;
mod options;

use commands::Settings;
use options::{GlobalOptions, LogLevel, global_options};

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version, fallback_to_usage, generate(cli))]
/// Load, index and resolve JSON Schema documents across draft-04 to 2020-12
struct Cli {
    #[bpaf(external(global_options))]
    global: GlobalOptions,

    #[bpaf(external(commands))]
    command: Commands,
}

#[derive(Debug, Clone, Bpaf)]
pub struct SchemaArgs {
    /// Dialect for documents without a recognised `$schema` (default: 2020-12)
    #[bpaf(long("dialect"), argument("DIALECT"))]
    pub dialect: Option<Dialect>,

    /// Schema URL or local path
    #[bpaf(positional("SCHEMA"))]
    pub schema: String,
}

#[derive(Debug, Clone, Bpaf)]
enum Commands {
    #[bpaf(command("load"))]
    /// Load a schema and everything it references, then list the documents
    Load(#[bpaf(external(schema_args))] SchemaArgs),

    #[bpaf(command("nodes"))]
    /// List the canonical URL of every schema node
    Nodes(#[bpaf(external(schema_args))] SchemaArgs),

    #[bpaf(command("resolve"))]
    /// Resolve the reference carried by a node
    Resolve(
        #[bpaf(external(schema_args))] SchemaArgs,
        /// Node URL, absolute or relative to the schema (e.g. '#/properties/a')
        #[bpaf(positional("NODE_URL"))]
        String,
    ),

    #[bpaf(command("names"))]
    /// Suggest a type name for every schema node
    Names(#[bpaf(external(schema_args))] SchemaArgs),

    #[bpaf(command("config-schema"))]
    /// Print the JSON Schema for jsonschema-graph.toml
    ConfigSchema,

    #[bpaf(command("version"))]
    /// Print version information
    Version,
}

fn init_tracing(level: LogLevel) {
    // JSONSCHEMA_GRAPH_LOG takes a full filter and also turns on span
    // entry/exit lines; otherwise --log-level picks a global level.
    let (filter, explicit) = match tracing_subscriber::EnvFilter::try_from_env("JSONSCHEMA_GRAPH_LOG") {
        Ok(f) => (f, true),
        Err(_) => (tracing_subscriber::EnvFilter::new(level.directive()), false),
    };
    tracing_subscriber::registry()
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_indent_lines(true)
                .with_verbose_exit(explicit)
                .with_verbose_entry(explicit)
                .with_timer(tracing_tree::time::Uptime::default())
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn open(global: &GlobalOptions, args: &SchemaArgs) -> anyhow::Result<(SchemaGraph<SchemaCache>, Url)> {
    let settings = Settings::load(global, args.dialect)?;
    tracing::debug!(?settings, "settings");
    Ok((settings.graph(), commands::schema_location(&args.schema)?))
}

async fn run(global: &GlobalOptions, command: Commands) -> anyhow::Result<String> {
    match command {
        Commands::Load(args) => {
            let (mut graph, schema) = open(global, &args)?;
            commands::load::run(&mut graph, &schema).await
        }
        Commands::Nodes(args) => {
            let (mut graph, schema) = open(global, &args)?;
            commands::nodes::run(&mut graph, &schema).await
        }
        Commands::Resolve(args, node) => {
            let (mut graph, schema) = open(global, &args)?;
            commands::resolve::run(&mut graph, &schema, &node).await
        }
        Commands::Names(args) => {
            let (mut graph, schema) = open(global, &args)?;
            commands::names::run(&mut graph, &schema).await
        }
        Commands::ConfigSchema => commands::config_schema::run(),
        Commands::Version => Ok(format!("jsonschema-graph {}\n", env!("CARGO_PKG_VERSION"))),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    let cli = cli().run();
    init_tracing(cli.global.log_level);

    match run(&cli.global, cli.command).await {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.downcast::<GraphError>() {
                Ok(graph_error) => eprintln!("{:?}", miette::Report::new(graph_error)),
                Err(e) => eprintln!("Error: {e:#}"),
            }
            ExitCode::from(2)
        }
    }
}
