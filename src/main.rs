use anyhow::Result;
use chatbot_flow_builder::{
    palette, BuilderConfig, Connection, FileStore, FlowDocument, FlowStore, MemoryStore, NodeKind,
    Position, SaveOutcome, ValidationError, START_NODE_ID,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "chatbot-flow")]
#[command(about = "Chatbot flow builder - build, validate and save conversation flows")]
#[command(version)]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the directory flows are saved in
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the sample two-node flow and save it
    Demo,

    /// Validate a saved flow file
    Check {
        /// Path to a saved flow (.json)
        file: PathBuf,
    },

    /// List the node types that can be created
    Palette,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = load_config(&cli).and_then(|config| match cli.command {
        Commands::Demo => run_demo(&config),
        Commands::Check { file } => check_flow(&config, &file),
        Commands::Palette => {
            list_palette();
            Ok(true)
        }
    });

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> Result<BuilderConfig> {
    let mut config = match &cli.config {
        Some(path) => BuilderConfig::load(path)?,
        None => BuilderConfig::default(),
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }

    Ok(config)
}

fn run_demo(config: &BuilderConfig) -> Result<bool> {
    let storage = FileStore::open(&config.data_dir)?;
    let mut store = FlowStore::with_config(config, storage);

    println!("Starting flow: {} node(s)", store.node_count());

    let greeting = store.add_node(NodeKind::Message, Position::new(100.0, 100.0));
    store.update_node_text(&greeting, "What would you like to do today?");
    println!("✓ Added node {}", greeting);

    store.connect(Connection::new(START_NODE_ID, greeting.as_str()));
    println!("✓ Connected {} -> {}", START_NODE_ID, greeting);

    match store.save_flow()? {
        SaveOutcome::Saved => {
            let path = config.data_dir.join(format!("{}.json", store.storage_key()));
            println!(
                "✓ Saved {} node(s), {} edge(s) to {}",
                store.node_count(),
                store.edge_count(),
                path.display()
            );
            Ok(true)
        }
        SaveOutcome::Blocked => {
            print_messages(store.validation_errors());
            Ok(false)
        }
    }
}

fn check_flow(config: &BuilderConfig, file: &Path) -> Result<bool> {
    let document = FlowDocument::read_file(file)?;
    let store = FlowStore::from_document(document, config, MemoryStore::new());

    println!(
        "Flow: {} node(s), {} edge(s)",
        store.node_count(),
        store.edge_count()
    );

    let errors = store.validate();
    if errors.is_empty() {
        println!("✓ Flow is valid");
        return Ok(true);
    }

    print_messages(&errors);

    Ok(!errors.iter().any(|e| e.is_error()))
}

fn list_palette() {
    for descriptor in palette::catalog() {
        println!("{:<10} {}", descriptor.id, descriptor.description);
    }
}

fn print_messages(items: &[ValidationError]) {
    for item in items {
        println!("  {}: {}", item.severity, item.message);
    }
}
