use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use graphwalk::config::{self, speed_name, EditorConfig, TraversalTiming};
use graphwalk::editor::GraphEditor;
use graphwalk::errors::GraphError;
use graphwalk::presentation::HeadlessRenderer;
use graphwalk::serializer::{self, ExportFormat};
use graphwalk::types::*;

/// Interactive graph editing and BFS/DFS traversal.
#[derive(Parser)]
#[command(name = "graphwalk", about = "Graph editing and BFS/DFS traversal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .graphwalk/config.json
    Init {
        /// Project path (default: current directory)
        path: Option<String>,
    },
    /// Run a traversal over a saved graph and print the visit order
    Traverse {
        /// Graph file (.json or .xml)
        file: PathBuf,
        /// Start node id
        #[arg(short, long)]
        start: NodeId,
        /// Traversal mode (bfs or dfs)
        #[arg(short, long, default_value = "bfs")]
        mode: String,
        /// Follow only outgoing edges
        #[arg(short, long)]
        directed: bool,
        /// Speed preset from 1 (very slow) to 5 (very fast)
        #[arg(long)]
        speed: Option<u8>,
        /// Skip all pauses and print the order right away
        #[arg(long)]
        instant: bool,
        /// Project path holding .graphwalk/config.json
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Convert a graph file between JSON and XML
    Convert {
        /// Graph file (.json or .xml)
        file: PathBuf,
        /// Target format (json or xml)
        #[arg(short, long)]
        to: String,
        /// Directory for graph.json / graph.xml (default: current directory)
        #[arg(short, long)]
        out_dir: Option<String>,
    },
    /// Show graph statistics
    Stats {
        /// Graph file (.json or .xml)
        file: PathBuf,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("graphwalk=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> graphwalk::errors::Result<()> {
    match cli.command {
        Commands::Init { path } => {
            let project_path = resolve_path(path);
            config::save_config(&project_path, &EditorConfig::default())?;
            println!(
                "Initialized graphwalk config at {}",
                config::get_config_path(&project_path).display()
            );
        }
        Commands::Traverse {
            file,
            start,
            mode,
            directed,
            speed,
            instant,
            path,
        } => {
            let mode = TraversalMode::from_str(&mode).ok_or_else(|| {
                GraphError::validation(format!("unknown traversal mode '{mode}'"))
            })?;
            let project_path = resolve_path(path);
            let mut config = config::load_config(&project_path)?;
            config.directed = directed;
            if let Some(speed) = speed {
                config.speed = speed;
            }
            let timing = if instant {
                TraversalTiming::immediate()
            } else {
                // Headless runs skip the deferred color reset.
                TraversalTiming {
                    reset_delay: Duration::ZERO,
                    ..config.timing()
                }
            };

            let format = detect_format(&file)?;
            let mut editor = GraphEditor::new(HeadlessRenderer::new(), config);
            editor.set_timing(timing);
            editor.import_file(Some(&file), format).await?;

            let engine = editor.engine().clone();
            let stopper = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    engine.stop();
                }
            });
            let result = editor.run_traversal(Some(start), mode).await;
            stopper.abort();
            let summary = result?;

            for entry in editor.log().entries() {
                println!("{}", entry.display());
            }
            let order: Vec<String> = summary.order.iter().map(|id| id.to_string()).collect();
            println!(
                "{} from {} at {} speed: {}",
                mode.label(),
                start,
                speed_name(editor.config().speed),
                order.join(" -> ")
            );
            if summary.cancelled {
                println!("Stopped after {} nodes", summary.visited_count);
            }
        }
        Commands::Convert { file, to, out_dir } => {
            let target = ExportFormat::from_str(&to)
                .ok_or_else(|| GraphError::validation(format!("unknown format '{to}'")))?;
            let format = detect_format(&file)?;
            let mut editor = GraphEditor::new(HeadlessRenderer::new(), EditorConfig::default());
            editor.import_file(Some(&file), format).await?;
            let out_dir = resolve_path(out_dir);
            let written = editor.export_to_dir(&out_dir, target).await?;
            println!("Wrote {}", written.display());
        }
        Commands::Stats { file, json } => {
            let format = detect_format(&file)?;
            let text = tokio::fs::read_to_string(&file).await?;
            let snapshot = serializer::import(&text, format)?;
            let mut store = graphwalk::graph::GraphStore::new();
            store.restore(snapshot)?;
            let stats = store.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Graph {}", file.display());
                println!("  Nodes:          {}", stats.node_count);
                println!("  Edges:          {}", stats.edge_count);
                println!("  Directed edges: {}", stats.directed_edge_count);
                println!("  Node counter:   {}", stats.node_counter);
                println!("  Edge counter:   {}", stats.edge_counter);
                if stats.dangling_edge_count > 0 {
                    println!("  Dangling edges: {}", stats.dangling_edge_count);
                }
            }
        }
    }
    Ok(())
}

fn detect_format(file: &Path) -> graphwalk::errors::Result<ExportFormat> {
    ExportFormat::from_path(file).ok_or_else(|| GraphError::FileSelection {
        message: "expected a .json or .xml file".to_string(),
        path: file.display().to_string(),
    })
}

/// Resolves an optional path argument to a `PathBuf`.
///
/// Defaults to the current working directory if no path is provided.
fn resolve_path(path: Option<String>) -> PathBuf {
    match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
