use anyhow::{Context, Result};
use bpmn_yawl::compiler::core::{ResourcingMap, Translator};
use bpmn_yawl::compiler::loader::{load_diagram_from_yaml, load_options_from_yaml, load_resourcing_from_yaml};
use bpmn_yawl::config::TranslatorOptions;
use bpmn_yawl::dsl::{Container, Node, NodeType};
use bpmn_yawl::net::serialize::JsonNetSerializer;
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate one pool of a diagram into a workflow net
    Translate {
        /// Path to the diagram YAML file
        #[arg(long, short)]
        diagram: PathBuf,

        /// Lane-to-resource YAML map
        #[arg(long, short)]
        resourcing: Option<PathBuf>,

        /// Index of the pool to translate
        #[arg(long, short, default_value_t = 0)]
        pool: usize,

        /// Translator options YAML file
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Write the net here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List the pools of a diagram
    Inspect {
        /// Path to the diagram YAML file
        #[arg(long, short)]
        diagram: PathBuf,
    },
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str().with_context(|| format!("Path is not valid UTF-8: {}", path.display()))
}

fn count_nodes(nodes: &[Node], ids: &mut HashSet<String>) -> usize {
    nodes
        .iter()
        .map(|node| {
            ids.insert(node.id.clone());
            match &node.kind {
                NodeType::SubProcess { nodes, .. } => 1 + count_nodes(nodes, ids),
                _ => 1,
            }
        })
        .sum()
}

fn describe_pool(index: usize, pool: &Container, flows: &[bpmn_yawl::dsl::SequenceFlow]) -> String {
    let mut ids = HashSet::new();
    let nodes = count_nodes(&pool.nodes, &mut ids);
    let flows = flows.iter().filter(|f| ids.contains(&f.source)).count();
    format!("{index}: {} ({}) nodes={nodes} flows={flows} lanes={}", pool.name, pool.id, pool.lanes.len())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Translate { diagram, resourcing, pool, config, output } => {
            let source = load_diagram_from_yaml(path_str(&diagram)?)?;
            let resourcing = match resourcing {
                Some(path) => load_resourcing_from_yaml(path_str(&path)?)?,
                None => ResourcingMap::new(),
            };
            let options = match config {
                Some(path) => load_options_from_yaml(path_str(&path)?)?,
                None => TranslatorOptions::default(),
            };

            let translator = Translator::with_options(options);
            let rendered = translator.translate_to_string(&source, pool, &resourcing, &JsonNetSerializer)?;

            match output {
                Some(path) => {
                    fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write net to {}", path.display()))?;
                    info!("Net written to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Inspect { diagram } => {
            let source = load_diagram_from_yaml(path_str(&diagram)?)?;
            println!("{} ({})", source.name, source.id);
            for (index, pool) in source.processes.iter().enumerate() {
                println!("{}", describe_pool(index, pool, &source.flows));
            }
        }
    }

    Ok(())
}
