//! Waypoint - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waypoint_core::prelude::*;
use waypoint_tools::report::{path_length, GraphStats};
use waypoint_tools::{parse_point, render, validate, Result, ToolError};

#[derive(Parser)]
#[command(name = "waypoint-tools")]
#[command(about = "Development tools for waypoint navigation graphs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a level file and configuration
    Validate {
        /// Path to the RON level description
        level: PathBuf,
        /// Path to a RON navigation config
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Build a graph and print its statistics
    Build {
        /// Path to the RON level description
        level: PathBuf,
        /// Path to a RON navigation config
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print statistics as RON instead of text
        #[arg(long)]
        ron: bool,
        /// Draw the graph, one character per this many world units
        #[arg(long)]
        draw: Option<f64>,
    },
    /// Build a graph and run a path query between two positions
    Path {
        /// Path to the RON level description
        level: PathBuf,
        /// Start position as x,y
        #[arg(long, value_parser = parse_point_arg)]
        from: Vec2,
        /// Goal position as x,y
        #[arg(long, value_parser = parse_point_arg)]
        to: Vec2,
        /// Path to a RON navigation config
        #[arg(long)]
        config: Option<PathBuf>,
        /// Use the greedy walk instead of the exhaustive search
        #[arg(long)]
        quick: bool,
        /// Draw the path, one character per this many world units
        #[arg(long)]
        draw: Option<f64>,
    },
}

fn parse_point_arg(text: &str) -> std::result::Result<Vec2, String> {
    parse_point(text).map_err(|e| e.to_string())
}

fn build_graph(level: &TileLevel, config: &NavConfig) -> Result<NavGraph> {
    let mut world = LevelCollider::with_step(level, config.collision_step);
    let mut graph = NavGraph::new(level);
    generate_from_level(&mut graph, level, &mut world, &config.generation)?;
    Ok(graph)
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Validate { level, config } => {
            tracing::info!("Validating level: {}", level.display());
            validate::validate_files(&level, config.as_deref())?;
        }
        Commands::Build {
            level,
            config,
            ron,
            draw,
        } => {
            let config = validate::load_config(config.as_deref())?;
            let level = validate::load_level(&level)?;
            let graph = build_graph(&level, &config)?;
            let stats = GraphStats::from_graph(&graph);
            if ron {
                let text = ron::ser::to_string_pretty(&stats, ron::ser::PrettyConfig::default())
                    .map_err(|e| ToolError::Serialize(e.to_string()))?;
                println!("{text}");
            } else {
                println!("{stats}");
            }
            if let Some(cell) = draw {
                print!("{}", render::render_ascii(&graph, &level, cell, &[])?);
            }
        }
        Commands::Path {
            level,
            from,
            to,
            config,
            quick,
            draw,
        } => {
            let config = validate::load_config(config.as_deref())?;
            let level = validate::load_level(&level)?;
            let graph = build_graph(&level, &config)?;

            let (path, walked) = if quick {
                let hops = get_path_quick(&graph, from, to, &config.search);
                // Greedy hops exclude the start node; prepend it for display.
                let start = Endpoint::from(from).resolve(&graph, config.search.nearest);
                let walked: Vec<NodeId> = start.into_iter().chain(hops.iter().copied()).collect();
                (hops, walked)
            } else {
                let path = get_path(&graph, from, to, &config.search).unwrap_or_default();
                (path.clone(), path)
            };

            if walked.is_empty() {
                println!("no path from {from} to {to}");
            } else {
                let waypoints: Vec<String> = graph
                    .path_positions(&walked)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                println!("nodes:   {}", path.len());
                println!("length:  {:.2}", path_length(&graph, &walked));
                println!("route:   {}", waypoints.join(" -> "));
            }
            if let Some(cell) = draw {
                print!("{}", render::render_ascii(&graph, &level, cell, &walked)?);
            }
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
