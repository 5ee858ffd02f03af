use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;

use revision_loop::config::{Config, DEFAULT_SOURCE_URL};
use revision_loop::pipeline::{Collaborators, Pipeline};
use revision_loop::versioning::ExportReport;
use revision_loop::workflow::graph::to_dot;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize a page and iterate until a human stops the loop
    Run {
        /// Page to summarize
        #[arg(short, long, default_value = DEFAULT_SOURCE_URL)]
        url: String,

        /// Directory for version records and the final artifact
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Stop with an error after this many review passes
        #[arg(long)]
        max_passes: Option<u32>,
    },
    /// Print the workflow graph in DOT format
    Graph,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;

    match args.command {
        Commands::Run {
            url,
            output_dir,
            max_passes,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if max_passes.is_some() {
                config.max_review_passes = max_passes;
            }
            let collaborators = Collaborators::from_config(&config)?;
            let pipeline = Pipeline::new(&config, collaborators)?;

            log::info!("Starting workflow for {}", url);
            let summary = pipeline.run(&url).await?;

            match &summary.artifact {
                Some(path) => println!("Final output saved to {}", path.display()),
                None => println!("Workflow completed. No reviewed content to save"),
            }
            match &summary.export {
                ExportReport::Exported { path, count } => {
                    println!("Exported {} version(s) to {}", count, path.display())
                }
                ExportReport::Empty => println!("No versions to export"),
            }
        }
        Commands::Graph => {
            let collaborators = Collaborators::from_config(&config)?;
            let pipeline = Pipeline::new(&config, collaborators)?;
            print!("{}", to_dot(pipeline.graph()));
        }
    }

    Ok(())
}
