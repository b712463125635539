use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "loom",
    about = "Storyloom: branching collaborative stories",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Lay out a story snapshot level by level
    Layout(SnapshotArgs),
    /// List the selectable branches of a node
    Branches(BranchesArgs),
    /// Read a story snapshot, optionally walking its branches
    Read(ReadArgs),
    /// Show the shape of a story snapshot
    Summary(SnapshotArgs),
    /// Build a sample story in memory and print it
    Demo,
}

#[derive(Args)]
pub struct SnapshotArgs {
    /// JSON file with a node array or a `{ "story": .., "nodes": [..] }` object
    pub file: PathBuf,
}

#[derive(Args)]
pub struct BranchesArgs {
    pub file: PathBuf,
    pub node: String,
}

#[derive(Args)]
pub struct ReadArgs {
    pub file: PathBuf,
    /// Follow the canonical path before applying choices
    #[arg(long)]
    pub canon: bool,
    /// Branch to take, in order; repeatable
    #[arg(long = "choose", value_name = "NODE")]
    pub choices: Vec<String>,
    /// Steps to go back after the choices
    #[arg(long, default_value = "0")]
    pub back: usize,
}
