use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "txlog",
    about = "txlog — object and commit-state stores for an append-only table log",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML file with `[store]` and `[state]` tables
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Use a local object store rooted here (overrides the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Use a file state store at this path (overrides the config file)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write an object
    Put(PutArgs),
    /// Print an object's content
    Get(PathArgs),
    /// Show an object's metadata
    Head(PathArgs),
    /// List objects under a prefix
    Ls(LsArgs),
    /// Delete an object
    Rm(PathArgs),
    /// Move an object, optionally only if the destination is free
    Mv(MvArgs),
    /// Read or record the cached commit version
    State(StateArgs),
}

#[derive(Args)]
pub struct PathArgs {
    pub path: String,
}

#[derive(Args)]
pub struct PutArgs {
    pub path: String,
    /// Read the content from this file
    #[arg(short, long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Use this string as the content
    #[arg(short, long)]
    pub data: Option<String>,
}

#[derive(Args)]
pub struct LsArgs {
    #[arg(default_value = "")]
    pub prefix: String,
}

#[derive(Args)]
pub struct MvArgs {
    pub from: String,
    pub to: String,
    /// Fail instead of overwriting an existing destination
    #[arg(long)]
    pub if_not_exists: bool,
}

#[derive(Args)]
pub struct StateArgs {
    #[command(subcommand)]
    pub action: StateAction,
}

#[derive(Subcommand)]
pub enum StateAction {
    /// Print the cached commit version
    Get,
    /// Record a commit version
    Put { version: i64 },
}
