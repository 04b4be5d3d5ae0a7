use anyhow::Result;
use bit_checkout::areas::repository::Repository;
use bit_checkout::artifacts::checkout::error::CheckoutError;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `BIT_LOG=debug`
const LOG_ENV: &str = "BIT_LOG";

#[derive(Parser)]
#[command(
    name = "bit",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Check out git trees into a working directory",
    long_about = "Stages files into a git-compatible object store and checks trees out \
    into the working directory. Checkout refuses to lose local changes unless forced.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command creates the object store and an empty index in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "add",
        about = "Stage files",
        long_about = "This command stores the content of the given files in the object store and records them in the index. \
        Directories are added recursively."
    )]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "write-tree",
        about = "Write the index as a tree object",
        long_about = "This command stores the staged files as tree objects and prints the ID of the root tree."
    )]
    WriteTree,
    #[command(
        name = "read-tree",
        about = "Check out one or two trees",
        long_about = "With one tree, this command makes the index and the working directory match it. \
        With two trees, it moves from the first tree to the second, keeping local changes \
        that the move does not touch."
    )]
    ReadTree {
        #[arg(short, long, help = "Discard conflicting local changes instead of aborting")]
        force: bool,
        #[arg(index = 1, required = true, num_args = 1..=2, help = "The head tree, then the tree to check out")]
        trees: Vec<String>,
    },
    #[command(
        name = "ls-tree",
        about = "List the contents of a tree object"
    )]
    LsTree {
        #[arg(short, long, help = "Recurse into subtrees")]
        recursive: bool,
        #[arg(index = 1)]
        tree: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path } => {
            let path = match path {
                Some(path) => PathBuf::from(path),
                None => std::env::current_dir()?,
            };

            open(&path)?.init()
        }
        Commands::Add { paths } => open(&std::env::current_dir()?)?.add(&paths),
        Commands::WriteTree => open(&std::env::current_dir()?)?.write_tree(),
        Commands::ReadTree { force, trees } => {
            open(&std::env::current_dir()?)?.read_tree(&trees, force)
        }
        Commands::LsTree { recursive, tree } => {
            open(&std::env::current_dir()?)?.ls_tree(&tree, recursive)
        }
    }
}

fn open(path: &Path) -> Result<Repository> {
    Repository::new(path, Box::new(std::io::stdout()))
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<CheckoutError>() {
        Some(CheckoutError::Conflicts(report)) => {
            eprintln!("{} {}", "error:".red().bold(), report);
            eprintln!("Aborting");
        }
        _ => eprintln!("{} {:#}", "error:".red().bold(), err),
    }
}
