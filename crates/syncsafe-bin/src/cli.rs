use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "syncsafe")]
#[command(version)]
#[command(about = "Rename files and folders that a cloud sync service would reject")]
#[command(long_about = "Scans a directory tree for file and folder names that violate cloud-sync \
naming rules (reserved device names, forbidden punctuation, trailing periods or whitespace) and \
renames them, or logs the would-be changes in the default dry-run mode.")]
pub struct Cli {
    #[arg(help = "Target directory (defaults to the current directory; must be an absolute path)")]
    pub target: Option<PathBuf>,

    #[arg(short, long, help = "Perform the renames (the default is a dry run that only logs)")]
    pub rename: bool,

    #[arg(short, long, help = "Skip the confirmation prompt before renaming")]
    pub yes: bool,

    #[arg(
        long,
        default_value = "logfile.csv",
        help = "Path of the CSV log written at the end of the run"
    )]
    pub log_file: PathBuf,

    #[arg(
        long = "exclude-prefix",
        default_value = ".",
        help = "Skip entries (and their subtrees) whose name starts with this prefix; repeatable"
    )]
    pub exclude_prefixes: Vec<String>,

    #[arg(long, help = "Load the recognized-extension table from a file, one entry per line")]
    pub extensions_file: Option<PathBuf>,

    #[arg(long, help = "Load the reserved-name table from a file, one entry per line")]
    pub reserved_file: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
