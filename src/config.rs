//! Command-line configuration for the `treescan` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use treescan::{default_concurrency, ScanError, Scanner, DEFAULT_BATCH_SIZE};

/// Scan all entries within a directory
#[derive(Parser, Debug, Clone)]
#[command(
    name = "treescan",
    version,
    about = "Scan all entries within a directory",
    after_help = "EXAMPLES:\n    \
        treescan count /var/log\n    \
        treescan list ~/src -c 4\n    \
        treescan count / --suppress-errors"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Upper limit of the number of directories read concurrently
    #[arg(
        short = 'c',
        long,
        global = true,
        default_value_t = default_concurrency(),
        value_parser = parse_positive,
        value_name = "NUM"
    )]
    pub concurrency: usize,

    /// Do not print scan errors and do not fail because of them
    #[arg(short = 's', long, global = true)]
    pub suppress_errors: bool,

    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Entries requested per directory read
    #[arg(
        long,
        global = true,
        hide = true,
        default_value_t = DEFAULT_BATCH_SIZE,
        value_parser = parse_positive,
        value_name = "NUM"
    )]
    pub batch_size: usize,

    /// Output stream capacity (defaults to twice the concurrency)
    #[arg(long, global = true, hide = true, value_parser = parse_positive, value_name = "NUM")]
    pub channel_capacity: Option<usize>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the number of entries per type and the total
    Count {
        /// Directory to scan
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Print every entry as "<type indicator> <path>"
    List {
        /// Directory to scan
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Count,
    List,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub mode:             OutputMode,
    pub root:             PathBuf,
    pub concurrency:      usize,
    pub batch_size:       usize,
    pub channel_capacity: Option<usize>,
    pub suppress_errors:  bool,
    pub verbose:          bool,
}

impl ScanConfig {
    pub fn from_args(args: CliArgs) -> Self {
        let (mode, root) = match args.command {
            Command::Count { dir } => (OutputMode::Count, dir),
            Command::List { dir } => (OutputMode::List, dir),
        };

        Self {
            mode,
            root,
            concurrency: args.concurrency,
            batch_size: args.batch_size,
            channel_capacity: args.channel_capacity,
            suppress_errors: args.suppress_errors,
            verbose: args.verbose,
        }
    }

    /// Build the scanner. Fails if the root is missing or not a directory.
    pub fn scanner(&self) -> Result<Scanner, ScanError> {
        let mut builder = Scanner::builder(&self.root)
            .concurrency(self.concurrency)
            .batch_size(self.batch_size);
        if let Some(capacity) = self.channel_capacity {
            builder = builder.channel_capacity(capacity);
        }
        builder.build()
    }
}

fn parse_positive(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if n == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(n)
}
