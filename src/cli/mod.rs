pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::browser::{SystemBrowser, UrlOpener};
use crate::config::Config;
use crate::error::Result;
use crate::render::OutputFormat;
use crate::storage::ListStore;

#[derive(Parser, Debug)]
#[command(name = "bejw")]
#[command(about = "A capped reading list for links that shimmer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

/// Location of the reading list file.
#[derive(Args, Debug, Clone, Default)]
pub struct FileArg {
    /// Reading list file (defaults to ~/.bejw/links.json)
    #[arg(long, value_name = "PATH")]
    pub file_path: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the reading list with a capacity and file path
    Init {
        /// Maximum number of links
        #[arg(long, value_parser = parse_capacity)]
        capacity: Option<usize>,

        #[command(flatten)]
        file: FileArg,

        /// Overwrite an existing reading list
        #[arg(long)]
        force: bool,
    },

    /// Add a link to the reading list
    Add {
        url: String,
        title: String,

        #[command(flatten)]
        file: FileArg,
    },

    /// Remove a link by its number in the list
    Remove {
        #[arg(allow_negative_numbers = true)]
        number: i64,

        /// Count read links when numbering
        #[arg(long)]
        include_read: bool,

        #[command(flatten)]
        file: FileArg,
    },

    /// Open a link in the browser
    Read {
        #[arg(allow_negative_numbers = true)]
        number: i64,

        /// Count read links when numbering
        #[arg(long)]
        include_read: bool,

        /// Also mark the opened link as read
        #[arg(long)]
        mark: bool,

        #[command(flatten)]
        file: FileArg,
    },

    /// Mark a link as read
    MarkRead {
        #[arg(allow_negative_numbers = true)]
        number: i64,

        /// Count read links when numbering
        #[arg(long)]
        include_read: bool,

        #[command(flatten)]
        file: FileArg,
    },

    /// Display the reading list
    List {
        #[command(flatten)]
        file: FileArg,

        /// Show permanent link ids
        #[arg(long)]
        show_ids: bool,

        /// Output format
        #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Omit the header row
        #[arg(long)]
        no_header: bool,

        /// Include read links
        #[arg(long, conflicts_with = "read")]
        include_read: bool,

        /// Show only read links
        #[arg(long)]
        read: bool,
    },

    /// Change the capacity of the reading list
    Capacity {
        #[arg(value_parser = parse_capacity)]
        value: usize,

        #[command(flatten)]
        file: FileArg,
    },

    /// Clear the reading list
    Clear {
        #[command(flatten)]
        file: FileArg,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn parse_capacity(raw: &str) -> std::result::Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("capacity must be at least 1".to_string()),
        Ok(value) => Ok(value),
        Err(e) => Err(e.to_string()),
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = Config::resolve(self.config.as_deref())?;
        commands::init_logging(self.debug, self.verbose, &config.logging);

        let browser = SystemBrowser::new(config.browser.clone());
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.execute(&config, &mut out, &browser)
    }

    /// Runs the command against `out` and `opener` instead of the real
    /// terminal and browser.
    pub fn execute<W: Write>(
        self,
        config: &Config,
        out: &mut W,
        opener: &dyn UrlOpener,
    ) -> Result<()> {
        let store_for = |file: &FileArg| -> Result<ListStore> {
            ListStore::open(file.file_path.as_deref().unwrap_or(&config.storage.file_path))
        };
        let default_capacity = config.storage.default_capacity;

        let Some(command) = self.command else {
            return commands::banner(out);
        };

        match command {
            Commands::Init { capacity, file, force } => {
                let capacity = capacity.unwrap_or(default_capacity);
                commands::init(out, &store_for(&file)?, capacity, force)
            }
            Commands::Add { url, title, file } => {
                commands::add(out, &store_for(&file)?, default_capacity, &url, &title)
            }
            Commands::Remove { number, include_read, file } => {
                commands::remove(out, &store_for(&file)?, default_capacity, number, include_read)
            }
            Commands::Read { number, include_read, mark, file } => commands::read(
                out,
                &store_for(&file)?,
                default_capacity,
                opener,
                number,
                include_read,
                mark,
            ),
            Commands::MarkRead { number, include_read, file } => {
                commands::mark_read(out, &store_for(&file)?, default_capacity, number, include_read)
            }
            Commands::List { file, show_ids, format, no_header, include_read, read } => {
                let options = commands::list_options(show_ids, no_header, include_read, read);
                commands::list(out, &store_for(&file)?, default_capacity, format, options)
            }
            Commands::Capacity { value, file } => {
                commands::set_capacity(out, &store_for(&file)?, default_capacity, value)
            }
            Commands::Clear { file } => commands::clear(out, &store_for(&file)?, default_capacity),
            Commands::Completions { shell } => commands::generate_completions(out, shell),
        }
    }
}
