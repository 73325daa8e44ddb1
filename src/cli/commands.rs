use std::io::Write;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, info, warn};

use crate::browser::UrlOpener;
use crate::cli::Cli;
use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use crate::reading_list::{ReadingList, View};
use crate::render::{render_links, OutputFormat, RenderOptions};
use crate::storage::ListStore;

/// Shown when no subcommand is given
pub fn banner<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "bejw: A capped reading list for links that shimmer")?;
    writeln!(out, "Run with --help to see commands and options.")?;
    Ok(())
}

/// Write a fresh, empty reading list
pub fn init<W: Write>(out: &mut W, store: &ListStore, capacity: usize, force: bool) -> Result<()> {
    info!("Initializing reading list at {}", store.path().display());

    if store.exists() {
        if !force {
            return Err(Error::AlreadyExists(format!(
                "Reading list already exists at {}. Use --force to overwrite it.",
                store.path().display()
            )));
        }
        warn!("Overwriting existing reading list: {}", store.path().display());
    }

    store.save(&ReadingList::new(capacity))?;
    writeln!(
        out,
        "Initialized reading list at {} with capacity {}",
        store.path().display(),
        capacity
    )?;
    Ok(())
}

/// Add a link and report its number among unread links
pub fn add<W: Write>(
    out: &mut W,
    store: &ListStore,
    default_capacity: usize,
    url: &str,
    title: &str,
) -> Result<()> {
    let mut list = store.load_or(default_capacity)?;
    let link = list.add_link(url, title)?;
    store.save(&list)?;

    match list.number_of(&link.id, View::Unread) {
        Some(number) => writeln!(out, "Added #{}", number)?,
        None => writeln!(out, "Added {}", link.id)?,
    }
    Ok(())
}

pub fn remove<W: Write>(
    out: &mut W,
    store: &ListStore,
    default_capacity: usize,
    number: i64,
    include_read: bool,
) -> Result<()> {
    let mut list = store.load_or(default_capacity)?;
    let title = list
        .find_by_number(number, View::from_include_read(include_read))
        .map(|link| link.title.clone())
        .ok_or(Error::LinkNotFound)?;

    if !list.remove_by_number(number, include_read) {
        return Err(Error::LinkNotFound);
    }
    store.save(&list)?;
    writeln!(out, "Removed #{}: {}", number, title)?;
    Ok(())
}

/// Open a link in the browser, optionally marking it read
pub fn read<W: Write>(
    out: &mut W,
    store: &ListStore,
    default_capacity: usize,
    opener: &dyn UrlOpener,
    number: i64,
    include_read: bool,
    mark: bool,
) -> Result<()> {
    let mut list = store.load_or(default_capacity)?;
    let (id, url) = list
        .find_by_number(number, View::from_include_read(include_read))
        .map(|link| (link.id.clone(), link.url.clone()))
        .ok_or(Error::LinkNotFound)?;

    opener.open(&url)?;

    if mark {
        list.mark_read(&id);
        store.save(&list)?;
    }

    writeln!(out, "Opened #{}: {}", number, url)?;
    Ok(())
}

pub fn mark_read<W: Write>(
    out: &mut W,
    store: &ListStore,
    default_capacity: usize,
    number: i64,
    include_read: bool,
) -> Result<()> {
    let mut list = store.load_or(default_capacity)?;
    if !list.mark_read_by_number(number, include_read) {
        return Err(Error::LinkNotFound);
    }
    store.save(&list)?;
    writeln!(out, "Marked #{} as read.", number)?;
    Ok(())
}

pub fn list_options(
    show_ids: bool,
    no_header: bool,
    include_read: bool,
    read_only: bool,
) -> RenderOptions {
    let view = if read_only {
        View::Read
    } else {
        View::from_include_read(include_read)
    };
    RenderOptions {
        view,
        show_ids,
        include_header: !no_header,
    }
}

/// Display the reading list
pub fn list<W: Write>(
    out: &mut W,
    store: &ListStore,
    default_capacity: usize,
    format: OutputFormat,
    options: RenderOptions,
) -> Result<()> {
    let list = store.load_or(default_capacity)?;
    debug!("Rendering {:?} view as {:?}", options.view, format);
    render_links(out, &list, format, options)
}

pub fn set_capacity<W: Write>(
    out: &mut W,
    store: &ListStore,
    default_capacity: usize,
    value: usize,
) -> Result<()> {
    let mut list = store.load_or(default_capacity)?;
    if value < list.len() {
        warn!(
            "Capacity {} is below the {} stored links; adding is blocked until some are removed",
            value,
            list.len()
        );
    }
    list.set_capacity(value);
    store.save(&list)?;
    writeln!(out, "Capacity set to {}", value)?;
    Ok(())
}

pub fn clear<W: Write>(out: &mut W, store: &ListStore, default_capacity: usize) -> Result<()> {
    let mut list = store.load_or(default_capacity)?;
    list.clear_links();
    store.save(&list)?;
    writeln!(out, "Reading list cleared")?;
    Ok(())
}

/// Generate shell completions
pub fn generate_completions<W: Write>(out: &mut W, shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let cmd_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, cmd_name, out);
    Ok(())
}

/// Initialize logging based on verbosity flags and the configured level.
/// Logs go to stderr so stdout stays parseable.
pub fn init_logging(debug: bool, verbose: bool, logging: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug)
        .with_writer(std::io::stderr);

    let installed = if logging.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_ok() {
        debug!("Logging initialized");
    }
}
