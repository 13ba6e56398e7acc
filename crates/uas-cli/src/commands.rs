//! Subcommand implementations.
//!
//! Each command returns the report to print, or a message for stderr.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use uas_core::{keys, ChangeTracked, Entry, IconPresenter, KeyValueStore, Options};
use uas_format::{parse_entries, serialize_entries, ListStats};

/// Read the list used in place of the bundled defaults, if one was given.
pub fn read_defaults(path: Option<&Path>) -> Result<Option<String>, String> {
    path.map(|p| {
        fs::read_to_string(p).map_err(|e| format!("Failed to read '{}': {}", p.display(), e))
    })
    .transpose()
}

pub fn cmd_check(input: &Path, verbose: bool) -> Result<String, String> {
    let content = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input.display(), e))?;
    let entries = parse_entries(&content);
    let stats = ListStats::from_entries(&entries);

    let mut out = String::new();
    let _ = writeln!(out, "List '{}'", input.display());
    let _ = writeln!(out, "  Lines:     {}", stats.lines);
    let _ = writeln!(out, "  Overrides: {}", stats.overrides);
    let _ = writeln!(out, "  Comments:  {}", stats.comments);
    let _ = writeln!(out, "  Empty:     {}", stats.empty);
    let _ = writeln!(out, "  Invalid:   {}", stats.invalid());

    if verbose {
        for (label, value) in uas_format::overrides(&entries) {
            let _ = writeln!(out, "    {label} => {value}");
        }
    }

    if stats.invalid() > 0 {
        let lines: Vec<String> = stats.invalid_lines.iter().map(usize::to_string).collect();
        return Err(format!("{out}Invalid lines: {}", lines.join(", ")));
    }
    Ok(out)
}

/// Rewrite a list in canonical form. Without `output` the text is returned.
///
/// A trailing newline in the input parses as an empty entry, so it survives.
pub fn cmd_format(input: &Path, output: Option<&Path>) -> Result<String, String> {
    let content = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input.display(), e))?;
    let text = serialize_entries(&parse_entries(&content));

    match output {
        Some(path) => {
            fs::write(path, &text).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
            Ok(format!("Formatted '{}' to '{}'\n", input.display(), path.display()))
        }
        None => Ok(text),
    }
}

/// Load the state, refresh the list unless it was edited, and write it back.
pub async fn cmd_init<S>(store: &S, default_text: &str) -> Result<String, String>
where
    S: KeyValueStore + ?Sized,
{
    let options = Options::bootstrap(store, default_text)
        .await
        .map_err(|e| format!("Failed to initialize state: {}", e))?;

    info!("state initialized with {} entries", options.entries().len());
    let source = if options.available_changed { "edited" } else { "defaults" };
    Ok(format!(
        "Initialized: {} entries ({}), {} domain overrides\n",
        options.entries().len(),
        source,
        options.domains.len()
    ))
}

/// One line per URL. A URL without a host gets no override and does not
/// stop the rest of the batch.
pub async fn cmd_resolve<S>(store: &S, urls: &[String]) -> Result<String, String>
where
    S: KeyValueStore + ?Sized,
{
    let options = load_options(store).await?;
    let mut out = String::new();

    for url in urls {
        let shown = match options.resolve(url) {
            Ok(Some(value)) => value,
            Ok(None) => "(default)".to_string(),
            Err(e) => {
                warn!("{e}");
                "(no override)".to_string()
            }
        };
        let _ = writeln!(out, "{url}\t{shown}");
    }
    Ok(out)
}

pub async fn cmd_status<S>(store: &S) -> Result<String, String>
where
    S: KeyValueStore + ?Sized,
{
    let options = load_options(store).await?;
    let state = IconPresenter::default().for_options(&options);

    let mut out = String::new();
    let _ = writeln!(out, "{}", state.title);
    let _ = writeln!(out, "  Icon:       {}", state.icon_path);
    let _ = writeln!(out, "  Badge:      {}", state.badge);
    let _ = writeln!(out, "  Current:    {}", options.current.as_deref().unwrap_or("(none)"));
    let _ = writeln!(out, "  Processing: {}", uas_core::processing_enabled(&options));
    let _ = writeln!(out, "  Entries:    {}", options.entries().len());
    let _ = writeln!(out, "  Edited:     {}", options.available_changed);
    let _ = writeln!(out, "  Edit mode:  {}", options.edit_mode.as_str());
    for (domain, value) in &options.domains {
        let _ = writeln!(out, "  {domain} => {value}");
    }
    Ok(out)
}

/// Select by label, falling back to treating `target` as a raw string.
pub async fn cmd_select<S>(store: &S, target: &str, raw: bool) -> Result<String, String>
where
    S: KeyValueStore + ?Sized,
{
    let mut options = load_options(store).await?;

    let record = if raw {
        options.select(target)
    } else {
        options
            .select_label(target)
            .ok_or_else(|| format!("No entry labelled '{}'", target))?
    };
    persist(store, record).await?;

    let badge = uas_core::badge_text(options.entries(), options.current.as_deref());
    Ok(format!("Selected '{}' [{}]\n", target, badge))
}

pub async fn cmd_disable<S>(store: &S) -> Result<String, String>
where
    S: KeyValueStore + ?Sized,
{
    let mut options = load_options(store).await?;
    let record = options.disable();
    persist(store, record).await?;
    Ok("Override disabled\n".to_string())
}

pub async fn cmd_domain_add<S>(store: &S, domain: &str) -> Result<String, String>
where
    S: KeyValueStore + ?Sized,
{
    let mut options = load_options(store).await?;
    let record = options
        .assign_domain(domain)
        .ok_or_else(|| "Select an override before assigning a domain".to_string())?;
    persist(store, record).await?;
    Ok(format!("Assigned current override to '{}'\n", domain.trim().to_lowercase()))
}

pub async fn cmd_domain_remove<S>(store: &S, domain: &str) -> Result<String, String>
where
    S: KeyValueStore + ?Sized,
{
    let mut options = load_options(store).await?;
    let record = options
        .remove_domain(domain)
        .ok_or_else(|| format!("No override for '{}'", domain))?;
    persist(store, record).await?;
    Ok(format!("Removed override for '{}'\n", domain.trim().to_lowercase()))
}

/// Replace the stored list with the contents of a text file.
pub async fn cmd_edit<S>(store: &S, input: &Path) -> Result<String, String>
where
    S: KeyValueStore + ?Sized,
{
    let content = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input.display(), e))?;

    let mut list = load_list(store).await?;
    list.replace_from_text(&content);
    let changed = list.changed();
    list.store(store)
        .await
        .map_err(|e| format!("Failed to store list: {}", e))?;

    debug!("edit changed={changed} persisted={}", list.persisted_changed());
    Ok(format!(
        "Stored {} entries ({})\n",
        list.len(),
        if changed { "changed" } else { "unchanged" }
    ))
}

pub async fn cmd_export<S>(store: &S, output: Option<&Path>) -> Result<String, String>
where
    S: KeyValueStore + ?Sized,
{
    let list = load_list(store).await?;
    let text = list.to_text();

    match output {
        Some(path) => {
            fs::write(path, &text).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
            Ok(format!("Exported {} entries to '{}'\n", list.len(), path.display()))
        }
        None => Ok(text),
    }
}

pub async fn cmd_reset<S>(store: &S, default_text: &str) -> Result<String, String>
where
    S: KeyValueStore + ?Sized,
{
    let mut list = load_list(store).await?;
    let undo = list
        .reset_to_defaults(store, default_text)
        .await
        .map_err(|e| format!("Failed to reset list: {}", e))?;

    Ok(format!(
        "Reset to {} default entries ({} previous entries discarded)\n",
        list.len(),
        undo.previous().len()
    ))
}

async fn load_options<S>(store: &S) -> Result<Options, String>
where
    S: KeyValueStore + ?Sized,
{
    Options::load(store)
        .await
        .map_err(|e| format!("Failed to load state: {}", e))
}

async fn load_list<S>(store: &S) -> Result<ChangeTracked<Entry>, String>
where
    S: KeyValueStore + ?Sized,
{
    ChangeTracked::load(store, keys::AVAILABLE, keys::AVAILABLE_CHANGED)
        .await
        .map_err(|e| format!("Failed to load list: {}", e))
}

async fn persist<S>(store: &S, record: uas_core::StoreRecord) -> Result<(), String>
where
    S: KeyValueStore + ?Sized,
{
    store
        .set(record)
        .await
        .map_err(|e| format!("Failed to store state: {}", e))
}
