use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

pub mod report;
pub mod sanitizer;

pub use report::{Action, EntryKind, Record, RunReport};
pub use sanitizer::{load_list, Sanitizer};

#[derive(thiserror::Error, Debug)]
pub enum RenamerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("List file error: {message}")]
    ListFile { message: String },
}

pub struct RenameOptions {
    pub dry_run: bool,
    pub excluded_prefixes: Vec<String>,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            excluded_prefixes: vec![".".to_string()],
        }
    }
}

// Run-wide counters, threaded explicitly through the walk.
struct RunState {
    unnamed: u32,
    duplicate: u32,
}

pub fn process_directory(
    target: &Path,
    sanitizer: &Sanitizer,
    options: &RenameOptions,
) -> Result<RunReport> {
    if !target.is_dir() {
        anyhow::bail!("Target does not exist or is not a directory: {:?}", target);
    }

    info!("Starting directory scan: {:?}", target);

    let mut report = RunReport::new();
    let mut state = RunState {
        unnamed: 1,
        duplicate: 1,
    };

    process_directory_recursive(target, sanitizer, options, &mut state, &mut report)?;

    info!(
        "Scan complete: {} files and {} folders processed, {} renamed, {} unchanged, {} failed",
        report.files_processed, report.dirs_processed, report.renamed, report.unchanged,
        report.failed
    );

    Ok(report)
}

fn process_directory_recursive(
    dir: &Path,
    sanitizer: &Sanitizer,
    options: &RenameOptions,
    state: &mut RunState,
    report: &mut RunReport,
) -> Result<()> {
    debug!("Processing directory: {:?}", dir);

    // A subtree that cannot be listed is skipped, not fatal.
    let entries: Vec<_> = match fs::read_dir(dir).and_then(|rd| rd.collect::<Result<Vec<_>, _>>())
    {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Skipping unreadable directory {:?}: {}", dir, e);
            return Ok(());
        }
    };

    // Process files first, while the parent path is still the original one
    for entry in &entries {
        if entry_is_dir(entry) {
            continue;
        }
        if let Some(name) = entry_name(entry, options) {
            process_entry(dir, &name, EntryKind::File, sanitizer, options, state, report)?;
        }
    }

    // Then descend into subdirectories
    for entry in &entries {
        if entry_is_dir(entry) && entry_name(entry, options).is_some() {
            process_directory_recursive(&entry.path(), sanitizer, options, state, report)?;
        }
    }

    // Finally, rename the directories themselves (last, so the paths of
    // everything beneath them were still valid while being processed)
    for entry in &entries {
        if !entry_is_dir(entry) {
            continue;
        }
        if let Some(name) = entry_name(entry, options) {
            process_entry(
                dir,
                &name,
                EntryKind::Directory,
                sanitizer,
                options,
                state,
                report,
            )?;
        }
    }

    Ok(())
}

// Does not follow symlinks; a symlink is handled as a file-kind entry.
fn entry_is_dir(entry: &fs::DirEntry) -> bool {
    entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
}

// Returns the entry name unless it is excluded or not valid UTF-8. Exclusion
// covers the whole subtree: an excluded directory is neither renamed nor
// descended into.
fn entry_name(entry: &fs::DirEntry, options: &RenameOptions) -> Option<String> {
    let file_name = entry.file_name();
    let Some(name) = file_name.to_str() else {
        warn!("Skipping non-UTF-8 entry name: {:?}", file_name);
        return None;
    };
    if options
        .excluded_prefixes
        .iter()
        .any(|prefix| !prefix.is_empty() && name.starts_with(prefix.as_str()))
    {
        debug!("Skipping excluded entry: {}", name);
        return None;
    }
    Some(name.to_string())
}

fn process_entry(
    parent: &Path,
    old_name: &str,
    kind: EntryKind,
    sanitizer: &Sanitizer,
    options: &RenameOptions,
    state: &mut RunState,
    report: &mut RunReport,
) -> Result<()> {
    match kind {
        EntryKind::File => report.files_processed += 1,
        EntryKind::Directory => report.dirs_processed += 1,
    }

    let new_name = sanitizer.sanitize(old_name, &mut state.unnamed);
    if new_name == old_name {
        report.push(Record::now(Action::Unchanged, parent, old_name, old_name, kind));
        return Ok(());
    }

    let old_path = parent.join(old_name);

    // Resolve collisions against existing siblings with the run-wide
    // duplicate counter, retrying until a free name is found.
    let mut final_name = new_name.clone();
    let mut new_path = parent.join(&final_name);
    while new_path.exists() {
        final_name = format!("{}{}", new_name, state.duplicate);
        state.duplicate += 1;
        new_path = parent.join(&final_name);
    }

    if options.dry_run {
        info!("Would rename {}: {:?} -> {:?}", kind, old_path, new_path);
    } else {
        info!("Renaming {}: {:?} -> {:?}", kind, old_path, new_path);
        if let Err(e) = fs::rename(&old_path, &new_path) {
            // Recoverable: record the failure and keep going with the rest
            // of the run.
            error!("Rename failed for {:?}: {}", old_path, e);
            report.push(Record::now(Action::Failed, parent, old_name, &final_name, kind));
            return Ok(());
        }
    }

    report.push(Record::now(Action::Renamed, parent, old_name, &final_name, kind));
    Ok(())
}
