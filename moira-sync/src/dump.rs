//! Dump remote state into a directory tree.
//!
//! ```text
//! {dir}/tags/tags.yml
//! {dir}/triggers/{name}.yml
//! {dir}/users/{login}.yml
//! ```
//!
//! Everything is fetched before the first directory is touched, so a failed
//! fetch leaves `dir` exactly as it was.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use moira_api::{MoiraClient, Transport};
use moira_core::{Document, TagCollection, Trigger, UserSettings};

use crate::error::SyncError;
use crate::writer::{atomic_write, recreate_dir};

/// Output category; each gets its own subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Tags,
    Triggers,
    Users,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[Category::Tags, Category::Triggers, Category::Users]
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Tags => "tags",
            Category::Triggers => "triggers",
            Category::Users => "users",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One file written by a dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub category: Category,
    /// Trigger name or user login; `tags` for the tag file.
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpSummary {
    pub files: Vec<SavedFile>,
    /// Number of tags in `tags.yml`.
    pub tag_count: usize,
}

impl DumpSummary {
    /// Objects saved for `category`. Tags are counted individually.
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Tags => self.tag_count,
            _ => self.files.iter().filter(|f| f.category == category).count(),
        }
    }
}

/// Fetched state, held in memory until everything has been read.
struct Snapshot {
    tags: TagCollection,
    triggers: Vec<Trigger>,
    users: Vec<UserSettings>,
}

/// Fetch tags, triggers and user settings, then write them under `dir`.
///
/// Each category directory is recreated, so files from an earlier dump do
/// not survive.
pub fn dump_to_dir<T: Transport>(
    client: &MoiraClient<T>,
    dir: &Path,
) -> Result<DumpSummary, SyncError> {
    let snapshot = Snapshot {
        tags: client.fetch_tags()?,
        triggers: client.fetch_triggers()?,
        users: client.fetch_user_settings()?,
    };
    tracing::info!(
        tags = snapshot.tags.list.len(),
        triggers = snapshot.triggers.len(),
        users = snapshot.users.len(),
        "remote state fetched"
    );

    let mut summary = DumpSummary {
        tag_count: snapshot.tags.list.len(),
        ..DumpSummary::default()
    };

    for category in Category::all() {
        let out = recreate_dir(dir, category.dir_name())?;
        match category {
            Category::Tags => {
                let path = out.join("tags.yml");
                write_document(&path, Document::Tag(snapshot.tags.clone()))?;
                summary.files.push(SavedFile {
                    category: *category,
                    name: "tags".to_string(),
                    path,
                });
            }
            Category::Triggers => {
                let mut used = HashSet::new();
                for trigger in &snapshot.triggers {
                    let path = out.join(unique_file_name(&trigger.name, &mut used));
                    let mut trigger = trigger.clone();
                    trigger.id = None;
                    let name = trigger.name.clone();
                    write_document(&path, Document::Trigger(trigger))?;
                    summary.files.push(SavedFile {
                        category: *category,
                        name,
                        path,
                    });
                }
            }
            Category::Users => {
                let mut used = HashSet::new();
                for user in &snapshot.users {
                    let path = out.join(unique_file_name(&user.login, &mut used));
                    write_document(&path, Document::User(user.clone()))?;
                    summary.files.push(SavedFile {
                        category: *category,
                        name: user.login.clone(),
                        path,
                    });
                }
            }
        }
    }
    Ok(summary)
}

fn write_document(path: &Path, document: Document) -> Result<(), SyncError> {
    let yaml = document.to_yaml()?;
    atomic_write(path, &yaml)?;
    tracing::info!(kind = %document.kind(), "saved {}", path.display());
    Ok(())
}

/// `{name}.yml`, with spaces and path separators replaced by `_`.
pub fn file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    format!("{stem}.yml")
}

/// [`file_name`], suffixed `_2`, `_3`, ... when an earlier object in the same
/// category already took that name.
fn unique_file_name(name: &str, used: &mut HashSet<String>) -> String {
    let base = file_name(name);
    if used.insert(base.clone()) {
        return base;
    }
    let stem = base.trim_end_matches(".yml");
    let mut n = 2;
    loop {
        let candidate = format!("{stem}_{n}.yml");
        if used.insert(candidate.clone()) {
            tracing::warn!(
                object = name,
                "file name {base} already used in this dump, saving as {candidate}"
            );
            return candidate;
        }
        n += 1;
    }
}
