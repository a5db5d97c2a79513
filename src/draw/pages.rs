use crate::draw::snapshot::Snapshot;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const SAVED_PAGES_KEY: &str = "savedPages";
pub const PAGE_NAMES_KEY: &str = "pageNames";

/// Durable key/value store for JSON-encoded page state.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(anyhow!("invalid storage key {key:?}"));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .with_context(|| format!("read storage file {}", path.display()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create storage folder {}", self.dir.display()))?;
        std::fs::write(&path, value)
            .with_context(|| format!("write storage file {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub name: String,
    pub snapshot: Snapshot,
}

pub fn default_page_name(index: usize) -> String {
    format!("Page {}", index + 1)
}

/// Ordered pages persisted as two parallel JSON lists.
///
/// `current` is always a valid index into `pages`, or zero when there are
/// no pages.
#[derive(Debug)]
pub struct PageStore<S> {
    storage: S,
    pages: Vec<Page>,
    current: usize,
}

impl<S: Storage> PageStore<S> {
    /// Reads the persisted lists. Absent or malformed data means no pages.
    pub fn load(storage: S) -> Self {
        let snapshots: Vec<Snapshot> = read_list(&storage, SAVED_PAGES_KEY);
        let mut names: Vec<String> = read_list(&storage, PAGE_NAMES_KEY);
        names.resize_with(snapshots.len().max(names.len()), String::new);

        let pages = snapshots
            .into_iter()
            .zip(names)
            .enumerate()
            .map(|(index, (snapshot, name))| Page {
                name: if name.trim().is_empty() {
                    default_page_name(index)
                } else {
                    name
                },
                snapshot,
            })
            .collect::<Vec<_>>();

        tracing::debug!(pages = pages.len(), "loaded persisted pages");
        Self {
            storage,
            pages,
            current: 0,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.pages.get(self.current)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Overwrites the snapshot of the current page, creating the first page
    /// when the store is empty, then persists both lists. If persisting
    /// fails the in-memory pages are left as they were.
    pub fn set_current_page(&mut self, snapshot: Snapshot) -> Result<()> {
        let current = self.current;
        let previous = match self.pages.get_mut(current) {
            Some(page) => Some(std::mem::replace(&mut page.snapshot, snapshot)),
            None => {
                self.pages.push(Page {
                    name: default_page_name(self.pages.len()),
                    snapshot,
                });
                self.current = self.pages.len() - 1;
                None
            }
        };

        if let Err(err) = self.persist() {
            match previous {
                Some(old) => {
                    if let Some(page) = self.pages.get_mut(current) {
                        page.snapshot = old;
                    }
                }
                None => {
                    self.pages.pop();
                    self.current = current;
                }
            }
            return Err(err);
        }
        Ok(())
    }

    pub fn add_page(&mut self, name: Option<String>, snapshot: Snapshot) -> Result<usize> {
        let index = self.pages.len();
        let name = name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| default_page_name(index));
        self.pages.push(Page { name, snapshot });
        self.current = index;
        self.persist()?;
        Ok(index)
    }

    pub fn select_page(&mut self, index: usize) -> Option<&Page> {
        if index >= self.pages.len() {
            return None;
        }
        self.current = index;
        self.pages.get(index)
    }

    pub fn rename_page(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        let page = self
            .pages
            .get_mut(index)
            .ok_or_else(|| anyhow!("no page at index {index}"))?;
        page.name = name.into();
        self.persist()
    }

    pub fn remove_page(&mut self, index: usize) -> Result<Page> {
        if index >= self.pages.len() {
            return Err(anyhow!("no page at index {index}"));
        }
        let removed = self.pages.remove(index);
        if self.current > index || self.current >= self.pages.len() {
            self.current = self.current.saturating_sub(1);
        }
        self.persist()?;
        Ok(removed)
    }

    pub fn persist(&mut self) -> Result<()> {
        let snapshots: Vec<&Snapshot> = self.pages.iter().map(|page| &page.snapshot).collect();
        let names: Vec<&str> = self.pages.iter().map(|page| page.name.as_str()).collect();
        let snapshots_json =
            serde_json::to_string(&snapshots).context("serialize saved pages")?;
        let names_json = serde_json::to_string(&names).context("serialize page names")?;
        self.storage.set(SAVED_PAGES_KEY, &snapshots_json)?;
        self.storage.set(PAGE_NAMES_KEY, &names_json)?;
        Ok(())
    }
}

fn read_list<S: Storage, T: serde::de::DeserializeOwned>(storage: &S, key: &str) -> Vec<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(?err, key, "failed to read persisted page state");
            return Vec::new();
        }
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        tracing::warn!(%err, key, "ignoring malformed persisted page state");
        Vec::new()
    })
}
