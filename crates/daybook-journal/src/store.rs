//! Directory-backed journal store.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use pulldown_cmark::{html, Options, Parser};
use tracing::{debug, info, warn};

use crate::entry::{self, EntrySummary};
use crate::error::{JournalError, JournalResult};

/// Journal entries as `*.md` files in one directory.
pub struct JournalStore {
    dir: PathBuf,
}

impl JournalStore {
    /// Open the store at `dir`, creating the directory if needed.
    pub fn new<P: Into<PathBuf>>(dir: P) -> JournalResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve `filename` inside the store, rejecting anything that could leave it.
    fn entry_path(&self, filename: &str) -> JournalResult<PathBuf> {
        let escapes = filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..");
        if escapes {
            return Err(JournalError::invalid_filename(filename));
        }
        Ok(self.dir.join(filename))
    }

    fn read_existing(&self, filename: &str) -> JournalResult<String> {
        let path = self.entry_path(filename)?;
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => JournalError::not_found(filename),
            _ => JournalError::Io(e),
        })
    }

    /// Every entry, newest filename first.
    pub fn list_entries(&self) -> JournalResult<Vec<EntrySummary>> {
        let mut entries = Vec::new();

        for dir_entry in fs::read_dir(&self.dir)? {
            let dir_entry = dir_entry?;
            let filename = match dir_entry.file_name().into_string() {
                Ok(name) if name.ends_with(".md") => name,
                Ok(_) => continue,
                Err(name) => {
                    warn!("Skipping non UTF-8 journal file {:?}", name);
                    continue;
                }
            };
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let content = fs::read_to_string(dir_entry.path())?;
            entries.push(EntrySummary::from_content(&filename, &content));
        }

        entries.sort_by(|a, b| b.filename.cmp(&a.filename));
        debug!("Listed {} journal entries", entries.len());
        Ok(entries)
    }

    /// Raw markdown of an entry.
    pub fn read_entry(&self, filename: &str) -> JournalResult<String> {
        self.read_existing(filename)
    }

    /// Entry rendered to HTML for the editor.
    pub fn render_entry(&self, filename: &str) -> JournalResult<String> {
        let markdown = self.read_existing(filename)?;
        Ok(render_markdown(&markdown))
    }

    /// Create an empty entry stamped with the local time.
    pub fn create_entry(&self) -> JournalResult<EntrySummary> {
        let filename = entry::new_entry_filename(Local::now().naive_local());
        let path = self.entry_path(&filename)?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(entry::new_entry_content().as_bytes())?;

        info!("Created journal entry {}", filename);
        Ok(EntrySummary {
            date: entry::entry_date(&filename),
            title: entry::NEW_ENTRY_TITLE.to_string(),
            preview: String::new(),
            filename,
        })
    }

    /// Replace an entry's content, normalizing the title/body layout.
    pub fn update_entry(&self, filename: &str, content: &str) -> JournalResult<()> {
        let path = self.entry_path(filename)?;
        if !path.is_file() {
            return Err(JournalError::not_found(filename));
        }
        if content.is_empty() {
            return Err(JournalError::EmptyContent);
        }

        fs::write(&path, entry::compose_update(content))?;
        info!("Updated journal entry {}", filename);
        Ok(())
    }
}

/// CommonMark with tables, strikethrough and task lists.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_output, parser);
    html_output
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn store() -> (tempfile::TempDir, JournalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JournalStore::new(dir.path().join("data")).unwrap();
        (dir, store)
    }

    fn write(store: &JournalStore, filename: &str, content: &str) {
        fs::write(store.dir().join(filename), content).unwrap();
    }

    #[test]
    fn test_list_sorted_newest_first() {
        let (_dir, store) = store();
        write(&store, "2024-05-01-090000-entry.md", "# First\nhello");
        write(&store, "2024-05-03-090000-entry.md", "# Third\n");
        write(&store, "2024-05-02-090000-entry.md", "# Second\nworld");
        write(&store, "notes.txt", "ignored");
        fs::create_dir(store.dir().join("folder.md")).unwrap();

        let entries = store.list_entries().unwrap();
        let titles = entries.iter().map(|e| e.title.as_str()).collect::<Vec<_>>();

        assert_eq!(titles, vec!["Third", "Second", "First"]);
        assert_eq!(entries[1].preview, "world");
        assert_eq!(entries[2].date, "2024-05-01");
    }

    #[test]
    fn test_render_entry_to_html() {
        let (_dir, store) = store();
        write(&store, "2024-05-01-090000-entry.md", "# Title\n\nSome *emphasis*.");

        let html = store.render_entry("2024-05-01-090000-entry.md").unwrap();
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn test_render_missing_entry() {
        let (_dir, store) = store();
        let result = store.render_entry("2024-01-01-000000-entry.md");
        assert!(matches!(result, Err(JournalError::NotFound(_))));
    }

    #[test]
    fn test_traversal_is_rejected() {
        let (_dir, store) = store();
        for name in ["../secret.md", "a/b.md", "..", ""] {
            assert!(matches!(
                store.read_entry(name),
                Err(JournalError::InvalidFilename(_))
            ));
        }
    }

    #[test]
    fn test_create_entry() {
        let (_dir, store) = store();

        let summary = store.create_entry().unwrap();

        assert!(summary.filename.ends_with("-entry.md"));
        assert_eq!(summary.title, entry::NEW_ENTRY_TITLE);
        assert_eq!(summary.date.len(), "YYYY-MM-DD".len());
        assert_eq!(
            store.read_entry(&summary.filename).unwrap(),
            "# Today, ...\n\n"
        );
        assert_eq!(store.list_entries().unwrap()[0].title, "Today, ...");
    }

    #[test]
    fn test_update_entry() {
        let (_dir, store) = store();
        write(&store, "2024-05-01-090000-entry.md", "# Today, ...\n\n");

        store
            .update_entry("2024-05-01-090000-entry.md", "# Run\nfive km")
            .unwrap();

        assert_eq!(
            store.read_entry("2024-05-01-090000-entry.md").unwrap(),
            "# Run\n\nfive km"
        );
    }

    #[test]
    fn test_update_missing_entry() {
        let (_dir, store) = store();
        let result = store.update_entry("2024-05-01-090000-entry.md", "# x");
        assert!(matches!(result, Err(JournalError::NotFound(_))));
    }

    #[test]
    fn test_update_with_empty_content() {
        let (_dir, store) = store();
        write(&store, "2024-05-01-090000-entry.md", "# Keep\n");

        let result = store.update_entry("2024-05-01-090000-entry.md", "");
        assert!(matches!(result, Err(JournalError::EmptyContent)));
        assert_eq!(
            store.read_entry("2024-05-01-090000-entry.md").unwrap(),
            "# Keep\n"
        );
    }

    #[test]
    fn test_render_markdown_task_list() {
        let html = render_markdown("- [x] done\n- [ ] todo");
        assert!(html.contains("checkbox"));
    }
}
