use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::warn;

use crate::language::Language;
use crate::lines::LineSource;

/// Resource holding the ordered key list, one key per row.
pub const KEYS_FILE: &str = "_keys";
/// Resource holding the language registry, one file name per locale line.
pub const NAMES_FILE: &str = "_lng_names";

/// Key of the reserved row 0: a language's display name.
pub const NAME_KEY: &str = "lng_name";
/// Key of the reserved row 1: a language's error message.
pub const ERROR_KEY: &str = "lng_error";

/// Sentinel replacing real line breaks in saved rows.
const LINE_BREAK_TOKEN: &str = "<line_break>";

/// Normalize raw user input into key form: trimmed, lower-case,
/// whitespace as underscores.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

fn escape(value: &str) -> String {
    value
        .replace("\r\n", LINE_BREAK_TOKEN)
        .replace('\n', LINE_BREAK_TOKEN)
        .trim()
        .to_string()
}

fn unescape(saved: &str) -> String {
    saved.trim().replace(LINE_BREAK_TOKEN, "\n")
}

/// A set of parallel line-indexed tables: the key file is the spine, and
/// every registered language file is row-aligned to it. The store owns the
/// lazy caches over one `LineSource` and keeps all files consistent under
/// key insert, rename, and delete.
///
/// Single-threaded by design: one active writer, whole-file rewrites,
/// caches invalidated eagerly after every mutation.
pub struct LngStore {
    source: Box<dyn LineSource>,
    keys: Option<Vec<String>>,
    tables: Option<BTreeMap<Language, Vec<String>>>,
    registry: Option<BTreeMap<Language, String>>,
    current: Language,
    listeners: Vec<Box<dyn Fn(Language)>>,
    write_hook: Option<Box<dyn Fn()>>,
}

impl LngStore {
    pub fn new(source: impl LineSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            keys: None,
            tables: None,
            registry: None,
            current: Language::English,
            listeners: Vec::new(),
            write_hook: None,
        }
    }

    // ---- caches ----

    fn keys_cached(&mut self) -> Result<&[String]> {
        if self.keys.is_none() {
            self.keys = Some(self.source.read_lines(KEYS_FILE, false)?);
        }
        Ok(self.keys.as_deref().unwrap())
    }

    fn registry_cached(&mut self) -> Result<&BTreeMap<Language, String>> {
        if self.registry.is_none() {
            self.load_registry()?;
        }
        Ok(self.registry.as_ref().unwrap())
    }

    fn load_registry(&mut self) -> Result<()> {
        let lines = self.source.read_lines(NAMES_FILE, true)?;
        let mut registry = BTreeMap::new();
        for (index, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match Language::from_index(index) {
                Some(language) => {
                    registry.insert(language, line.trim().to_string());
                }
                None => warn!("registry line {index} does not name a known language, ignored"),
            }
        }

        if !registry.contains_key(&self.current) {
            if let Some(&language) = registry.keys().next() {
                self.current = language;
            }
        }

        self.registry = Some(registry);
        Ok(())
    }

    fn tables_cached(&mut self) -> Result<&BTreeMap<Language, Vec<String>>> {
        if self.tables.is_none() {
            self.load_tables()?;
        }
        Ok(self.tables.as_ref().unwrap())
    }

    fn load_tables(&mut self) -> Result<()> {
        let registry = self.registry_cached()?.clone();
        let mut tables = BTreeMap::new();
        for (language, file) in registry {
            let rows = self
                .source
                .read_lines(&file, false)
                .with_context(|| format!("failed to load the {language} table"))?;
            tables.insert(language, rows);
        }
        self.tables = Some(tables);
        Ok(())
    }

    /// Drop every cache; the next access reloads from the line source.
    pub fn refresh(&mut self) {
        self.keys = None;
        self.tables = None;
        self.registry = None;
    }

    fn notify_written(&self) {
        if let Some(hook) = &self.write_hook {
            hook();
        }
    }

    // ---- key table ----

    /// All keys in row order.
    pub fn keys(&mut self) -> Result<Vec<String>> {
        Ok(self.keys_cached()?.to_vec())
    }

    /// Row index of `key` (trimmed equality), or `None` when absent.
    pub fn index_of(&mut self, key: &str) -> Result<Option<usize>> {
        let key = key.trim().to_string();
        Ok(self.keys_cached()?.iter().position(|k| k.trim() == key))
    }

    pub fn contains_key(&mut self, key: &str) -> Result<bool> {
        Ok(self.index_of(key)?.is_some())
    }

    /// Append `raw` (normalized) as a new key row, and an empty row to
    /// every language table so row alignment holds. Returns `false`
    /// without touching any file when the key already exists.
    pub fn add_key(&mut self, raw: &str) -> Result<bool> {
        let key = normalize_key(raw);
        if key.is_empty() || self.contains_key(&key)? {
            return Ok(false);
        }

        // The trailing element is the empty placeholder row left by the
        // last write; the new key takes it, and the terminating newline of
        // the rewrite opens the next placeholder.
        let mut lines = self.source.read_lines(KEYS_FILE, true)?;
        match lines.last_mut() {
            Some(last) => *last = key,
            None => lines.push(key),
        }
        self.source.write_lines(KEYS_FILE, &lines)?;
        self.keys = None;

        for (language, file) in self.registry_cached()?.clone() {
            let rows = self.source.read_lines(&file, true)?;
            self.source
                .write_lines(&file, &rows)
                .with_context(|| format!("failed to grow the {language} table"))?;
        }
        self.tables = None;

        self.notify_written();
        Ok(true)
    }

    /// Delete a key's row from the key table and the same row from every
    /// language table. The two reserved keys cannot be removed.
    pub fn remove_key(&mut self, key: &str) -> Result<bool> {
        let key = normalize_key(key);
        if key == NAME_KEY || key == ERROR_KEY {
            warn!("the \"{key}\" key is reserved and cannot be removed");
            return Ok(false);
        }
        let Some(index) = self.index_of(&key)? else {
            return Ok(false);
        };

        let keys = self.keys_cached()?.to_vec();
        let languages: Vec<(Language, String)> =
            self.registry_cached()?.clone().into_iter().collect();

        // Snapshot the surviving rows of every table before any file
        // changes; the caches still hold the pre-removal row alignment.
        let mut rewrites: Vec<(String, Vec<String>)> = Vec::with_capacity(languages.len());
        for (language, file) in &languages {
            let mut rows = Vec::with_capacity(keys.len().saturating_sub(1));
            for (i, k) in keys.iter().enumerate() {
                if i != index {
                    rows.push(self.raw_value(k, *language)?);
                }
            }
            rewrites.push((file.clone(), rows));
        }

        let remaining: Vec<String> = keys
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, k)| k)
            .collect();
        self.source.write_lines(KEYS_FILE, &remaining)?;
        for (file, rows) in &rewrites {
            self.source.write_lines(file, rows)?;
        }

        self.notify_written();
        self.refresh();
        Ok(true)
    }

    /// Rewrite the key table substituting the first exact (trimmed) match
    /// of `old` with `new`. Language rows are untouched: the row index is
    /// the join key, so values stay attached to the renamed row. No match
    /// means a pure rewrite with no content change.
    pub fn rename_key(&mut self, old: &str, new: &str) -> Result<()> {
        let old = old.trim().to_string();
        let new = new.trim().to_string();

        let mut replaced = false;
        let rows: Vec<String> = self
            .keys_cached()?
            .iter()
            .map(|key| {
                let key = key.trim();
                if !replaced && key == old {
                    replaced = true;
                    new.clone()
                } else {
                    key.to_string()
                }
            })
            .collect();
        self.source.write_lines(KEYS_FILE, &rows)?;

        self.notify_written();
        self.refresh();
        Ok(())
    }

    // ---- language tables ----

    /// Escaped on-disk form of `key`'s row, or "" when absent. Used to
    /// re-emit surviving rows around destructive key operations.
    pub fn raw_value(&mut self, key: &str, language: Language) -> Result<String> {
        Ok(escape(&self.get_for(key, language, false)?))
    }

    /// Write `value` into `key`'s row of one language table. A value equal
    /// to the currently resolved one is not rewritten; other languages are
    /// untouched.
    pub fn set_value(&mut self, key: &str, value: &str, language: Language) -> Result<()> {
        if self.get_for(key, language, true)? == value {
            return Ok(());
        }
        let Some(file) = self.registry_cached()?.get(&language).cloned() else {
            warn!("{language} is not registered, value not written");
            return Ok(());
        };
        let Some(index) = self.index_of(key)? else {
            warn!("unknown key \"{key}\", value not written");
            return Ok(());
        };

        let saved = escape(value);
        let mut rows = self.source.read_lines(&file, false)?;
        if let Some(row) = rows.get_mut(index) {
            *row = saved;
        }
        self.source.write_lines(&file, &rows)?;
        self.tables = None;

        self.notify_written();
        Ok(())
    }

    /// Register `language` with a fresh table file: display name at row 0,
    /// error message at row 1, one blank row per remaining key. Returns
    /// `false` when the language or the file name is already taken.
    pub fn create_language(
        &mut self,
        language: Language,
        file_name: &str,
        display_name: &str,
        error_message: &str,
    ) -> Result<bool> {
        let file_name = file_name.trim().replace(' ', "_");
        let display_name = if display_name.trim().is_empty() {
            language.english_name().to_string()
        } else {
            display_name.trim().to_string()
        };
        let error_message = if error_message.trim().is_empty() {
            format!("Localization Error ({display_name})")
        } else {
            error_message.trim().to_string()
        };

        let registry = self.registry_cached()?;
        if registry.contains_key(&language) || registry.values().any(|f| *f == file_name) {
            return Ok(false);
        }

        let key_count = self.keys_cached()?.len();
        let mut rows = vec![display_name, error_message];
        rows.resize(key_count.max(2), String::new());
        self.source.write_lines(&file_name, &rows)?;

        self.write_registry_slot(language, &file_name)?;

        self.registry = None;
        self.tables = None;
        self.notify_written();
        Ok(true)
    }

    /// Unregister `language`, blank its registry line, and delete its
    /// table file. The last registered language cannot be removed.
    pub fn remove_language(&mut self, language: Language) -> Result<bool> {
        if self.registry_cached()?.len() == 1 {
            warn!("cannot remove the only registered language");
            return Ok(false);
        }
        let Some(file) = self.registry_cached()?.get(&language).cloned() else {
            return Ok(false);
        };

        self.write_registry_slot(language, "")?;
        self.source.remove(&file)?;

        if let Some(registry) = self.registry.as_mut() {
            registry.remove(&language);
        }
        if let Some(tables) = self.tables.as_mut() {
            tables.remove(&language);
        }
        if self.current == language {
            self.registry = None;
        }

        self.notify_written();
        Ok(true)
    }

    /// Rewrite the registry file with `value` on `language`'s line,
    /// normalized to one line per known locale.
    fn write_registry_slot(&mut self, language: Language, value: &str) -> Result<()> {
        let lines = self.source.read_lines(NAMES_FILE, true)?;
        let slot = language.index();
        let rows: Vec<String> = (0..Language::ALL.len())
            .map(|i| {
                if i == slot {
                    value.to_string()
                } else {
                    lines.get(i).map(|l| l.trim().to_string()).unwrap_or_default()
                }
            })
            .collect();
        self.source.write_lines(NAMES_FILE, &rows)
    }

    // ---- lookup ----

    /// Resolved value of `key` in the current language, with the error
    /// string standing in for missing keys.
    pub fn get(&mut self, key: &str) -> Result<String> {
        // Loading the registry may redirect an unregistered current
        // language to the first registered one.
        self.registry_cached()?;
        let language = self.current;
        self.get_for(key, language, true)
    }

    /// Resolved value of `key` in `language`. A key the language's table
    /// does not cover yields the language's error message row when
    /// `return_error_string` is set, "" otherwise. A blank stored row is a
    /// legitimate value and is returned as "". Unregistered languages
    /// always yield "".
    pub fn get_for(
        &mut self,
        key: &str,
        language: Language,
        return_error_string: bool,
    ) -> Result<String> {
        if !self.registry_cached()?.contains_key(&language) {
            return Ok(String::new());
        }

        let index = self.index_of(key)?;
        let tables = self.tables_cached()?;
        let rows = tables.get(&language).map(Vec::as_slice).unwrap_or(&[]);

        match index.and_then(|i| rows.get(i)) {
            Some(raw) => Ok(unescape(raw)),
            None if return_error_string => {
                Ok(rows.get(1).map(|raw| unescape(raw)).unwrap_or_default())
            }
            None => Ok(String::new()),
        }
    }

    /// Try the current language, then `fallback`; blank results fall
    /// through. When both are blank, the current language's error message
    /// is returned (or "" without `return_error_string`).
    pub fn get_with_fallback(
        &mut self,
        key: &str,
        fallback: Language,
        return_error_string: bool,
    ) -> Result<String> {
        self.registry_cached()?;
        let language = self.current;
        let result = self.get_for(key, language, false)?;
        if !result.trim().is_empty() {
            return Ok(result.trim().to_string());
        }

        let result = self.get_for(key, fallback, false)?;
        if !result.trim().is_empty() {
            return Ok(result.trim().to_string());
        }

        if return_error_string {
            self.get(ERROR_KEY)
        } else {
            Ok(String::new())
        }
    }

    /// Whether `key` has a non-blank row in each registered language, in
    /// registry order.
    pub fn localization_status(&mut self, key: &str) -> Result<Vec<bool>> {
        let index = self.index_of(key)?;
        let languages = self.available_languages()?;
        let tables = self.tables_cached()?;

        Ok(languages
            .iter()
            .map(|language| {
                index
                    .and_then(|i| tables.get(language).and_then(|rows| rows.get(i)))
                    .map(|row| !row.trim().is_empty())
                    .unwrap_or(false)
            })
            .collect())
    }

    /// Share of non-blank rows per registered language, as a percentage
    /// rounded to two decimals.
    pub fn localization_percentages(&mut self) -> Result<BTreeMap<Language, f32>> {
        let tables = self.tables_cached()?;
        let mut percentages = BTreeMap::new();
        for (language, rows) in tables {
            let filled = rows.iter().filter(|row| !row.trim().is_empty()).count();
            let pct = if rows.is_empty() {
                0.0
            } else {
                100.0 * filled as f32 / rows.len() as f32
            };
            percentages.insert(*language, (pct * 100.0).round() / 100.0);
        }
        Ok(percentages)
    }

    // ---- registry ----

    /// Registered languages in registry order.
    pub fn available_languages(&mut self) -> Result<Vec<Language>> {
        Ok(self.registry_cached()?.keys().copied().collect())
    }

    /// Backing file names, in registry order.
    pub fn language_files(&mut self) -> Result<Vec<String>> {
        Ok(self.registry_cached()?.values().cloned().collect())
    }

    pub fn language_count(&mut self) -> Result<usize> {
        Ok(self.registry_cached()?.len())
    }

    pub fn current_language(&self) -> Language {
        self.current
    }

    /// Switch the current language, reloading every table and notifying
    /// the language-change listeners. Returns `false` when `language` is
    /// not registered.
    pub fn set_language(&mut self, language: Language) -> Result<bool> {
        if !self.registry_cached()?.contains_key(&language) {
            return Ok(false);
        }

        self.current = language;
        self.load_tables()?;

        for listener in &self.listeners {
            listener(language);
        }
        Ok(true)
    }

    /// Adopt the language named by the `LANG` environment variable, when
    /// it maps to a registered language.
    pub fn set_language_from_env(&mut self) -> Result<bool> {
        let detected = std::env::var("LANG")
            .ok()
            .and_then(|code| Language::from_locale_code(&code));
        match detected {
            Some(language) => self.set_language(language),
            None => Ok(false),
        }
    }

    /// Register a callback fired synchronously on every successful
    /// language switch. Delivery order is unspecified.
    pub fn on_language_change(&mut self, listener: impl Fn(Language) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Register a hook fired after every batch of file writes, for
    /// external index-refresh integration.
    pub fn set_write_hook(&mut self, hook: impl Fn() + 'static) {
        self.write_hook = Some(Box::new(hook));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::{DirSource, PackSource};
    use std::cell::Cell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    fn write_table(dir: &Path, name: &str, rows: &[&str]) {
        let mut content = rows.join("\n");
        content.push('\n');
        fs::write(dir.join(format!("{name}.txt")), content).unwrap();
    }

    fn registry_rows(entries: &[(Language, &str)]) -> Vec<String> {
        let mut rows = vec![String::new(); Language::ALL.len()];
        for (language, file) in entries {
            rows[language.index()] = file.to_string();
        }
        rows
    }

    fn write_registry(dir: &Path, entries: &[(Language, &str)]) {
        let rows = registry_rows(entries);
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        write_table(dir, NAMES_FILE, &refs);
    }

    /// English + Turkish tables over keys [lng_name, lng_error, hello].
    fn fixture(dir: &Path) -> LngStore {
        let loc = dir.join("localization");
        fs::create_dir(&loc).unwrap();
        write_table(&loc, KEYS_FILE, &["lng_name", "lng_error", "hello"]);
        write_registry(
            &loc,
            &[(Language::English, "english"), (Language::Turkish, "turkish")],
        );
        write_table(
            &loc,
            "english",
            &["English", "Localization Error (English)", "Hello!"],
        );
        write_table(
            &loc,
            "turkish",
            &["Türkçe", "Lokalizasyon Hatası (Türkçe)", "Merhaba!"],
        );
        LngStore::new(DirSource::new(loc, dir.join("defaults")))
    }

    fn table_path(dir: &Path, name: &str) -> PathBuf {
        dir.join("localization").join(format!("{name}.txt"))
    }

    #[test]
    fn test_get_resolves_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());

        assert_eq!(store.get("hello").unwrap(), "Hello!");
        assert_eq!(
            store.get_for("hello", Language::Turkish, true).unwrap(),
            "Merhaba!"
        );
        assert_eq!(
            store.get("missing_key").unwrap(),
            "Localization Error (English)"
        );
        assert_eq!(
            store.get_for("missing_key", Language::English, false).unwrap(),
            ""
        );
    }

    #[test]
    fn test_unregistered_language_resolves_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());

        assert_eq!(store.get_for("hello", Language::Thai, true).unwrap(), "");
    }

    #[test]
    fn test_blank_row_is_distinct_from_missing_key() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());

        store.add_key("untranslated").unwrap();
        // The stored row is genuinely blank, not "key not found".
        assert_eq!(store.get("untranslated").unwrap(), "");
        assert_eq!(
            store.get("no_such_key").unwrap(),
            "Localization Error (English)"
        );
    }

    #[test]
    fn test_add_key_grows_every_table() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());

        assert!(store.add_key("  New Key ").unwrap());
        assert_eq!(
            store.keys().unwrap(),
            ["lng_name", "lng_error", "hello", "new_key"]
        );

        for name in ["english", "turkish"] {
            let content = fs::read_to_string(table_path(tmp.path(), name)).unwrap();
            assert_eq!(content.matches('\n').count(), 4, "{name} row count");
        }

        // Existing keys are a no-op.
        assert!(!store.add_key("new_key").unwrap());
        assert_eq!(store.keys().unwrap().len(), 4);
    }

    #[test]
    fn test_remove_key_shifts_rows_in_every_table() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());
        store.add_key("bye").unwrap();
        store.set_value("bye", "Goodbye!", Language::English).unwrap();

        assert!(store.remove_key("hello").unwrap());

        assert_eq!(store.keys().unwrap(), ["lng_name", "lng_error", "bye"]);
        // The surviving value moved up with its key.
        assert_eq!(store.get("bye").unwrap(), "Goodbye!");
        let content = fs::read_to_string(table_path(tmp.path(), "turkish")).unwrap();
        assert_eq!(content, "Türkçe\nLokalizasyon Hatası (Türkçe)\n\n");
    }

    #[test]
    fn test_reserved_keys_cannot_be_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());

        assert!(!store.remove_key(NAME_KEY).unwrap());
        assert!(!store.remove_key(ERROR_KEY).unwrap());
        assert_eq!(store.keys().unwrap().len(), 3);
    }

    #[test]
    fn test_remove_then_add_appends_at_end() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());
        store.add_key("bye").unwrap();

        store.remove_key("hello").unwrap();
        store.add_key("hello").unwrap();

        // Same length as before, but the row index is not restored.
        assert_eq!(
            store.keys().unwrap(),
            ["lng_name", "lng_error", "bye", "hello"]
        );
        assert_eq!(store.index_of("hello").unwrap(), Some(3));
    }

    #[test]
    fn test_rename_key_keeps_row_values() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());

        store.rename_key("hello", "greeting").unwrap();

        assert_eq!(store.keys().unwrap(), ["lng_name", "lng_error", "greeting"]);
        assert_eq!(store.get("greeting").unwrap(), "Hello!");
        assert_eq!(
            store.get_for("greeting", Language::Turkish, true).unwrap(),
            "Merhaba!"
        );
    }

    #[test]
    fn test_rename_missing_key_rewrites_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());
        let path = table_path(tmp.path(), KEYS_FILE);
        let before = fs::read(&path).unwrap();

        store.rename_key("ghost", "spirit").unwrap();

        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_set_value_rewrites_single_row() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());
        let turkish_before = fs::read(table_path(tmp.path(), "turkish")).unwrap();

        store.set_value("hello", "Hi there", Language::English).unwrap();

        let content = fs::read_to_string(table_path(tmp.path(), "english")).unwrap();
        assert_eq!(content, "English\nLocalization Error (English)\nHi there\n");
        assert_eq!(fs::read(table_path(tmp.path(), "turkish")).unwrap(), turkish_before);
    }

    #[test]
    fn test_set_value_suppresses_identical_write() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());
        let writes = Rc::new(Cell::new(0));
        let seen = writes.clone();
        store.set_write_hook(move || seen.set(seen.get() + 1));

        store.set_value("hello", "Hello!", Language::English).unwrap();
        assert_eq!(writes.get(), 0);

        store.set_value("hello", "Hi there", Language::English).unwrap();
        assert_eq!(writes.get(), 1);
    }

    #[test]
    fn test_escape_round_trip() {
        let value = "  first line\nsecond line  ";
        assert_eq!(unescape(&escape(value)), value.trim());
        assert_eq!(escape(value), "first line<line_break>second line");
    }

    #[test]
    fn test_multiline_value_round_trips_through_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());

        store
            .set_value("hello", "Hello,\nworld!", Language::English)
            .unwrap();

        // One physical line on disk, restored on read.
        let content = fs::read_to_string(table_path(tmp.path(), "english")).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert_eq!(store.get("hello").unwrap(), "Hello,\nworld!");
    }

    #[test]
    fn test_create_language_builds_aligned_table() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());

        assert!(store
            .create_language(Language::German, "german", "", "")
            .unwrap());

        let content = fs::read_to_string(table_path(tmp.path(), "german")).unwrap();
        assert_eq!(content, "German\nLocalization Error (German)\n\n");
        assert_eq!(
            store.available_languages().unwrap(),
            [Language::English, Language::German, Language::Turkish]
        );
        // Every key is covered by a blank row, so lookups see a blank
        // value rather than a missing key.
        assert_eq!(store.get_for("hello", Language::German, true).unwrap(), "");
        assert_eq!(store.localization_status("hello").unwrap(), [true, false, true]);

        // Registered language and taken file name are both no-ops.
        assert!(!store.create_language(Language::German, "deutsch", "", "").unwrap());
        assert!(!store.create_language(Language::French, "german", "", "").unwrap());
    }

    #[test]
    fn test_remove_language_deletes_file_and_registry_line() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());

        assert!(store.remove_language(Language::Turkish).unwrap());

        assert_eq!(store.available_languages().unwrap(), [Language::English]);
        assert!(!table_path(tmp.path(), "turkish").exists());
        let registry = fs::read_to_string(table_path(tmp.path(), NAMES_FILE)).unwrap();
        assert!(!registry.contains("turkish"));
    }

    #[test]
    fn test_last_language_cannot_be_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());
        store.remove_language(Language::Turkish).unwrap();

        assert!(!store.remove_language(Language::English).unwrap());
        assert_eq!(store.available_languages().unwrap(), [Language::English]);
        assert!(table_path(tmp.path(), "english").exists());
    }

    #[test]
    fn test_fallback_resolution() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());
        store.add_key("only_turkish").unwrap();
        store
            .set_value("only_turkish", "Sadece Türkçe", Language::Turkish)
            .unwrap();

        // Current (English) is blank, the fallback carries the value.
        assert_eq!(
            store
                .get_with_fallback("only_turkish", Language::Turkish, true)
                .unwrap(),
            "Sadece Türkçe"
        );
        // Blank everywhere resolves to the current language's error row.
        store.add_key("nowhere").unwrap();
        assert_eq!(
            store.get_with_fallback("nowhere", Language::Turkish, true).unwrap(),
            "Localization Error (English)"
        );
        assert_eq!(
            store.get_with_fallback("nowhere", Language::Turkish, false).unwrap(),
            ""
        );
    }

    #[test]
    fn test_localization_status_and_percentages() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());
        store.add_key("extra").unwrap();
        store.set_value("extra", "Extra", Language::English).unwrap();

        assert_eq!(store.localization_status("extra").unwrap(), [true, false]);
        assert_eq!(store.localization_status("no_such_key").unwrap(), [false, false]);

        let percentages = store.localization_percentages().unwrap();
        assert_eq!(percentages[&Language::English], 100.0);
        assert_eq!(percentages[&Language::Turkish], 75.0);
    }

    #[test]
    fn test_set_language_notifies_listeners() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = fixture(tmp.path());
        let fired = Rc::new(Cell::new(0));
        let seen = fired.clone();
        store.on_language_change(move |language| {
            assert_eq!(language, Language::Turkish);
            seen.set(seen.get() + 1);
        });

        assert!(store.set_language(Language::Turkish).unwrap());
        assert_eq!(store.current_language(), Language::Turkish);
        assert_eq!(store.get("hello").unwrap(), "Merhaba!");
        assert_eq!(fired.get(), 1);

        // Switching to an unregistered language fails without firing.
        assert!(!store.set_language(Language::Thai).unwrap());
        assert_eq!(store.current_language(), Language::Turkish);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_unregistered_current_falls_back_to_first_registered() {
        let tmp = tempfile::tempdir().unwrap();
        let loc = tmp.path().join("localization");
        fs::create_dir(&loc).unwrap();
        write_table(&loc, KEYS_FILE, &["lng_name", "lng_error"]);
        write_registry(&loc, &[(Language::Turkish, "turkish")]);
        write_table(&loc, "turkish", &["Türkçe", "Hata"]);

        let mut store = LngStore::new(DirSource::new(loc, tmp.path().join("defaults")));
        assert_eq!(store.get("lng_name").unwrap(), "Türkçe");
        assert_eq!(store.current_language(), Language::Turkish);
    }

    #[test]
    fn test_packed_backend_serves_lookups_and_rejects_writes() {
        let registry = registry_rows(&[(Language::English, "english")]).join("\n") + "\n";
        let source = PackSource::new()
            .with(KEYS_FILE, "lng_name\nlng_error\nhello\n")
            .with(NAMES_FILE, &registry)
            .with("english", "English\nLocalization Error (English)\nHello!\n");
        let mut store = LngStore::new(source);

        assert_eq!(store.get("hello").unwrap(), "Hello!");
        assert_eq!(store.get("missing_key").unwrap(), "Localization Error (English)");
        assert!(store.add_key("new_key").is_err());
    }
}
