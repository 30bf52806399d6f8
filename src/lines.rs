use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// A named text resource read as an ordered sequence of lines.
///
/// Mutation has default implementations that refuse, so read-only
/// backends only implement `read_lines`.
pub trait LineSource {
    /// Read the lines of `name`. With `keep_trailing` set, the final
    /// element produced by the terminating newline is preserved;
    /// otherwise it is dropped so the result holds only the logical rows.
    fn read_lines(&self, name: &str, keep_trailing: bool) -> Result<Vec<String>>;

    fn write_lines(&self, name: &str, lines: &[String]) -> Result<()> {
        let _ = lines;
        Err(StoreError::ReadOnlySource(name.to_string()).into())
    }

    fn remove(&self, name: &str) -> Result<()> {
        Err(StoreError::ReadOnlySource(name.to_string()).into())
    }
}

fn split_lines(content: &str, keep_trailing: bool) -> Vec<String> {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    if !keep_trailing {
        lines.pop();
    }
    lines
}

/// Authoring backend: plain `.txt` files in a writable directory.
///
/// A missing directory is bootstrapped by copying every file from the
/// default-templates directory.
pub struct DirSource {
    localization_dir: PathBuf,
    templates_dir: PathBuf,
}

impl DirSource {
    pub fn new(localization_dir: impl Into<PathBuf>, templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            localization_dir: localization_dir.into(),
            templates_dir: templates_dir.into(),
        }
    }

    fn table_dir(&self) -> Result<&Path> {
        if !self.localization_dir.is_dir() {
            self.bootstrap()?;
        }
        Ok(&self.localization_dir)
    }

    fn bootstrap(&self) -> Result<()> {
        if !self.templates_dir.is_dir() {
            return Err(StoreError::TemplatesDirMissing(self.templates_dir.clone()).into());
        }

        fs::create_dir_all(&self.localization_dir).with_context(|| {
            format!(
                "failed to create localization directory {}",
                self.localization_dir.display()
            )
        })?;

        for entry in fs::read_dir(&self.templates_dir)? {
            let entry = entry?;
            if entry.path().is_file() {
                fs::copy(entry.path(), self.localization_dir.join(entry.file_name()))
                    .with_context(|| format!("failed to copy template {:?}", entry.file_name()))?;
            }
        }

        Ok(())
    }

    fn file_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.table_dir()?.join(format!("{name}.txt")))
    }
}

impl LineSource for DirSource {
    fn read_lines(&self, name: &str, keep_trailing: bool) -> Result<Vec<String>> {
        let path = self.file_path(name)?;
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(split_lines(&content, keep_trailing))
    }

    fn write_lines(&self, name: &str, lines: &[String]) -> Result<()> {
        let path = self.file_path(name)?;
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    fn remove(&self, name: &str) -> Result<()> {
        let path = self.file_path(name)?;
        fs::remove_file(&path).with_context(|| format!("failed to delete {}", path.display()))
    }
}

/// Deployed backend: resources compiled into the binary, typically
/// registered with `include_str!`. No write path.
#[derive(Default)]
pub struct PackSource {
    resources: HashMap<String, String>,
}

impl PackSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, content: &str) -> Self {
        self.resources.insert(name.to_string(), content.to_string());
        self
    }
}

impl LineSource for PackSource {
    fn read_lines(&self, name: &str, keep_trailing: bool) -> Result<Vec<String>> {
        let content = self
            .resources
            .get(name)
            .ok_or_else(|| StoreError::UnknownResource(name.to_string()))?;
        Ok(split_lines(content, keep_trailing))
    }
}
