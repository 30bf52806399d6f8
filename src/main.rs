use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use unicode_width::UnicodeWidthStr;

use lng::config::{Config, CONFIG_FILE};
use lng::language::Language;
use lng::lines::DirSource;
use lng::search::KeyMatcher;
use lng::store::{normalize_key, LngStore, ERROR_KEY, KEYS_FILE, NAMES_FILE, NAME_KEY};

#[derive(Parser)]
#[command(name = "lng")]
#[command(about = "Manage flat-file localization tables and look up localized strings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default lng.toml and seed the localization directory
    Init,
    /// Look up the localized value of a key
    Get {
        key: String,
        /// Language to resolve in (defaults to the configured language)
        #[arg(long)]
        lang: Option<Language>,
        /// Retry with the configured fallback language when blank
        #[arg(long)]
        fallback: bool,
    },
    /// Write a localized value for a key, creating the key if needed
    Set {
        key: String,
        value: String,
        /// Language whose table receives the value
        #[arg(long)]
        lang: Option<Language>,
    },
    /// Key table operations
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Language registry operations
    Lang {
        #[command(subcommand)]
        action: LangAction,
    },
    /// Localization coverage, per key or per language
    Status {
        key: Option<String>,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// List all keys in row order
    List,
    /// Add a new key (normalized) with an empty row in every language
    Add { key: String },
    /// Remove a key and its row in every language
    Rm { key: String },
    /// Rename a key, keeping its row and values
    Mv { old: String, new: String },
    /// Search keys by exact, prefix, or fuzzy match
    Find {
        query: String,
        /// Maximum number of suggestions to display
        #[arg(long, default_value_t = 8)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum LangAction {
    /// List registered languages with their backing files
    List,
    /// Register a language and create its table file
    Add {
        language: Language,
        /// Backing file name (defaults to the language name)
        #[arg(long)]
        file: Option<String>,
        /// Display name stored at row 0
        #[arg(long)]
        name: Option<String>,
        /// Error message stored at row 1
        #[arg(long)]
        error: Option<String>,
    },
    /// Unregister a language and delete its table file
    Rm { language: Language },
    /// Switch the current language and persist it in lng.toml
    Use { language: Language },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::new()?;

    if let Commands::Init = cli.command {
        return init(&config);
    }

    let mut store = LngStore::new(DirSource::new(
        config.paths.localization_dir.clone(),
        config.paths.templates_dir.clone(),
    ));
    if let Some(language) = config.effective_language() {
        store.set_language(language)?;
    }

    match cli.command {
        Commands::Init => unreachable!(),
        Commands::Get { key, lang, fallback } => {
            let key = normalize_key(&key);
            let value = if fallback {
                let fallback_language = config.fallback_language().unwrap_or(Language::English);
                store.get_with_fallback(&key, fallback_language, true)?
            } else if let Some(language) = lang {
                store.get_for(&key, language, true)?
            } else {
                store.get(&key)?
            };
            println!("{value}");
        }
        Commands::Set { key, value, lang } => {
            let key = normalize_key(&key);
            store.language_count()?;
            let language = lang.unwrap_or_else(|| store.current_language());
            if store.add_key(&key)? {
                println!("{} {}", "new key".green(), key);
            }
            store.set_value(&key, &value, language)?;
            println!("{} {} = {}", language.to_string().cyan(), key.bold(), value);
        }
        Commands::Key { action } => match action {
            KeyAction::List => {
                for key in store.keys()? {
                    println!("{key}");
                }
            }
            KeyAction::Add { key } => {
                let normalized = normalize_key(&key);
                if store.add_key(&key)? {
                    println!("{} {}", "added".green(), normalized);
                } else {
                    println!("{} {}", "already exists".yellow(), normalized);
                }
            }
            KeyAction::Rm { key } => {
                let key = normalize_key(&key);
                if !store.contains_key(&key)? {
                    println!("{} {}", "unknown key".red(), key);
                    return Ok(());
                }
                let filled = store
                    .localization_status(&key)?
                    .into_iter()
                    .filter(|filled| *filled)
                    .count();
                println!(
                    "removing \"{}\" deletes its row and {} localized value(s)",
                    key.bold(),
                    filled
                );
                if !confirm()? {
                    println!("{}", "aborted".yellow());
                    return Ok(());
                }
                if store.remove_key(&key)? {
                    println!("{} {}", "removed".green(), key);
                }
            }
            KeyAction::Mv { old, new } => {
                let old = normalize_key(&old);
                let new = normalize_key(&new);
                if !store.contains_key(&old)? {
                    println!("{} {}", "unknown key".red(), old);
                    return Ok(());
                }
                store.rename_key(&old, &new)?;
                println!("{} {} -> {}", "renamed".green(), old, new.bold());
            }
            KeyAction::Find { query, limit } => {
                let matcher = KeyMatcher::new();
                let keys = store.keys()?;
                let matches = matcher.suggestions(&query, &keys);
                if matches.is_empty() {
                    println!("{}", "no matching keys".yellow());
                }
                for result in matches.iter().take(limit) {
                    println!("{}", result.key);
                }
            }
        },
        Commands::Lang { action } => match action {
            LangAction::List => {
                let languages = store.available_languages()?;
                let files = store.language_files()?;
                let current = store.current_language();
                let width = languages
                    .iter()
                    .map(|l| l.to_string().len())
                    .max()
                    .unwrap_or(0);
                for (language, file) in languages.iter().zip(&files) {
                    let marker = if *language == current { "*" } else { " " };
                    let display = store.get_for(NAME_KEY, *language, false)?;
                    println!(
                        "{} {} {} ({}.txt)",
                        marker.green().bold(),
                        pad(&language.to_string(), width),
                        display.cyan(),
                        file
                    );
                }
            }
            LangAction::Add { language, file, name, error } => {
                let file = file.unwrap_or_else(|| language.to_string().to_lowercase());
                let created = store.create_language(
                    language,
                    &file,
                    name.as_deref().unwrap_or(""),
                    error.as_deref().unwrap_or(""),
                )?;
                if created {
                    println!("{} {} ({}.txt)", "registered".green(), language, file);
                } else {
                    println!("{} {}", "language or file already registered".yellow(), language);
                }
            }
            LangAction::Rm { language } => {
                println!(
                    "removing {} deletes its table file and registry entry",
                    language.to_string().bold()
                );
                if !confirm()? {
                    println!("{}", "aborted".yellow());
                    return Ok(());
                }
                if store.remove_language(language)? {
                    println!("{} {}", "removed".green(), language);
                } else {
                    println!("{} {}", "cannot remove".red(), language);
                }
            }
            LangAction::Use { language } => {
                if store.set_language(language)? {
                    let mut config = config.clone();
                    config.display.language = language.to_string().to_lowercase();
                    config.save()?;
                    println!("{} {}", "current language".green(), language);
                } else {
                    println!("{} {} is not registered", "error:".red().bold(), language);
                }
            }
        },
        Commands::Status { key, json } => match key {
            Some(key) => {
                let key = normalize_key(&key);
                let languages = store.available_languages()?;
                let statuses = store.localization_status(&key)?;
                if json {
                    let report: serde_json::Map<String, serde_json::Value> = languages
                        .iter()
                        .zip(&statuses)
                        .map(|(language, filled)| (language.to_string(), (*filled).into()))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    for (language, filled) in languages.iter().zip(&statuses) {
                        let mark = if *filled { "✓".green() } else { "✗".red() };
                        println!("{mark} {language}");
                    }
                }
            }
            None => {
                let percentages = store.localization_percentages()?;
                if json {
                    let report: std::collections::BTreeMap<String, f32> = percentages
                        .iter()
                        .map(|(language, pct)| (language.to_string(), *pct))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    let width = percentages
                        .keys()
                        .map(|l| l.to_string().len())
                        .max()
                        .unwrap_or(0);
                    let names: Vec<(Language, String)> = percentages
                        .keys()
                        .map(|&language| {
                            store
                                .get_for(NAME_KEY, language, false)
                                .map(|name| (language, name))
                        })
                        .collect::<Result<_>>()?;
                    let name_width = names
                        .iter()
                        .map(|(_, name)| UnicodeWidthStr::width(name.as_str()))
                        .max()
                        .unwrap_or(0);
                    for (language, name) in &names {
                        let pct = percentages[language];
                        let shown = format!("{pct:6.2}%");
                        let shown = if pct >= 100.0 {
                            shown.green()
                        } else if pct >= 50.0 {
                            shown.yellow()
                        } else {
                            shown.red()
                        };
                        println!(
                            "{} {} {}",
                            pad(&language.to_string(), width),
                            pad(name, name_width).cyan(),
                            shown
                        );
                    }
                }
            }
        },
    }

    Ok(())
}

/// Pad to a display width, counting wide characters properly.
fn pad(text: &str, width: usize) -> String {
    let mut out = text.to_string();
    for _ in UnicodeWidthStr::width(text)..width {
        out.push(' ');
    }
    out
}

fn confirm() -> Result<bool> {
    print!("{}", "continue? [yes/no] ".yellow());
    io::stdout().flush().ok();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return Ok(false);
    }
    Ok(input.trim().eq_ignore_ascii_case("yes"))
}

/// Seed the default-templates directory and force the bootstrap copy, so
/// a fresh project gets an English table and the reserved keys.
fn init(config: &Config) -> Result<()> {
    let templates = &config.paths.templates_dir;
    if !templates.is_dir() {
        fs::create_dir_all(templates)?;
        fs::write(
            templates.join(format!("{KEYS_FILE}.txt")),
            format!("{NAME_KEY}\n{ERROR_KEY}\n"),
        )?;
        fs::write(
            templates.join("english.txt"),
            "English\nLocalization Error (English)\n",
        )?;
        let mut registry = vec![String::new(); Language::ALL.len()];
        registry[Language::English.index()] = "english".to_string();
        fs::write(
            templates.join(format!("{NAMES_FILE}.txt")),
            registry.join("\n") + "\n",
        )?;
        println!("{} {}", "seeded".green(), templates.display());
    }

    if !Path::new(CONFIG_FILE).exists() {
        config.save()?;
        println!("{} {CONFIG_FILE}", "wrote".green());
    }

    // The first read triggers the bootstrap copy into the localization dir.
    let mut store = LngStore::new(DirSource::new(
        config.paths.localization_dir.clone(),
        config.paths.templates_dir.clone(),
    ));
    store.keys()?;
    println!(
        "{} {}",
        "localization directory ready".green().bold(),
        config.paths.localization_dir.display()
    );
    Ok(())
}
