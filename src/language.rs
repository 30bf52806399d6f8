use clap::ValueEnum;
use std::fmt;

/// A supported locale.
///
/// The discriminant is the line number of the locale in the language
/// registry file, so values must never change once assigned; new locales
/// go at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Language {
    Arabic = 0,
    Chinese = 1,
    Czech = 2,
    Danish = 3,
    Dutch = 4,
    English = 5,
    Finnish = 6,
    French = 7,
    German = 8,
    Greek = 9,
    Hebrew = 10,
    Hungarian = 11,
    Indonesian = 12,
    Italian = 13,
    Japanese = 14,
    Korean = 15,
    Norwegian = 16,
    Polish = 17,
    Portuguese = 18,
    Romanian = 19,
    Russian = 20,
    Spanish = 21,
    Swedish = 22,
    Thai = 23,
    Turkish = 24,
    Ukrainian = 25,
    Vietnamese = 26,
}

impl Language {
    /// Every supported locale, in registry-line order.
    pub const ALL: [Language; 27] = [
        Language::Arabic,
        Language::Chinese,
        Language::Czech,
        Language::Danish,
        Language::Dutch,
        Language::English,
        Language::Finnish,
        Language::French,
        Language::German,
        Language::Greek,
        Language::Hebrew,
        Language::Hungarian,
        Language::Indonesian,
        Language::Italian,
        Language::Japanese,
        Language::Korean,
        Language::Norwegian,
        Language::Polish,
        Language::Portuguese,
        Language::Romanian,
        Language::Russian,
        Language::Spanish,
        Language::Swedish,
        Language::Thai,
        Language::Turkish,
        Language::Ukrainian,
        Language::Vietnamese,
    ];

    /// Line number of this locale in the registry file.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Language> {
        Language::ALL.get(index).copied()
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Language::Arabic => "Arabic",
            Language::Chinese => "Chinese",
            Language::Czech => "Czech",
            Language::Danish => "Danish",
            Language::Dutch => "Dutch",
            Language::English => "English",
            Language::Finnish => "Finnish",
            Language::French => "French",
            Language::German => "German",
            Language::Greek => "Greek",
            Language::Hebrew => "Hebrew",
            Language::Hungarian => "Hungarian",
            Language::Indonesian => "Indonesian",
            Language::Italian => "Italian",
            Language::Japanese => "Japanese",
            Language::Korean => "Korean",
            Language::Norwegian => "Norwegian",
            Language::Polish => "Polish",
            Language::Portuguese => "Portuguese",
            Language::Romanian => "Romanian",
            Language::Russian => "Russian",
            Language::Spanish => "Spanish",
            Language::Swedish => "Swedish",
            Language::Thai => "Thai",
            Language::Turkish => "Turkish",
            Language::Ukrainian => "Ukrainian",
            Language::Vietnamese => "Vietnamese",
        }
    }

    /// ISO-639 code of this locale.
    pub fn locale_code(self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::Chinese => "zh",
            Language::Czech => "cs",
            Language::Danish => "da",
            Language::Dutch => "nl",
            Language::English => "en",
            Language::Finnish => "fi",
            Language::French => "fr",
            Language::German => "de",
            Language::Greek => "el",
            Language::Hebrew => "he",
            Language::Hungarian => "hu",
            Language::Indonesian => "id",
            Language::Italian => "it",
            Language::Japanese => "ja",
            Language::Korean => "ko",
            Language::Norwegian => "no",
            Language::Polish => "pl",
            Language::Portuguese => "pt",
            Language::Romanian => "ro",
            Language::Russian => "ru",
            Language::Spanish => "es",
            Language::Swedish => "sv",
            Language::Thai => "th",
            Language::Turkish => "tr",
            Language::Ukrainian => "uk",
            Language::Vietnamese => "vi",
        }
    }

    /// Match a `LANG`-style locale string ("tr_TR.UTF-8", "en-US", "de")
    /// by its ISO-639 prefix.
    pub fn from_locale_code(code: &str) -> Option<Language> {
        let prefix = code
            .split(['.', '_', '-', '@'])
            .next()
            .unwrap_or(code)
            .to_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|language| language.locale_code() == prefix)
    }

    /// Match either an English language name ("turkish") or an ISO-639
    /// code ("tr"), case-insensitively.
    pub fn from_name_or_code(value: &str) -> Option<Language> {
        let value = value.trim();
        Language::ALL
            .iter()
            .copied()
            .find(|language| language.english_name().eq_ignore_ascii_case(value))
            .or_else(|| Language::from_locale_code(value))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.english_name())
    }
}
