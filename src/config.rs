//! Parsing for the line-oriented `key: value` configuration files (the site's
//! `genablog.cfg` and each entry's `meta.cfg`), plus the fixed names of the
//! input tree.

use crate::util::{read_to_string, FileError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::warn;
use std::path::Path;

/// Directory in the blog root that contains all input files.
pub const IN_ROOT_DIRECTORY: &str = "in";
/// The site configuration file, relative to [`IN_ROOT_DIRECTORY`].
pub const SITE_CONFIG_FILE: &str = "genablog.cfg";
/// The header fragment, relative to [`IN_ROOT_DIRECTORY`].
pub const HEADER_FILE: &str = "header.html";
/// The footer fragment, relative to [`IN_ROOT_DIRECTORY`].
pub const FOOTER_FILE: &str = "footer.html";
/// Directory of static page sources, relative to [`IN_ROOT_DIRECTORY`].
pub const STATIC_DIRECTORY: &str = "static";
/// Directory of entry subdirectories, relative to [`IN_ROOT_DIRECTORY`].
pub const BLOG_DIRECTORY: &str = "blog";
/// Directory of global assets, relative to [`IN_ROOT_DIRECTORY`].
pub const GLOBAL_ASSETS_DIRECTORY: &str = "assets";
/// The per-entry configuration file.
pub const ENTRY_CONFIG_FILE: &str = "meta.cfg";
/// The per-entry HTML body.
pub const ENTRY_BODY_FILE: &str = "body.html";
/// The per-entry asset directory.
pub const ENTRY_ASSETS_DIRECTORY: &str = "assets";

pub const DEFAULT_BLOG_TITLE: &str = "My Blog";
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Splits `input` into `(key, value)` pairs. Each line is split on its first
/// `:`; the key is trimmed and lowercased, the value is trimmed. Lines
/// without a `:` are skipped.
pub fn entries(input: &str) -> impl Iterator<Item = (String, &str)> {
    input.lines().filter_map(|line| {
        let (key, value) = line.split_once(':')?;
        Some((key.trim().to_lowercase(), value.trim()))
    })
}

/// Splits a comma-separated value into trimmed, non-empty items.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Best-effort parsing of a free-form date. Returns `None` if no known
/// format matches.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d/%m/%Y",
        "%d.%m.%Y",
        "%B %d, %Y",
        "%b %d, %Y",
        "%B %d %Y",
        "%d %B %Y",
        "%d %b %Y",
    ];
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ];

    let value = value.trim();

    // `%Y%m%d`, the format new entries are stamped with. Handled by hand
    // since `%Y` doesn't know where to stop without a separator.
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        let (year, month, day) = (&value[..4], &value[4..6], &value[6..]);
        if let (Ok(year), Ok(month), Ok(day)) = (year.parse(), month.parse(), day.parse()) {
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .or_else(|_| DateTime::parse_from_rfc2822(value))
                .ok()
                .map(|datetime| datetime.date_naive())
        })
}

/// The site-wide configuration read from `in/genablog.cfg`.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    /// The blog's title. Defaults to [`DEFAULT_BLOG_TITLE`].
    pub title: String,

    /// The default author for entries that don't name one. Defaults to
    /// [`DEFAULT_AUTHOR`].
    pub author: String,

    /// Page names listed by `navlist:`. Reported in the summary; the navbar
    /// is built from the static pages instead.
    pub navlist: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            title: DEFAULT_BLOG_TITLE.to_owned(),
            author: DEFAULT_AUTHOR.to_owned(),
            navlist: Vec::new(),
        }
    }
}

impl SiteConfig {
    pub fn from_file(path: &Path) -> Result<SiteConfig, FileError> {
        Ok(SiteConfig::parse(&read_to_string(path, "site configuration")?))
    }

    pub fn parse(input: &str) -> SiteConfig {
        let mut config = SiteConfig::default();
        for (key, value) in entries(input) {
            match key.as_str() {
                "title" => config.title = value.to_owned(),
                "author" => config.author = value.to_owned(),
                "navlist" => config.navlist = parse_list(value),
                _ => {}
            }
        }
        config
    }
}

/// The per-entry configuration read from `in/blog/<entry>/meta.cfg`. Every
/// field is optional; the caller supplies defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryConfig {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

impl EntryConfig {
    /// Parses an entry configuration. `origin` is only used to report dates
    /// which can't be parsed; those are left unset and parsing continues.
    pub fn parse(input: &str, origin: &Path) -> EntryConfig {
        let mut config = EntryConfig::default();
        for (key, value) in entries(input) {
            match key.as_str() {
                "title" => config.title = Some(value.to_owned()),
                "author" => config.author = Some(value.to_owned()),
                "date" => match parse_date(value) {
                    Some(date) => config.date = Some(date),
                    None => warn!("Invalid date `{}` in {}", value, origin.display()),
                },
                "tags" => config.tags = parse_list(value),
                _ => {}
            }
        }
        config
    }
}
