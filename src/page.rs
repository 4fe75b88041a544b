//! Defines [`WebPage`], the metadata shared by every output page, and
//! [`BlogPage`], which composes a [`WebPage`] with the metadata of a single
//! blog entry.

use crate::config::{self, EntryConfig};
use crate::util::read_to_string;
use chrono::{Datelike, NaiveDate};
use log::warn;
use std::path::{Path, PathBuf};

/// Returns the output file name for a page titled `title`: every whitespace
/// character becomes `_` and `.html` is appended.
pub fn page_name(title: &str) -> String {
    let mut name: String = title
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    name.push_str(".html");
    name
}

/// Metadata for a single output page.
#[derive(Clone, Debug, PartialEq)]
pub struct WebPage {
    title: String,
    navlist: Vec<String>,

    /// Where the page's input lives: the source file of a static page, or the
    /// directory of a blog entry.
    source: PathBuf,
}

impl WebPage {
    pub fn new(title: &str, source: PathBuf, navlist: Vec<String>) -> WebPage {
        WebPage {
            title: title.trim().to_owned(),
            navlist,
            source,
        }
    }

    /// Builds a static page from its source file. The title is the file name
    /// up to its first `.`. Returns `None` for hidden files and for names
    /// which leave an empty title.
    pub fn from_static_file(path: &Path, navlist: Vec<String>) -> Option<WebPage> {
        let file_name = path.file_name()?.to_str()?;
        if file_name.starts_with('.') {
            return None;
        }
        let title = file_name.split('.').next()?.trim();
        if title.is_empty() {
            return None;
        }
        Some(WebPage::new(title, path.to_owned(), navlist))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn page_name(&self) -> String {
        page_name(&self.title)
    }

    pub fn navlist(&self) -> &[String] {
        &self.navlist
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// A single blog entry. One [`BlogPage`] exists per subdirectory of
/// `in/blog/`; its metadata comes from the subdirectory's `meta.cfg`.
#[derive(Clone, Debug, PartialEq)]
pub struct BlogPage {
    page: WebPage,
    author: String,
    date: NaiveDate,
    tags: Vec<String>,
}

impl BlogPage {
    /// The date given to entries with a missing or unparsable `date`.
    pub fn unset_date() -> NaiveDate {
        NaiveDate::default()
    }

    /// Reads the entry rooted at `entry_directory`. The title defaults to the
    /// directory name and the author to `default_author`. A missing or
    /// unreadable `meta.cfg` is reported and the entry keeps its defaults.
    pub fn read(entry_directory: &Path, navlist: Vec<String>, default_author: &str) -> BlogPage {
        let directory_name = entry_directory
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let config_path = entry_directory.join(config::ENTRY_CONFIG_FILE);
        let config = match read_to_string(&config_path, "entry configuration") {
            Ok(contents) => EntryConfig::parse(&contents, &config_path),
            Err(e) => {
                warn!("{}; using defaults", e);
                EntryConfig::default()
            }
        };

        BlogPage::from_config(
            config,
            &directory_name,
            entry_directory.to_owned(),
            navlist,
            default_author,
        )
    }

    pub fn from_config(
        config: EntryConfig,
        default_title: &str,
        entry_directory: PathBuf,
        navlist: Vec<String>,
        default_author: &str,
    ) -> BlogPage {
        let title = config.title.as_deref().unwrap_or(default_title);
        BlogPage {
            page: WebPage::new(title, entry_directory, navlist),
            author: config
                .author
                .unwrap_or_else(|| default_author.trim().to_owned()),
            date: config.date.unwrap_or_else(BlogPage::unset_date),
            tags: config.tags,
        }
    }

    pub fn page(&self) -> &WebPage {
        &self.page
    }

    pub fn title(&self) -> &str {
        self.page.title()
    }

    pub fn page_name(&self) -> String {
        self.page.page_name()
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The entry's input directory.
    pub fn source_location(&self) -> &Path {
        self.page.source()
    }

    pub fn body_path(&self) -> PathBuf {
        self.source_location().join(config::ENTRY_BODY_FILE)
    }

    pub fn assets_path(&self) -> PathBuf {
        self.source_location().join(config::ENTRY_ASSETS_DIRECTORY)
    }
}
