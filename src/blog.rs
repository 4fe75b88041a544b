//! Defines [`Blog`], which owns every page and tag of a blog and drives the
//! read phase ([`Blog::read_all`]) and the write phase ([`Blog::write_all`]).

use crate::config::{self, SiteConfig};
use crate::page::{BlogPage, WebPage};
use crate::tag::{self, Tag};
use crate::util::FileError;
use crate::write;
use chrono::{Local, NaiveDateTime};
use log::info;
use std::fmt;
use std::fs::read_dir;
use std::io;
use std::path::{Path, PathBuf};

/// Directory in the blog root that receives the generated sites.
pub const OUT_ROOT_DIRECTORY: &str = "out";

/// The format of run directory names.
const RUN_DIRECTORY_FORMAT: &str = "%Y%m%d%H%M%S";

/// A blog rooted at a directory containing `in/` (the sources) and `out/`
/// (the generated sites).
pub struct Blog {
    location: PathBuf,
    config: SiteConfig,
    blog_webpages: Vec<BlogPage>,
    static_webpages: Vec<WebPage>,
    tags: Vec<Tag>,

    /// The moment the build is considered to happen. It names the run
    /// directory and decides which year is "current".
    now: NaiveDateTime,
}

impl Blog {
    /// Opens the blog at `location` using the local time as the build time.
    /// See [`Blog::open_at`].
    pub fn open(location: &Path) -> Result<Blog> {
        Blog::open_at(location, Local::now().naive_local())
    }

    /// Opens the blog at `location` and reads its site configuration. Fails if
    /// `location` isn't a directory or has no `in/genablog.cfg`.
    pub fn open_at(location: &Path, now: NaiveDateTime) -> Result<Blog> {
        if !location.is_dir() {
            return Err(Error::InvalidRoot(location.to_owned()));
        }

        let config_path = location
            .join(config::IN_ROOT_DIRECTORY)
            .join(config::SITE_CONFIG_FILE);
        if !config_path.is_file() {
            return Err(Error::MissingConfig(config_path));
        }

        Ok(Blog {
            location: location.to_owned(),
            config: SiteConfig::from_file(&config_path)?,
            blog_webpages: Vec::new(),
            static_webpages: Vec::new(),
            tags: Vec::new(),
            now,
        })
    }

    /// Reads the entries, the static pages and indexes the tags.
    pub fn read_all(&mut self) -> Result<()> {
        self.read_blog()?;
        self.read_static()?;
        self.index_tags();
        info!(
            "Read {} entries, {} static pages and {} tags",
            self.blog_webpages.len(),
            self.static_webpages.len(),
            self.tags.len()
        );
        Ok(())
    }

    /// Reads one [`BlogPage`] per subdirectory of `in/blog/` and sorts them
    /// by date, oldest first. Entries with the same date keep the order of
    /// their directory names.
    pub fn read_blog(&mut self) -> Result<()> {
        let directories = list(&self.in_directory(config::BLOG_DIRECTORY), |path| {
            path.is_dir()
        })?;

        self.blog_webpages = directories
            .iter()
            .map(|directory| {
                BlogPage::read(directory, self.config.navlist.clone(), &self.config.author)
            })
            .collect();
        self.blog_webpages.sort_by_key(BlogPage::date);
        Ok(())
    }

    /// Reads one [`WebPage`] per file in `in/static/`, in file-name order.
    pub fn read_static(&mut self) -> Result<()> {
        let files = list(&self.in_directory(config::STATIC_DIRECTORY), |path| {
            path.is_file()
        })?;

        let navlist = &self.config.navlist;
        self.static_webpages = files
            .iter()
            .filter_map(|file| WebPage::from_static_file(file, navlist.clone()))
            .collect();
        Ok(())
    }

    /// Rebuilds the tag index from the (sorted) entries.
    pub fn index_tags(&mut self) {
        self.tags = tag::index_tags(&self.blog_webpages);
    }

    /// Writes a complete site into a fresh run directory and returns its path.
    pub fn write_all(&self) -> write::Result<PathBuf> {
        write::write_all(self)
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn author(&self) -> &str {
        &self.config.author
    }

    pub fn navlist(&self) -> &[String] {
        &self.config.navlist
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// The entries, sorted by date, oldest first.
    pub fn blog_webpages(&self) -> &[BlogPage] {
        &self.blog_webpages
    }

    pub fn static_webpages(&self) -> &[WebPage] {
        &self.static_webpages
    }

    /// The tags, sorted by label.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// The entries `tag` points at, in the order they were indexed.
    pub fn tag_targets<'a>(&'a self, tag: &'a Tag) -> impl Iterator<Item = &'a BlogPage> + 'a {
        tag.targets()
            .iter()
            .filter_map(move |&i| self.blog_webpages.get(i))
    }

    /// Resolves `name` against the `in/` directory.
    pub fn in_directory(&self, name: &str) -> PathBuf {
        self.location.join(config::IN_ROOT_DIRECTORY).join(name)
    }

    pub fn output_root(&self) -> PathBuf {
        self.location.join(OUT_ROOT_DIRECTORY)
    }

    /// The directory this build writes into: `out/<YYYYMMDDhhmmss>`.
    pub fn output_run_directory(&self) -> PathBuf {
        self.output_root()
            .join(self.now.format(RUN_DIRECTORY_FORMAT).to_string())
    }
}

/// Returns the paths in `directory` accepted by `keep`, sorted by name. A
/// missing `directory` yields nothing.
fn list(directory: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Ok(Vec::new());
    }

    let annotate = |err| Error::Io {
        path: directory.to_owned(),
        err,
    };
    let mut paths = Vec::new();
    for result in read_dir(directory).map_err(annotate)? {
        let path = result.map_err(annotate)?.path();
        if keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

impl fmt::Display for Blog {
    /// Summarizes everything that was read, one page or tag per line.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Blog Location: {}", self.location.display())?;
        writeln!(f, "Title: {}", self.title())?;
        writeln!(f, "Author: {}", self.author())?;
        writeln!(f, "Navlist: {}", self.navlist().join(", "))?;
        writeln!(f, "Static Pages:")?;
        for page in &self.static_webpages {
            writeln!(f, "  {} ({})", page.title(), page.source().display())?;
        }
        writeln!(f, "Blog Pages:")?;
        for page in &self.blog_webpages {
            writeln!(
                f,
                "  {} by {} on {} [{}]",
                page.title(),
                page.author(),
                page.date(),
                page.tags().join(", ")
            )?;
        }
        writeln!(f, "Tags:")?;
        for tag in &self.tags {
            let titles: Vec<&str> = self.tag_targets(tag).map(BlogPage::title).collect();
            writeln!(f, "  {}: {}", tag.label(), titles.join(", "))?;
        }
        Ok(())
    }
}

/// The result of opening or reading a [`Blog`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error opening or reading a [`Blog`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the blog location isn't a directory.
    InvalidRoot(PathBuf),

    /// Returned when `in/genablog.cfg` doesn't exist.
    MissingConfig(PathBuf),

    /// Returned when the site configuration can't be read.
    Config(FileError),

    /// Returned for I/O errors listing an input directory.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidRoot(path) => {
                write!(f, "{} is not a valid directory", path.display())
            }
            Error::MissingConfig(path) => {
                write!(f, "Blog configuration file {} not found", path.display())
            }
            Error::Config(err) => err.fmt(f),
            Error::Io { path, err } => {
                write!(f, "Reading directory '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidRoot(_) => None,
            Error::MissingConfig(_) => None,
            Error::Config(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

impl From<FileError> for Error {
    /// Converts a [`FileError`] into an [`Error`]. This allows us to use the
    /// `?` operator when reading the site configuration.
    fn from(err: FileError) -> Error {
        Error::Config(err)
    }
}
