//! The page-emission pipeline. [`write_all`] creates a fresh run directory and
//! fills it with the root pages, the yearly archive pages, one page per entry,
//! one page per tag and the copied assets.
//!
//! Every page is wrapped in the user's header and footer fragments. Pages
//! live either in the run directory itself (depth 0) or one directory below
//! it (depth 1), and links to other pages and to the global assets are
//! prefixed with one `../` per level of depth.

use crate::assets;
use crate::blog::Blog;
use crate::config;
use crate::page::{BlogPage, WebPage};
use crate::tag::Tag;
use crate::util::{read_to_string, FileError};
use chrono::Datelike;
use log::{debug, info, warn};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Run subdirectory holding one archive page per year.
pub const YEARS_DIRECTORY: &str = "years";
/// Run subdirectory holding one page per entry.
pub const BLOG_DIRECTORY: &str = "blog";
/// Run subdirectory holding one page per tag.
pub const TAGS_DIRECTORY: &str = "tags";
/// Run subdirectory holding all copied assets.
pub const ASSETS_DIRECTORY: &str = "assets";
/// Subdirectory of [`ASSETS_DIRECTORY`] holding the global assets.
pub const GLOBAL_ASSETS_DIRECTORY: &str = "_global";

/// References to global assets in the header and footer fragments.
const GLOBAL_ASSETS_REFERENCE: &str = "assets/_global";
/// References to an entry's own assets in its body.
const ENTRY_ASSETS_REFERENCE: &str = "assets/";

/// Creates the run directory and writes the whole site into it. Returns the
/// run directory. Nothing is written if the run directory already exists.
pub fn write_all(blog: &Blog) -> Result<PathBuf> {
    let run_directory = create_output_directories(blog)?;
    let writer = Writer::new(blog, &run_directory)?;
    writer.warn_escaping_names();

    info!("Writing root pages");
    writer.write_root_pages()?;
    info!("Writing year pages");
    writer.write_years_pages()?;
    info!("Writing blog pages");
    writer.write_blog_pages()?;
    info!("Writing tag pages");
    writer.write_tags_pages()?;
    info!("Copying assets");
    writer.copy_assets()?;

    info!("Wrote {}", run_directory.display());
    Ok(run_directory)
}

/// Creates the output root if needed, then the run directory with its
/// `years/`, `blog/`, `tags/` and `assets/` subdirectories.
pub fn create_output_directories(blog: &Blog) -> Result<PathBuf> {
    let output_root = blog.output_root();
    fs::create_dir_all(&output_root).map_err(annotate(&output_root))?;

    let run_directory = blog.output_run_directory();
    if run_directory.exists() {
        return Err(Error::RunDirectoryExists(run_directory));
    }
    match fs::create_dir(&run_directory) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(Error::RunDirectoryExists(run_directory))
        }
        Err(e) => return Err(annotate(&run_directory)(e)),
    }

    for name in &[YEARS_DIRECTORY, BLOG_DIRECTORY, TAGS_DIRECTORY, ASSETS_DIRECTORY] {
        let path = run_directory.join(name);
        fs::create_dir(&path).map_err(annotate(&path))?;
    }
    Ok(run_directory)
}

/// Writes the pages of a [`Blog`] into a run directory which already exists
/// (see [`create_output_directories`]).
pub struct Writer<'a> {
    blog: &'a Blog,
    run_directory: &'a Path,

    /// The contents of `in/header.html`.
    header: String,

    /// The contents of `in/footer.html`.
    footer: String,
}

impl<'a> Writer<'a> {
    /// Loads the header and footer fragments.
    pub fn new(blog: &'a Blog, run_directory: &'a Path) -> Result<Writer<'a>> {
        let in_root = blog.location().join(config::IN_ROOT_DIRECTORY);
        Ok(Writer {
            blog,
            run_directory,
            header: read_to_string(&in_root.join(config::HEADER_FILE), "header")?,
            footer: read_to_string(&in_root.join(config::FOOTER_FILE), "footer")?,
        })
    }

    /// Writes `index.html`, `tags.html` and the static pages.
    pub fn write_root_pages(&self) -> Result<()> {
        let mut index = self.create(Path::new("index.html"))?;
        self.write_header(&mut index, 0)?;
        index.write(&index_body(
            self.blog.blog_webpages(),
            self.blog.now().year(),
        ))?;
        self.write_footer(&mut index, 0)?;
        index.finish()?;

        let mut tags = self.create(Path::new("tags.html"))?;
        self.write_header(&mut tags, 0)?;
        tags.write(&tags_index_body(self.blog.tags()))?;
        self.write_footer(&mut tags, 0)?;
        tags.finish()?;

        for page in self.blog.static_webpages() {
            let contents = read_to_string(page.source(), "static page")?;
            let mut out = self.create(Path::new(&page.page_name()))?;
            self.write_header(&mut out, 0)?;
            out.write(&contents)?;
            self.write_footer(&mut out, 0)?;
            out.finish()?;
        }
        Ok(())
    }

    /// Writes `years/<year>.html` for every year that has entries.
    pub fn write_years_pages(&self) -> Result<()> {
        for (year, pages) in year_groups(self.blog.blog_webpages()) {
            let relative = Path::new(YEARS_DIRECTORY).join(format!("{}.html", year));
            let mut out = self.create(&relative)?;
            self.write_header(&mut out, 1)?;
            out.write(&group_header(&year.to_string()))?;
            for page in pages {
                out.write(&entry_link(page, 1))?;
            }
            out.write("</div>\n")?;
            self.write_footer(&mut out, 1)?;
            out.finish()?;
        }
        Ok(())
    }

    /// Writes `blog/<title>.html` for every entry: a metadata block followed
    /// by the entry's body, whose asset references are pointed at the entry's
    /// copied assets.
    pub fn write_blog_pages(&self) -> Result<()> {
        for page in self.blog.blog_webpages() {
            let body = read_to_string(&page.body_path(), "entry body")?;
            let relative = Path::new(BLOG_DIRECTORY).join(page.page_name());
            let mut out = self.create(&relative)?;
            self.write_header(&mut out, 1)?;
            out.write(&metadata_block(page))?;
            out.write(&rewrite_entry_assets(&body, page.title()))?;
            self.write_footer(&mut out, 1)?;
            out.finish()?;
        }
        Ok(())
    }

    /// Writes `tags/<label>.html` for every tag, linking its entries in the
    /// order they were indexed.
    pub fn write_tags_pages(&self) -> Result<()> {
        for tag in self.blog.tags() {
            let relative = Path::new(TAGS_DIRECTORY).join(tag.page_name());
            let mut out = self.create(&relative)?;
            self.write_header(&mut out, 1)?;
            out.write(&format!(
                "<div class='gb_link_grouping'>\n<span class='gb_header'>{}</span><br/>\n",
                tag.label()
            ))?;
            for page in self.blog.tag_targets(tag) {
                out.write(&entry_link(page, 1))?;
            }
            out.write("</div>\n")?;
            self.write_footer(&mut out, 1)?;
            out.finish()?;
        }
        Ok(())
    }

    /// Reports entry titles and tag labels which would be written outside
    /// their own file or asset directory. They are still written.
    pub fn warn_escaping_names(&self) {
        for page in self.blog.blog_webpages() {
            if output_name_escapes(page.title()) {
                warn!(
                    "Entry title `{}` ({}) escapes its output location",
                    page.title(),
                    page.source_location().display()
                );
            }
        }
        for tag in self.blog.tags() {
            if output_name_escapes(tag.label()) {
                warn!("Tag `{}` escapes its output location", tag.label());
            }
        }
    }

    /// Copies `in/assets/` to `assets/_global/` and each entry's `assets/` to
    /// `assets/<title>/`.
    pub fn copy_assets(&self) -> Result<()> {
        let assets_directory = self.run_directory.join(ASSETS_DIRECTORY);
        assets::copy_dir(
            &self.blog.in_directory(config::GLOBAL_ASSETS_DIRECTORY),
            &assets_directory.join(GLOBAL_ASSETS_DIRECTORY),
        )?;
        for page in self.blog.blog_webpages() {
            assets::copy_dir(&page.assets_path(), &assets_directory.join(page.title()))?;
        }
        Ok(())
    }

    /// Writes the header fragment, with global asset references adjusted for
    /// `depth`, followed by the navigation bar.
    pub fn write_header(&self, out: &mut PageFile, depth: usize) -> Result<()> {
        let prefix = depth_prefix(depth);
        out.write(&rewrite_global_assets(&self.header, &prefix))?;
        out.write(&navbar(
            &prefix,
            !self.blog.tags().is_empty(),
            self.blog.static_webpages(),
        ))
    }

    /// Writes the footer fragment, with global asset references adjusted for
    /// `depth`.
    pub fn write_footer(&self, out: &mut PageFile, depth: usize) -> Result<()> {
        out.write(&rewrite_global_assets(&self.footer, &depth_prefix(depth)))
    }

    fn create(&self, relative: &Path) -> Result<PageFile> {
        let path = self.run_directory.join(relative);
        debug!("Writing {}", path.display());
        let file = File::create(&path).map_err(annotate(&path))?;
        Ok(PageFile {
            out: BufWriter::new(file),
            path,
        })
    }
}

/// An output file being written. Errors name the file.
pub struct PageFile {
    path: PathBuf,
    out: BufWriter<File>,
}

impl PageFile {
    pub fn write(&mut self, s: &str) -> Result<()> {
        self.out
            .write_all(s.as_bytes())
            .map_err(annotate(&self.path))
    }

    /// Flushes and closes the file.
    pub fn finish(mut self) -> Result<()> {
        self.out.flush().map_err(annotate(&self.path))
    }
}

/// `../` repeated `depth` times.
pub fn depth_prefix(depth: usize) -> String {
    "../".repeat(depth)
}

/// Prefixes every `assets/_global` in `fragment` with `prefix`.
pub fn rewrite_global_assets(fragment: &str, prefix: &str) -> String {
    fragment.replace(
        GLOBAL_ASSETS_REFERENCE,
        &format!("{}{}", prefix, GLOBAL_ASSETS_REFERENCE),
    )
}

/// Replaces every `assets/` in an entry body with `../assets/<title>/`. This
/// is plain text substitution, anywhere in the body.
pub fn rewrite_entry_assets(body: &str, title: &str) -> String {
    body.replace(
        ENTRY_ASSETS_REFERENCE,
        &format!("../{}/{}/", ASSETS_DIRECTORY, title),
    )
}

/// The navigation bar: Home, Tags (only if `has_tags`), every static page,
/// in discovery order.
pub fn navbar(prefix: &str, has_tags: bool, static_webpages: &[WebPage]) -> String {
    let nav_link = |href: &str, text: &str| {
        format!(
            "<a class='gb_navbar_link' href='{}{}'>{}</a> - ",
            prefix, href, text
        )
    };

    let mut navbar = String::from("<div class='gb_navbar'>- - - ");
    navbar.push_str(&nav_link("index.html", "Home"));
    if has_tags {
        navbar.push_str(&nav_link("tags.html", "Tags"));
    }
    for page in static_webpages {
        navbar.push_str(&nav_link(&page.page_name(), page.title()));
    }
    navbar.push_str("- -<br/>\n</div>\n");
    navbar
}

/// Whether `name`, used as a file or directory name under the run directory,
/// lands somewhere other than its own entry: the global asset directory, a
/// parent directory, or a nested path.
pub fn output_name_escapes(name: &str) -> bool {
    name == GLOBAL_ASSETS_DIRECTORY
        || name == "."
        || name == ".."
        || name.contains(|c: char| c == '/' || c == '\\')
}

fn link(href: &str, text: &str) -> String {
    format!("<a class='gb_link' href='{}'>{}</a><br/>\n", href, text)
}

/// A link to an entry's page from a page at `depth`.
fn entry_link(page: &BlogPage, depth: usize) -> String {
    link(
        &format!("{}{}/{}", depth_prefix(depth), BLOG_DIRECTORY, page.page_name()),
        page.title(),
    )
}

fn group_header(text: &str) -> String {
    format!(
        "<div class='gb_link_grouping'><span class='gb_header'>{}</span><br/>\n",
        text
    )
}

/// The body of `index.html`. Entries from `current_year` are grouped by
/// month, newest first. Older (and newer) years are listed under "Archive",
/// in the order they are met walking the entries newest first.
pub fn index_body(pages: &[BlogPage], current_year: i32) -> String {
    let mut body = String::from("<div class='gb_link_area'>\n");
    let mut month: Option<u32> = None;
    let mut years: Vec<i32> = Vec::new();

    for page in pages.iter().rev() {
        if page.year() == current_year {
            let page_month = page.date().month();
            if month.map_or(true, |current| page_month < current) {
                if month.is_some() {
                    body.push_str("</div>\n");
                }
                month = Some(page_month);
                body.push_str(&group_header(&page.date().format("%B").to_string()));
            }
            body.push_str(&entry_link(page, 0));
        } else if !years.contains(&page.year()) {
            years.push(page.year());
        }
    }
    if month.is_some() {
        body.push_str("</div>\n");
    }

    body.push_str("<div class='gb_link_grouping'>\n<span class='gb_header'>Archive</span><br/>\n");
    for year in years {
        body.push_str(&link(
            &format!("{}/{}.html", YEARS_DIRECTORY, year),
            &year.to_string(),
        ));
    }
    body.push_str("</div>\n</div>\n<br/>\n");
    body
}

/// The body of `tags.html`. Tags must be sorted by label. A letter header is
/// started whenever a label's first character is greater than the last
/// header's, starting from `?`.
pub fn tags_index_body(tags: &[Tag]) -> String {
    let mut body = String::from("<div class='gb_link_area'>\n<div class='gb_link_grouping'>");
    let mut watermark = '?';

    for tag in tags {
        if let Some(first) = tag.label().chars().next() {
            if watermark < first {
                watermark = first;
                body.push_str("</div>\n");
                body.push_str(&group_header(&first.to_uppercase().to_string()));
            }
        }
        body.push_str(&link(
            &format!("{}/{}", TAGS_DIRECTORY, tag.page_name()),
            tag.label(),
        ));
    }
    body.push_str("</div>\n</div>\n<br/>\n");
    body
}

/// Groups entries (sorted oldest first) by year, newest year first, each
/// group newest first. A new group starts whenever the year drops.
pub fn year_groups(pages: &[BlogPage]) -> Vec<(i32, Vec<&BlogPage>)> {
    let mut groups: Vec<(i32, Vec<&BlogPage>)> = Vec::new();
    for page in pages.iter().rev() {
        match groups.last_mut() {
            Some((year, group)) if page.year() >= *year => group.push(page),
            _ => groups.push((page.year(), vec![page])),
        }
    }
    groups
}

/// The title, author and date lines shown above an entry's body.
pub fn metadata_block(page: &BlogPage) -> String {
    format!(
        "<span class='gb_blog_title'>{}</span><br/>\n\
         <span class='gb_blog_author'>{}</span><br/>\n\
         <span class='gb_blog_date'>{}</span><br/>\n",
        page.title(),
        page.author(),
        page.date().format("%Y-%m-%d"),
    )
}

fn annotate(path: &Path) -> impl FnOnce(io::Error) -> Error {
    let path = path.to_owned();
    move |err| Error::Io { path, err }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned when this run's output directory already exists. Nothing is
    /// written in that case.
    RunDirectoryExists(PathBuf),

    /// Returned when a source file (header, footer, entry body, static page)
    /// can't be read.
    Source(FileError),

    /// Returned for I/O errors creating or writing an output path.
    Io { path: PathBuf, err: io::Error },

    /// Returned for errors copying assets.
    Assets(assets::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::RunDirectoryExists(path) => {
                write!(f, "Output directory {} already exists", path.display())
            }
            Error::Source(err) => err.fmt(f),
            Error::Io { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::Assets(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::RunDirectoryExists(_) => None,
            Error::Source(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
            Error::Assets(err) => Some(err),
        }
    }
}

impl From<FileError> for Error {
    /// Converts a [`FileError`] into an [`Error`]. This allows us to use the
    /// `?` operator when reading source files.
    fn from(err: FileError) -> Error {
        Error::Source(err)
    }
}

impl From<assets::Error> for Error {
    /// Converts an [`assets::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator when copying assets.
    fn from(err: assets::Error) -> Error {
        Error::Assets(err)
    }
}
