//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output site: opening the blog and reading its
//! sources ([`crate::blog`]), then writing every page and copying the assets
//! into a fresh run directory ([`crate::write`]).

use crate::blog::{Blog, Error as ReadError};
use crate::write::Error as WriteError;
use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::path::{Path, PathBuf};

/// Builds the blog at `location` using the local time. Returns the run
/// directory the site was written to.
pub fn build_site(location: &Path) -> Result<PathBuf> {
    build_site_at(location, Local::now().naive_local())
}

/// Builds the blog at `location` as if at `now`, which names the run
/// directory and decides the current year.
pub fn build_site_at(location: &Path, now: NaiveDateTime) -> Result<PathBuf> {
    let mut blog = Blog::open_at(location, now)?;
    blog.read_all()?;
    Ok(blog.write_all()?)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during reading or
/// writing.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors opening the blog or reading its sources.
    Read(ReadError),

    /// Returned for errors writing the output site.
    Write(WriteError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read(err) => Some(err),
            Error::Write(err) => Some(err),
        }
    }
}

impl From<ReadError> for Error {
    /// Converts [`ReadError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ReadError) -> Error {
        Error::Read(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str =
        "<html>\n<link rel=\"stylesheet\" href=\"assets/_global/blog.css\">\n<body>\n";
    const FOOTER: &str = "<footer><img src='assets/_global/logo.png'></footer>\n</body>\n";

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 6, 1)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    fn blog(config: &str) -> std::io::Result<TempDir> {
        let dir = TempDir::new()?;
        let root = dir.path();
        fs::create_dir_all(root.join("in/blog"))?;
        fs::create_dir_all(root.join("in/assets/img"))?;
        fs::write(root.join("in/genablog.cfg"), config)?;
        fs::write(root.join("in/header.html"), HEADER)?;
        fs::write(root.join("in/footer.html"), FOOTER)?;
        fs::write(root.join("in/assets/blog.css"), "body {}")?;
        fs::write(root.join("in/assets/img/logo.png"), &[0u8, 1, 2, 3])?;
        fs::write(root.join("in/assets/.hidden"), "x")?;
        Ok(dir)
    }

    fn entry(root: &Path, directory: &str, meta: &str, body: &str) -> std::io::Result<()> {
        let path = root.join("in/blog").join(directory);
        fs::create_dir_all(path.join("assets"))?;
        fs::write(path.join("meta.cfg"), meta)?;
        fs::write(path.join("body.html"), body)?;
        fs::write(path.join("assets/photo.jpg"), directory)?;
        Ok(())
    }

    fn read(path: PathBuf) -> std::io::Result<String> {
        fs::read_to_string(path)
    }

    #[test]
    fn test_single_current_year_entry() -> TestResult {
        let dir = blog("title: Test\nauthor: Jane\n")?;
        let root = dir.path();
        entry(
            root,
            "hello",
            "title: Hello World\ndate: 2021-03-14\ntags: a,b\n",
            "<img src='assets/photo.jpg'><a href='assets/photo.jpg'>photo</a>\n",
        )?;

        let run = build_site_at(root, now())?;
        assert_eq!(root.join("out/20210601090000"), run);

        let index = read(run.join("index.html"))?;
        assert_eq!(1, index.matches("<span class='gb_header'>March</span>").count());
        assert_eq!(1, index.matches("href='blog/Hello_World.html'>Hello World</a>").count());
        assert!(!index.contains("years/"));
        assert!(index.contains("href=\"assets/_global/blog.css\""));

        let tags = read(run.join("tags.html"))?;
        assert!(tags.contains("href='tags/a.html'>a</a>"));
        assert!(tags.contains("href='tags/b.html'>b</a>"));
        for label in &["a", "b"] {
            let page = read(run.join("tags").join(format!("{}.html", label)))?;
            assert_eq!(1, page.matches("class='gb_link'").count());
            assert!(page.contains("href='../blog/Hello_World.html'"));
        }

        let post = read(run.join("blog/Hello_World.html"))?;
        assert!(post.contains("<span class='gb_blog_title'>Hello World</span><br/>\n"));
        assert!(post.contains("<span class='gb_blog_author'>Jane</span><br/>\n"));
        assert!(post.contains("<span class='gb_blog_date'>2021-03-14</span><br/>\n"));
        assert!(post.contains(
            "<img src='../assets/Hello World/photo.jpg'><a href='../assets/Hello World/photo.jpg'>"
        ));
        assert!(post.contains("href=\"../assets/_global/blog.css\""));
        assert!(post.contains("src='../assets/_global/logo.png'"));
        assert!(post.contains("href='../index.html'>Home</a>"));
        assert!(post.contains("href='../tags.html'>Tags</a>"));

        assert_eq!(
            "hello",
            read(run.join("assets/Hello World/photo.jpg"))?
        );
        assert_eq!(vec![0u8, 1, 2, 3], fs::read(run.join("assets/_global/img/logo.png"))?);
        assert!(!run.join("assets/_global/.hidden").exists());
        Ok(())
    }

    #[test]
    fn test_shared_tag_across_years() -> TestResult {
        let dir = blog("title: Test\n")?;
        let root = dir.path();
        entry(root, "new", "title: Newer\ndate: 2020-02-02\ntags: x\n", "new")?;
        entry(root, "old", "title: Older\ndate: 2019-07-07\ntags: x\n", "old")?;

        let run = build_site_at(root, now())?;

        let tag = read(run.join("tags/x.html"))?;
        let older = tag.find("../blog/Older.html").unwrap();
        let newer = tag.find("../blog/Newer.html").unwrap();
        assert!(older < newer);

        for (year, title, other) in &[(2020, "Newer", "Older"), (2019, "Older", "Newer")] {
            let page = read(run.join("years").join(format!("{}.html", year)))?;
            assert_eq!(1, page.matches("class='gb_link'").count());
            assert!(page.contains(&format!("href='../blog/{}.html'", title)));
            assert!(!page.contains(other));
        }

        let index = read(run.join("index.html"))?;
        let y2020 = index.find("href='years/2020.html'").unwrap();
        let y2019 = index.find("href='years/2019.html'").unwrap();
        assert!(y2020 < y2019);
        Ok(())
    }

    #[test]
    fn test_navbar_without_navlist() -> TestResult {
        let dir = blog("title: Test\n")?;
        let root = dir.path();
        entry(root, "post", "date: 2021-01-01\n", "body")?;

        let run = build_site_at(root, now())?;
        let index = read(run.join("index.html"))?;
        assert_eq!(1, index.matches("class='gb_navbar_link'").count());
        assert!(index.contains("href='index.html'>Home</a>"));
        assert!(!index.contains("tags.html'>Tags"));
        Ok(())
    }

    #[test]
    fn test_static_pages_in_navbar() -> TestResult {
        // navlist items are summary-only; the navbar links static pages once
        let dir = blog("title: Test\nnavlist: About Me, Friends\n")?;
        let root = dir.path();
        fs::create_dir_all(root.join("in/static"))?;
        fs::write(root.join("in/static/About Me.html"), "<p>all about assets/_global</p>\n")?;
        entry(root, "post", "date: 2021-01-01\ntags: t\n", "body")?;

        let run = build_site_at(root, now())?;
        let about = read(run.join("About_Me.html"))?;
        assert!(about.starts_with(HEADER));
        assert!(about.contains("<p>all about assets/_global</p>\n"));
        assert!(about.ends_with(FOOTER));

        let tag = read(run.join("tags/t.html"))?;
        let navbar: Vec<&str> = tag
            .match_indices("class='gb_navbar_link' href='")
            .map(|(i, m)| {
                let start = i + m.len();
                let end = start + tag[start..].find('\'').unwrap();
                &tag[start..end]
            })
            .collect();
        assert_eq!(vec!["../index.html", "../tags.html", "../About_Me.html"], navbar);
        assert_eq!(1, tag.matches("About_Me.html").count());
        assert!(!tag.contains("Friends"));
        assert!(!run.join("Friends.html").exists());
        Ok(())
    }

    #[test]
    fn test_run_directory_exists() -> TestResult {
        let dir = blog("title: Test\n")?;
        let root = dir.path();
        fs::create_dir_all(root.join("out/20210601090000"))?;
        fs::write(root.join("out/20210601090000/index.html"), "keep me")?;

        match build_site_at(root, now()) {
            Err(Error::Write(WriteError::RunDirectoryExists(path))) => {
                assert_eq!(root.join("out/20210601090000"), path)
            }
            other => panic!("wanted RunDirectoryExists; found {:?}", other),
        }
        assert_eq!("keep me", read(root.join("out/20210601090000/index.html"))?);
        Ok(())
    }

    #[test]
    fn test_missing_entry_body_is_fatal() -> TestResult {
        let dir = blog("title: Test\n")?;
        let root = dir.path();
        fs::create_dir_all(root.join("in/blog/empty"))?;

        match build_site_at(root, now()) {
            Err(Error::Write(WriteError::Source(err))) => {
                assert_eq!(root.join("in/blog/empty/body.html"), err.path)
            }
            other => panic!("wanted a missing body error; found {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_missing_config_is_fatal() -> TestResult {
        let dir = TempDir::new()?;
        match build_site_at(dir.path(), now()) {
            Err(Error::Read(ReadError::MissingConfig(_))) => {}
            other => panic!("wanted MissingConfig; found {:?}", other),
        }
        assert!(!dir.path().join("out").exists());
        Ok(())
    }
}
