//! Recursive copying of asset directories into the output tree.

use log::debug;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Files are streamed in chunks of this many bytes.
const CHUNK_SIZE: usize = 2048;

/// Copies the tree at `source` into `target`, creating `target` and any
/// subdirectories as needed. Entries whose name starts with `.` are skipped
/// along with everything beneath them. A missing `source` is not an error;
/// nothing is copied. Returns the number of files copied.
pub fn copy_dir(source: &Path, target: &Path) -> Result<usize> {
    if !source.is_dir() {
        return Ok(0);
    }
    create_dir(target)?;

    let mut copied = 0;
    let walker = WalkDir::new(source)
        .follow_links(true)
        .min_depth(1)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));
    for result in walker {
        let entry = result?;
        let relative = match entry.path().strip_prefix(source) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let destination = target.join(relative);
        if entry.file_type().is_dir() {
            create_dir(&destination)?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &destination)?;
            debug!("Copied {}", destination.display());
            copied += 1;
        }
    }
    Ok(copied)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })
}

/// Copies one file byte-for-byte, [`CHUNK_SIZE`] bytes at a time.
fn copy_file(source: &Path, target: &Path) -> Result<()> {
    let mut reader = File::open(source).map_err(annotate(source))?;
    let mut writer = File::create(target).map_err(annotate(target))?;
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(annotate(source)(e)),
        };
        writer
            .write_all(&buffer[..read])
            .map_err(annotate(target))?;
    }
    writer.flush().map_err(annotate(target))
}

fn annotate(path: &Path) -> impl FnOnce(io::Error) -> Error {
    let path = path.to_owned();
    move |err| Error::Io { path, err }
}

/// The result of an asset-copying operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error copying assets.
#[derive(Debug)]
pub enum Error {
    /// Returned when the source tree can't be walked.
    WalkDir(walkdir::Error),

    /// Returned for I/O errors reading or writing a specific path.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::WalkDir(err) => err.fmt(f),
            Error::Io { path, err } => {
                write!(f, "Copying asset '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::WalkDir(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator while walking the source tree.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn read_tree(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files: Vec<(PathBuf, Vec<u8>)> = WalkDir::new(root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                (
                    entry.path().strip_prefix(root).unwrap().to_owned(),
                    fs::read(entry.path()).unwrap(),
                )
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_copy_dir() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let source = dir.path().join("assets");
        fs::create_dir_all(source.join("img/icons"))?;
        fs::create_dir_all(source.join(".git"))?;
        fs::write(source.join("blog.css"), "body {}")?;
        fs::write(source.join(".DS_Store"), "junk")?;
        fs::write(source.join(".git/HEAD"), "ref")?;
        fs::write(source.join("img/icons/.keep"), "")?;
        // larger than one chunk
        let big: Vec<u8> = (0..(CHUNK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        fs::write(source.join("img/icons/big.bin"), &big)?;

        let first = dir.path().join("out1/_global");
        let second = dir.path().join("out2/_global");
        assert_eq!(2, copy_dir(&source, &first)?);
        assert_eq!(2, copy_dir(&source, &second)?);

        let tree = read_tree(&first);
        assert_eq!(
            vec![PathBuf::from("blog.css"), PathBuf::from("img/icons/big.bin")],
            tree.iter().map(|(path, _)| path.clone()).collect::<Vec<_>>()
        );
        assert_eq!(big, tree[1].1);
        assert_eq!(tree, read_tree(&second));
        assert!(!first.join(".git").exists());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_dir_skips_hidden_non_utf8_names(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new()?;
        let source = dir.path().join("assets");
        fs::create_dir_all(&source)?;
        let hidden = OsStr::from_bytes(b".cache\xff");
        let visible = OsStr::from_bytes(b"photo\xff.jpg");
        if fs::write(source.join(hidden), "junk").is_err() {
            // the file system only takes UTF-8 names
            return Ok(());
        }
        fs::write(source.join(visible), "jpeg")?;

        let target = dir.path().join("out");
        assert_eq!(1, copy_dir(&source, &target)?);
        assert!(!target.join(hidden).exists());
        assert!(target.join(visible).exists());
        Ok(())
    }

    #[test]
    fn test_copy_missing_dir_is_noop() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let target = dir.path().join("target");
        assert_eq!(0, copy_dir(&dir.path().join("missing"), &target)?);
        assert!(!target.exists());
        Ok(())
    }
}
