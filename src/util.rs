use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// An I/O failure on a named input file, e.g., the header fragment or an
/// entry body.
#[derive(Debug)]
pub struct FileError {
    pub kind: &'static str,
    pub path: PathBuf,
    pub err: io::Error,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Opening {} file `{}`: {}",
            self.kind,
            self.path.display(),
            self.err
        )
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

pub fn open(path: &Path, kind: &'static str) -> Result<File, FileError> {
    File::open(path).map_err(|err| FileError {
        kind,
        path: path.to_owned(),
        err,
    })
}

/// Reads the whole of `path` into a string. `kind` names the file in the
/// error message.
pub fn read_to_string(path: &Path, kind: &'static str) -> Result<String, FileError> {
    let mut contents = String::new();
    open(path, kind)?
        .read_to_string(&mut contents)
        .map_err(|err| FileError {
            kind,
            path: path.to_owned(),
            err,
        })?;
    Ok(contents)
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_to_string_missing_file() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("header.html");
        match read_to_string(&path, "header") {
            Ok(_) => panic!("wanted an error for a missing file"),
            Err(e) => {
                assert_eq!(path, e.path);
                assert_eq!(io::ErrorKind::NotFound, e.err.kind());
                assert!(e.to_string().starts_with("Opening header file"));
            }
        }
        Ok(())
    }

    #[test]
    fn test_read_to_string() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let path = dir.path().join("footer.html");
        std::fs::write(&path, "</body>\n")?;
        assert_eq!("</body>\n", read_to_string(&path, "footer")?);
        Ok(())
    }
}
