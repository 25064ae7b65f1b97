#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

mod entry;
mod error;
mod exec;
mod parser;
mod section;
mod writer;

use std::borrow::Cow;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::{fmt, fs, str};

pub use entry::Entry;
pub use error::{Error, ParseErrorKind, Result};
pub use exec::{ExecTokenizer, Token};
pub use section::Section;

use parser::{Parser, Sections};

/// An in-memory desktop entry file: ordered sections of ordered `key=value` entries.
///
/// Comments and blank lines are not preserved; writing a file emits only its sections and
/// entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesktopFile {
    path: Option<PathBuf>,
    sections: Sections,
}

impl DesktopFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse the file at `path`, remembering the path for [`DesktopFile::save`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Parse`] if it is malformed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = Self::new();
        file.read(path)?;
        Ok(file)
    }

    /// Parse desktop entry data from a stream. The resulting file has no path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the stream cannot be read and [`Error::Parse`] if it is
    /// malformed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut file = Self::new();
        file.read_from(reader)?;
        Ok(file)
    }

    /// Replace the contents of `self` with the file at `path`.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD rather than rejected. On failure the previous contents
    /// and path are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Parse`] if it is malformed.
    pub fn read(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| Error::io(path, source))?;

        self.sections = Parser::new(&decode_data(&data)).into_sections()?;
        self.path = Some(path.to_owned());

        tracing::debug!(
            path = %path.display(),
            sections = self.sections.len(),
            "read desktop file"
        );

        Ok(())
    }

    /// Replace the contents of `self` with data parsed from `reader`, keeping the current path.
    ///
    /// On failure the previous contents are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the stream cannot be read and [`Error::Parse`] if it is
    /// malformed.
    pub fn read_from<R: Read>(&mut self, mut reader: R) -> Result<()> {
        let mut data = Vec::with_capacity(4096);
        reader.read_to_end(&mut data).map_err(Error::Read)?;

        self.sections = Parser::new(&decode_data(&data)).into_sections()?;

        tracing::debug!(sections = self.sections.len(), "read desktop file from stream");

        Ok(())
    }

    /// Write the file back to the path it was read from or last given via
    /// [`DesktopFile::set_path`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPath`] if there is no path and [`Error::Io`] if writing fails.
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_deref().ok_or(Error::MissingPath)?;
        writer::save(&self.sections, path)
    }

    /// Create or overwrite the file at `path`. The stored path is not changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        writer::save(&self.sections, path.as_ref())
    }

    /// # Errors
    ///
    /// Returns any error produced by `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer::write_sections(&self.sections, writer)
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Remove every section, keeping the path.
    pub fn clear(&mut self) {
        self.sections.clear();
    }

    /// Look up a section by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSection`] if the file has no such section.
    pub fn section(&self, name: &str) -> Result<&Section> {
        self.sections
            .get(name)
            .ok_or_else(|| Error::UnknownSection(name.to_owned()))
    }

    /// Iterate over sections in file order.
    pub fn sections(&self) -> impl ExactSizeIterator<Item = &Section> {
        self.sections.values()
    }

    pub fn section_names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    #[must_use]
    pub fn entry_exists(&self, section: &str, key: &str) -> bool {
        self.get_entry(section, key).is_some()
    }

    #[must_use]
    pub fn get_entry(&self, section: &str, key: &str) -> Option<&Entry> {
        self.sections.get(section)?.get(key)
    }

    /// Store `entry` in `section`, creating the section if needed.
    ///
    /// Returns whether an entry with the same key already existed and was replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSectionName`] or [`Error::InvalidKey`] if the section name or key
    /// could not be read back from the written file, such as an empty key.
    pub fn set_entry(&mut self, section: &str, entry: Entry) -> Result<bool> {
        if section.contains(['[', ']', '\n', '\r']) {
            return Err(Error::InvalidSectionName(section.to_owned()));
        }

        if !is_writable_key(entry.key()) {
            return Err(Error::InvalidKey(entry.key().to_owned()));
        }

        Ok(self
            .sections
            .entry(section.to_owned())
            .or_insert_with(|| Section::new(section))
            .insert(entry)
            .is_some())
    }

    /// Change the value of an existing entry, returning whether it was found.
    pub fn set_value(&mut self, section: &str, key: &str, value: impl Into<String>) -> bool {
        self.sections
            .get_mut(section)
            .is_some_and(|section| section.set_value(key, value))
    }

    pub fn remove_entry(&mut self, section: &str, key: &str) -> Option<Entry> {
        self.sections.get_mut(section)?.remove(key)
    }

    /// Placeholder for running an external validator such as `desktop-file-validate`.
    ///
    /// # Errors
    ///
    /// Currently never fails.
    #[allow(clippy::unnecessary_wraps)]
    pub fn validate(&self) -> Result<()> {
        tracing::debug!(path = ?self.path, "skipping external validation");
        Ok(())
    }
}

impl str::FromStr for DesktopFile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self {
            path: None,
            sections: Parser::new(s).into_sections()?,
        })
    }
}

impl fmt::Display for DesktopFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&writer::Render(&self.sections), f)
    }
}

// Desktop entry files are meant to be UTF-8, but stray Latin-1 bytes in comments are common.
fn decode_data(data: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(data)
}

/// Whether a key set through the API would be read back unchanged.
fn is_writable_key(key: &str) -> bool {
    !key.is_empty()
        && key.trim_matches(' ') == key
        && !key.starts_with('#')
        && !key.contains(['=', '\n', '\r'])
        && parser::is_valid_key(key)
}
