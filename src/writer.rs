use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::{fmt, fs};

use crate::error::{Error, Result};
use crate::parser::Sections;

/// Text form of `sections` in iteration order, with values emitted verbatim.
///
/// Consecutive sections are separated by a blank line.
pub struct Render<'a>(pub &'a Sections);

impl fmt::Display for Render<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.0.values().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }

            writeln!(f, "[{}]", section.name())?;

            for entry in section.entries() {
                writeln!(f, "{}={}", entry.key(), entry.value())?;
            }
        }

        Ok(())
    }
}

pub fn write_sections<W: Write>(sections: &Sections, writer: &mut W) -> io::Result<()> {
    write!(writer, "{}", Render(sections))
}

/// Create or truncate `path` and write `sections` into it.
pub fn save(sections: &Sections, path: &Path) -> Result<()> {
    let file = fs::File::create(path).map_err(|source| Error::io(path, source))?;
    let mut writer = BufWriter::new(file);

    write_sections(sections, &mut writer)
        .and_then(|()| writer.flush())
        .map_err(|source| Error::io(path, source))?;

    tracing::debug!(path = %path.display(), sections = sections.len(), "saved desktop file");

    Ok(())
}
