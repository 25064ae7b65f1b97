use std::str::Lines;

use indexmap::IndexMap;

use crate::entry::Entry;
use crate::error::{Error, ParseErrorKind, Result};
use crate::section::Section;

pub type Sections = IndexMap<String, Section>;

/// Represents an on-going parse.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Lines<'a>,
    line: usize,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line: 0,
        }
    }
}

impl Parser<'_> {
    /// Consume the input, returning every section in the order it first appeared.
    ///
    /// Repeated section headers reopen the existing section, and repeated keys overwrite the
    /// earlier value.
    pub fn into_sections(mut self) -> Result<Sections> {
        let mut sections = Sections::with_capacity(4);
        let mut current = None::<String>;

        while let Some(line) = self.lines.next() {
            self.line += 1;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if trimmed.starts_with('[') {
                let name = self.parse_section_header(trimmed)?;
                tracing::trace!(line = self.line, section = name, "opening section");

                sections
                    .entry(name.to_owned())
                    .or_insert_with(|| Section::new(name));
                current = Some(name.to_owned());
                continue;
            }

            let entry = self.parse_entry(line)?;
            let section = current
                .as_deref()
                .and_then(|name| sections.get_mut(name))
                .ok_or_else(|| self.error(ParseErrorKind::EntryOutsideSection))?;

            section.insert(entry);
        }

        Ok(sections)
    }

    /// Extract the name from a `[name]` line, which must contain exactly one bracket of each kind.
    fn parse_section_header<'l>(&self, trimmed: &'l str) -> Result<&'l str> {
        let name = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .filter(|name| !name.contains(['[', ']']))
            .ok_or_else(|| self.error(ParseErrorKind::MalformedSectionHeader))?;

        Ok(name)
    }

    /// Split a line on its first `=` into a validated key and its value.
    fn parse_entry(&self, line: &str) -> Result<Entry> {
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| self.error(ParseErrorKind::MissingDelimiter))?;

        let key = key.trim_matches(' ');
        let value = value.trim_matches(' ');

        if key.is_empty() {
            return Err(self.error(ParseErrorKind::EmptyKey));
        }

        if !is_valid_key(key) {
            return Err(self.error(ParseErrorKind::MalformedLocaleKey));
        }

        Ok(Entry::new(key, value))
    }

    fn error(&self, kind: ParseErrorKind) -> Error {
        Error::parse(self.line, kind)
    }
}

/// A key is either bracket-free or `base[locale]`, with both parts non-empty and bracket-free.
pub(crate) fn is_valid_key(key: &str) -> bool {
    let Some((base, rest)) = key.split_once('[') else {
        return !key.contains(']');
    };

    rest.strip_suffix(']').is_some_and(|locale| {
        !base.is_empty() && !base.contains(']') && !locale.is_empty() && !locale.contains(['[', ']'])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Sections> {
        Parser::new(text).into_sections()
    }

    fn parse_kind(text: &str) -> Option<ParseErrorKind> {
        match parse(text) {
            Err(Error::Parse { kind, .. }) => Some(kind),
            _ => None,
        }
    }

    #[test]
    fn simple_desktop_file() {
        let text = "\
[Desktop Entry]
Version=1.0
Name=name
Exec=exec
Icon=icon
Type=Application
Categories=Utility;Multimedia;
";

        let sections = parse(text).expect("failed to parse hardcoded desktop file");
        let section = &sections["Desktop Entry"];

        assert_eq!(section.len(), 6);
        assert_eq!(section.get("Name"), Some(&Entry::new("Name", "name")));
        assert_eq!(section.get("Type").map(Entry::value), Some("Application"));
        assert_eq!(
            section.get("Categories").map(Entry::as_list),
            Some(vec!["Utility".to_owned(), "Multimedia".to_owned()])
        );
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let text = "\
# leading comment

[Desktop Entry]
Name=name
   # indented comment
Exec=exec

";

        let sections = parse(text).expect("failed to parse hardcoded desktop file");
        let keys = sections["Desktop Entry"]
            .entries()
            .map(Entry::key)
            .collect::<Vec<_>>();

        assert_eq!(keys, ["Name", "Exec"]);
    }

    #[test]
    fn empty_input() {
        assert!(parse("").expect("empty input is valid").is_empty());
    }

    #[test]
    fn only_first_delimiter_splits() {
        let sections = parse("[Desktop Entry]\nName===name\n").expect("valid line");

        assert_eq!(
            sections["Desktop Entry"].get("Name"),
            Some(&Entry::new("Name", "==name"))
        );
    }

    #[test]
    fn surrounding_spaces_are_trimmed() {
        let text = "[Desktop Entry]\nName= What a great  name    \nExec =exec\n";
        let sections = parse(text).expect("valid lines");
        let section = &sections["Desktop Entry"];

        assert_eq!(section.get("Name").map(Entry::value), Some("What a great  name"));
        assert_eq!(section.get("Exec").map(Entry::value), Some("exec"));
    }

    #[test]
    fn entry_before_section() {
        assert_eq!(
            parse_kind("Name=name\n[Desktop Entry]\n"),
            Some(ParseErrorKind::EntryOutsideSection)
        );
    }

    #[test]
    fn missing_delimiter() {
        assert_eq!(
            parse_kind("[Desktop Entry]\nExec\n"),
            Some(ParseErrorKind::MissingDelimiter)
        );
        assert_eq!(
            parse_kind("[Desktop Entry]\nName name\n"),
            Some(ParseErrorKind::MissingDelimiter)
        );
    }

    #[test]
    fn empty_key() {
        assert_eq!(
            parse_kind("[Desktop Entry]\n=name\n"),
            Some(ParseErrorKind::EmptyKey)
        );
        assert_eq!(
            parse_kind("[Desktop Entry]\n   = name\n"),
            Some(ParseErrorKind::EmptyKey)
        );
    }

    #[test]
    fn broken_section_headers() {
        for header in [
            "[Desktop Entry",
            "[Desktop Entry]]",
            "[[Desktop Entry]",
            "[Desktop] Entry]",
            "[Desktop Entry] trailing",
        ] {
            let first = format!("{header}\ntest=test\n");
            let later = format!("[Desktop Entry]\ntest=test\n{header}\n");

            assert_eq!(
                parse_kind(&first),
                Some(ParseErrorKind::MalformedSectionHeader),
                "header: {header}"
            );
            assert_eq!(
                parse_kind(&later),
                Some(ParseErrorKind::MalformedSectionHeader),
                "header: {header}"
            );
        }
    }

    #[test]
    fn missing_opening_bracket() {
        assert!(parse("Desktop Entry]\ntest=test\n").is_err());
        assert!(parse("[Desktop Entry]\ntest=test\nAnother Section]\n").is_err());
    }

    #[test]
    fn error_reports_line_number() {
        let result = parse("[Desktop Entry]\nName=name\n\nbroken\n");

        assert!(matches!(
            result,
            Err(Error::Parse {
                line: 4,
                kind: ParseErrorKind::MissingDelimiter
            })
        ));
    }

    #[test]
    fn localized_keys() {
        for locale in ["de", "de_DE", "ca@valencia", "de_DE.UTF-8"] {
            let key = format!("Name[{locale}]");
            let text = format!("[Desktop Entry]\nName=name\n{key}=name\nExec=exec\n");

            let sections = parse(&text).expect("localized key should be accepted");
            let keys = sections["Desktop Entry"]
                .entries()
                .map(Entry::key)
                .collect::<Vec<_>>();

            assert_eq!(keys, ["Name", key.as_str(), "Exec"], "locale: {locale}");
        }
    }

    #[test]
    fn broken_localized_keys() {
        for key in [
            "test]de[",
            "test[de]]",
            "test[[de]",
            "test[]de",
            "test[de",
            "testde]",
            "test[]",
        ] {
            let text = format!("[Desktop Entry]\n{key}=test\n");

            assert_eq!(
                parse_kind(&text),
                Some(ParseErrorKind::MalformedLocaleKey),
                "key: {key}"
            );
        }
    }

    #[test]
    fn duplicate_sections_merge_and_keys_overwrite() {
        let text = "\
[Desktop Entry]
Name=first
[Desktop Action new]
Exec=app --new
[Desktop Entry]
Name=second
Exec=app
";

        let sections = parse(text).expect("valid file");
        let names = sections.keys().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(names, ["Desktop Entry", "Desktop Action new"]);

        let section = &sections["Desktop Entry"];
        assert_eq!(section.get("Name").map(Entry::value), Some("second"));
        assert_eq!(section.get("Exec").map(Entry::value), Some("app"));
    }

    #[test]
    fn empty_section_name() {
        let sections = parse("[]\nKey=value\n").expect("empty section name is allowed");

        assert_eq!(sections[""].get("Key").map(Entry::value), Some("value"));
    }

    #[test]
    fn header_with_surrounding_whitespace() {
        let sections = parse("  [Desktop Entry]\t\nName=name\n").expect("valid header");
        let names = sections.keys().map(String::as_str).collect::<Vec<_>>();

        assert_eq!(names, ["Desktop Entry"]);
    }

    #[test]
    fn only_spaces_are_trimmed_from_values() {
        let sections = parse("[Desktop Entry]\nName= \tname\t \n").expect("valid line");

        assert_eq!(
            sections["Desktop Entry"].get("Name").map(Entry::value),
            Some("\tname\t")
        );
    }

    #[test]
    fn crlf_line_endings() {
        let sections = parse("[Desktop Entry]\r\nName=name\r\n").expect("valid file");

        assert_eq!(
            sections["Desktop Entry"].get("Name").map(Entry::value),
            Some("name")
        );
    }
}
