//! Header matching rules and the single-file rewrite.

use std::collections::BTreeSet;
use std::ops::Range;
use std::path::Path;

use regex::bytes::Regex;

use crate::error::HeaderError;

/// Which files are inspected, what a notice looks like, and how far down to look.
#[derive(Debug, Clone)]
pub struct HeaderRules {
    extensions: BTreeSet<String>,
    pattern: Regex,
    scan_lines: usize,
}

impl HeaderRules {
    /// Build rules from an extension list (with or without leading dots), a
    /// regex containing a named `year` group, and the number of leading lines
    /// searched per file.
    pub fn new<I, S>(extensions: I, pattern: &str, scan_lines: usize) -> Result<Self, HeaderError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if scan_lines == 0 {
            return Err(HeaderError::EmptyScanWindow);
        }
        let regex = Regex::new(pattern)?;
        if !regex.capture_names().any(|name| name == Some("year")) {
            return Err(HeaderError::MissingYearGroup {
                pattern: pattern.to_string(),
            });
        }
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Ok(Self {
            extensions,
            pattern: regex,
            scan_lines,
        })
    }

    /// Whether `path` has one of the configured extensions.
    pub fn applies_to(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    pub fn scan_lines(&self) -> usize {
        self.scan_lines
    }
}

/// Location of the first copyright notice's year within a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// 1-based line number.
    pub line: usize,
    /// Byte range of the `year` group within the whole content.
    pub span: Range<usize>,
}

impl Notice {
    /// The year bytes as they appear in `content`.
    pub fn year<'c>(&self, content: &'c [u8]) -> &'c [u8] {
        &content[self.span.clone()]
    }
}

/// Result of checking one file's content against a last-change year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// No line in the scan window matches the notice pattern.
    NoNotice,
    /// The first notice already carries the right year.
    UpToDate { line: usize },
    /// The first notice was stale; `content` is the full corrected file.
    Updated {
        line: usize,
        old_year: String,
        content: Vec<u8>,
    },
}

/// Find the first notice within the first `scan_lines` lines of `content`.
pub fn find_notice(rules: &HeaderRules, content: &[u8]) -> Option<Notice> {
    let mut offset = 0;
    for (index, line) in content
        .split_inclusive(|b| *b == b'\n')
        .take(rules.scan_lines)
        .enumerate()
    {
        if let Some(year) = rules.pattern.captures(line).and_then(|caps| caps.name("year")) {
            return Some(Notice {
                line: index + 1,
                span: offset + year.start()..offset + year.end(),
            });
        }
        offset += line.len();
    }
    None
}

/// Set the year of `notice` to `year`, or `None` when it already matches.
/// Every byte outside the year span, line endings included, is carried over
/// unchanged.
pub fn apply_year(content: &[u8], notice: &Notice, year: i32) -> Option<Vec<u8>> {
    let wanted = format!("{year:04}");
    if notice.year(content) == wanted.as_bytes() {
        return None;
    }

    let Range { start, end } = notice.span;
    let mut updated = Vec::with_capacity(content.len() - (end - start) + wanted.len());
    updated.extend_from_slice(&content[..start]);
    updated.extend_from_slice(wanted.as_bytes());
    updated.extend_from_slice(&content[end..]);
    Some(updated)
}

/// Correct the year of the first copyright notice in `content`.
///
/// Only the first `scan_lines` lines are searched and only the `year` span of
/// the first matching line is replaced.
pub fn rewrite_header(rules: &HeaderRules, content: &[u8], year: i32) -> Rewrite {
    let Some(notice) = find_notice(rules, content) else {
        return Rewrite::NoNotice;
    };
    match apply_year(content, &notice, year) {
        None => Rewrite::UpToDate { line: notice.line },
        Some(updated) => Rewrite::Updated {
            line: notice.line,
            old_year: String::from_utf8_lossy(notice.year(content)).into_owned(),
            content: updated,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PATTERN: &str = r"Copyright ©\s*(?P<year>\d{4})";

    fn rules() -> HeaderRules {
        HeaderRules::new(["c", ".cpp", "H"], PATTERN, 10).expect("rules")
    }

    #[rstest]
    #[case("a.c", true)]
    #[case("src/b.cpp", true)]
    #[case("include/c.h", true)]
    #[case("include/D.H", true)]
    #[case("e.py", false)]
    #[case("Makefile", false)]
    #[case("f.cpp.bak", false)]
    fn extension_filter(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(rules().applies_to(Path::new(path)), expected);
    }

    #[test]
    fn pattern_without_year_group_is_rejected() {
        let err = HeaderRules::new(["c"], r"Copyright \d{4}", 10).unwrap_err();
        assert!(matches!(err, HeaderError::MissingYearGroup { .. }));
    }

    #[test]
    fn broken_pattern_is_rejected() {
        let err = HeaderRules::new(["c"], r"Copyright (?P<year>\d{4}", 10).unwrap_err();
        assert!(matches!(err, HeaderError::Pattern(_)));
    }

    #[test]
    fn zero_scan_window_is_rejected() {
        let err = HeaderRules::new(["c"], PATTERN, 0).unwrap_err();
        assert!(matches!(err, HeaderError::EmptyScanWindow));
    }

    #[test]
    fn stale_year_is_replaced_and_rest_preserved() {
        let input = b"/*\n * Copyright \xc2\xa9 2019 Example Corp\n */\nint x;\n";
        match rewrite_header(&rules(), input, 2023) {
            Rewrite::Updated {
                line,
                old_year,
                content,
            } => {
                assert_eq!(line, 2);
                assert_eq!(old_year, "2019");
                assert_eq!(
                    content,
                    b"/*\n * Copyright \xc2\xa9 2023 Example Corp\n */\nint x;\n".to_vec()
                );
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn correct_year_is_up_to_date() {
        let input = "// Copyright © 2023 Example Corp\n".as_bytes();
        assert_eq!(
            rewrite_header(&rules(), input, 2023),
            Rewrite::UpToDate { line: 1 }
        );
    }

    #[test]
    fn only_first_notice_is_touched() {
        let input = "// Copyright © 2019 A\n// Copyright © 2018 B\n".as_bytes();
        let Rewrite::Updated { content, .. } = rewrite_header(&rules(), input, 2024) else {
            panic!("expected update");
        };
        assert_eq!(
            content,
            "// Copyright © 2024 A\n// Copyright © 2018 B\n".as_bytes().to_vec()
        );
    }

    #[test]
    fn correct_first_notice_shields_later_stale_ones() {
        let input = "// Copyright © 2024 A\n// Copyright © 2018 B\n".as_bytes();
        assert_eq!(
            rewrite_header(&rules(), input, 2024),
            Rewrite::UpToDate { line: 1 }
        );
    }

    #[test]
    fn notice_beyond_scan_window_is_ignored() {
        let mut input = "\n".repeat(10);
        input.push_str("// Copyright © 2019 Example Corp\n");
        assert_eq!(
            rewrite_header(&rules(), input.as_bytes(), 2023),
            Rewrite::NoNotice
        );
    }

    #[test]
    fn crlf_and_missing_final_newline_survive() {
        let input = "x\r\n// Copyright © 2001 Example Corp".as_bytes();
        let Rewrite::Updated { content, .. } = rewrite_header(&rules(), input, 2002) else {
            panic!("expected update");
        };
        assert_eq!(content, "x\r\n// Copyright © 2002 Example Corp".as_bytes().to_vec());
    }

    #[test]
    fn non_utf8_bytes_elsewhere_are_kept() {
        let mut input = b"// Copyright \xc2\xa9 2010 X\n".to_vec();
        input.extend_from_slice(b"char c = '\xff';\n");
        let Rewrite::Updated { content, .. } = rewrite_header(&rules(), &input, 2011) else {
            panic!("expected update");
        };
        assert!(content.ends_with(b"char c = '\xff';\n"));
        assert!(content.starts_with(b"// Copyright \xc2\xa9 2011 X\n"));
    }

    #[test]
    fn newer_header_year_is_also_corrected() {
        let input = "// Copyright © 2030 X\n".as_bytes();
        assert!(matches!(
            rewrite_header(&rules(), input, 2020),
            Rewrite::Updated { .. }
        ));
    }

    #[test]
    fn notice_span_covers_year_only() {
        let input = "#pragma once\n// Copyright © 2015 X\n".as_bytes();
        let notice = find_notice(&rules(), input).expect("notice");
        assert_eq!(notice.line, 2);
        assert_eq!(notice.year(input), b"2015");
        assert_eq!(find_notice(&rules(), b"int x;\n"), None);
    }
}
