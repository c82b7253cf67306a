//! Parsing of the remote-sync client's textual output.
//!
//! Two kinds of line matter:
//!
//! ```text
//! M /srv/drive/posts/hello              <- status letter, space, source path
//! Exported '/srv/drive/posts/hello' to '/srv/drive/posts/hello_exports/hello.docx'
//! ```
//!
//! Everything else is noise and is skipped.

use std::sync::OnceLock;

use regex::Regex;

use driveraker_core::ExportConvention;

fn status_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z]) (/.*?)\s*$").expect("status line pattern is valid")
    })
}

fn export_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bto '([^']+)'").expect("export line pattern is valid"))
}

/// Derive the exported-document path for a source document.
///
/// `/dir/name` becomes `/dir/name<suffix>/name.<extension>`. Returns `None`
/// for a path with no final component.
pub fn derive_export_path(source: &str, convention: &ExportConvention) -> Option<String> {
    let source = source.trim_end_matches('/');
    let name = source.rsplit('/').next().filter(|n| !n.is_empty())?;
    Some(format!(
        "{source}{}/{name}.{}",
        convention.suffix, convention.extension
    ))
}

/// Source paths named by modified-status lines, in report order.
pub fn modified_sources<'a>(report: &'a str, convention: &ExportConvention) -> Vec<&'a str> {
    report
        .lines()
        .filter_map(|line| {
            let caps = status_line().captures(line)?;
            let marker = caps.get(1)?.as_str().chars().next()?;
            if !convention.is_modified_marker(marker) {
                return None;
            }
            caps.get(2).map(|m| m.as_str())
        })
        .collect()
}

/// Exported-document paths for every modified source in `report`.
///
/// Unparseable input yields an empty list, never an error.
pub fn parse_modified_report(report: &str, convention: &ExportConvention) -> Vec<String> {
    modified_sources(report, convention)
        .into_iter()
        .filter_map(|source| {
            let derived = derive_export_path(source, convention);
            if derived.is_none() {
                tracing::debug!("ignoring modified entry without a file name: {source}");
            }
            derived
        })
        .collect()
}

/// Every `to '<path>'` export target in the sync output, in order.
pub fn parse_exported_paths(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| export_line().captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Split a newline-separated listing into paths, dropping blank lines.
pub fn parse_listing(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conv() -> ExportConvention {
        ExportConvention::default()
    }

    #[test]
    fn derives_export_path_from_source() {
        assert_eq!(
            derive_export_path("/root/a", &conv()).as_deref(),
            Some("/root/a_exports/a.docx")
        );
        assert_eq!(
            derive_export_path("/root/posts/hello/", &conv()).as_deref(),
            Some("/root/posts/hello_exports/hello.docx")
        );
        assert_eq!(derive_export_path("/", &conv()), None);
    }

    #[test]
    fn custom_convention_is_honoured() {
        let convention = ExportConvention {
            suffix: ".out".into(),
            extension: "odt".into(),
            markers: vec!["M".into(), "U".into()],
        };
        let report = "U /d/x\nM /d/y\nA /d/z\n";
        assert_eq!(
            parse_modified_report(report, &convention),
            vec!["/d/x.out/x.odt".to_string(), "/d/y.out/y.odt".to_string()]
        );
    }

    #[test]
    fn parses_every_modified_line_in_order() {
        let report = "Resolving...\nM /root/a\n  M /root/b\nnoise M /root/c\n";
        assert_eq!(
            parse_modified_report(report, &conv()),
            vec![
                "/root/a_exports/a.docx".to_string(),
                "/root/b_exports/b.docx".to_string(),
            ]
        );
    }

    #[test]
    fn ignores_other_markers_and_relative_paths() {
        let report = "A /root/new\nD /root/gone\nM relative/path\nMM /root/x\nM  /root/y\n";
        assert!(parse_modified_report(report, &conv()).is_empty());
    }

    #[test]
    fn paths_with_spaces_are_kept_whole() {
        let report = "M /root/My Post  \r\n";
        assert_eq!(
            parse_modified_report(report, &conv()),
            vec!["/root/My Post_exports/My Post.docx".to_string()]
        );
    }

    #[test]
    fn empty_or_garbage_report_is_empty() {
        assert!(parse_modified_report("", &conv()).is_empty());
        assert!(parse_modified_report("\u{0}\u{1}garbage\n\n", &conv()).is_empty());
    }

    #[test]
    fn extracts_exported_paths() {
        let output = "Exported '/root/a' to '/root/a_exports/a.docx'\n\
                      M /root/b\n\
                      Exported '/root/b' to '/root/b_exports/b.docx'\n";
        assert_eq!(
            parse_exported_paths(output),
            vec![
                "/root/a_exports/a.docx".to_string(),
                "/root/b_exports/b.docx".to_string(),
            ]
        );
    }

    #[test]
    fn listing_skips_blank_lines() {
        assert_eq!(
            parse_listing("/root/a.docx\n\n  /root/b.docx  \n"),
            vec!["/root/a.docx".to_string(), "/root/b.docx".to_string()]
        );
    }
}
