//! Parsing of the installed-products listing.
//!
//! `wmic product get name` terminates each row with `\r\r\n`. Once line
//! endings are normalised that becomes a blank line between records, so the
//! listing is a sequence of blank-line separated blocks whose first block is
//! the column header.

/// Record separator after line-ending normalisation.
const RECORD_SEPARATOR: &str = "\n\n";

/// Convert `\r\n` and lone `\r` to `\n`.
fn normalize_line_endings(output: &str) -> String {
    output.replace("\r\n", "\n").replace('\r', "\n")
}

/// Application names from raw listing output.
///
/// Blocks are trimmed, empty blocks dropped, the header removed, and the
/// rest sorted by byte order (case-sensitive).
pub fn parse_installed_applications(output: &str) -> Vec<String> {
    let normalized = normalize_line_endings(output);

    let mut applications: Vec<String> = normalized
        .split(RECORD_SEPARATOR)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .skip(1)
        .map(str::to_string)
        .collect();

    applications.sort();
    applications
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_dropped_and_sorted() {
        let apps = parse_installed_applications("Name\n\nFoo\n\nBar\n\n");
        assert_eq!(apps, vec!["Bar".to_string(), "Foo".to_string()]);
    }

    #[test]
    fn test_wmic_crlf_output() {
        let raw = "Name                      \r\r\nZoom        \r\r\nAdobe Reader\r\r\n\r\r\n";
        let apps = parse_installed_applications(raw);
        assert_eq!(apps, vec!["Adobe Reader".to_string(), "Zoom".to_string()]);
    }

    #[test]
    fn test_ordinal_sort_is_case_sensitive() {
        let apps = parse_installed_applications("Name\n\nbeta\n\nAlpha\n\nZulu\n\n");
        assert_eq!(apps, vec!["Alpha", "Zulu", "beta"]);
    }

    #[test]
    fn test_header_only_yields_nothing() {
        assert!(parse_installed_applications("Name\r\r\n\r\r\n").is_empty());
        assert!(parse_installed_applications("").is_empty());
        assert!(parse_installed_applications("   \n\n  \n\n").is_empty());
    }

    #[test]
    fn test_whitespace_blocks_do_not_count_as_header() {
        let apps = parse_installed_applications("\n\n   \n\nName\n\nFoo\n\n");
        assert_eq!(apps, vec!["Foo".to_string()]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let apps = parse_installed_applications("Name\n\nFoo\n\nFoo\n\n");
        assert_eq!(apps, vec!["Foo", "Foo"]);
    }
}
