// Single dump line parsing
//
// Line format: `{project} {page_title} {view_count} {response_bytes}`.
// Malformed lines are expected noise in the upstream dumps and are skipped,
// never reported.

/// Tokens a line must carry before it is considered.
pub const MIN_TOKENS: usize = 4;

/// Borrowed view of one well-formed dump line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageviewLine<'a> {
    pub project: &'a str,
    pub page: &'a str,
    pub views: i64,
}

/// Parse one line, returning `None` for anything that should be dropped.
///
/// The fourth token is required to be present but its value is ignored.
pub fn parse_line(line: &str) -> Option<PageviewLine<'_>> {
    let mut tokens = line.split_ascii_whitespace();
    let project = tokens.next()?;
    let page = tokens.next()?;
    let views = tokens.next()?;
    tokens.next()?;

    let views = views.parse::<i64>().ok().filter(|v| *v >= 0)?;

    Some(PageviewLine {
        project,
        page,
        views,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_line() {
        let parsed = parse_line("en Main_Page 120 4500").unwrap();
        assert_eq!(
            parsed,
            PageviewLine {
                project: "en",
                page: "Main_Page",
                views: 120,
            }
        );
    }

    #[test]
    fn test_trailing_newline_and_padding_ignored() {
        let parsed = parse_line("  de.m Berlin 7 0\r\n").unwrap();
        assert_eq!(parsed.project, "de.m");
        assert_eq!(parsed.page, "Berlin");
        assert_eq!(parsed.views, 7);
    }

    #[test]
    fn test_extra_tokens_tolerated() {
        let parsed = parse_line("fr Accueil 77 2200 trailing junk").unwrap();
        assert_eq!(parsed.views, 77);
    }

    #[test]
    fn test_too_few_tokens_skipped() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("malformed_line_only_two_tokens"), None);
        assert_eq!(parse_line("en Main_Page"), None);
        assert_eq!(parse_line("en Main_Page 120"), None);
    }

    #[test]
    fn test_non_integer_views_skipped() {
        assert_eq!(parse_line("en Main_Page lots 4500"), None);
        assert_eq!(parse_line("en Main_Page 1.5 4500"), None);
        assert_eq!(parse_line("en Main_Page -3 4500"), None);
        assert_eq!(parse_line("en Main_Page 99999999999999999999 4500"), None);
    }

    #[test]
    fn test_zero_views_kept() {
        assert_eq!(parse_line("en Special:Search 0 300").unwrap().views, 0);
    }

    #[test]
    fn test_fourth_token_not_validated() {
        assert_eq!(parse_line("en Main_Page 5 -").unwrap().views, 5);
    }
}
