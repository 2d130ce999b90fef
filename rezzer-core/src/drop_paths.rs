//! Parsing of drag-and-drop file payloads.
//!
//! Desktop toolkits hand dropped files over as a single string. Two shapes
//! are common and both are accepted here:
//!
//! * a whitespace-separated list where entries containing spaces are wrapped
//!   in braces: `{/my videos/a.mp4} /videos/b.mp4`
//! * a URI list with one `file://` URI per line, percent-encoded:
//!   `file:///my%20videos/a.mp4`
//!
//! The parser only splits and decodes; whether the paths exist is checked
//! when they are added to a [`FileQueue`](crate::queue::FileQueue).

use std::path::PathBuf;
use url::Url;

/// Splits a drop payload into paths, in payload order.
///
/// An opening brace with no matching close takes the rest of the payload as
/// one path. Empty entries are skipped.
pub fn parse_drop_list(payload: &str) -> Vec<PathBuf> {
    split_entries(payload)
        .into_iter()
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry_to_path(&entry))
        .collect()
}

fn split_entries(payload: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut chars = payload.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut entry = String::new();
        if c == '{' {
            chars.next();
            let mut depth = 1;
            for c in chars.by_ref() {
                match c {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                entry.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                entry.push(c);
                chars.next();
            }
        }
        entries.push(entry);
    }

    entries
}

fn entry_to_path(entry: &str) -> PathBuf {
    if entry.starts_with("file:") {
        if let Some(path) = Url::parse(entry).ok().and_then(|url| url.to_file_path().ok()) {
            return path;
        }
    }
    PathBuf::from(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(payload: &str) -> Vec<String> {
        parse_drop_list(payload)
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_empty_payload() {
        assert!(parse("").is_empty());
        assert!(parse("   \n\t ").is_empty());
        assert!(parse("{} {}").is_empty());
    }

    #[test]
    fn test_plain_entries() {
        assert_eq!(parse("/a/b.mp4 /c/d.mov"), vec!["/a/b.mp4", "/c/d.mov"]);
    }

    #[test]
    fn test_braced_entries_keep_spaces() {
        assert_eq!(
            parse("{/my videos/clip one.mp4} /c/d.mov {/x y/z.mkv}"),
            vec!["/my videos/clip one.mp4", "/c/d.mov", "/x y/z.mkv"]
        );
    }

    #[test]
    fn test_nested_braces_are_kept() {
        assert_eq!(parse("{/a/{b}/c.mp4}"), vec!["/a/{b}/c.mp4"]);
    }

    #[test]
    fn test_unterminated_brace_takes_rest() {
        assert_eq!(
            parse("/first.mp4 {/a/unterminated path.mp4"),
            vec!["/first.mp4", "/a/unterminated path.mp4"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_file_uris_are_decoded() {
        assert_eq!(
            parse("file:///tmp/My%20Clip.mp4\r\nfile:///tmp/b.mov\n"),
            vec!["/tmp/My Clip.mp4", "/tmp/b.mov"]
        );
    }

    #[test]
    fn test_other_schemes_left_as_is() {
        assert_eq!(parse("http://host/a.mp4"), vec!["http://host/a.mp4"]);
    }
}
