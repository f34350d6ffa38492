//! GitHub API service implementations.

mod git_data;
mod pull_requests;
mod repositories;

pub use git_data::*;
pub use pull_requests::*;
pub use repositories::*;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is in a repository path. `/` separates segments.
const PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Percent-encodes each segment of a file path or ref name.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("docs/notes/myNewFile.md"), "docs/notes/myNewFile.md");
        assert_eq!(encode_path("heads/main_1700000000"), "heads/main_1700000000");
    }

    #[test]
    fn test_encode_path_escapes_reserved_characters() {
        assert_eq!(encode_path("notes/a#b?c.md"), "notes/a%23b%3Fc.md");
        assert_eq!(encode_path("my file%.md"), "my%20file%25.md");
        assert_eq!(encode_path("Résumé.md"), "R%C3%A9sum%C3%A9.md");
    }
}
