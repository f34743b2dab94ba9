//! RFC 6901 JSON Pointer token escaping

/// Unescape a JSON Pointer token according to RFC 6901
///
/// - '~1' → '/'
/// - '~0' → '~'
pub fn unescape_pointer_token(token: &str) -> String {
    // Must process ~1 before ~0 to avoid double-unescaping
    token.replace("~1", "/").replace("~0", "~")
}

/// Escape a string for use in a JSON Pointer
pub fn escape_pointer_token(token: &str) -> String {
    // Must escape ~ before / to avoid incorrect escaping
    token.replace('~', "~0").replace('/', "~1")
}

/// Append an escaped token to a pointer path
pub fn push_pointer_token(path: &mut String, token: &str) {
    path.push('/');
    path.push_str(&escape_pointer_token(token));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_handles_tilde_and_slash() {
        assert_eq!(escape_pointer_token("a/b"), "a~1b");
        assert_eq!(escape_pointer_token("m~n"), "m~0n");
        assert_eq!(escape_pointer_token("~1"), "~01");
    }

    #[test]
    fn unescape_is_inverse_of_escape() {
        for token in ["plain", "a/b", "m~n", "~1", "~0/~1"] {
            assert_eq!(unescape_pointer_token(&escape_pointer_token(token)), token);
        }
    }

    #[test]
    fn push_builds_paths() {
        let mut path = String::new();
        push_pointer_token(&mut path, "state");
        push_pointer_token(&mut path, "a/b");
        push_pointer_token(&mut path, "0");
        assert_eq!(path, "/state/a~1b/0");
    }
}
