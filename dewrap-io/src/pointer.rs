//! JSON Pointer selection over wrapped documents
//!
//! Navigation looks through wrappers: `/state/count` reaches `count` even
//! when `state` is a tracked object around the mapping.

use dewrap_format::path::{push_pointer_token, unescape_pointer_token};
use dewrap_format::{DewrapError, Limits, Result, Value};

/// Split an RFC 6901 pointer into unescaped tokens
///
/// The empty pointer selects the root and yields no tokens.
pub fn parse_pointer(pointer: &str, limits: &Limits) -> Result<Vec<String>> {
    if pointer.len() > limits.max_pointer_length {
        return Err(DewrapError::PointerTooLong {
            length: pointer.len(),
            max_length: limits.max_pointer_length,
        });
    }
    let invalid = |reason: String| DewrapError::InvalidPointer {
        pointer: pointer.to_string(),
        reason,
    };

    let rest = match pointer.strip_prefix('/') {
        Some(rest) => rest,
        None if pointer.is_empty() => return Ok(Vec::new()),
        None => return Err(invalid("a non-empty pointer starts with '/'".to_string())),
    };

    let raw: Vec<&str> = rest.split('/').collect();
    if raw.len() > limits.max_pointer_depth {
        return Err(DewrapError::PointerDepthExceeded {
            pointer: pointer.to_string(),
            depth: raw.len(),
            max_depth: limits.max_pointer_depth,
        });
    }

    raw.into_iter()
        .map(|token| match bad_escape(token) {
            Some(sequence) => Err(invalid(format!(
                "'{}' is not an escape; '~' must be followed by '0' or '1'",
                sequence
            ))),
            None => Ok(unescape_pointer_token(token)),
        })
        .collect()
}

/// First `~` in `token` that does not start `~0` or `~1`
fn bad_escape(token: &str) -> Option<String> {
    let bytes = token.as_bytes();
    token
        .match_indices('~')
        .find_map(|(at, _)| match bytes.get(at + 1) {
            Some(b'0') | Some(b'1') => None,
            Some(_) => Some(token[at..].chars().take(2).collect()),
            None => Some("~".to_string()),
        })
}

/// Strip every wrapper layer around `value`
pub fn look_through(mut value: Value) -> Value {
    loop {
        match value {
            Value::Wrapped(wrapper) => value = wrapper.get(),
            other => return other,
        }
    }
}

/// Navigate to the value at `tokens`, looking through wrappers on the way
///
/// The returned target itself keeps its wrappers.
pub fn navigate(root: Value, tokens: &[String], pointer: &str) -> Result<Value> {
    let mut current = root;
    let mut reached = String::new();

    for token in tokens {
        push_pointer_token(&mut reached, token);

        current = match look_through(current) {
            Value::Mapping(mut map) => match map.remove(token.as_str()) {
                Some(next) => next,
                None => {
                    return Err(DewrapError::PointerNotFound {
                        pointer: pointer.to_string(),
                        reached,
                        available: describe_keys(map.keys().map(String::as_str), map.len()),
                    })
                }
            },
            Value::Sequence(mut items) => {
                let len = items.len();
                match token.parse::<usize>() {
                    Ok(index) if index < len => items.swap_remove(index),
                    Ok(_) => {
                        return Err(DewrapError::PointerNotFound {
                            pointer: pointer.to_string(),
                            reached,
                            available: format!("<sequence with {} elements>", len),
                        })
                    }
                    Err(_) => {
                        return Err(DewrapError::PointerNotFound {
                            pointer: pointer.to_string(),
                            reached,
                            available: format!(
                                "<sequence with {} elements, expected numeric index>",
                                len
                            ),
                        })
                    }
                }
            }
            other => {
                return Err(DewrapError::PointerNotFound {
                    pointer: pointer.to_string(),
                    reached,
                    available: format!("<{}, cannot traverse further>", other.type_name()),
                })
            }
        };
    }

    Ok(current)
}

fn describe_keys<'a>(keys: impl Iterator<Item = &'a str>, total: usize) -> String {
    let shown: Vec<&str> = keys.take(10).collect();
    if total > 10 {
        format!("{}, ... ({} total)", shown.join(", "), total)
    } else if shown.is_empty() {
        "<empty mapping>".to_string()
    } else {
        shown.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dewrap_format::decode;
    use serde_json::json;

    fn limits() -> Limits {
        Limits::default()
    }

    #[test]
    fn parse_pointer_validates_length() {
        let long_pointer = format!("/{}", "a".repeat(300));
        assert!(matches!(
            parse_pointer(&long_pointer, &limits()),
            Err(DewrapError::PointerTooLong { length: 301, .. })
        ));
    }

    #[test]
    fn parse_pointer_requires_leading_slash() {
        let err = parse_pointer("state", &limits()).unwrap_err();
        assert!(matches!(err, DewrapError::InvalidPointer { .. }));
    }

    #[test]
    fn parse_pointer_enforces_depth() {
        let tight = Limits {
            max_pointer_depth: 2,
            ..Limits::default()
        };
        assert!(matches!(
            parse_pointer("/a/b/c", &tight),
            Err(DewrapError::PointerDepthExceeded { depth: 3, .. })
        ));
    }

    #[test]
    fn parse_pointer_rejects_bad_escapes() {
        let err = parse_pointer("/a~2b", &limits()).unwrap_err();
        assert!(err.to_string().contains("~2"));
        assert!(parse_pointer("/a~", &limits()).is_err());
        assert!(parse_pointer("/a~~0", &limits())
            .unwrap_err()
            .to_string()
            .contains("'~~'"));
        assert_eq!(parse_pointer("/~01", &limits()).unwrap(), vec!["~1".to_string()]);
    }

    #[test]
    fn parse_pointer_unescapes_tokens() {
        assert_eq!(parse_pointer("", &limits()).unwrap(), Vec::<String>::new());
        assert_eq!(
            parse_pointer("/a~1b/m~0n/", &limits()).unwrap(),
            vec!["a/b".to_string(), "m~n".to_string(), String::new()]
        );
    }

    #[test]
    fn navigate_looks_through_wrappers() {
        let doc = decode(json!({
            "state": {"$reactive": {"items": {"$ref": [10, {"$proxy": 20}]}}}
        }))
        .unwrap();
        let tokens = parse_pointer("/state/items/1", &limits()).unwrap();

        let target = navigate(doc, &tokens, "/state/items/1").unwrap();
        assert!(target.as_wrapper().is_some());
        assert_eq!(look_through(target), Value::from(20i64));
    }

    #[test]
    fn navigate_reports_missing_key() {
        let doc = decode(json!({"state": {"a": 1, "b": 2}})).unwrap();
        let tokens = parse_pointer("/state/c", &limits()).unwrap();

        match navigate(doc, &tokens, "/state/c").unwrap_err() {
            DewrapError::PointerNotFound {
                reached, available, ..
            } => {
                assert_eq!(reached, "/state/c");
                assert_eq!(available, "a, b");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn navigate_rejects_out_of_range_index() {
        let doc = decode(json!({"list": [1, 2]})).unwrap();
        let tokens = parse_pointer("/list/5", &limits()).unwrap();
        let err = navigate(doc, &tokens, "/list/5").unwrap_err();
        assert!(err.to_string().contains("2 elements"));
    }

    #[test]
    fn navigate_cannot_descend_into_primitive() {
        let doc = decode(json!({"n": {"$ref": 3}})).unwrap();
        let tokens = parse_pointer("/n/x", &limits()).unwrap();
        let err = navigate(doc, &tokens, "/n/x").unwrap_err();
        assert!(err.to_string().contains("number"));
    }
}
