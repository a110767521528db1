use serde_json::Value;
use std::fmt::{Display, Formatter};

/// The path segment that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyError(pub String);

impl Display for KeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}'", self.0)
    }
}

impl std::error::Error for KeyError {}

/// Walks `map` along `path`. Hitting a missing key, or a non-object
/// before the path ends, fails with that key.
pub fn access_nested_map<'a>(map: &'a Value, path: &[&str]) -> Result<&'a Value, KeyError> {
    path.iter().try_fold(map, |current, key| {
        current
            .as_object()
            .and_then(|object| object.get(*key))
            .ok_or_else(|| KeyError(key.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"a": 1}), &["a"], json!(1))]
    #[case(json!({"a": {"b": 2}}), &["a"], json!({"b": 2}))]
    #[case(json!({"a": {"b": 2}}), &["a", "b"], json!(2))]
    fn resolves_nested_paths(#[case] map: Value, #[case] path: &[&str], #[case] expected: Value) {
        assert_eq!(access_nested_map(&map, path), Ok(&expected));
    }

    #[rstest]
    #[case(json!({}), &["a"], "a")]
    #[case(json!({"a": 1}), &["a", "b"], "b")]
    fn reports_the_missing_key(#[case] map: Value, #[case] path: &[&str], #[case] missing: &str) {
        let error = access_nested_map(&map, path).unwrap_err();
        assert_eq!(error.to_string(), format!("'{missing}'"));
    }

    #[test]
    fn empty_path_returns_the_map() {
        let map = json!({"a": 1});
        assert_eq!(access_nested_map(&map, &[]), Ok(&map));
    }
}
