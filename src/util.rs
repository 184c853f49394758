use rand::{distr::Alphanumeric, Rng};

use crate::error::{StorageError, StorageResult};

/// Normalizes a storage name to forward slashes and resolves `.` and `..`
/// segments. Names that would escape the storage root are rejected.
pub fn clean_name(name: &str) -> StorageResult<String> {
    let name = name.replace('\\', "/");
    let trailing_slash = name.ends_with('/') && name.len() > 1;

    let mut parts: Vec<&str> = Vec::new();
    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(StorageError::Suspicious(format!(
                        "attempted access outside the storage root: {}",
                        name
                    )));
                }
            }
            other => parts.push(other),
        }
    }

    let mut cleaned = parts.join("/");
    if trailing_slash && !cleaned.is_empty() {
        cleaned.push('/');
    }

    Ok(cleaned)
}

/// Derives a collision-avoiding variant of `name` by inserting a random
/// 7-character suffix before the extension.
pub fn get_alternative_name(name: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect();

    match name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/{}", dir, insert_suffix(file, &suffix)),
        None => insert_suffix(name, &suffix),
    }
}

fn insert_suffix(file: &str, suffix: &str) -> String {
    match file.rsplit_once('.') {
        Some((root, ext)) if !root.is_empty() => format!("{}_{}.{}", root, suffix, ext),
        _ => format!("{}_{}", file, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        let cases = vec![
            ("path/to/file.txt", "path/to/file.txt"),
            ("path\\to\\file.txt", "path/to/file.txt"),
            ("./file.txt", "file.txt"),
            ("path/./file.txt", "path/file.txt"),
            ("path/sub/../file.txt", "path/file.txt"),
            ("path//file.txt", "path/file.txt"),
            ("path/to/", "path/to/"),
        ];

        for (input, expected) in cases {
            let result = clean_name(input).unwrap();
            assert_eq!(result, expected, "failed for case: {}", input);
        }
    }

    #[test]
    fn test_clean_name_rejects_escapes() {
        let cases = vec!["../file.txt", "path/../../file.txt", ".."];

        for input in cases {
            assert!(
                matches!(clean_name(input), Err(StorageError::Suspicious(_))),
                "failed for case: {}",
                input
            );
        }
    }

    #[test]
    fn test_get_alternative_name() {
        let cases = vec![
            ("file.txt", "file_", ".txt"),
            ("path/to/file.tar", "path/to/file_", ".tar"),
            ("noext", "noext_", ""),
            (".hidden", ".hidden_", ""),
        ];

        for (input, prefix, ext) in cases {
            let result = get_alternative_name(input);
            assert!(
                result.starts_with(prefix),
                "failed prefix for case: {} -> {}",
                input,
                result
            );
            assert!(
                result.ends_with(ext),
                "failed extension for case: {} -> {}",
                input,
                result
            );
            assert_eq!(
                result.len(),
                input.len() + 8,
                "failed length for case: {} -> {}",
                input,
                result
            );
        }
    }

    #[test]
    fn test_alternative_names_differ() {
        assert_ne!(get_alternative_name("f.txt"), get_alternative_name("f.txt"));
    }
}
