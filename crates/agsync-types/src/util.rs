use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").unwrap());
static UNSAFE_COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9.\-]").unwrap());

/// Calculate the Gemini-style project hash: sha256 over the path string.
///
/// The path is hashed as given. Remote paths cannot be canonicalized here,
/// and the same checkout on two machines must produce the same hash.
pub fn project_hash_from_root(project_root: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(project_root.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Encode a project path the way Claude names its project directories.
///
/// Every character outside `[A-Za-z0-9]` becomes `-`, so `/home/me/my_app`
/// is stored as `-home-me-my-app`. The encoding is lossy.
pub fn encode_project_path(path: &str) -> String {
    NON_ALNUM.replace_all(path, "-").into_owned()
}

/// Best-effort inverse of `encode_project_path` for POSIX paths.
pub fn decode_project_dir(encoded: &str) -> String {
    if encoded.starts_with('-') {
        encoded.replace('-', "/")
    } else {
        encoded.to_string()
    }
}

/// Make a string safe for use inside a single directory name.
pub fn sanitize_component(s: &str) -> String {
    UNSAFE_COMPONENT.replace_all(s, "-").into_owned()
}

/// Check if string is 64-character hexadecimal
pub fn is_64_char_hex(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_project_path() {
        assert_eq!(encode_project_path("/home/me/my_app"), "-home-me-my-app");
        assert_eq!(
            encode_project_path("C:\\Users\\me\\proj"),
            "C--Users-me-proj"
        );
    }

    #[test]
    fn test_decode_project_dir_is_best_effort() {
        assert_eq!(decode_project_dir("-home-me-proj"), "/home/me/proj");
        assert_eq!(decode_project_dir("C--Users-me"), "C--Users-me");
    }

    #[test]
    fn test_project_hash_is_stable_hex() {
        let hash = project_hash_from_root("/home/me/proj");
        assert!(is_64_char_hex(&hash));
        assert_eq!(hash, project_hash_from_root("/home/me/proj"));
        assert_ne!(hash, project_hash_from_root("/home/me/proj2"));
    }
}
