//! Path string utilities
//!
//! Pure string operations: nothing here touches the filesystem, so paths
//! from any platform can be resolved on any other.

use sha2::{Digest, Sha256};

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Whether a path is absolute on Unix or Windows
///
/// Accepts `/x`, `\x` (including UNC `\\server`), `C:\x` and `C:/x`.
pub fn is_absolute_path(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    let bytes = path.as_bytes();
    has_drive_prefix(path) && bytes.len() >= 3 && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Comparison key: forward slashes, lowercase drive letter, no trailing separator
fn comparison_key(path: &str) -> String {
    let mut key = path.replace('\\', "/");
    if has_drive_prefix(&key) {
        key[..1].make_ascii_lowercase();
    }
    while key.len() > 1 && key.ends_with('/') {
        key.pop();
    }
    key
}

/// Shorten an absolute path relative to a working directory
///
/// Returns `path` unchanged when `cwd` is missing, `path` is relative, the
/// path lies outside `cwd`, or `path` is `cwd` itself. Only whole segments
/// match: `/project-backup` is never inside `/project`.
pub fn make_relative(path: &str, cwd: Option<&str>) -> String {
    let Some(cwd) = cwd.map(str::trim).filter(|c| !c.is_empty()) else {
        return path.to_string();
    };
    if !is_absolute_path(path) {
        return path.to_string();
    }

    let path_key = comparison_key(path);
    let cwd_key = comparison_key(cwd);

    if path_key == cwd_key {
        return path.to_string();
    }

    let prefix_len = if cwd_key.ends_with('/') {
        // cwd is a root such as "/"
        cwd_key.len()
    } else {
        cwd_key.len() + 1
    };

    let inside = path_key.starts_with(&cwd_key)
        && (cwd_key.ends_with('/') || path_key.as_bytes().get(cwd_key.len()) == Some(&b'/'));
    if !inside {
        return path.to_string();
    }

    // Separator normalization keeps byte offsets, so slice the original
    match path.get(prefix_len..) {
        Some(rest) if !rest.trim_matches(['/', '\\']).is_empty() => rest.to_string(),
        _ => path.to_string(),
    }
}

/// Lowercase hex SHA-256 of a project directory path
pub fn project_hash(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify that SHA256(workdir) == hash
pub fn verify_hash(workdir: &str, expected_hash: &str) -> bool {
    project_hash(workdir).eq_ignore_ascii_case(expected_hash.trim())
}

/// Walk a path's ancestors (itself first) looking for a hash match
///
/// The root is never tested; the walk stops there.
pub fn find_matching_path(full_path: &str, expected_hash: &str) -> Option<String> {
    let mut current = full_path.trim_end_matches(['/', '\\']);

    while !current.is_empty() && !(has_drive_prefix(current) && current.len() == 2) {
        if verify_hash(current, expected_hash) {
            return Some(current.to_string());
        }

        match current.rfind(['/', '\\']) {
            Some(0) | None => break,
            Some(i) => current = current[..i].trim_end_matches(['/', '\\']),
        }
    }

    None
}

/// Infer a project root from a directory hash and candidate file paths
///
/// Relative candidates are ignored. Returns the first ancestor of the first
/// candidate that hashes to `hash`.
pub fn infer_project_path<S: AsRef<str>>(hash: &str, candidates: &[S]) -> Option<String> {
    if hash.trim().is_empty() || candidates.is_empty() {
        return None;
    }

    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| is_absolute_path(c))
        .find_map(|c| find_matching_path(c, hash))
}

/// Extract absolute paths mentioned in free text
///
/// Looks for absolute paths, especially after `---` delimiters (how tool
/// output frames file contents).
pub fn extract_candidate_paths(content: &str) -> Vec<String> {
    let mut paths = Vec::new();

    for line in content.lines() {
        if !(line.contains("/Users/") || line.contains("/home/") || line.contains(":\\")) {
            continue;
        }

        // Prefer paths after '---' delimiter
        let search_text = match line.find("---") {
            Some(pos) => &line[pos + 3..],
            None => line,
        };

        for part in search_text.split_whitespace() {
            let part = part
                .trim_start_matches(['`', '\'', '"', '(', '['])
                .trim_end_matches(['`', '\'', '"', ')', ']', ',', ';', ':', '.']);
            if part.len() > 1 && is_absolute_path(part) {
                paths.push(part.to_string());
            }
        }
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_relative_inside_cwd() {
        assert_eq!(
            make_relative("/Users/dev/project/src/index.ts", Some("/Users/dev/project")),
            "src/index.ts"
        );
        assert_eq!(
            make_relative("/Users/dev/project/src/index.ts", Some("/Users/dev/project/")),
            "src/index.ts"
        );
    }

    #[test]
    fn test_make_relative_outside_cwd() {
        assert_eq!(
            make_relative("/etc/hosts", Some("/Users/dev/project")),
            "/etc/hosts"
        );
        assert_eq!(
            make_relative("/Users/dev/project-backup/file.ts", Some("/Users/dev/project")),
            "/Users/dev/project-backup/file.ts"
        );
    }

    #[test]
    fn test_make_relative_unchanged_cases() {
        assert_eq!(make_relative("src/main.rs", Some("/repo")), "src/main.rs");
        assert_eq!(make_relative("/repo/a.rs", None), "/repo/a.rs");
        assert_eq!(make_relative("/repo/a.rs", Some("  ")), "/repo/a.rs");
        assert_eq!(make_relative("/repo", Some("/repo")), "/repo");
        assert_eq!(make_relative("/repo/", Some("/repo")), "/repo/");
    }

    #[test]
    fn test_make_relative_windows() {
        assert_eq!(
            make_relative(r"C:\Users\dev\project\src\lib.rs", Some(r"c:\Users\dev\project")),
            r"src\lib.rs"
        );
        assert_eq!(
            make_relative("C:/Users/dev/project/src/lib.rs", Some(r"C:\Users\dev\project")),
            "src/lib.rs"
        );
        assert_eq!(
            make_relative(r"D:\Users\dev\project\a.rs", Some(r"C:\Users\dev\project")),
            r"D:\Users\dev\project\a.rs"
        );
    }

    #[test]
    fn test_make_relative_root_cwd() {
        assert_eq!(make_relative("/etc/hosts", Some("/")), "etc/hosts");
    }

    #[test]
    fn test_is_absolute_path() {
        assert!(is_absolute_path("/usr/bin"));
        assert!(is_absolute_path(r"C:\Windows"));
        assert!(is_absolute_path("d:/data"));
        assert!(is_absolute_path(r"\\server\share"));
        assert!(!is_absolute_path("src/main.rs"));
        assert!(!is_absolute_path("C:relative"));
    }

    #[test]
    fn test_verify_hash() {
        let workdir = "/Users/cliftonc/work/guideai";
        let expected = "7e95bdea1c91b994ca74439a92c90b82767abc9c0b8566e20ab60b2a797fc332";
        assert!(verify_hash(workdir, expected));
        assert!(verify_hash(workdir, &expected.to_uppercase()));
    }

    #[test]
    fn test_infer_project_path_empty_inputs() {
        let none: [&str; 0] = [];
        assert_eq!(infer_project_path("abc", &none), None);
        assert_eq!(infer_project_path("", &["/Users/a/b.rs"]), None);
    }

    #[test]
    fn test_infer_project_path_skips_relative() {
        let hash = project_hash("src");
        assert_eq!(infer_project_path(&hash, &["src/main.rs"]), None);
    }

    #[test]
    fn test_infer_project_path_candidate_itself() {
        let hash = project_hash("/srv/app");
        assert_eq!(
            infer_project_path(&hash, &["/srv/app"]),
            Some("/srv/app".to_string())
        );
    }

    #[test]
    fn test_find_matching_path_windows() {
        let hash = project_hash(r"C:\work\app");
        assert_eq!(
            find_matching_path(r"C:\work\app\src\main.rs", &hash),
            Some(r"C:\work\app".to_string())
        );
    }

    #[test]
    fn test_find_matching_path_terminates_at_root() {
        assert_eq!(find_matching_path("/", &project_hash("/")), None);
        assert_eq!(find_matching_path("///", "00"), None);
    }

    #[test]
    fn test_extract_candidate_paths_trims_punctuation() {
        let paths = extract_candidate_paths("see `/Users/a/repo/x.rs`, then (/home/b/y.py).");
        assert_eq!(paths, vec!["/Users/a/repo/x.rs", "/home/b/y.py"]);
    }
}
