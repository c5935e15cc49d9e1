use crate::TransferError;

/// Normalizes a collected path into device form.
///
/// Backslashes become `/` and every `.` segment is dropped, so
/// `././a.txt` and `out/./a.txt` collapse to `a.txt` and `out/a.txt`.
pub fn normalize_relative_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Checks that a normalized device path stays inside the web root.
///
/// The path must be non-empty, relative and `/` separated, with no `..`
/// and no empty or `.` segments. Drive letters (`C:`) count as absolute.
pub fn validate_upload_path(path: &str) -> Result<(), TransferError> {
    let problem = if path.is_empty() {
        Some("empty path")
    } else if path.starts_with('/') || has_drive_letter(path) {
        Some("absolute path not allowed")
    } else {
        path.split('/').find_map(|segment| match segment {
            "" => Some("empty path segment"),
            "." => Some("current directory segment not allowed"),
            ".." => Some("parent directory traversal not allowed"),
            _ => None,
        })
    };

    match problem {
        Some(problem) => Err(TransferError::InvalidPath(format!("{problem}: {path:?}"))),
        None => Ok(()),
    }
}

fn has_drive_letter(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_leading_dot_slash() {
        assert_eq!(normalize_relative_path("./index.html"), "index.html");
        assert_eq!(normalize_relative_path("./_next/app.js"), "_next/app.js");
        assert_eq!(normalize_relative_path("index.html"), "index.html");
    }

    #[test]
    fn drops_every_current_dir_segment() {
        assert_eq!(normalize_relative_path("././a.txt"), "a.txt");
        assert_eq!(normalize_relative_path("out/./_next/./app.js"), "out/_next/app.js");
        assert_eq!(normalize_relative_path(".\\.\\a.txt"), "a.txt");
        assert_eq!(normalize_relative_path("."), "");
    }

    #[test]
    fn rejects_current_dir_segments() {
        assert!(validate_upload_path("./a.txt").is_err());
        assert!(validate_upload_path("out/./a.txt").is_err());
        assert!(validate_upload_path(".").is_err());
    }

    #[test]
    fn converts_backslashes() {
        assert_eq!(normalize_relative_path("out\\static\\a.css"), "out/static/a.css");
        assert_eq!(normalize_relative_path(".\\a.txt"), "a.txt");
    }

    #[test]
    fn keeps_dotfiles() {
        assert_eq!(normalize_relative_path(".nojekyll"), ".nojekyll");
    }

    #[test]
    fn rejects_empty_path() {
        assert!(validate_upload_path("").is_err());
    }

    #[test]
    fn rejects_parent_dir_traversal() {
        assert!(validate_upload_path("../../../etc/passwd").is_err());
        assert!(validate_upload_path("out/../../escape").is_err());
        assert!(validate_upload_path("..").is_err());
    }

    #[test]
    fn rejects_absolute_path() {
        assert!(validate_upload_path("/app/index.html").is_err());
        assert!(validate_upload_path("C:/site/index.html").is_err());
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(validate_upload_path("out//index.html").is_err());
        assert!(validate_upload_path("out/").is_err());
    }

    #[test]
    fn error_names_the_path() {
        let err = validate_upload_path("out/../x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid path: parent directory traversal not allowed: \"out/../x\""
        );
    }

    #[test]
    fn accepts_nested_relative_paths() {
        assert!(validate_upload_path("out/index.html").is_ok());
        assert!(validate_upload_path("out/_next/static/chunks/main.js").is_ok());
        assert!(validate_upload_path(".well-known/config.json").is_ok());
    }
}
