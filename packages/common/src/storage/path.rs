use super::error::StorageError;

const MAX_PATH_LEN: usize = 512;

fn invalid(path: &str, reason: &'static str) -> StorageError {
    StorageError::InvalidPath {
        path: path.to_string(),
        reason,
    }
}

/// Validates a disk-relative path such as `ar_models/chair.glb`.
///
/// Paths are `/`-separated, relative, and may not contain empty, `.`/`..`
/// or hidden segments, so a validated path always stays below the disk root.
pub fn validate_relative_path(path: &str) -> Result<&str, StorageError> {
    if path.is_empty() {
        return Err(invalid(path, "path cannot be empty"));
    }

    if path.len() > MAX_PATH_LEN {
        return Err(invalid(path, "path exceeds maximum length of 512 characters"));
    }

    if path.contains('\0') {
        return Err(invalid(path, "null bytes are not allowed"));
    }

    if path.chars().any(|c| c.is_ascii_control()) {
        return Err(invalid(path, "control characters are not allowed"));
    }

    if path.contains('\\') {
        return Err(invalid(path, "backslashes are not allowed"));
    }

    if path.starts_with('/') {
        return Err(invalid(path, "path must be relative"));
    }

    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(invalid(path, "empty path segments are not allowed"));
        }
        if segment == ".." || segment == "." {
            return Err(invalid(path, "'.' and '..' segments are not allowed"));
        }
        if segment.starts_with('.') {
            return Err(invalid(path, "hidden path segments are not allowed"));
        }
    }

    Ok(path)
}

/// Validates a single file name (no directory components).
pub fn validate_file_name(name: &str) -> Result<&str, StorageError> {
    if name.contains('/') {
        return Err(invalid(name, "path separators are not allowed"));
    }
    validate_relative_path(name)
}

/// Joins a directory and a file name with `/`.
pub fn join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
