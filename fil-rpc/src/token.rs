// fil-rpc/src/token.rs
use std::fs;
use std::path::Path;

/// Reads a bearer token from a plain text file
///
/// A missing, unreadable or empty file is not fatal: a warning is logged and
/// calls proceed without authentication.
pub fn load_token(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(contents) => {
            let token = contents.trim().to_string();
            if token.is_empty() {
                log::warn!("Token file {} is empty, continuing without auth", path.display());
                None
            } else {
                log::info!("Loaded RPC auth token from {}", path.display());
                Some(token)
            }
        }
        Err(e) => {
            log::warn!("Could not read token file {}: {}, continuing without auth", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_token_is_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  eyJhbGciOi.token  ").unwrap();
        assert_eq!(load_token(file.path()).as_deref(), Some("eyJhbGciOi.token"));
    }

    #[test]
    fn test_missing_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_token(dir.path().join("jwt")), None);
    }

    #[test]
    fn test_blank_file_yields_none() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(load_token(file.path()), None);
    }
}
