use crate::config::Config;
use std::path::PathBuf;

/// Splits a raw control message into its verb and the rest of the first line.
///
/// The verb keeps its case. Anything after the first line break is ignored.
pub fn split_command(message: &str) -> (&str, &str) {
    let line = message.trim_start().lines().next().unwrap_or("");
    match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line.trim_end(), ""),
    }
}

/// Resolves `arg` against the virtual working directory, folding `.` and `..`.
///
/// The result is always absolute and never climbs above `/`.
pub fn resolve_path(current_dir: &str, arg: &str) -> String {
    let mut segments: Vec<&str> = if arg.starts_with('/') {
        Vec::new()
    } else {
        current_dir.split('/').filter(|s| !s.is_empty()).collect()
    };

    for segment in arg.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    format!("/{}", segments.join("/"))
}

pub fn parent_dir(current_dir: &str) -> String {
    resolve_path(current_dir, "..")
}

/// Maps a virtual directory onto the served root on disk.
pub fn construct_path(config: &Config, current_dir: &str) -> PathBuf {
    config
        .server
        .root_dir
        .join(current_dir.trim_start_matches('/'))
}

/// Resolves the on-disk directory for `virtual_dir`, symlinks included, and
/// fails with `PermissionDenied` when it lands outside the served root.
pub async fn confine_path(config: &Config, virtual_dir: &str) -> Result<PathBuf, std::io::Error> {
    let root = tokio::fs::canonicalize(&config.server.root_dir).await?;
    let path = tokio::fs::canonicalize(construct_path(config, virtual_dir)).await?;
    if !path.starts_with(&root) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("{:?} is outside the served root", path),
        ));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("USER anonymous\r\n"), ("USER", "anonymous"));
        assert_eq!(split_command("PASV\r\n"), ("PASV", ""));
        assert_eq!(split_command("  CWD  /pub/docs \r\n"), ("CWD", "/pub/docs"));
        assert_eq!(split_command("user bob\r\n"), ("user", "bob"));
        assert_eq!(split_command("USER a\r\nPASS b\r\n"), ("USER", "a"));
        assert_eq!(split_command(""), ("", ""));
        assert_eq!(split_command("\r\n"), ("", ""));
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path("/", "pub"), "/pub");
        assert_eq!(resolve_path("/pub", "docs/../img"), "/pub/img");
        assert_eq!(resolve_path("/pub/img", "/etc"), "/etc");
        assert_eq!(resolve_path("/pub", "./."), "/pub");
        assert_eq!(resolve_path("/", "../../.."), "/");
        assert_eq!(resolve_path("/a", "b//c/"), "/a/b/c");
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("/a/b"), "/a");
        assert_eq!(parent_dir("/a"), "/");
        assert_eq!(parent_dir("/"), "/");
    }

    #[test]
    fn test_construct_path_stays_under_root() {
        let mut config = Config::default();
        config.server.root_dir = PathBuf::from("/srv/ftp");
        assert_eq!(construct_path(&config, "/"), PathBuf::from("/srv/ftp/"));
        assert_eq!(construct_path(&config, "/pub"), PathBuf::from("/srv/ftp/pub"));
    }

    #[tokio::test]
    async fn test_confine_path_accepts_real_subdirectory() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("pub")).unwrap();
        let mut config = Config::default();
        config.server.root_dir = root.path().to_path_buf();

        let path = confine_path(&config, "/pub").await.unwrap();
        assert_eq!(path, root.path().canonicalize().unwrap().join("pub"));
        assert!(confine_path(&config, "/missing").await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_confine_path_rejects_symlink_out_of_root() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("link")).unwrap();
        let mut config = Config::default();
        config.server.root_dir = root.path().to_path_buf();

        let err = confine_path(&config, "/link").await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::PermissionDenied);
    }
}
