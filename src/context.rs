use std::path::PathBuf;

/// Context passed throughout the application containing global configuration
#[derive(Clone)]
pub struct Context {
    /// Enable verbose output (list every archive member as it is added)
    pub verbose: bool,

    /// Path to the Cargo.toml manifest, if one was found
    pub manifest_path: Option<PathBuf>,

    /// Base directory (directory containing Cargo.toml, or the working directory)
    pub base_dir: PathBuf,
}

impl Context {
    pub fn new(manifest_path: Option<PathBuf>, cwd: PathBuf, verbose: bool) -> Self {
        let base_dir = manifest_path
            .as_deref()
            .and_then(|p| p.parent())
            .map(|p| {
                if p.as_os_str().is_empty() {
                    cwd.clone()
                } else {
                    p.to_path_buf()
                }
            })
            .unwrap_or(cwd);

        Self {
            verbose,
            manifest_path,
            base_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_from_manifest() {
        let ctx = Context::new(
            Some(PathBuf::from("/work/app/Cargo.toml")),
            PathBuf::from("/elsewhere"),
            false,
        );
        assert_eq!(ctx.base_dir, PathBuf::from("/work/app"));
    }

    #[test]
    fn test_base_dir_falls_back_to_cwd() {
        let ctx = Context::new(None, PathBuf::from("/work/app"), true);
        assert_eq!(ctx.base_dir, PathBuf::from("/work/app"));

        let ctx = Context::new(Some(PathBuf::from("Cargo.toml")), PathBuf::from("/cwd"), false);
        assert_eq!(ctx.base_dir, PathBuf::from("/cwd"));
    }
}
