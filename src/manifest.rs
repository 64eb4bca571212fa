use crate::context::Context;
use crate::error::Error;
use crate::result::Result;
use crate::tpl::Tpl;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SOURCE: &str = "out";
const DEFAULT_FILENAME: &str = "$NAME";
const ARCHIVE_EXTENSION: &str = ".tar.gz";

#[derive(Debug, Deserialize)]
pub struct CargoToml {
    #[serde(default)]
    pub package: Option<Package>,
}

#[derive(Debug, Deserialize)]
pub struct Package {
    pub name: String,
    /// Either a version string or `{ workspace = true }`
    #[serde(default)]
    pub version: Option<toml::Value>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Metadata {
    #[serde(default)]
    pub outpack: Option<PackConfig>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PackConfig {
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub filename: Option<String>,

    #[serde(rename = "output-folder", default)]
    pub output_folder: Option<String>,
}

/// Resolved packaging job
#[derive(Debug)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub source_dir: PathBuf,
    pub archive_path: PathBuf,
}

impl Manifest {
    /// Load from `[package.metadata.outpack]` in Cargo.toml, falling back to
    /// defaults when there is no Cargo.toml or no such section
    pub fn load(ctx: &Context) -> Result<Self> {
        let (name, version, config) = read_package(ctx)?;
        Self::resolve(ctx, &name, &version, config.unwrap_or_default())
    }

    /// Load using a standalone TOML file holding the outpack keys at top level.
    /// Package name and version still come from Cargo.toml when present.
    pub fn load_with_config_file(ctx: &Context, config_path: &Path) -> Result<Self> {
        if !config_path.is_file() {
            return Err(Error::ManifestNotFound(config_path.display().to_string()));
        }

        let content = fs::read_to_string(config_path)
            .map_err(|e| Error::fs("read manifest", config_path, e))?;
        let config: PackConfig = toml::from_str(&content)?;

        let (name, version, _) = read_package(ctx)?;
        Self::resolve(ctx, &name, &version, config)
    }

    fn resolve(ctx: &Context, name: &str, version: &str, config: PackConfig) -> Result<Self> {
        let tpl = Tpl::with_package(name, version);

        let source_dir = ctx
            .base_dir
            .join(tpl.parse(config.source.as_deref().unwrap_or(DEFAULT_SOURCE)));

        let filename = tpl.parse(config.filename.as_deref().unwrap_or(DEFAULT_FILENAME));
        if filename.trim().is_empty() {
            return Err(Error::InvalidManifest(
                "outpack filename resolves to an empty string".to_string(),
            ));
        }

        let output_folder = config
            .output_folder
            .map(|f| ctx.base_dir.join(tpl.parse(&f)))
            .unwrap_or_else(|| ctx.base_dir.clone());

        Ok(Manifest {
            name: name.to_string(),
            version: version.to_string(),
            source_dir,
            archive_path: output_folder.join(archive_filename(&filename)),
        })
    }
}

/// Append `.tar.gz` unless the name already carries a gzip tar extension
pub fn archive_filename(filename: &str) -> String {
    if filename.ends_with(ARCHIVE_EXTENSION) || filename.ends_with(".tgz") {
        filename.to_string()
    } else {
        format!("{}{}", filename, ARCHIVE_EXTENSION)
    }
}

/// Package name, version and outpack section from Cargo.toml, if any
fn read_package(ctx: &Context) -> Result<(String, String, Option<PackConfig>)> {
    let fallback = || (default_name(ctx), "0.0.0".to_string(), None);

    let Some(manifest_path) = &ctx.manifest_path else {
        return Ok(fallback());
    };

    let content = fs::read_to_string(manifest_path)
        .map_err(|e| Error::fs("read manifest", manifest_path, e))?;
    let cargo_toml: CargoToml = toml::from_str(&content)?;

    let Some(package) = cargo_toml.package else {
        return Ok(fallback());
    };

    let version = package
        .version
        .as_ref()
        .and_then(|v| v.as_str())
        .unwrap_or("0.0.0")
        .to_string();
    let config = package.metadata.and_then(|m| m.outpack);

    Ok((package.name, version, config))
}

fn default_name(ctx: &Context) -> String {
    crate::utils::dir_name(&ctx.base_dir).unwrap_or_else(|| "archive".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_cargo_toml(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("Cargo.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("meet2-pc-frontend");
        fs::create_dir(&base).unwrap();

        let ctx = Context::new(None, base.clone(), false);
        let manifest = Manifest::load(&ctx).unwrap();

        assert_eq!(manifest.name, "meet2-pc-frontend");
        assert_eq!(manifest.source_dir, base.join("out"));
        assert_eq!(manifest.archive_path, base.join("meet2-pc-frontend.tar.gz"));
    }

    #[test]
    fn test_metadata_section() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_cargo_toml(
            tmp.path(),
            r#"
[package]
name = "frontend"
version = "2.1.0"

[package.metadata.outpack]
source = "dist"
filename = "$NAME-$VERSION"
output-folder = "setup"
"#,
        );

        let ctx = Context::new(Some(path), PathBuf::from("/unused"), false);
        let manifest = Manifest::load(&ctx).unwrap();

        assert_eq!(manifest.version, "2.1.0");
        assert_eq!(manifest.source_dir, tmp.path().join("dist"));
        assert_eq!(
            manifest.archive_path,
            tmp.path().join("setup").join("frontend-2.1.0.tar.gz")
        );
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_cargo_toml(
            tmp.path(),
            "[package]\nname = \"frontend\"\nversion.workspace = true\n",
        );

        let ctx = Context::new(Some(path), PathBuf::from("/unused"), false);
        let manifest = Manifest::load(&ctx).unwrap();

        assert_eq!(manifest.version, "0.0.0");
        assert_eq!(manifest.source_dir, tmp.path().join("out"));
        assert_eq!(manifest.archive_path, tmp.path().join("frontend.tar.gz"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_cargo_toml(
            tmp.path(),
            "[package]\nname = \"x\"\n\n[package.metadata.outpack]\nsorce = \"dist\"\n",
        );

        let ctx = Context::new(Some(path), PathBuf::from("/unused"), false);
        assert!(matches!(Manifest::load(&ctx), Err(Error::Toml(_))));
    }

    #[test]
    fn test_empty_filename_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_cargo_toml(
            tmp.path(),
            "[package]\nname = \"x\"\n\n[package.metadata.outpack]\nfilename = \"\"\n",
        );

        let ctx = Context::new(Some(path), PathBuf::from("/unused"), false);
        assert!(matches!(
            Manifest::load(&ctx),
            Err(Error::InvalidManifest(_))
        ));
    }

    #[test]
    fn test_standalone_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let cargo = write_cargo_toml(tmp.path(), "[package]\nname = \"web\"\nversion = \"1.0.0\"\n");
        let config = tmp.path().join("outpack.toml");
        fs::write(&config, "source = \"build\"\nfilename = \"$NAME-v$VERSION.tgz\"\n").unwrap();

        let ctx = Context::new(Some(cargo), PathBuf::from("/unused"), false);
        let manifest = Manifest::load_with_config_file(&ctx, &config).unwrap();

        assert_eq!(manifest.source_dir, tmp.path().join("build"));
        assert_eq!(manifest.archive_path, tmp.path().join("web-v1.0.0.tgz"));
    }

    #[test]
    fn test_standalone_config_file_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = Context::new(None, tmp.path().to_path_buf(), false);
        let result = Manifest::load_with_config_file(&ctx, &tmp.path().join("nope.toml"));
        assert!(matches!(result, Err(Error::ManifestNotFound(_))));
    }

    #[test]
    fn test_archive_filename() {
        assert_eq!(archive_filename("app"), "app.tar.gz");
        assert_eq!(archive_filename("app.tar.gz"), "app.tar.gz");
        assert_eq!(archive_filename("app.tgz"), "app.tgz");
    }
}
