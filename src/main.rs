mod args;
mod context;
mod error;
mod manifest;
mod pack;
mod platform;
mod result;
mod tpl;
mod utils;

use args::Args;
use context::Context;
use manifest::Manifest;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> result::Result<()> {
    // Parse command-line arguments
    let Args {
        verbose,
        source,
        output,
        path,
        manifest: outpack_manifest,
    } = Args::parse();

    let cwd = std::env::current_dir()?;

    // Cargo.toml is optional unless explicitly requested
    let manifest_path = utils::find_manifest(path.as_deref(), &cwd)?;

    let ctx = Context::new(manifest_path, cwd, verbose);

    cliclack::intro("outpack")?;

    let mut manifest = {
        let spinner = cliclack::spinner();
        spinner.start("Loading manifest...");
        let result = if let Some(config_path) = outpack_manifest {
            Manifest::load_with_config_file(&ctx, &config_path)
        } else {
            Manifest::load(&ctx)
        };
        match result {
            Ok(m) => {
                spinner.stop(format!("Loaded configuration for {} {}", m.name, m.version));
                m
            }
            Err(e) => {
                spinner.error("Failed to load manifest");
                return Err(e);
            }
        }
    };

    // Command-line paths win over the manifest
    if let Some(source) = source {
        manifest.source_dir = source;
    }
    if let Some(output) = output {
        manifest.archive_path = output;
    }

    if ctx.verbose {
        cliclack::log::info(format!(
            "Packing {} into {}",
            manifest.source_dir.display(),
            manifest.archive_path.display()
        ))?;
    }

    let spinner = cliclack::spinner();
    spinner.start("Creating tar.gz archive...");

    let summary = match pack::pack(&ctx, &manifest.source_dir, &manifest.archive_path) {
        Ok(summary) => summary,
        Err(e) => {
            spinner.error("Failed to create archive");
            return Err(e);
        }
    };

    spinner.stop(format!(
        "Packed {} members: {} files, {} directories, {} symlinks ({} bytes -> {} bytes)",
        summary.members(),
        summary.files,
        summary.directories,
        summary.symlinks,
        summary.content_bytes,
        summary.archive_bytes
    ));

    if ctx.verbose {
        for name in &summary.added {
            cliclack::log::remark(format!("Added {}", name.display()))?;
        }
    }

    for skipped in &summary.skipped {
        cliclack::log::warning(format!(
            "Skipped {}: {}",
            skipped.reason,
            skipped.path.display()
        ))?;
    }

    cliclack::outro(format!(
        "Archive created successfully: {}",
        manifest.archive_path.display()
    ))?;
    Ok(())
}
