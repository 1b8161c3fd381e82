//! Build script for the meter plugin.
//!
//! Packs the built web editor (`ui/dist`) into `$OUT_DIR/ui.zip`, which the
//! plugin embeds for release builds. Paths inside the archive are relative
//! to `ui/dist` and use forward slashes.

use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn main() -> Result<(), Box<dyn Error>> {
    let dist = PathBuf::from("ui/dist");
    println!("cargo:rerun-if-changed={}", dist.display());

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let mut writer = ZipWriter::new(File::create(out_dir.join("ui.zip"))?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    if dist.is_dir() {
        let mut files = Vec::new();
        collect_files(&dist, &mut files)?;
        files.sort();
        for path in files {
            let name = archive_name(&dist, &path)?;
            println!("cargo:rerun-if-changed={}", path.display());
            writer.start_file(name, options)?;
            writer.write_all(&fs::read(&path)?)?;
        }
    } else {
        println!("cargo:warning=ui/dist not found, embedding an empty editor archive");
    }

    writer.finish()?;
    Ok(())
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn archive_name(root: &Path, path: &Path) -> Result<String, Box<dyn Error>> {
    let relative = path.strip_prefix(root)?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
