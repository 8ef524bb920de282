//! SECOM dataset acquisition
//!
//! Downloads the UCI SECOM archive, extracts it into the data directory,
//! and removes the archive afterwards. A directory that already holds
//! `secom*` files is treated as a warm cache and left untouched.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;

use crate::utils::create_download_bar;

pub const DEFAULT_DATASET_URL: &str =
    "https://archive.ics.uci.edu/static/public/179/secom.zip";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Locations of the extracted feature and label files.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub features: PathBuf,
    pub labels: PathBuf,
}

/// Expected file locations inside a data directory.
pub fn dataset_paths(data_dir: &Path) -> DatasetPaths {
    DatasetPaths {
        features: data_dir.join("secom.data"),
        labels: data_dir.join("secom_labels.data"),
    }
}

/// Download and extract the dataset unless cached files are present.
pub fn fetch_dataset(url: &str, data_dir: &Path) -> Result<DatasetPaths> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    if has_cached_files(data_dir)? {
        println!(
            "   {} Dataset already present in {}, skipping download",
            style("✓").green(),
            style(data_dir.display()).dim()
        );
        return Ok(dataset_paths(data_dir));
    }

    let archive_path = data_dir.join("secom.zip");
    download_archive(url, &archive_path)?;
    extract_archive(&archive_path, data_dir)?;
    std::fs::remove_file(&archive_path).ok();

    let paths = dataset_paths(data_dir);
    anyhow::ensure!(
        paths.features.exists(),
        "Archive did not contain secom.data"
    );
    Ok(paths)
}

/// `secom*` files already extracted here?
fn has_cached_files(data_dir: &Path) -> Result<bool> {
    for entry in std::fs::read_dir(data_dir)
        .with_context(|| format!("Failed to list data directory: {}", data_dir.display()))?
    {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with("secom") {
            return Ok(true);
        }
    }
    Ok(false)
}

fn download_archive(url: &str, dest: &Path) -> Result<()> {
    println!("   {} Downloading {}", style("↓").cyan(), style(url).dim());

    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let mut response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to request {}", url))?;
    anyhow::ensure!(
        response.status().is_success(),
        "Download failed with HTTP {} for {}",
        response.status(),
        url
    );

    let total_bytes = response.content_length().unwrap_or(0);
    let bar = create_download_bar(total_bytes);

    let mut file = File::create(dest)
        .with_context(|| format!("Failed to create archive file: {}", dest.display()))?;
    let mut buffer = [0u8; 64 * 1024];
    let mut downloaded = 0u64;
    loop {
        let read = response
            .read(&mut buffer)
            .context("Failed while reading download stream")?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read])
            .with_context(|| format!("Failed to write archive file: {}", dest.display()))?;
        downloaded += read as u64;
        bar.set_position(downloaded);
    }
    bar.finish_with_message("Download complete");

    Ok(())
}

/// Unpack a zip archive into the destination directory.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read archive: {}", archive_path.display()))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            anyhow::bail!("Archive entry {} has an unsafe path", entry.name());
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)
            .with_context(|| format!("Failed to create file: {}", target.display()))?;
        std::io::copy(&mut entry, &mut out)
            .with_context(|| format!("Failed to extract entry to {}", target.display()))?;
    }

    Ok(())
}
