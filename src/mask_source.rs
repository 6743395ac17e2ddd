// src/mask_source.rs

use crate::mask::BinaryMask;
use crate::types::InputConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

const MASK_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Directory of warped binary masks, one image per frame in path order.
pub struct MaskSource {
    config: InputConfig,
}

impl MaskSource {
    pub fn new(config: InputConfig) -> Self {
        Self { config }
    }

    pub fn find_mask_files(&self) -> Result<Vec<PathBuf>> {
        let dir = Path::new(&self.config.mask_dir);
        if !dir.is_dir() {
            anyhow::bail!("Mask directory {} does not exist", dir.display());
        }

        let mut masks: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_mask_file(p))
            .collect();
        masks.sort();

        info!("Found {} mask files", masks.len());
        Ok(masks)
    }

    pub fn load(&self, path: &Path) -> Result<BinaryMask> {
        let img = image::open(path)
            .with_context(|| format!("Failed to decode mask {}", path.display()))?
            .to_luma8();
        BinaryMask::from_luma(&img, self.config.binary_threshold)
    }
}

fn is_mask_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            MASK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
