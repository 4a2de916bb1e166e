use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use panoview_core::probe::is_equirectangular;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let image = image::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?
        .into_rgba8();
    let (width, height) = image.dimensions();

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}x{}", width, height);
    if height > 0 {
        println!("Aspect:      {:.3}", f64::from(width) / f64::from(height));
    }
    println!(
        "Panorama:    {}",
        if is_equirectangular(&image) {
            "yes (equirectangular 2:1)"
        } else {
            "no"
        }
    );

    Ok(())
}
