pub mod config;
pub mod error;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use indicatif::ProgressBar;
use pkx::{ColorPair, ModelFile};
use rayon::prelude::*;
use recolor::Recolor;

use crate::config::Config;
use crate::error::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// One model folder: a single model file plus its textures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub dir: PathBuf,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub assets: usize,
    pub processed: usize,
    pub skipped: usize,
    pub textures: usize,
}

/// Recolors every asset under `input` into a mirrored folder under `output`.
///
/// Only invalid root folders are fatal. Any other failure skips the asset it
/// belongs to and is logged.
pub fn run(
    input: &Path,
    output: &Path,
    config: &Config,
    progress: Option<&ProgressBar>,
) -> Result<Summary> {
    check_root("input", input)?;
    check_root("output", output)?;

    let assets = discover_assets(input, &config.asset_prefix)?;
    log::info!("found {} assets in {}", assets.len(), input.display());
    if let Some(bar) = progress {
        bar.set_length(assets.len() as u64);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()?;

    let outcomes: Vec<Option<usize>> = pool.install(|| {
        assets
            .par_iter()
            .map(|asset| {
                let outcome = process_asset(asset, &output.join(&asset.name), config);
                if let Some(bar) = progress {
                    bar.set_message(asset.name.clone());
                    bar.inc(1);
                }
                match outcome {
                    Ok(count) => Some(count),
                    Err(err) => {
                        log::error!("skipping {}: {:?}", asset.name, miette::Report::new(err));
                        None
                    }
                }
            })
            .collect()
    });

    let mut summary = Summary {
        assets: assets.len(),
        ..Summary::default()
    };
    for outcome in outcomes {
        match outcome {
            Some(count) => {
                summary.processed += 1;
                summary.textures += count;
            }
            None => summary.skipped += 1,
        }
    }
    Ok(summary)
}

/// Immediate sub-folders of `input` whose name starts with `prefix`, by name.
pub fn discover_assets(input: &Path, prefix: &str) -> Result<Vec<Asset>> {
    let mut assets = Vec::new();
    for entry in fs::read_dir(input).map_err(Error::io(input))? {
        let entry = entry.map_err(Error::io(input))?;
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(prefix) {
            assets.push(Asset { name, dir });
        }
    }
    assets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(assets)
}

/// Files directly inside `dir` with `extension` (compared case-insensitively), by name.
pub fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(Error::io(dir))? {
        let path = entry.map_err(Error::io(dir))?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// The single model file of an asset.
pub fn find_model(asset: &Asset, extension: &str) -> Result<PathBuf> {
    let mut models = files_with_extension(&asset.dir, extension)?;
    if models.len() != 1 {
        return Err(Error::AssetDiscovery {
            asset: asset.name.clone(),
            found: models.len(),
        });
    }
    Ok(models.remove(0))
}

pub fn load_colors(asset: &Asset, model_path: &Path) -> Result<ColorPair> {
    let model_error = |source: pkx::error::Error| Error::Model {
        asset: asset.name.clone(),
        source,
    };
    let mut model = ModelFile::open(model_path).map_err(model_error)?;
    model.require_colors().map_err(model_error)
}

/// Reads the colors of `asset` and writes its recolored textures to
/// `output_dir`. Returns the number of textures written.
pub fn process_asset(asset: &Asset, output_dir: &Path, config: &Config) -> Result<usize> {
    fs::create_dir_all(output_dir).map_err(Error::io(output_dir))?;

    let model_path = find_model(asset, &config.model_extension)?;
    let colors = load_colors(asset, &model_path)?;
    log::info!("processing model {}", asset.name);
    log::debug!(
        "{}: color1={:?} color2={:?}",
        asset.name,
        colors.color1,
        colors.color2
    );

    let recolor = Recolor::new(colors).with_strategy(config.strategy);
    let textures = files_with_extension(&asset.dir, &config.texture_extension)?;
    for texture in &textures {
        recolor_texture(texture, output_dir, &recolor)?;
    }
    Ok(textures.len())
}

/// Recolors one texture and saves it under the same file name in `output_dir`.
pub fn recolor_texture(texture: &Path, output_dir: &Path, recolor: &Recolor) -> Result<PathBuf> {
    let Some(file_name) = texture.file_name() else {
        return Err(Error::Io {
            path: texture.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "texture path has no file name"),
        });
    };
    log::info!("processing texture {}", file_name.to_string_lossy());

    let image_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source: image::ImageError| Error::Image { path, source }
    };
    let source = image::open(texture).map_err(image_error(texture))?;
    let image = recolor_image(source, recolor);

    let target = output_dir.join(file_name);
    image.save(&target).map_err(image_error(&target))?;
    Ok(target)
}

/// Recolors a decoded texture, keeping its bit depth and whether it has an
/// alpha channel. Grayscale input comes back as RGB(A).
pub fn recolor_image(source: DynamicImage, recolor: &Recolor) -> DynamicImage {
    let color = source.color();
    let wide = color.bytes_per_pixel() > color.channel_count();
    log::debug!("texture color type {color:?}");

    let recolored = if wide {
        let mut image = source.into_rgba16();
        recolor.apply(&mut image);
        DynamicImage::ImageRgba16(image)
    } else {
        let mut image = source.into_rgba8();
        recolor.apply(&mut image);
        DynamicImage::ImageRgba8(image)
    };

    // Opaque textures are processed with alpha 1; the scaled alpha is dropped.
    match (color.has_alpha(), wide) {
        (true, _) => recolored,
        (false, false) => DynamicImage::ImageRgb8(recolored.to_rgb8()),
        (false, true) => DynamicImage::ImageRgb16(recolored.to_rgb16()),
    }
}

fn check_root(role: &'static str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || !path.is_dir() {
        return Err(Error::Path {
            role,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
