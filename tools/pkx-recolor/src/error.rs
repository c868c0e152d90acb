use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("invalid {role} path \"{}\": it doesn't exist or is not a folder", .path.display())]
    #[diagnostic(code(pkx_recolor::path_error))]
    Path { role: &'static str, path: PathBuf },

    #[error("{found} model files found for {asset}, expected exactly one")]
    #[diagnostic(code(pkx_recolor::asset_discovery_error))]
    AssetDiscovery { asset: String, found: usize },

    #[error("cannot read colors of {asset}")]
    #[diagnostic(code(pkx_recolor::model_error))]
    Model {
        asset: String,
        #[source]
        source: pkx::error::Error,
    },

    #[error("texture \"{}\" could not be recolored", .path.display())]
    #[diagnostic(code(pkx_recolor::image_error))]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("file system error at \"{}\"", .path.display())]
    #[diagnostic(code(pkx_recolor::io_error))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file \"{}\"", .path.display())]
    #[diagnostic(code(pkx_recolor::config_error))]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot start the worker pool")]
    #[diagnostic(code(pkx_recolor::thread_pool_error))]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
