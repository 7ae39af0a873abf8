//! Error type shared by the core and the host helpers.

/// Everything that can go wrong while building render inputs, loading
/// settings or talking to the render worker.
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    /// Zoom must be a positive, finite factor.
    #[error("zoom factor must be positive and finite, got {0}")]
    InvalidZoom(f64),

    /// The pan center must be a finite point.
    #[error("pan center must be finite, got ({re}, {im})")]
    InvalidPan { re: f64, im: f64 },

    /// The base extent of the plane must be positive and finite.
    #[error("base extent must be positive and finite, got {0}")]
    InvalidExtent(f64),

    /// A raster needs at least one pixel on each axis.
    #[error("raster must be at least 1x1, got {width}x{height}")]
    InvalidRaster { width: u32, height: u32 },

    #[error("iteration budget must be at least 1")]
    InvalidBudget,

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    Settings(String),

    /// Pixel data that does not hold `4 * width * height` bytes.
    #[error("image buffer of {len} bytes does not fit {width}x{height} RGBA")]
    BufferSize { width: u32, height: u32, len: usize },

    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),

    /// The worker thread is gone and can no longer accept requests.
    #[error("render worker has shut down")]
    WorkerClosed,
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
