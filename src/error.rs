use thiserror::Error;

/// Problems found while validating a path before playback
#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("node {index} has a non-finite coordinate")]
    InvalidCoordinate { index: usize },

    #[error("node {index} has an invalid segment {field}: {value}")]
    InvalidSegment {
        index: usize,
        field: &'static str,
        value: f64,
    },
}

/// Failures while turning a directions result into a path
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("directions result contains no routes")]
    NoRoutes,

    #[error("leg {leg} step {step} has no coordinates")]
    EmptyStep { leg: usize, step: usize },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Failures when configuring or starting a playback session
#[derive(Debug, Error, PartialEq)]
pub enum PlaybackError {
    #[error("desired ETA must be a finite number of minutes >= 0, got {0}")]
    InvalidEta(f64),

    #[error("model scale must be a finite number > 0, got {0}")]
    InvalidScale(f64),

    #[error("frames per camera must be greater than zero")]
    InvalidCadence,

    #[error("camera catalog is empty")]
    EmptyCatalog,

    #[error("camera preset {index} is invalid: {reason}")]
    InvalidCamera { index: usize, reason: String },
}

/// A renderer host refused a command
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HostError {
    #[error("model asset is not loaded")]
    AssetNotLoaded,

    #[error("host rejected command: {0}")]
    Rejected(String),
}

/// Failures reading or writing the route library
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("route library I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("route library is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no saved route named {0:?}")]
    NotFound(String),
}
