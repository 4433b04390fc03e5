pub type ShotmarkResult<T> = Result<T, ShotmarkError>;

#[derive(thiserror::Error, Debug)]
pub enum ShotmarkError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("asset missing: {0}")]
    AssetMissing(String),

    #[error("io error: {0}")]
    Io(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShotmarkError {
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn asset_missing(msg: impl Into<String>) -> Self {
        Self::AssetMissing(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}
