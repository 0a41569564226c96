#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Generic {0}")]
    Generic(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog API returned HTTP {0}")]
    ApiStatus(u16),

    #[error("Invalid volume ID or URL: {0}")]
    InvalidVolumeId(String),
}
