use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("io error at `{path}`: {message}")]
    Path { path: String, message: String },
    #[error("http client error: {message}")]
    Http { message: String },
    #[error("credential error: {message}")]
    Credentials { message: String },
    #[error("rasterisation failed: {message}")]
    Raster { message: String },
    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn path(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::Path {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    pub fn raster(message: impl Into<String>) -> Self {
        Self::Raster {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
