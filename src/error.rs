use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Binary serialization error: {0}")]
	Bincode(#[from] bincode::Error),

	#[error("Thread pool error: {0}")]
	ThreadPool(#[from] rayon::ThreadPoolBuildError),

	#[error("Configuration error: {0}")]
	Config(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
