use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to access storage file at {path:?}.")]
	StorageIo { path: PathBuf, source: std::io::Error },
	#[error("Storage file at {path:?} is not a JSON object of strings.")]
	StorageFormat { path: PathBuf, source: serde_json::Error },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error("Chat endpoint answered with HTTP {status}.")]
	Status { status: u16 },
}
