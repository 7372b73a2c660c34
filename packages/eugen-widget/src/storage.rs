//! String key/value persistence standing in for browser local storage.

use std::{
	collections::{BTreeMap, HashMap},
	fs, io,
	path::{Path, PathBuf},
	sync::Mutex,
};

use crate::{Error, Result};

pub trait KeyValueStore: Send + Sync {
	fn get(&self, key: &str) -> Result<Option<String>>;

	/// Overwrites any previous value under `key`.
	fn set(&self, key: &str, value: &str) -> Result<()>;

	fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: Mutex<HashMap<String, String>>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}
impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>> {
		let entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());

		Ok(entries.get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());

		entries.insert(key.to_string(), value.to_string());

		Ok(())
	}

	fn remove(&self, key: &str) -> Result<()> {
		let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());

		entries.remove(key);

		Ok(())
	}
}

/// One JSON object per file, one string entry per key. Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileStore {
	path: PathBuf,
	guard: Mutex<()>,
}
impl FileStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), guard: Mutex::new(()) }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_entries(&self) -> Result<BTreeMap<String, String>> {
		let raw = match fs::read_to_string(&self.path) {
			Ok(raw) => raw,
			Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
			Err(err) => return Err(Error::StorageIo { path: self.path.clone(), source: err }),
		};

		if raw.trim().is_empty() {
			return Ok(BTreeMap::new());
		}

		serde_json::from_str(&raw)
			.map_err(|err| Error::StorageFormat { path: self.path.clone(), source: err })
	}

	/// Like [`Self::read_entries`], but a corrupt file counts as empty so writes can recover it.
	fn read_entries_for_write(&self) -> Result<BTreeMap<String, String>> {
		match self.read_entries() {
			Err(Error::StorageFormat { path, source }) => {
				tracing::warn!(path = ?path, error = %source, "Discarding unreadable storage file.");

				Ok(BTreeMap::new())
			},
			other => other,
		}
	}

	fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
		if let Some(parent) = self.path.parent()
			&& !parent.as_os_str().is_empty()
		{
			fs::create_dir_all(parent)
				.map_err(|err| Error::StorageIo { path: self.path.clone(), source: err })?;
		}

		let raw = serde_json::to_string_pretty(entries)?;

		fs::write(&self.path, raw)
			.map_err(|err| Error::StorageIo { path: self.path.clone(), source: err })
	}
}
impl KeyValueStore for FileStore {
	fn get(&self, key: &str) -> Result<Option<String>> {
		let _guard = self.guard.lock().unwrap_or_else(|err| err.into_inner());

		Ok(self.read_entries()?.remove(key))
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		let _guard = self.guard.lock().unwrap_or_else(|err| err.into_inner());
		let mut entries = self.read_entries_for_write()?;

		entries.insert(key.to_string(), value.to_string());

		self.write_entries(&entries)
	}

	fn remove(&self, key: &str) -> Result<()> {
		let _guard = self.guard.lock().unwrap_or_else(|err| err.into_inner());
		let mut entries = self.read_entries_for_write()?;

		if entries.remove(key).is_none() {
			return Ok(());
		}

		self.write_entries(&entries)
	}
}
