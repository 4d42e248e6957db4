use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use thiserror::Error;

/// Why source text could not be retrieved.
#[derive(Debug, Error)]
pub enum RetrievalError {
	#[error("Error reading file {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("Error fetching {url}: {source}")]
	Http {
		url: String,
		#[source]
		source: reqwest::Error,
	},
	#[error("HTTP error! status: {status} ({url})")]
	Status {
		url: String,
		status: reqwest::StatusCode,
	},
}

/// Retrieves the raw text behind `source`.
///
/// - `http://` and `https://` sources are fetched (blocking); any non-2xx
///   status is an error.
/// - Anything else is read from disk.
pub fn retrieve(source: &str) -> Result<String, RetrievalError> {
	if source.starts_with("http://") || source.starts_with("https://") {
		fetch(source)
	} else {
		read_text(source)
	}
}

fn fetch(url: &str) -> Result<String, RetrievalError> {
	let http = |source| RetrievalError::Http { url: url.to_owned(), source };

	let response = reqwest::blocking::get(url).map_err(http)?;
	let status = response.status();
	if !status.is_success() {
		return Err(RetrievalError::Status { url: url.to_owned(), status });
	}
	let text = response.text().map_err(http)?;
	log::debug!("fetched {} bytes from {}", text.len(), url);
	Ok(text)
}

/// Reads a whole text file into memory.
pub fn read_text<P: AsRef<Path>>(filename: P) -> Result<String, RetrievalError> {
	let path = filename.as_ref();
	let io_error = |source| RetrievalError::Io { path: path.to_path_buf(), source };

	let mut contents = String::new();
	File::open(path).map_err(io_error)?.read_to_string(&mut contents).map_err(io_error)?;
	Ok(contents)
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists the files with a given extension in a directory.
///
/// Returns file stems only (no path, no extension), sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(stem) = path.file_stem() {
				files.push(stem.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scratch_dir(name: &str) -> PathBuf {
		let dir = env::temp_dir().join(format!("md-chain-io-{}-{}", name, std::process::id()));
		let _ = fs::remove_dir_all(&dir);
		fs::create_dir_all(&dir).unwrap();
		dir
	}

	#[test]
	fn reads_local_files() {
		let dir = scratch_dir("read");
		let path = dir.join("book.md");
		fs::write(&path, "# Title\nsome text").unwrap();

		assert_eq!(retrieve(path.to_str().unwrap()).unwrap(), "# Title\nsome text");
		fs::remove_dir_all(dir).unwrap();
	}

	#[test]
	fn missing_file_is_a_typed_error() {
		let dir = scratch_dir("missing");
		let err = retrieve(dir.join("nope.md").to_str().unwrap()).unwrap_err();
		assert!(matches!(err, RetrievalError::Io { ref source, .. } if source.kind() == io::ErrorKind::NotFound));
		fs::remove_dir_all(dir).unwrap();
	}

	#[test]
	fn lists_files_by_extension() {
		let dir = scratch_dir("list");
		for name in ["b.md", "a.md", "notes.txt"] {
			fs::write(dir.join(name), "x").unwrap();
		}
		fs::create_dir(dir.join("sub.md")).unwrap();

		assert_eq!(list_files(&dir, "md").unwrap(), vec!["a", "b"]);
		fs::remove_dir_all(dir).unwrap();
	}

	#[test]
	fn dot_folder_is_current_dir() {
		assert_eq!(normalize_folder("./"), env::current_dir().unwrap());
		assert_eq!(normalize_folder("data"), PathBuf::from("data"));
	}
}
