//! Errors surfaced while emitting Ninja files.

use crate::label::Label;
use std::error;
use std::fmt;
use std::io;

/// An error produced while translating the resolved graph into Ninja text.
///
/// Most errors name the target that triggered them in
/// [`origin`][Self::origin]. The optional [`help`][Self::help] text carries
/// the longer explanation printed below the first line.
#[derive(Clone, Debug)]
pub struct Error {
	pub origin: Option<Label>,
	pub message: String,
	pub help: String,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	pub fn new(message: impl Into<String>) -> Error {
		Error {
			origin: None,
			message: message.into(),
			help: String::new(),
		}
	}

	/// Create an error attributed to a specific target.
	pub fn in_target(origin: &Label, message: impl Into<String>) -> Error {
		Error {
			origin: Some(origin.clone()),
			message: message.into(),
			help: String::new(),
		}
	}

	/// Attach the multi-line help text.
	pub fn with_help(mut self, help: impl Into<String>) -> Error {
		self.help = help.into();
		self
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "ERROR")?;
		if let Some(origin) = &self.origin {
			write!(f, " at {}", origin)?;
		}
		write!(f, ": {}", self.message)?;
		if !self.help.is_empty() {
			write!(f, "\n{}", self.help)?;
		}
		Ok(())
	}
}

impl error::Error for Error {}

impl From<io::Error> for Error {
	fn from(src: io::Error) -> Error {
		Error::new(format!("I/O failure: {}", src))
	}
}
