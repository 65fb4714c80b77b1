//! # Targets
//!
//! Target generation for the dispatcher.
//!
//! Responsibilities:
//! - Load wordlists
//! - Resolve the `{time}` value (`now`, epoch, ISO, or literal)
//! - Render `{word}`/`{time}` URL templates into `Target`s
//! - Persist the generated list
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::path::Path;
//! use targets::{read_wordlist, resolve_time, save_targets, UrlTemplate};
//!
//! let words = read_wordlist(Path::new("words.txt")).unwrap();
//! let time = resolve_time("now", "%Y-%m-%dT%H:%M:%S").unwrap();
//! let template = UrlTemplate::new("http://dvwa.local/?id={word}&ts={time}").unwrap();
//! let list = template.generate(&words, &time);
//! save_targets(&list, Path::new("generated_urls.txt")).unwrap();
//! ```

mod error;
mod output;
mod template;
mod time;
mod wordlist;

pub use contracts::Target;
pub use error::{Result, TargetError};
pub use output::save_targets;
pub use template::{encode_word, UrlTemplate, TIME_PLACEHOLDER, WORD_PLACEHOLDER};
pub use time::{resolve_time, resolve_time_at};
pub use wordlist::{parse_wordlist, read_wordlist};
