//! Per-language natural class cache.
//!
//! Enumeration is by far the slowest stage, so its deduplicated output is
//! kept as `<output_dir>/<language>.json` and reused on later runs. An
//! unreadable or malformed cache file counts as a miss.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, warn};

use crate::classes::ClassMap;
use crate::error::{PhonosimError, Result};
use crate::persist::{write_atomic, OutputLayout};

pub struct NaturalClassCache {
    layout: OutputLayout,
}

impl NaturalClassCache {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }

    pub fn path(&self, language: &str) -> PathBuf {
        self.layout.classes_path(language)
    }

    /// Cached classes for `language`, if a readable cache file exists
    pub fn load(&self, language: &str) -> Option<ClassMap> {
        let path = self.path(language);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no natural class cache");
                return None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable natural class cache; recomputing");
                return None;
            }
        };

        match serde_json::from_str::<ClassMap>(&text) {
            Ok(classes) => {
                debug!(path = %path.display(), classes = classes.len(), "loaded natural class cache");
                Some(classes)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt natural class cache; recomputing");
                None
            }
        }
    }

    /// Write `classes` for `language`, replacing any previous cache
    pub fn store(&self, language: &str, classes: &ClassMap) -> Result<PathBuf> {
        let path = self.path(language);
        write_atomic(&path, &to_pretty_json(classes)?)?;
        Ok(path)
    }
}

/// JSON with 4-space indentation; non-ASCII segment labels stay verbatim.
fn to_pretty_json(classes: &ClassMap) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    classes
        .serialize(&mut serializer)
        .map_err(|e| PhonosimError::Serialization {
            reason: e.to_string(),
        })?;
    Ok(out)
}
