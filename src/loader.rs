//! Loads a `World` from a JSON sector file.
//!
//! Expected shape:
//!
//! ```json
//! { "sectors": [ { "points": [x0, y0, x1, y1], "colors": [r, g, b, a] } ] }
//! ```
//!
//! Loading is all-or-nothing: the first violation aborts and no partial
//! world is returned.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::world::{Sector, World};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Points,
    Colors,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Points => "points",
            Field::Colors => "colors",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Coarse classification of a `LoadError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileOpen,
    Parse,
    Schema,
    Type,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("missing or invalid 'sectors'")]
    MissingSectors,
    #[error("sector {sector}: '{field}' missing or is not an array")]
    InvalidField { sector: usize, field: Field },
    #[error("sector {sector}: {field}[{index}] is not a 32-bit integer: {value}")]
    NotInteger {
        sector: usize,
        field: Field,
        index: usize,
        value: Value,
    },
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::FileOpen { .. } => ErrorKind::FileOpen,
            LoadError::Parse(_) => ErrorKind::Parse,
            LoadError::MissingSectors | LoadError::InvalidField { .. } => ErrorKind::Schema,
            LoadError::NotInteger { .. } => ErrorKind::Type,
        }
    }
}

pub fn load(path: impl AsRef<Path>) -> Result<World, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let world = load_slice(&bytes)?;

    log::info!("Loaded {} sectors from {}", world.len(), path.display());
    for (i, sector) in world.sectors().iter().enumerate() {
        log::debug!(
            "  Sector {} has {} points and {} color components",
            i,
            sector.points().len(),
            sector.colors().len()
        );
    }

    Ok(world)
}

pub fn load_str(text: &str) -> Result<World, LoadError> {
    load_slice(text.as_bytes())
}

/// Parses raw file contents. Invalid UTF-8 is a parse error. A leading UTF-8
/// byte order mark is skipped.
pub fn load_slice(bytes: &[u8]) -> Result<World, LoadError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let root: Value = serde_json::from_slice(bytes)?;
    from_value(&root)
}

pub fn from_value(root: &Value) -> Result<World, LoadError> {
    let entries = root
        .get("sectors")
        .and_then(Value::as_array)
        .ok_or(LoadError::MissingSectors)?;

    let sectors = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_sector(i, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(World::new(sectors))
}

fn parse_sector(sector: usize, entry: &Value) -> Result<Sector, LoadError> {
    // Both fields must be arrays before any element is coerced.
    let points = required_array(sector, entry, Field::Points)?;
    let colors = required_array(sector, entry, Field::Colors)?;

    Ok(Sector::new(
        int_elements(sector, Field::Points, points)?,
        int_elements(sector, Field::Colors, colors)?,
    ))
}

fn required_array(sector: usize, entry: &Value, field: Field) -> Result<&[Value], LoadError> {
    entry
        .get(field.key())
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or(LoadError::InvalidField { sector, field })
}

fn int_elements(sector: usize, field: Field, values: &[Value]) -> Result<Vec<i32>, LoadError> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            as_i32(value).ok_or_else(|| LoadError::NotInteger {
                sector,
                field,
                index,
                value: value.clone(),
            })
        })
        .collect()
}

/// Integral JSON numbers within `i32` range. `3.0` passes, `3.5` does not.
fn as_i32(value: &Value) -> Option<i32> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).ok();
    }
    if n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}
