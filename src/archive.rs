use std::fs;
use std::io::Write;

use camino::Utf8Path;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::domain::Post;
use crate::error::HarvestError;

const INDENT: &[u8] = b"    ";

pub fn to_pretty_json(posts: &[Post]) -> Result<Vec<u8>, HarvestError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    posts
        .serialize(&mut serializer)
        .map_err(|err| HarvestError::Archive(err.to_string()))?;
    buf.push(b'\n');
    Ok(buf)
}

/// Replaces the archive at `dest` with the given posts. The JSON is written
/// to a sibling temp file first, so readers never see a half-written archive.
pub fn write_archive(posts: &[Post], dest: &Utf8Path) -> Result<(), HarvestError> {
    let json = to_pretty_json(posts)?;
    let parent = match dest.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path()).map_err(|err| HarvestError::Archive(err.to_string()))?;

    let mut temp = tempfile::Builder::new()
        .prefix("post-harvest-archive")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| HarvestError::Archive(err.to_string()))?;
    temp.write_all(&json)
        .map_err(|err| HarvestError::Archive(err.to_string()))?;
    temp.flush()
        .map_err(|err| HarvestError::Archive(err.to_string()))?;
    temp.persist(dest.as_std_path())
        .map_err(|err| HarvestError::Archive(err.to_string()))?;
    Ok(())
}

pub fn read_archive(path: &Utf8Path) -> Result<Vec<Post>, HarvestError> {
    let content = fs::read_to_string(path.as_std_path()).map_err(|err| HarvestError::Archive(err.to_string()))?;
    serde_json::from_str(&content).map_err(|err| HarvestError::Archive(err.to_string()))
}
