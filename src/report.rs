use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::cache::DataCache;
use crate::error::{Error, Result};

/// Opening marker of the embedded data block in the dashboard HTML.
pub const OPEN_MARKER: &str = "const dataCache = {";

/// Closing marker of the embedded data block (eight spaces, brace,
/// semicolon — the indentation the dashboard's script block uses).
pub const CLOSE_MARKER: &str = "        };";

/// Indent unit matching the data block's position inside the script tag.
const BLOCK_INDENT: &[u8] = b"            ";

/// Render the full embedded block: opening marker, the cache as pretty
/// JSON, closing marker. The serialized object's outer braces are supplied
/// by the markers themselves, so the block stays a valid JS object literal
/// and a later run can find the same markers again.
pub fn render_block(cache: &DataCache) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(BLOCK_INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    cache.serialize(&mut ser)?;
    let json = String::from_utf8(buf).map_err(|e| Error::Serialize(e.to_string()))?;

    // Strip the outer `{`/`}`; keep the body's surrounding newlines.
    let body = &json[1..json.len() - 1];
    Ok(format!("{OPEN_MARKER}{body}{CLOSE_MARKER}"))
}

/// Replace the embedded data block in `artifact` with a fresh rendering of
/// `cache`, leaving every byte outside the block untouched.
///
/// The closing marker is searched strictly after the opening marker, so a
/// closing-marker-like string earlier in the file cannot truncate the
/// replacement range.
pub fn splice(artifact: &str, cache: &DataCache) -> Result<String> {
    let start = artifact
        .find(OPEN_MARKER)
        .ok_or_else(|| Error::MalformedArtifact("opening marker not found".into()))?;

    let search_from = start + OPEN_MARKER.len();
    let close_rel = artifact[search_from..].find(CLOSE_MARKER).ok_or_else(|| {
        Error::MalformedArtifact("closing marker not found after opening marker".into())
    })?;
    let end = search_from + close_rel + CLOSE_MARKER.len();

    let block = render_block(cache)?;
    let mut out = String::with_capacity(artifact.len() - (end - start) + block.len());
    out.push_str(&artifact[..start]);
    out.push_str(&block);
    out.push_str(&artifact[end..]);
    Ok(out)
}

/// Read the report file, splice the cache in, and write it back.
///
/// The file is only written after a successful splice; a malformed
/// artifact leaves it byte-identical.
pub fn update_report(path: &Path, cache: &DataCache) -> Result<()> {
    let artifact = std::fs::read_to_string(path)?;
    let updated = splice(&artifact, cache)?;
    std::fs::write(path, updated)?;
    log::info!("updated {} with fresh data", path.display());
    Ok(())
}
