use std::{
    ffi::OsString,
    fs::File,
    io::{BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::instrument;

use crate::{Error, OcrResult, Result};

const JSON_INDENT: &[u8] = b"    ";

/// `photos/sample.jpg` -> `photos/sample.json`
pub fn sibling_json_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("json")
}

/// `photos/sample.jpg` + `.annotated.jpg` -> `<out_dir>/sample.annotated.jpg`
pub fn output_path(out_dir: &Path, image_path: &Path, suffix: &str) -> PathBuf {
    let mut name = image_path
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    out_dir.join(name)
}

/// Reads the persisted result stored next to `image_path`.
#[instrument(level = "debug")]
pub fn load_result(image_path: &Path) -> Result<OcrResult> {
    let path = sibling_json_path(image_path);
    let data = std::fs::read_to_string(&path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => Error::NotFound(path.clone()),
        _ => Error::io(&path, err),
    })?;
    let result = serde_json::from_str::<OcrResult>(&data)
        .map_err(|source| Error::Parse { path, source })?;
    log::debug!(
        "Loaded OCR result with {} regions, text angle {:?}",
        result.regions.len(),
        result.text_angle
    );
    Ok(result)
}

/// Writes `result` as four-space indented JSON, replacing any existing file.
#[instrument(level = "debug", skip(result))]
pub fn save_result(path: &Path, result: &OcrResult) -> Result<()> {
    let file = File::create(path).map_err(|err| Error::io(path, err))?;
    let mut writer = BufWriter::new(file);
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    result
        .serialize(&mut serializer)
        .map_err(|err| Error::io(path, err.into()))?;
    writer.flush().map_err(|err| Error::io(path, err))?;
    Ok(())
}
