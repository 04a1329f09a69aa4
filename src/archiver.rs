use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::ProductRecord;

pub fn save_to_file(records: &[ProductRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Raw page dump for selector debugging.
pub fn dump_markup(markup: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, markup).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductDraft, Source};
    use url::Url;

    #[test]
    fn test_save_to_file_writes_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.json");
        let record = ProductRecord::from_draft(
            Source::Amazon,
            Url::parse("https://www.amazon.com/dp/B01").unwrap(),
            ProductDraft {
                title: Some("Desk lamp".into()),
                price: Some(23.5),
                ..Default::default()
            },
        );

        save_to_file(&[record], &path).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved[0]["title"], "Desk lamp");
        assert_eq!(saved[0]["price"], 23.5);
        assert_eq!(saved[0]["source"], "AMAZON");
    }

    #[test]
    fn test_dump_markup_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("amazon_debug.html");

        dump_markup("<html></html>", &path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
