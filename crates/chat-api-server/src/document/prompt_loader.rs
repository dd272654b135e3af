use lopdf::Document as PdfDocument;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::utils::error::ApiError;

/// Load the system prompt that seeds every conversation.
///
/// PDFs contribute the text of each page in page order, concatenated without
/// a separator. Any other extension is read as UTF-8 text.
pub fn load_system_prompt(path: &Path) -> Result<String, ApiError> {
    if !path.is_file() {
        return Err(ApiError::Configuration(format!(
            "System prompt document not found: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    debug!("Loading system prompt from {:?} (type: {})", path, extension);

    let content = match extension.as_str() {
        "pdf" => parse_pdf(path)?,
        _ => parse_text(path)?,
    };

    if content.trim().is_empty() {
        return Err(ApiError::Configuration(format!(
            "System prompt document has no extractable text: {}",
            path.display()
        )));
    }

    info!("📄 System prompt loaded: {} characters", content.chars().count());
    Ok(content)
}

fn parse_pdf(path: &Path) -> Result<String, ApiError> {
    let doc = PdfDocument::load(path).map_err(|e| {
        ApiError::Configuration(format!("Failed to load PDF {}: {}", path.display(), e))
    })?;

    let pages = doc.get_pages();
    let mut content = String::new();

    // BTreeMap keyed by page number, so iteration is page order
    for page_num in pages.keys() {
        let text = doc.extract_text(&[*page_num]).map_err(|e| {
            ApiError::Configuration(format!(
                "Failed to extract text from page {} of {}: {}",
                page_num,
                path.display(),
                e
            ))
        })?;
        content.push_str(&text);
    }

    debug!("Extracted {} pages from {:?}", pages.len(), path);
    Ok(content)
}

fn parse_text(path: &Path) -> Result<String, ApiError> {
    fs::read_to_string(path).map_err(|e| {
        ApiError::Configuration(format!("Failed to read {}: {}", path.display(), e))
    })
}
