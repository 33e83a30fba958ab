//! PDF text extraction using lopdf.

use lopdf::Document;

/// Extract the text of every page, in page order.
///
/// Pages that fail to decode are skipped; a document with no readable text
/// at all (e.g. a scan) is an error.
pub(super) fn extract_text(bytes: &[u8]) -> Result<String, String> {
    let doc = Document::load_mem(bytes).map_err(|e| format!("failed to load PDF: {}", e))?;

    // get_pages is a BTreeMap, so keys come back in page order
    let mut pages = Vec::new();
    for page_number in doc.get_pages().into_keys() {
        match doc.extract_text(&[page_number]) {
            Ok(text) if !text.trim().is_empty() => pages.push(text.trim().to_string()),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping PDF page {}: {}", page_number, e),
        }
    }

    if pages.is_empty() {
        return Err("no text content found in PDF; it may be scanned".to_string());
    }
    Ok(pages.join("\n\n"))
}
