//! DOCX text extraction.
//!
//! A .docx file is a zip archive; the body lives in `word/document.xml` as
//! WordprocessingML. Text is taken from `<w:t>` runs and paragraphs become
//! lines.

use std::io::{Cursor, Read};

const DOCUMENT_XML: &str = "word/document.xml";

pub(super) fn extract_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| format!("not a DOCX (zip) archive: {}", e))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| format!("missing {}: {}", DOCUMENT_XML, e))?
        .read_to_string(&mut xml)
        .map_err(|e| format!("failed to read {}: {}", DOCUMENT_XML, e))?;

    Ok(document_xml_to_text(&xml))
}

/// Walk the tags of document.xml, keeping run text and paragraph breaks.
fn document_xml_to_text(xml: &str) -> String {
    let mut text = String::new();
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        let Some(len) = rest[open..].find('>') else {
            break;
        };
        let tag = &rest[open + 1..open + len];
        rest = &rest[open + len + 1..];

        if let Some(closing) = tag.strip_prefix('/') {
            if closing == "w:p" {
                text.push('\n');
            }
            continue;
        }

        let name = tag
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default();
        match name {
            "w:t" if !tag.ends_with('/') => {
                let end = rest.find("</w:t>").unwrap_or(rest.len());
                text.push_str(&decode_entities(&rest[..end]));
                rest = &rest[end..];
            }
            "w:tab" => text.push('\t'),
            "w:br" | "w:cr" => text.push('\n'),
            _ => {}
        }
    }

    text.trim().to_string()
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:r><w:t>The Treaty of </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Westphalia </w:t></w:r><w:r><w:t>was signed in 1648.</w:t></w:r></w:p>
<w:p><w:r><w:t>It ended the Thirty Years&apos; War &amp; more.</w:t></w:r></w:p>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t><w:tab/><w:t>value</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
</w:body>
</w:document>"#;

    fn docx_bytes(xml: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            zip.start_file(DOCUMENT_XML, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let text = extract_text(&docx_bytes(BODY)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "The Treaty of Westphalia was signed in 1648.",
                "It ended the Thirty Years' War & more.",
                "cell\tvalue",
            ]
        );
    }

    #[test]
    fn test_non_zip_is_rejected() {
        let err = extract_text(b"plain bytes").unwrap_err();
        assert!(err.starts_with("not a DOCX"));
    }

    #[test]
    fn test_zip_without_document_is_rejected() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            zip.start_file("other.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"<x/>").unwrap();
            zip.finish().unwrap();
        }
        let err = extract_text(&buf.into_inner()).unwrap_err();
        assert!(err.starts_with("missing word/document.xml"));
    }

    #[test]
    fn test_self_closing_text_tag_is_ignored() {
        assert_eq!(
            document_xml_to_text("<w:p><w:t/><w:t>x</w:t></w:p>"),
            "x"
        );
    }
}
