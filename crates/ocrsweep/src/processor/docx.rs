use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use quick_xml::escape::escape;
use tracing::info_span;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::ProcessError;
use crate::processor::{Stage, StageKind, StageResult};
use crate::storage::{write_replacing, ArtifactPaths};

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_TAIL: &str = "<w:sectPr/></w:body></w:document>";

/// Writes an ordered sequence of lines as a rich document, one paragraph per line.
pub trait DocumentWriter: Send + Sync {
    fn write_paragraphs(&self, lines: &[String], path: &Path) -> Result<(), ProcessError>;
}

/// Minimal WordprocessingML package: enough for Word and LibreOffice to open.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxWriter;

impl DocxWriter {
    pub fn render_document_xml(lines: &[String]) -> String {
        let mut xml = String::from(DOCUMENT_HEAD);
        for line in lines {
            let cleaned = strip_invalid_xml_chars(line);
            if cleaned.is_empty() {
                xml.push_str("<w:p/>");
            } else {
                xml.push_str("<w:p><w:r><w:t xml:space=\"preserve\">");
                xml.push_str(&escape(cleaned.as_str()));
                xml.push_str("</w:t></w:r></w:p>");
            }
        }
        xml.push_str(DOCUMENT_TAIL);
        xml
    }

    fn package(lines: &[String]) -> zip::result::ZipResult<Vec<u8>> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        writer.start_file("[Content_Types].xml", options)?;
        writer.write_all(CONTENT_TYPES_XML.as_bytes())?;
        writer.start_file("_rels/.rels", options)?;
        writer.write_all(PACKAGE_RELS_XML.as_bytes())?;
        writer.start_file("word/document.xml", options)?;
        writer.write_all(Self::render_document_xml(lines).as_bytes())?;

        Ok(writer.finish()?.into_inner())
    }
}

impl DocumentWriter for DocxWriter {
    fn write_paragraphs(&self, lines: &[String], path: &Path) -> Result<(), ProcessError> {
        let bytes = Self::package(lines)
            .map_err(|e| ProcessError::DocxProcessing(e.to_string()))?;
        write_replacing(path, &bytes).map_err(|e| ProcessError::WriteArtifact {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Drops characters XML 1.0 cannot carry, such as the form feeds OCR output is full of.
fn strip_invalid_xml_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || ('\u{20}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

/// Optional stage: `<stem>.txt` to `<stem>.docx` for manual proofreading.
pub struct DocumentExporter {
    writer: Arc<dyn DocumentWriter>,
}

impl DocumentExporter {
    pub fn new(writer: Arc<dyn DocumentWriter>) -> Self {
        Self { writer }
    }

    fn export(&self, artifacts: &ArtifactPaths) -> Result<(), ProcessError> {
        let mut bytes = Vec::new();
        std::fs::File::open(&artifacts.text)
            .and_then(|mut f| f.read_to_end(&mut bytes))
            .map_err(|e| ProcessError::ReadDocument {
                path: artifacts.text.clone(),
                source: e,
            })?;

        let lines: Vec<String> = String::from_utf8_lossy(&bytes)
            .lines()
            .map(|line| line.trim_end().to_string())
            .collect();

        self.writer.write_paragraphs(&lines, &artifacts.docx)
    }
}

impl Stage for DocumentExporter {
    fn kind(&self) -> StageKind {
        StageKind::Exporter
    }

    fn run(&self, artifacts: &ArtifactPaths) -> StageResult {
        let _span = info_span!("processor.export").entered();
        self.export(artifacts).into()
    }
}
