//! PDF document loading

use std::path::Path;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use pdfchat_core::{DocumentMetadata, Error, LoadedDocument, PageText, Result};

/// Reads PDFs from disk and extracts their text page by page
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    supported_extensions: Vec<String>,
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self {
            supported_extensions: vec![".pdf".to_string()],
        }
    }

    fn extension_of(path: &Path) -> String {
        path.extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }

    fn is_supported(&self, path: &Path) -> bool {
        self.supported_extensions.contains(&Self::extension_of(path))
    }

    /// Load a single PDF file
    pub fn load_document(&self, path: &Path) -> Result<LoadedDocument> {
        if !path.exists() {
            return Err(Error::DocumentLoader(format!("File not found: {}", path.display())));
        }

        if !self.is_supported(path) {
            return Err(Error::DocumentLoader(format!(
                "Unsupported file type: {}. Only PDF files are supported.",
                Self::extension_of(path)
            )));
        }

        let (pages, page_count) = self.extract_pages(path).map_err(|e| {
            error!("Error loading document {}: {}", path.display(), e);
            e
        })?;

        let file_size = std::fs::metadata(path)?.len();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(LoadedDocument {
            metadata: DocumentMetadata {
                filename,
                file_path: path.display().to_string(),
                file_type: Self::extension_of(path),
                file_size,
                page_count,
            },
            pages,
        })
    }

    /// Load every PDF under a directory, recursively. Failures are logged and skipped.
    pub fn load_documents(&self, dir: &Path) -> Vec<LoadedDocument> {
        let mut documents = Vec::new();

        if !dir.exists() {
            warn!("Directory not found: {}", dir.display());
            return documents;
        }

        let pdf_files: Vec<_> = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file() && self.is_supported(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        if pdf_files.is_empty() {
            info!("No PDF files found in {}", dir.display());
            return documents;
        }

        for path in pdf_files {
            match self.load_document(&path) {
                Ok(doc) => {
                    info!("Loaded PDF: {} ({} pages)", doc.metadata.filename, doc.metadata.page_count);
                    documents.push(doc);
                }
                Err(e) => error!("Failed to load {}: {}", path.display(), e),
            }
        }

        info!("Successfully loaded {} PDF documents", documents.len());
        documents
    }

    /// Load a file or a whole directory
    pub fn load_path(&self, path: &Path) -> Result<Vec<LoadedDocument>> {
        if path.is_file() {
            Ok(vec![self.load_document(path)?])
        } else {
            Ok(self.load_documents(path))
        }
    }

    /// Whether the file looks like a readable PDF
    pub fn validate_pdf(&self, path: &Path) -> bool {
        if !path.exists() || !self.is_supported(path) {
            return false;
        }

        match lopdf::Document::load(path) {
            Ok(pdf) => match pdf.get_pages().keys().next() {
                Some(first) => pdf.extract_text(&[*first]).is_ok(),
                None => true,
            },
            Err(_) => false,
        }
    }

    fn extract_pages(&self, path: &Path) -> Result<(Vec<PageText>, usize)> {
        let pdf = lopdf::Document::load(path).map_err(|e| {
            Error::DocumentLoader(format!("Error reading PDF file {}: {}", path.display(), e))
        })?;

        let page_numbers: Vec<u32> = pdf.get_pages().keys().copied().collect();
        let mut pages = Vec::new();

        for page_number in &page_numbers {
            match pdf.extract_text(&[*page_number]) {
                Ok(text) if !text.trim().is_empty() => pages.push(PageText {
                    page_number: *page_number as usize,
                    content: text,
                }),
                Ok(_) => {}
                Err(e) => warn!("Error extracting text from page {}: {}", page_number, e),
            }
        }

        if pages.is_empty() {
            return Err(Error::DocumentLoader(
                "No text could be extracted from the PDF".to_string(),
            ));
        }

        Ok((pages, page_numbers.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_pdf;

    #[test]
    fn test_load_document_extracts_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.pdf");
        write_pdf(&path, &["Hello from page one", "", "Closing words on page three"]);

        let doc = DocumentLoader::new().load_document(&path).unwrap();

        assert_eq!(doc.metadata.filename, "guide.pdf");
        assert_eq!(doc.metadata.file_type, ".pdf");
        assert_eq!(doc.metadata.page_count, 3);
        assert!(doc.metadata.file_size > 0);

        let numbers: Vec<usize> = doc.pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert!(doc.pages[0].content.contains("Hello"));
        assert!(doc.content().starts_with("--- Page 1 ---"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = DocumentLoader::new()
            .load_document(Path::new("/definitely/not/here.pdf"))
            .unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_non_pdf_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();

        let err = DocumentLoader::new().load_document(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported file type: .txt"));
        assert!(!DocumentLoader::new().validate_pdf(&path));
    }

    #[test]
    fn test_pdf_without_text_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.pdf");
        write_pdf(&path, &["", ""]);

        let err = DocumentLoader::new().load_document(&path).unwrap_err();
        assert!(err.to_string().contains("No text could be extracted"));
    }

    #[test]
    fn test_load_documents_walks_recursively_and_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        write_pdf(&dir.path().join("a.pdf"), &["Alpha document text"]);
        write_pdf(&nested.join("b.PDF"), &["Beta document text"]);
        std::fs::write(dir.path().join("broken.pdf"), "not really a pdf").unwrap();
        std::fs::write(dir.path().join("readme.md"), "# ignored").unwrap();

        let docs = DocumentLoader::new().load_documents(dir.path());
        let names: Vec<&str> = docs.iter().map(|d| d.metadata.filename.as_str()).collect();

        assert_eq!(names, vec!["a.pdf", "b.PDF"]);
    }

    #[test]
    fn test_load_documents_missing_dir_is_empty() {
        let docs = DocumentLoader::new().load_documents(Path::new("/no/such/dir"));
        assert!(docs.is_empty());
    }

    #[test]
    fn test_validate_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.pdf");
        let bad = dir.path().join("bad.pdf");
        write_pdf(&good, &["Some text"]);
        std::fs::write(&bad, "garbage").unwrap();

        let loader = DocumentLoader::new();
        assert!(loader.validate_pdf(&good));
        assert!(!loader.validate_pdf(&bad));
    }
}
