/// A file about to be uploaded as one multipart part.
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Creates an upload, guessing the content type from the extension.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let content_type = content_type_for(&name).to_string();
        Self {
            name,
            content_type,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Lower-cased extension, without the dot.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// A file fetched from a download endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub(crate) fn extension_of(name: &str) -> Option<String> {
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

fn content_type_for(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain",
        Some("zip") => "application/zip",
        Some("rar") => "application/vnd.rar",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("mp4") => "video/mp4",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(extension_of("Informe.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension_of("backup.tar.zip").as_deref(), Some("zip"));
    }

    #[test]
    fn test_missing_extension() {
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".bashrc"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(FileUpload::new("a.png", vec![]).content_type, "image/png");
        assert_eq!(
            FileUpload::new("a.bin", vec![]).content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn test_debug_hides_bytes() {
        let upload = FileUpload::new("notes.txt", vec![1, 2, 3]);
        let debug = format!("{upload:?}");
        assert!(debug.contains("size: 3"));
        assert!(!debug.contains("[1, 2, 3]"));
    }
}
