use std::path::{Path, PathBuf};

/// MIME types a browser reports for CSV files (Windows reports CSV as Excel).
pub const ALLOWED_MIME_TYPES: [&str; 2] = ["text/csv", "application/vnd.ms-excel"];

pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

/// A file the user picked. Only the handle is kept; the bytes are read when
/// the upload body is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub mime: String,
}

impl SelectedFile {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or_default()
            .to_string();

        SelectedFile {
            path: path.to_path_buf(),
            name,
            mime,
        }
    }

    pub fn is_allowed(&self) -> bool {
        is_allowed_mime(&self.mime)
    }
}

/// Opens the native file dialog. `None` when the user cancels.
pub async fn pick_file() -> Option<SelectedFile> {
    let handle = rfd::AsyncFileDialog::new()
        .set_title("Select a data file")
        .add_filter("Spreadsheet", &["csv", "xls"])
        .add_filter("All files", &["*"])
        .pick_file()
        .await?;

    let file = SelectedFile::from_path(handle.path());
    tracing::debug!(name = %file.name, mime = %file.mime, "file picked");
    Some(file)
}
