use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::api::{ApiError, UploadClient};
use crate::config::UploadSettings;
use crate::preview::PreviewHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Empty,
    Selected,
    Uploading,
    Uploaded,
    UploadFailed,
}

/// A file picked for upload: name, detected content type, and bytes.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read a file from disk. This is the picker half of selection; the
    /// controller half (`select_file`) stays synchronous.
    pub async fn read_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => match ext.to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            _ => "application/octet-stream",
        },
        None => "application/octet-stream",
    }
}

/// What `begin_upload` decided to do.
pub enum UploadStart {
    /// A request was dispatched; await or spawn the call to resolve it.
    Started(UploadCall),
    /// Nothing is selected. The caller should surface a blocking notice;
    /// no state transition happened.
    NoFile,
    /// An upload is already in flight. Rejected without a state change.
    Busy,
}

/// An owned, sendable upload request, detached from the controller.
pub struct UploadCall {
    client: UploadClient,
    file: MediaFile,
}

impl UploadCall {
    pub fn file_name(&self) -> &str {
        &self.file.file_name
    }

    pub async fn send(self) -> Result<String, ApiError> {
        self.client.upload(&self.file).await
    }
}

/// Two-phase media flow: selecting a file derives a local preview reference
/// immediately; uploading exchanges the bytes for a durable remote URL.
///
/// Phases: `Empty -> Selected -> Uploading -> {Uploaded, UploadFailed}`,
/// with a new selection allowed from any phase except mid-upload. The remote
/// URL is only ever written by a successful upload.
pub struct MediaController {
    client: UploadClient,
    selected: Option<MediaFile>,
    preview: Option<PreviewHandle>,
    remote_url: Option<String>,
    phase: UploadPhase,
    error: Option<ApiError>,
}

impl MediaController {
    pub fn new(settings: UploadSettings) -> Self {
        Self {
            client: UploadClient::new(&settings.cloud_name, &settings.upload_preset),
            selected: None,
            preview: None,
            remote_url: None,
            phase: UploadPhase::Empty,
            error: None,
        }
    }

    pub fn selected_file(&self) -> Option<&MediaFile> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url.as_deref()
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }

    /// The kind of the most recent failure, if the last upload failed.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Store a picked file and synchronously derive a fresh preview
    /// reference from its bytes. The previous preview, if any, is released
    /// by the replacement, and a previous upload's URL is discarded so the
    /// display never pairs an old upload with a new file.
    ///
    /// A `None` selection (cancelled picker) changes nothing. Selection is
    /// frozen while an upload is in flight.
    pub fn select_file(&mut self, file: Option<MediaFile>) -> Result<()> {
        let Some(file) = file else {
            return Ok(());
        };
        if self.is_uploading() {
            return Ok(());
        }

        let preview = PreviewHandle::create(&file.file_name, &file.bytes)?;
        self.preview = Some(preview);
        self.selected = Some(file);
        self.remote_url = None;
        self.error = None;
        self.phase = UploadPhase::Selected;
        Ok(())
    }

    /// Move to `Uploading` and hand back the outbound request, or report why
    /// nothing was dispatched.
    pub fn begin_upload(&mut self) -> UploadStart {
        if self.is_uploading() {
            return UploadStart::Busy;
        }
        let Some(file) = self.selected.clone() else {
            return UploadStart::NoFile;
        };

        self.phase = UploadPhase::Uploading;
        self.error = None;
        UploadStart::Started(UploadCall {
            client: self.client.clone(),
            file,
        })
    }

    /// Resolve the in-flight upload. On failure the previous remote URL is
    /// left in place; only a successful upload writes it.
    pub fn finish_upload(&mut self, result: Result<String, ApiError>) {
        match result {
            Ok(url) => {
                self.remote_url = Some(url);
                self.phase = UploadPhase::Uploaded;
            }
            Err(err) => {
                warn!(error = %err, "upload request failed");
                self.error = Some(err);
                self.phase = UploadPhase::UploadFailed;
            }
        }
    }

    /// Upload and wait for the result in one step. The await on the network
    /// exchange is the only suspension point.
    pub async fn upload(&mut self) {
        if let UploadStart::Started(call) = self.begin_upload() {
            let result = call.send().await;
            self.finish_upload(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> MediaController {
        MediaController::new(UploadSettings {
            cloud_name: "test-cloud".to_string(),
            upload_preset: "test-preset".to_string(),
        })
    }

    fn image(name: &str, bytes: &[u8]) -> MediaFile {
        MediaFile::new(name, bytes.to_vec())
    }

    #[test]
    fn test_cancelled_selection_is_a_no_op() {
        let mut media = controller();
        media.select_file(None).unwrap();
        assert_eq!(media.phase(), UploadPhase::Empty);
        assert!(media.selected_file().is_none());
        assert!(media.preview().is_none());
    }

    #[test]
    fn test_selection_derives_preview_synchronously() {
        let mut media = controller();
        media.select_file(Some(image("cat.png", b"pngbytes"))).unwrap();
        assert_eq!(media.phase(), UploadPhase::Selected);
        let preview = media.preview().expect("preview should exist");
        assert!(preview.path().exists());
        assert_eq!(std::fs::read(preview.path()).unwrap(), b"pngbytes");
    }

    #[test]
    fn test_reselection_replaces_and_releases_previous_preview() {
        let mut media = controller();
        media.select_file(Some(image("one.png", b"first"))).unwrap();
        let old_path = media.preview().unwrap().path().to_path_buf();

        media.select_file(Some(image("two.png", b"second"))).unwrap();
        let new_path = media.preview().unwrap().path().to_path_buf();

        assert_ne!(old_path, new_path);
        assert!(!old_path.exists());
        assert!(new_path.exists());
    }

    #[test]
    fn test_upload_without_selection_is_rejected_without_transition() {
        let mut media = controller();
        assert!(matches!(media.begin_upload(), UploadStart::NoFile));
        assert_eq!(media.phase(), UploadPhase::Empty);
        assert!(!media.is_uploading());
    }

    #[test]
    fn test_upload_dispatch_enters_uploading() {
        let mut media = controller();
        media.select_file(Some(image("cat.png", b"bytes"))).unwrap();
        match media.begin_upload() {
            UploadStart::Started(call) => assert_eq!(call.file_name(), "cat.png"),
            _ => panic!("expected a dispatched call"),
        }
        assert!(media.is_uploading());
        assert!(matches!(media.begin_upload(), UploadStart::Busy));
    }

    #[test]
    fn test_successful_upload_sets_remote_url() {
        let mut media = controller();
        media.select_file(Some(image("cat.png", b"bytes"))).unwrap();
        let _ = media.begin_upload();
        media.finish_upload(Ok("https://x/y.png".to_string()));
        assert_eq!(media.remote_url(), Some("https://x/y.png"));
        assert_eq!(media.phase(), UploadPhase::Uploaded);
        assert!(!media.is_uploading());
    }

    #[test]
    fn test_failed_upload_keeps_previous_remote_url() {
        let mut media = controller();
        media.select_file(Some(image("cat.png", b"bytes"))).unwrap();
        let _ = media.begin_upload();
        media.finish_upload(Ok("https://x/first.png".to_string()));

        let _ = media.begin_upload();
        media.finish_upload(Err(ApiError::Status {
            status: 500,
            body: String::new(),
        }));
        assert_eq!(media.remote_url(), Some("https://x/first.png"));
        assert_eq!(media.phase(), UploadPhase::UploadFailed);
        assert!(!media.is_uploading());
        assert!(media.last_error().is_some());
    }

    #[test]
    fn test_new_selection_discards_previous_upload_url() {
        let mut media = controller();
        media.select_file(Some(image("one.png", b"first"))).unwrap();
        let _ = media.begin_upload();
        media.finish_upload(Ok("https://x/one.png".to_string()));

        media.select_file(Some(image("two.png", b"second"))).unwrap();
        assert_eq!(media.remote_url(), None);
        assert_eq!(media.phase(), UploadPhase::Selected);
    }

    #[test]
    fn test_selection_is_frozen_while_uploading() {
        let mut media = controller();
        media.select_file(Some(image("one.png", b"first"))).unwrap();
        let _ = media.begin_upload();

        media.select_file(Some(image("two.png", b"second"))).unwrap();
        assert_eq!(media.selected_file().unwrap().file_name, "one.png");
        assert!(media.is_uploading());
    }

    #[test]
    fn test_teardown_releases_preview() {
        let mut media = controller();
        media.select_file(Some(image("cat.png", b"bytes"))).unwrap();
        let path = media.preview().unwrap().path().to_path_buf();
        assert!(path.exists());
        drop(media);
        assert!(!path.exists());
    }

    #[test]
    fn test_content_type_detection() {
        assert_eq!(image("a.PNG", b"").content_type, "image/png");
        assert_eq!(image("b.jpeg", b"").content_type, "image/jpeg");
        assert_eq!(image("odd.bin", b"").content_type, "application/octet-stream");
        assert_eq!(image("noext", b"").content_type, "application/octet-stream");
    }
}
