use anyhow::Result;
use tokio::task::JoinHandle;

use lienzo_core::api::ApiError;
use lienzo_core::chat::{ChatController, SubmitStart};
use lienzo_core::media::{MediaController, MediaFile, UploadPhase, UploadStart};
use lienzo_core::state::ChatMessage;
use lienzo_core::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Media,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Chat screen state
    pub chat: ChatController,
    pub transcript: Vec<ChatMessage>,
    pub chat_cursor: usize, // cursor position in the draft, in chars
    pub chat_scroll: u16,
    pub chat_area_height: u16, // inner chat area, for scroll calculations
    pub chat_area_width: u16,
    pub chat_task: Option<JoinHandle<Result<String, ApiError>>>,

    // Media screen state
    pub media: MediaController,
    pub path_input: String,
    pub path_cursor: usize,
    pub upload_task: Option<JoinHandle<Result<String, ApiError>>>,

    // Blocking notice popup; any key dismisses it
    pub notice: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new() -> Result<Self> {
        let config = Config::load().unwrap_or_else(|_| Config::new());
        let chat = ChatController::new(config.chat_settings()?);
        let media = MediaController::new(config.upload_settings()?);
        Ok(Self::from_parts(chat, media))
    }

    pub fn from_parts(chat: ChatController, media: MediaController) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Chat,
            input_mode: InputMode::Normal,

            chat,
            transcript: Vec::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_area_height: 0,
            chat_area_width: 0,
            chat_task: None,

            media,
            path_input: String::new(),
            path_cursor: 0,
            upload_task: None,

            notice: None,

            animation_frame: 0,
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.is_pending() || self.media.is_uploading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Dispatch the chat draft on a background task. Returns true if a
    /// request actually went out.
    pub fn submit_chat(&mut self) -> bool {
        match self.chat.begin_submit() {
            SubmitStart::Started(call) => {
                self.transcript.push(ChatMessage::user(call.prompt().to_string()));
                self.chat_task = Some(tokio::spawn(call.send()));
                true
            }
            SubmitStart::EmptyInput | SubmitStart::Busy => false,
        }
    }

    pub fn select_media(&mut self, file: MediaFile) {
        if let Err(err) = self.media.select_file(Some(file)) {
            self.notice = Some(format!("Could not preview file: {err}"));
        }
    }

    pub fn start_upload(&mut self) {
        match self.media.begin_upload() {
            UploadStart::Started(call) => {
                self.upload_task = Some(tokio::spawn(call.send()));
            }
            UploadStart::NoFile => {
                self.notice = Some("Select a file before uploading.".to_string());
            }
            UploadStart::Busy => {}
        }
    }

    /// Join any finished background request and feed it to its controller.
    pub async fn poll_tasks(&mut self) {
        if let Some(task) = self.chat_task.take() {
            if task.is_finished() {
                let result = join_request(task).await;
                let reply = self.chat.finish_submit(result).to_string();
                self.transcript.push(ChatMessage::assistant(reply));
                self.scroll_transcript_to_bottom();
            } else {
                self.chat_task = Some(task);
            }
        }

        if let Some(task) = self.upload_task.take() {
            if task.is_finished() {
                let result = join_request(task).await;
                self.media.finish_upload(result);
                if self.media.phase() == UploadPhase::UploadFailed {
                    let detail = self
                        .media
                        .last_error()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "unknown error".to_string());
                    self.notice = Some(format!("Upload failed: {detail}"));
                }
            } else {
                self.upload_task = Some(task);
            }
        }
    }

    /// Scroll the transcript so the latest message (or the "Thinking..."
    /// indicator) is visible.
    pub fn scroll_transcript_to_bottom(&mut self) {
        let wrap_width = if self.chat_area_width > 0 {
            self.chat_area_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in &self.transcript {
            total_lines += 1; // Role line ("You:" or "AI:")
            for line in msg.content.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.chat.is_pending() {
            total_lines += 2; // "AI:" + "Thinking..."
        }

        let visible_height = if self.chat_area_height > 0 {
            self.chat_area_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }
}

async fn join_request(task: JoinHandle<Result<String, ApiError>>) -> Result<String, ApiError> {
    match task.await {
        Ok(result) => result,
        Err(err) => Err(ApiError::Transport(format!("request task failed: {err}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lienzo_core::{ChatSettings, UploadSettings};
    use std::io::Write;

    fn test_app() -> App {
        let chat = ChatController::new(ChatSettings {
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
        });
        let media = MediaController::new(UploadSettings {
            cloud_name: "test-cloud".to_string(),
            upload_preset: "test-preset".to_string(),
        });
        App::from_parts(chat, media)
    }

    #[test]
    fn test_empty_chat_submit_dispatches_nothing() {
        let mut app = test_app();
        assert!(!app.submit_chat());
        assert!(app.chat_task.is_none());
        assert!(app.transcript.is_empty());
    }

    #[test]
    fn test_upload_without_file_raises_notice() {
        let mut app = test_app();
        app.start_upload();
        assert!(app.upload_task.is_none());
        assert!(app.notice.is_some());
        assert_eq!(app.media.phase(), UploadPhase::Empty);
    }

    #[tokio::test]
    async fn test_select_media_from_disk_sets_preview() {
        let mut file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .unwrap();
        file.write_all(b"pngbytes").unwrap();

        let media_file = MediaFile::read_from_path(file.path()).await.unwrap();
        let mut app = test_app();
        app.select_media(media_file);

        assert_eq!(app.media.phase(), UploadPhase::Selected);
        assert!(app.media.preview().is_some());
        assert!(app.notice.is_none());
    }
}
