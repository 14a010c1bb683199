use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;
use lienzo_core::media::MediaFile;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await?,
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_tasks().await;
        }
    }
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    // A notice is modal; any key dismisses it
    if app.notice.is_some() {
        app.notice = None;
        return Ok(());
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key).await?,
    }

    Ok(())
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => {
            app.screen = match app.screen {
                Screen::Chat => Screen::Media,
                Screen::Media => Screen::Chat,
            };
        }
        _ => match app.screen {
            Screen::Chat => handle_chat_normal(app, key),
            Screen::Media => handle_media_normal(app, key),
        },
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.chat_scroll = app.chat_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.chat_scroll = app.chat_scroll.saturating_sub(1);
        }
        KeyCode::Char('G') => app.scroll_transcript_to_bottom(),
        _ => {}
    }
}

fn handle_media_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('o') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('u') => app.start_upload(),
        _ => {}
    }
}

async fn handle_editing_mode(app: &mut App, key: KeyEvent) -> Result<()> {
    match app.screen {
        Screen::Chat => handle_chat_editing(app, key),
        Screen::Media => handle_media_editing(app, key).await,
    }
    Ok(())
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            if app.submit_chat() {
                app.chat.update_input(String::new());
                app.chat_cursor = 0;
                app.input_mode = InputMode::Normal;
                app.scroll_transcript_to_bottom();
            }
        }
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let mut text = app.chat.input().to_string();
                let byte_pos = char_to_byte_index(&text, app.chat_cursor);
                text.remove(byte_pos);
                app.chat.update_input(text);
            }
        }
        KeyCode::Delete => {
            let mut text = app.chat.input().to_string();
            if app.chat_cursor < text.chars().count() {
                let byte_pos = char_to_byte_index(&text, app.chat_cursor);
                text.remove(byte_pos);
                app.chat.update_input(text);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat.input().chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat.input().chars().count();
        }
        KeyCode::Char(c) => {
            let mut text = app.chat.input().to_string();
            let byte_pos = char_to_byte_index(&text, app.chat_cursor);
            text.insert(byte_pos, c);
            app.chat.update_input(text);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

async fn handle_media_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            let path = app.path_input.trim().to_string();
            if !path.is_empty() {
                match MediaFile::read_from_path(&path).await {
                    Ok(file) => {
                        app.select_media(file);
                        app.path_input.clear();
                        app.path_cursor = 0;
                        app.input_mode = InputMode::Normal;
                    }
                    Err(err) => {
                        app.notice = Some(format!("{err:#}"));
                    }
                }
            }
        }
        KeyCode::Backspace => {
            if app.path_cursor > 0 {
                app.path_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.path_input, app.path_cursor);
                app.path_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.path_cursor = app.path_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.path_input.chars().count();
            app.path_cursor = (app.path_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.path_cursor = 0;
        }
        KeyCode::End => {
            app.path_cursor = app.path_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.path_input, app.path_cursor);
            app.path_input.insert(byte_pos, c);
            app.path_cursor += 1;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lienzo_core::{ChatController, ChatSettings, MediaController, UploadSettings};

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

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_edits_the_controller_draft() {
        let mut app = test_app();
        app.input_mode = InputMode::Editing;
        handle_chat_editing(&mut app, press(KeyCode::Char('h')));
        handle_chat_editing(&mut app, press(KeyCode::Char('i')));
        assert_eq!(app.chat.input(), "hi");
        assert_eq!(app.chat_cursor, 2);

        handle_chat_editing(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.chat.input(), "h");
        assert_eq!(app.chat_cursor, 1);
    }

    #[test]
    fn test_multibyte_input_edits_are_char_based() {
        let mut app = test_app();
        app.input_mode = InputMode::Editing;
        handle_chat_editing(&mut app, press(KeyCode::Char('é')));
        handle_chat_editing(&mut app, press(KeyCode::Char('x')));
        handle_chat_editing(&mut app, press(KeyCode::Left));
        handle_chat_editing(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.chat.input(), "x");
    }

    #[test]
    fn test_enter_with_empty_draft_stays_in_editing() {
        let mut app = test_app();
        app.input_mode = InputMode::Editing;
        handle_chat_editing(&mut app, press(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Editing);
        assert!(app.chat_task.is_none());
    }

    #[tokio::test]
    async fn test_any_key_dismisses_notice() {
        let mut app = test_app();
        app.notice = Some("Select a file before uploading.".to_string());
        handle_key(&mut app, press(KeyCode::Char('x'))).await.unwrap();
        assert!(app.notice.is_none());
    }
}
