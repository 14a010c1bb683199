use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, Screen};
use lienzo_core::media::UploadPhase;
use lienzo_core::state::ChatRole;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);

    match app.screen {
        Screen::Chat => render_chat_screen(app, frame, body_area),
        Screen::Media => render_media_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if let Some(notice) = app.notice.clone() {
        render_notice(&notice, frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Lienzo ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Chat => " CHAT ",
        Screen::Media => " MEDIA ",
    };

    let hints = match (app.screen, app.input_mode) {
        (Screen::Chat, InputMode::Normal) => {
            " i edit prompt | j/k scroll | Tab media | q quit"
        }
        (Screen::Chat, InputMode::Editing) => " Enter send | Esc done",
        (Screen::Media, InputMode::Normal) => {
            " o choose file | u upload | Tab chat | q quit"
        }
        (Screen::Media, InputMode::Editing) => " Enter select | Esc done",
    };

    let footer = Line::from(vec![
        Span::styled(mode_text, mode_style),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_area_height = chat_area.height.saturating_sub(2);
    app.chat_area_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let chat_text = if app.transcript.is_empty() && !app.chat.is_pending() {
        Text::from(Span::styled(
            "Ask anything...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &app.transcript {
            let label_color = match msg.role {
                ChatRole::User => Color::Cyan,
                ChatRole::Assistant => Color::Yellow,
            };
            lines.push(Line::from(Span::styled(
                msg.role.label(),
                Style::default().fg(label_color).add_modifier(Modifier::BOLD),
            )));
            for line in msg.content.lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        if app.chat.is_pending() {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, chat_area);

    render_input_line(
        frame,
        input_area,
        " Prompt ",
        app.chat.input(),
        app.chat_cursor,
        app.input_mode == InputMode::Editing,
    );
}

fn render_media_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [info_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    let info_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Upload ");

    let label_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = Vec::new();

    match app.media.selected_file() {
        Some(file) => {
            lines.push(Line::from(vec![
                Span::styled("File: ", label_style),
                Span::raw(format!(
                    "{} ({} bytes, {})",
                    file.file_name,
                    file.bytes.len(),
                    file.content_type
                )),
            ]));
            if let Some(preview) = app.media.preview() {
                lines.push(Line::from(vec![
                    Span::styled("Preview: ", label_style),
                    Span::raw(preview.uri()),
                ]));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "No file selected. Press 'o' to choose one.",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    lines.push(Line::default());
    lines.push(match app.media.phase() {
        UploadPhase::Empty => Line::default(),
        UploadPhase::Selected => Line::from(Span::styled(
            "Ready to upload. Press 'u'.",
            Style::default().fg(Color::DarkGray),
        )),
        UploadPhase::Uploading => {
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            Line::from(Span::styled(
                format!("Uploading{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
        }
        UploadPhase::Uploaded => Line::from(Span::styled(
            "Uploaded.",
            Style::default().fg(Color::Green),
        )),
        UploadPhase::UploadFailed => Line::from(Span::styled(
            "Upload failed.",
            Style::default().fg(Color::Red),
        )),
    });

    if let Some(url) = app.media.remote_url() {
        lines.push(Line::from(vec![
            Span::styled("URL: ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(url.to_string()),
        ]));
    }

    let info = Paragraph::new(Text::from(lines))
        .block(info_block)
        .wrap(Wrap { trim: true });
    frame.render_widget(info, info_area);

    render_input_line(
        frame,
        input_area,
        " File path ",
        &app.path_input,
        app.path_cursor,
        app.input_mode == InputMode::Editing,
    );
}

fn render_input_line(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    cursor: usize,
    editing: bool,
) {
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title.to_string());

    // Horizontal scroll keeps the cursor inside the inner width
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor >= inner_width {
        cursor - inner_width + 1
    } else {
        0
    };

    let visible_text: String = value.chars().skip(scroll_offset).take(inner_width).collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if editing {
        let cursor_x = (cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_notice(notice: &str, frame: &mut Frame, area: Rect) {
    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 5;
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Notice (any key to dismiss) ");

    let body = Paragraph::new(notice.to_string())
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(body, popup_area);
}
