use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use crate::app::{App, FocusPane};
use crate::message::{Sender, Transcript};

const SEND_WIDTH: u16 = 14;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            // Consume the second *
            chars.next();

            // Push any accumulated plain text
            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
                if found_close {
                    current_text.push_str("**");
                }
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

fn sender_style(sender: Sender) -> Style {
    let color = match sender {
        Sender::User => Color::Cyan,
        Sender::Bot => Color::Yellow,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn border_color(focused: bool) -> Color {
    if focused { Color::Cyan } else { Color::DarkGray }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, input row, footer
    let [header_area, chat_area, input_row, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let [input_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_WIDTH),
    ])
    .areas(input_row);

    // Store areas for mouse hit-testing
    {
        let view = app.view_mut();
        view.chat_area = Some(chat_area);
        view.input_area = Some(input_area);
        view.send_area = Some(send_area);
        // Inner size minus borders, for scroll calculations
        view.chat_height = chat_area.height.saturating_sub(2);
        view.chat_width = chat_area.width.saturating_sub(2);
    }
    app.sync_scroll();

    render_header(app, frame, header_area);
    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_send(app, frame, send_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" askchat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(format!("→ {}", app.endpoint), Style::default().fg(Color::White)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// Transcript contents as an unbordered, word-wrapped paragraph.
///
/// Both drawing and scroll bookkeeping go through this so they always agree
/// on how many rows the transcript takes.
pub fn transcript_paragraph(
    transcript: &Transcript,
    thinking: bool,
    animation_frame: u8,
) -> Paragraph<'static> {
    let text = if transcript.is_empty() && !thinking {
        Text::from(Span::styled(
            "Ask a question...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line<'static>> = Vec::new();

        for msg in transcript {
            lines.push(Line::from(Span::styled(
                format!("{}:", msg.sender().label()),
                sender_style(msg.sender()),
            )));
            match msg.sender() {
                Sender::User => {
                    for line in msg.text().lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                }
                Sender::Bot => {
                    for line in msg.text().lines() {
                        lines.push(parse_markdown_line(line));
                    }
                }
            }
            if msg.text().is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::default());
        }

        if thinking {
            lines.push(Line::from(Span::styled("Bot:", sender_style(Sender::Bot))));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    Paragraph::new(text).wrap(Wrap { trim: false })
}

/// Rows the transcript needs when wrapped to `width` columns
pub fn transcript_height(
    transcript: &Transcript,
    width: u16,
    thinking: bool,
    animation_frame: u8,
) -> u16 {
    // Default to 50 if the pane hasn't been drawn yet
    let width = if width > 0 { width } else { 50 };
    let rows = transcript_paragraph(transcript, thinking, animation_frame).line_count(width);
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let view = app.view();
    let transcript = app.session.transcript();
    let thinking = app.session.is_awaiting_answer();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(view.focus == FocusPane::Transcript)))
        .title(" Chat ");

    let paragraph = transcript_paragraph(transcript, thinking, view.animation_frame);
    let total = u16::try_from(paragraph.line_count(view.chat_width.max(1))).unwrap_or(u16::MAX);

    frame.render_widget(paragraph.block(block).scroll((view.scroll, 0)), area);

    if total > view.chat_height {
        let mut state = ScrollbarState::new(total.saturating_sub(view.chat_height) as usize)
            .position(view.scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let view = app.view();
    let input = app.session.input();
    let focused = view.focus == FocusPane::Input;

    let (title, text_style) = if input.is_enabled() {
        (" Message ", Style::default().fg(Color::Cyan))
    } else {
        (" Waiting for answer ", Style::default().fg(Color::DarkGray))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused && input.is_enabled() {
            Color::Yellow
        } else {
            Color::DarkGray
        }))
        .title(title);

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = input.cursor();
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input
        .text()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    frame.render_widget(Paragraph::new(visible_text).style(text_style).block(block), area);

    if focused && input.is_enabled() {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_send(app: &App, frame: &mut Frame, area: Rect) {
    let view = app.view();
    let focused = view.focus == FocusPane::Send;

    let (label, style) = if view.send_enabled {
        let style = if focused {
            Style::default().bg(Color::Cyan).fg(Color::Black).bold()
        } else {
            Style::default().fg(Color::Cyan).bold()
        };
        ("Send", style)
    } else {
        ("Sending...", Style::default().fg(Color::DarkGray))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused && view.send_enabled)));

    let button = Paragraph::new(Line::from(Span::styled(label, style)).centered()).block(block);
    frame.render_widget(button, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.view().focus {
        FocusPane::Input => (" INPUT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        FocusPane::Send => (" SEND ", Style::default().bg(Color::Cyan).fg(Color::Black)),
        FocusPane::Transcript => (" CHAT ", Style::default().bg(Color::Blue).fg(Color::White)),
    };

    let hints = match app.view().focus {
        FocusPane::Input => " Enter send · Tab focus · Esc chat · PgUp/PgDn scroll · Ctrl-C quit",
        FocusPane::Send => " Enter/Space send · Tab focus · Esc back · Ctrl-C quit",
        FocusPane::Transcript => " j/k scroll · g/G top/bottom · i type · q quit",
    };

    let footer = Line::from(vec![
        Span::styled(mode_text, mode_style),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}
