use genisi_core::{chat_view, strings, ChatMessage, ChatRole, ChatView};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Focus, FocusState, SUGGESTION_COLUMNS};

const SIDEBAR_WIDTH: u16 = 30;
const SEND_BUTTON_WIDTH: u16 = 9;
const SUGGESTION_GRID_WIDTH: u16 = 72;
const SUGGESTION_CARD_HEIGHT: u16 = 3;
const PREVIOUS_CHAT_PLACEHOLDERS: usize = 3;

const USER_COLOR: Color = Color::Green;
const ASSISTANT_COLOR: Color = Color::Magenta;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

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
                if !current_text.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current_text)));
                }
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let main_area = if app.show_sidebar {
        let [sidebar_area, main_area] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)]).areas(area);
        render_sidebar(app, frame, sidebar_area);
        main_area
    } else {
        app.new_chat_area = None;
        area
    };

    // Main layout: header, chat, composer, footer
    let [header_area, chat_area, composer_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(main_area);

    render_header(frame, header_area);
    render_chat(app, frame, chat_area);
    render_composer(app, frame, composer_area);
    render_footer(frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" ✦ ", Style::default().fg(ASSISTANT_COLOR)),
        Span::styled(strings::APP_NAME, Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            "   Ctrl+B menu · Ctrl+N new chat · Tab suggestions · Ctrl+C/Ctrl+Q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let disclaimer = Paragraph::new(Span::styled(
        strings::DISCLAIMER,
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(disclaimer, area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [button_area, heading_area, list_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(inner);

    let button = Paragraph::new(Line::from(vec![
        Span::styled("+ ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(strings::NEW_CHAT, Style::default().bold()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray)),
    );
    frame.render_widget(button, button_area);
    app.new_chat_area = Some(button_area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            strings::PREVIOUS_CHATS,
            Style::default().fg(Color::DarkGray),
        )),
        heading_area,
    );

    // Decoration only; previous conversations are not stored
    let items: Vec<ListItem> = (1..=PREVIOUS_CHAT_PLACEHOLDERS)
        .map(|i| {
            ListItem::new(Line::from(vec![
                Span::styled("› ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{} {}", strings::PREVIOUS_CHAT_PREFIX, i),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items), list_area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            strings::SIDEBAR_FOOTER,
            Style::default().fg(Color::DarkGray),
        )),
        footer_area,
    );
}

/// Word-wrap `text` into rows no wider than `width` display columns.
/// Words wider than a row are split across rows.
pub fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.width();

        if word_len > width {
            // Hard-split an over-long word, continuing the current row
            if current_len > 0 && current_len + 1 < width {
                current_line.push(' ');
                current_len += 1;
            } else if current_len > 0 {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            for c in word.chars() {
                let char_len = c.width().unwrap_or(0);
                if current_len > 0 && current_len + char_len > width {
                    lines.push(std::mem::take(&mut current_line));
                    current_len = 0;
                }
                current_line.push(c);
                current_len += char_len;
            }
        } else if current_len == 0 {
            // First word on row
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            // Word fits on current row
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            // Word doesn't fit, start new row
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }
    lines
}

/// Every row of the conversation, already wrapped to `width`. Drawing and
/// the scroll offset both use this, so they agree on the row count.
pub fn chat_lines(
    messages: &[ChatMessage],
    typing: bool,
    animation_frame: u8,
    width: u16,
) -> Vec<Line<'static>> {
    let width = width as usize;
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in messages {
        lines.push(role_label(msg.role));
        for raw in msg.content.lines() {
            for row in wrap_text_to_width(raw, width) {
                lines.push(match msg.role {
                    ChatRole::User => {
                        Line::from(Span::styled(row, Style::default().fg(Color::Gray)))
                    }
                    ChatRole::Assistant => parse_markdown_line(&row),
                });
            }
        }
        lines.push(Line::default());
    }

    if typing {
        lines.push(role_label(ChatRole::Assistant));
        // Cycles through one, two and three dots
        let dots = vec!["•"; (animation_frame as usize) + 1].join(" ");
        lines.push(Line::from(Span::styled(
            dots,
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Store areas for mouse hit-testing and scroll calculations
    app.chat_area = Some(area);
    app.chat_height = inner.height;
    app.chat_width = inner.width;

    let focus = app.focus;
    let suggestion_areas = match chat_view(&app.session) {
        ChatView::Welcome { suggestions } => render_welcome(frame, inner, suggestions, focus),
        ChatView::Conversation { messages, typing } => {
            let lines = chat_lines(messages, typing, app.animation_frame, inner.width);

            // The viewport may have changed since the last mutation
            let rows = u16::try_from(lines.len()).unwrap_or(u16::MAX);
            let max_scroll = rows.saturating_sub(inner.height);
            app.chat_scroll = if app.follow_tail {
                max_scroll
            } else {
                app.chat_scroll.min(max_scroll)
            };

            let chat = Paragraph::new(Text::from(lines)).scroll((app.chat_scroll, 0));
            frame.render_widget(chat, inner);
            Vec::new()
        }
    };
    app.suggestion_areas = suggestion_areas;
}

fn role_label(role: ChatRole) -> Line<'static> {
    let (label, color) = match role {
        ChatRole::User => (strings::USER_LABEL, USER_COLOR),
        ChatRole::Assistant => (strings::ASSISTANT_LABEL, ASSISTANT_COLOR),
    };
    Line::from(vec![
        Span::styled("● ", Style::default().fg(color)),
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

/// Greeting plus suggestion cards. Returns the card areas.
fn render_welcome(
    frame: &mut Frame,
    area: Rect,
    suggestions: &[&'static str],
    focus: FocusState,
) -> Vec<Rect> {
    let rows = suggestions.len().div_ceil(SUGGESTION_COLUMNS) as u16;
    let [_, title_area, subtitle_area, _, grid_area, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(rows * SUGGESTION_CARD_HEIGHT),
        Constraint::Fill(1),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            strings::WELCOME_TITLE,
            Style::default().fg(ASSISTANT_COLOR).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        title_area,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            strings::WELCOME_SUBTITLE,
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center),
        subtitle_area,
    );

    let [_, grid_area, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(SUGGESTION_GRID_WIDTH.min(grid_area.width)),
        Constraint::Fill(1),
    ])
    .areas(grid_area);

    let row_areas = Layout::vertical(vec![Constraint::Length(SUGGESTION_CARD_HEIGHT); rows as usize])
        .split(grid_area);
    let column_constraints = vec![Constraint::Ratio(1, SUGGESTION_COLUMNS as u32); SUGGESTION_COLUMNS];

    let mut card_areas = Vec::with_capacity(suggestions.len());
    for (index, suggestion) in suggestions.iter().enumerate() {
        let row = row_areas[index / SUGGESTION_COLUMNS];
        let card_area = Layout::horizontal(column_constraints.clone()).split(row)[index % SUGGESTION_COLUMNS];

        let selected = focus.target == Focus::Suggestions && focus.suggestion == index;
        let border_color = if selected { Color::Cyan } else { Color::DarkGray };
        let text_style = if selected {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let card = Paragraph::new(Span::styled(*suggestion, text_style))
            .alignment(Alignment::Right)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border_color)),
            );
        frame.render_widget(card, card_area);
        card_areas.push(card_area);
    }
    card_areas
}

/// Display column of the char index `cursor` in `text`.
fn cursor_column(text: &str, cursor: usize) -> usize {
    text.chars()
        .take(cursor)
        .map(|c| c.width().unwrap_or(0))
        .sum()
}

fn render_composer(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, send_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(SEND_BUTTON_WIDTH)]).areas(area);
    app.send_area = Some(send_area);

    let pending = app.session.is_pending();
    let editing = app.focus.target == Focus::Composer && !pending;
    let border_color = if editing { Color::Cyan } else { Color::DarkGray };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = input_block.inner(input_area);

    // Offsets are in terminal columns; wide glyphs take two
    let draft = app.session.draft();
    let cursor_col = cursor_column(draft, app.composer_cursor);
    let visible = inner.width.max(1) as usize;
    let offset = (cursor_col + 1).saturating_sub(visible);

    let content = if draft.is_empty() {
        Span::styled(strings::COMPOSER_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else if pending {
        Span::styled(draft.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(draft.to_string())
    };

    let input = Paragraph::new(content)
        .block(input_block)
        .scroll((0, offset as u16));
    frame.render_widget(input, input_area);

    if editing {
        let x = inner.x + (cursor_col - offset) as u16;
        frame.set_cursor_position((x, inner.y));
    }

    let send_style = if app.session.can_submit() {
        Style::default().fg(Color::Black).bg(Color::White).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let send = Paragraph::new(Span::styled("إرسال ⏎", send_style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(send, send_area);
}
