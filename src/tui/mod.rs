// TUI module for rendering the terminal interface
pub mod colors;
pub mod helpers;
pub mod input;

// Re-exports
pub use colors::*;
pub use helpers::{
    calculate_progress, category_icon, position_of_mode, selection_cards, SelectionCard,
    FAVORITES_HINT,
};
pub use input::{handle_card_key, handle_selection_key, KeyAction};

use crate::domain::{CardView, Mode};
use crate::image_loader::LoadState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

/// Height of one selection card, borders included
const SELECTION_CARD_HEIGHT: u16 = 4;

/// Which screen is underneath any overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Selection,
    Card,
}

/// Overlay drawn on top of the current screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// No overlay
    Main,
    Help,
    /// Shown on first launch
    Welcome,
    /// A message dismissed by any key
    Notice(String),
}

/// Side of the card facing the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Face {
    /// The photo
    #[default]
    Front,
    /// Building name and category
    Back,
}

impl Face {
    pub fn flipped(self) -> Self {
        match self {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        }
    }
}

/// Splits the frame into header, content and footer
fn screen_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Area of the card on the card screen; gestures outside it are dropped
pub fn card_area(area: Rect) -> Rect {
    screen_chunks(area)[1]
}

/// Area holding the selection cards; the last content row is kept for hints
fn selection_list_area(area: Rect) -> Rect {
    let content = screen_chunks(area)[1];
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(content)[0]
}

/// Visible selection cards with their slots, scrolled so `cursor` is shown
pub fn selection_slots(list_area: Rect, count: usize, cursor: usize) -> Vec<(usize, Rect)> {
    if list_area.height == 0 || count == 0 {
        return Vec::new();
    }

    let per_page = ((list_area.height / SELECTION_CARD_HEIGHT) as usize).max(1);
    let offset = if cursor >= per_page {
        cursor + 1 - per_page
    } else {
        0
    };

    (offset..count.min(offset + per_page))
        .map(|index| {
            let y = list_area.y + ((index - offset) as u16) * SELECTION_CARD_HEIGHT;
            let height = SELECTION_CARD_HEIGHT.min(list_area.bottom().saturating_sub(y));
            (index, Rect::new(list_area.x, y, list_area.width, height))
        })
        .collect()
}

/// Selection card under a mouse click, if any
pub fn selection_hit(
    area: Rect,
    count: usize,
    cursor: usize,
    column: u16,
    row: u16,
) -> Option<usize> {
    selection_slots(selection_list_area(area), count, cursor)
        .into_iter()
        .find(|(_, slot)| {
            column >= slot.x && column < slot.right() && row >= slot.y && row < slot.bottom()
        })
        .map(|(index, _)| index)
}

/// Renders the selection screen. With `dataset_error` set the deck is
/// replaced by an explanation.
pub fn render_selection(
    frame: &mut Frame,
    cards: &[SelectionCard],
    cursor: usize,
    dataset_error: Option<&str>,
) {
    let [header, content, footer] = screen_chunks(frame.area());

    let header_widget = Paragraph::new(vec![
        Line::from(Span::styled(
            " ArchFlash ",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            " Choose a deck to start",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_COLOR)),
    );
    frame.render_widget(header_widget, header);

    if let Some(error) = dataset_error {
        frame.render_widget(render_unavailable_widget(error), content);
    } else {
        let list_area = selection_list_area(frame.area());
        for (index, slot) in selection_slots(list_area, cards.len(), cursor) {
            render_selection_card(frame, slot, &cards[index], index == cursor);
        }

        let favorites_empty = cards
            .iter()
            .any(|c| c.mode == Mode::Favorites && !c.enabled);
        if favorites_empty {
            let hint_area = Rect::new(content.x, content.bottom().saturating_sub(1), content.width, 1);
            let hint = Paragraph::new(Line::from(Span::styled(
                format!("{}.", FAVORITES_HINT),
                Style::default()
                    .fg(TEXT_SECONDARY)
                    .add_modifier(Modifier::ITALIC),
            )))
            .alignment(Alignment::Center);
            frame.render_widget(hint, hint_area);
        }
    }

    render_footer(
        frame,
        footer,
        &[("↑↓", "Move"), ("Enter", "Start"), ("?", "Help"), ("q", "Quit")],
    );
}

fn render_selection_card(frame: &mut Frame, area: Rect, card: &SelectionCard, selected: bool) {
    let (border, title_color, subtitle_color) = match (card.enabled, selected) {
        (false, true) => (TEXT_SECONDARY, TEXT_DISABLED, TEXT_DISABLED),
        (false, false) => (BORDER_COLOR, TEXT_DISABLED, TEXT_DISABLED),
        (true, true) => (ACCENT_HIGHLIGHT, ACCENT_HIGHLIGHT, TEXT_PRIMARY),
        (true, false) => (BORDER_COLOR, TEXT_PRIMARY, TEXT_SECONDARY),
    };
    let marker = if selected { "▸ " } else { "  " };

    let lines = vec![
        Line::from(vec![
            Span::styled(marker, Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::raw(card.icon),
            Span::raw("  "),
            Span::styled(
                card.title.clone(),
                Style::default()
                    .fg(title_color)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            format!("      {}", card.subtitle),
            Style::default().fg(subtitle_color),
        )),
    ];

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(widget, area);
}

/// Creates the notice shown when the dataset could not be loaded
fn render_unavailable_widget(error: &str) -> Paragraph<'static> {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Dataset unavailable",
            Style::default()
                .fg(ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Check the dataset path or URL and restart.",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT_PRIMARY)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

/// Renders the card screen for the current card
pub fn render_card(frame: &mut Frame, view: &CardView, face: Face, image: &LoadState) {
    let [header, content, footer] = screen_chunks(frame.area());

    render_card_header(frame, header, view);

    let (title, border) = match (face, view.is_favorite) {
        (Face::Front, true) => (" Front ♥ ", ACCENT_SECONDARY),
        (Face::Back, true) => (" Back ♥ ", ACCENT_SECONDARY),
        (Face::Front, false) => (" Front ", BORDER_COLOR),
        (Face::Back, false) => (" Back ", BORDER_COLOR),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(title)
        .title_alignment(Alignment::Center);
    let inner = block.inner(content);
    frame.render_widget(block, content);

    match face {
        Face::Front => render_card_front(frame, inner, view, image),
        Face::Back => render_card_back(frame, inner, view),
    }

    render_footer(
        frame,
        footer,
        &[
            ("←", "Prev"),
            ("→", "Next"),
            ("Space", "Flip"),
            ("f", "Favorite"),
            ("o", "Open"),
            ("b", "Back"),
            ("?", "Help"),
        ],
    );
}

fn render_card_header(frame: &mut Frame, area: Rect, view: &CardView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let favorite = if view.is_favorite {
        Span::styled("♥ Saved", Style::default().fg(ACCENT_SECONDARY))
    } else {
        Span::styled("♡ Not saved", Style::default().fg(TEXT_SECONDARY))
    };

    let title_line = Line::from(vec![
        Span::styled(
            format!(" Card {}/{} ", view.display_index, view.total),
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        favorite,
    ]);

    let header = Paragraph::new(title_line).block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_COLOR)),
    );
    frame.render_widget(header, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .gauge_style(Style::default().fg(ACCENT_HIGHLIGHT).bg(BG_DARK))
        .ratio(calculate_progress(view.display_index, view.total))
        .label(format!(
            "{:.0}% ({}/{})",
            view.percentage, view.display_index, view.total
        ));
    frame.render_widget(gauge, chunks[1]);
}

fn render_card_front(frame: &mut Frame, area: Rect, view: &CardView, image: &LoadState) {
    match image {
        LoadState::Loading => render_loading_overlay(frame, area),
        LoadState::Ready(card_image) => {
            let lines = card_image.to_lines(area.width, area.height);
            let padding = (area.height as usize).saturating_sub(lines.len()) / 2;
            let mut padded = vec![Line::from(""); padding];
            padded.extend(lines);

            frame.render_widget(Paragraph::new(padded).alignment(Alignment::Center), area);
        }
        LoadState::Error(e) => {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "[!] Could not load this image",
                    Style::default()
                        .fg(ACCENT_PRIMARY)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(e.clone(), Style::default().fg(TEXT_SECONDARY))),
                Line::from(""),
                Line::from(Span::styled(
                    view.image_url.clone(),
                    Style::default().fg(TEXT_SECONDARY),
                )),
                Line::from(""),
                Line::from("Press o to open it externally or Space to see the answer."),
            ];
            let paragraph = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .style(Style::default().fg(TEXT_PRIMARY))
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
        }
    }
}

fn render_card_back(frame: &mut Frame, area: Rect, view: &CardView) {
    let text = vec![
        Line::from(Span::styled(
            view.name.clone(),
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            view.category.clone(),
            Style::default().fg(TEXT_PRIMARY),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Space to flip back",
            Style::default()
                .fg(TEXT_SECONDARY)
                .add_modifier(Modifier::ITALIC),
        )),
    ];

    let padding = (area.height as usize).saturating_sub(text.len()) / 2;
    let mut lines = vec![Line::from(""); padding];
    lines.extend(text);

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Renders a loading box centered in `area`
pub fn render_loading_overlay(frame: &mut Frame, area: Rect) {
    let loading_area = centered_rect(50, 40, area);
    frame.render_widget(Clear, loading_area);

    let block = Block::default()
        .title(" Loading ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(loading_area);
    frame.render_widget(block, loading_area);

    let spinners = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let now = chrono::Utc::now().timestamp_millis().max(0) as usize;
    let spinner = spinners[(now / 100) % spinners.len()];

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("{} ", spinner),
                Style::default().fg(ACCENT_HIGHLIGHT),
            ),
            Span::styled("Loading image", Style::default().fg(TEXT_PRIMARY)),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

/// Renders the help overlay
pub fn render_help_overlay(frame: &mut Frame) {
    let help_area = centered_rect(60, 80, frame.area());
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let key = |k: &'static str| Span::styled(k, Style::default().fg(ACCENT_HIGHLIGHT));
    let heading = |t: &'static str| {
        Line::from(Span::styled(
            t,
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        ))
    };

    let help_lines = vec![
        Line::from(""),
        heading("Cards"),
        Line::from(vec![key("  → / l      "), Span::raw("Next card")]),
        Line::from(vec![key("  ← / h      "), Span::raw("Previous card")]),
        Line::from(vec![key("  Space      "), Span::raw("Flip card")]),
        Line::from(vec![key("  f          "), Span::raw("Save / unsave image")]),
        Line::from(vec![key("  o          "), Span::raw("Open image in viewer")]),
        Line::from(vec![key("  b / Esc    "), Span::raw("Back to selection")]),
        Line::from(""),
        heading("Mouse"),
        Line::from(vec![key("  drag ← →   "), Span::raw("Swipe to next / previous")]),
        Line::from(vec![key("  click      "), Span::raw("Flip card")]),
        Line::from(""),
        heading("Selection"),
        Line::from(vec![key("  ↑ ↓ / j k  "), Span::raw("Move")]),
        Line::from(vec![key("  Enter      "), Span::raw("Start deck")]),
        Line::from(vec![key("  q          "), Span::raw("Quit")]),
        Line::from(""),
        Line::from(Span::styled(
            format!("{}.", FAVORITES_HINT),
            Style::default()
                .fg(ACCENT_SECONDARY)
                .add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    let paragraph = Paragraph::new(help_lines)
        .alignment(Alignment::Left)
        .style(Style::default().fg(TEXT_PRIMARY))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, inner);
}

/// Renders the welcome dialog overlay
pub fn render_welcome_overlay(frame: &mut Frame) {
    let area = centered_rect(80, 75, frame.area());
    frame.render_widget(Clear, area);

    let bold = Style::default()
        .fg(ACCENT_HIGHLIGHT)
        .add_modifier(Modifier::BOLD);

    let welcome_lines = vec![
        Line::from(""),
        Line::from(Span::styled("Welcome to ArchFlash!", bold)),
        Line::from(""),
        Line::from("Learn to recognize buildings and architectural styles with flashcards."),
        Line::from(""),
        Line::from(Span::styled("Quick Start:", bold)),
        Line::from(""),
        Line::from(vec![
            Span::styled("  1. ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Pick a deck: all categories, one style period, or your favorites"),
        ]),
        Line::from(vec![
            Span::styled("  2. ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Look at the photo and guess the building"),
        ]),
        Line::from(vec![
            Span::styled("  3. ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Press "),
            Span::styled("Space", bold),
            Span::raw(" (or click) to flip and check your answer"),
        ]),
        Line::from(vec![
            Span::styled("  4. ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("Press "),
            Span::styled("→", bold),
            Span::raw(" or swipe left for the next card, "),
            Span::styled("f", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw(" to save it"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  •  ", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw("Each deck is shuffled every time you start it"),
        ]),
        Line::from(vec![
            Span::styled("  •  ", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw("Saved images stay saved between runs"),
        ]),
        Line::from(vec![
            Span::styled("  •  ", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw("Press "),
            Span::styled("?", bold),
            Span::raw(" anytime for all shortcuts"),
        ]),
        Line::from(""),
        Line::from(Span::styled("Press any key to start...", bold)),
    ];

    let welcome = Paragraph::new(welcome_lines)
        .block(
            Block::default()
                .title(Span::styled(" Welcome ", bold))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
                .style(Style::default().bg(BG_DARK)),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    frame.render_widget(welcome, area);
}

/// Renders a dismissible message box
pub fn render_notice(frame: &mut Frame, message: &str) {
    let area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default()
                .fg(TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to continue",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

/// Renders the footer with styled key hints
fn render_footer(frame: &mut Frame, area: Rect, controls: &[(&str, &str)]) {
    let mut spans = Vec::with_capacity(controls.len() * 3);
    for (i, (key, label)) in controls.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  │  "));
        }
        spans.push(Span::styled(
            format!("{} ", key),
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            label.to_string(),
            Style::default().fg(TEXT_SECONDARY),
        ));
    }

    let footer = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
