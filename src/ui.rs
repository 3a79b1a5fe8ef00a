use crate::activity::{activity_color, TagSummary, ALL_ACTIVITIES};
use crate::app::{App, ViewMode};
use crate::calendar::{DayState, GridDay, DAYS_PER_WEEK, WEEKS_PER_GRID};
use crate::gallery::{EMPTY_HINT, EMPTY_ICON, EMPTY_TITLE};
use crate::modal::{DiaryModal, Field, TextInput};
use chrono::Datelike;
use color_eyre::Result;
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::HashMap;
use std::io::{stdout, Stdout};

const TITLE: &str = "🌱 캘린더";
const CALENDAR_TAB: &str = "🗓️ 캘린더";
const PHOTO_TAB: &str = "📸 사진";
const MEMO_PLACEHOLDER: &str = "오늘의 식물 상태는 어떤가요?";
const PHOTO_PLACEHOLDER: &str = "+ 사진 추가 (Enter / Ctrl+O)";

const TODAY_COLOR: Color = Color::Rgb(0x22, 0xC5, 0x5E);
const ENTRY_BG: Color = Color::Rgb(0x37, 0x41, 0x51);
const GRID_BORDER: Color = Color::DarkGray;

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI { terminal })
    }

    pub fn display(&mut self, app: &mut App) -> Result<()> {
        self.terminal.draw(|f| draw(f, app))?;
        Ok(())
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::error!("failed to disable raw mode: {e}");
        }
        if let Err(e) = stdout().execute(LeaveAlternateScreen) {
            tracing::error!("failed to leave alternate screen: {e}");
        }
    }
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(f.area());

    draw_header(f, chunks[0], app.view_mode());
    // Only the visible panel is drawn; both keep their state regardless.
    match app.view_mode() {
        ViewMode::Calendar => draw_calendar(f, chunks[1], app),
        ViewMode::Photo => draw_gallery(f, chunks[1], app),
    }
    draw_controls(f, chunks[2], app);

    let area = f.area();
    if let Some(modal) = app.modal() {
        draw_modal(f, area, modal);
    }
}

fn draw_header(f: &mut Frame, area: Rect, mode: ViewMode) {
    let tab = |label: &str, active: bool| {
        let style = if active {
            Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Span::styled(format!(" {label} "), style)
    };

    let lines = vec![
        Line::from(Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(vec![
            tab(CALENDAR_TAB, mode == ViewMode::Calendar),
            Span::raw(" "),
            tab(PHOTO_TAB, mode == ViewMode::Photo),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_controls(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().add_modifier(Modifier::BOLD));
    let mut spans = Vec::new();
    if app.modal().is_some() {
        spans.extend([
            key("Tab"),
            Span::raw(" field, "),
            key("Ctrl+S"),
            Span::raw(" save, "),
            key("Ctrl+D"),
            Span::raw(" delete, "),
            key("Esc"),
            Span::raw(" cancel"),
        ]);
    } else {
        if app.view_mode() == ViewMode::Calendar {
            spans.extend([key("[ ]"), Span::raw(" month, "), key("t"), Span::raw(" today, ")]);
        }
        spans.extend([
            key("Enter"),
            Span::raw(" edit, "),
            key("Tab"),
            Span::raw(" switch view, "),
            key("q"),
            Span::raw(" quit"),
        ]);
    }
    let controls = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(controls, area);
}

fn draw_calendar(f: &mut Frame, area: Rect, app: &mut App) {
    let today = app.today();
    let cursor = app.calendar().cursor();
    let week_start = app.calendar().week_start();
    let Some(grid) = app.calendar().grid(today) else {
        return;
    };
    let marked = app.marked_dates();

    let block = Block::default()
        .borders(Borders::TOP)
        .title(
            Line::from(format!("◀ {} ▶", grid.title()))
                .centered()
                .style(Style::default().add_modifier(Modifier::BOLD)),
        );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::vertical(
        std::iter::once(Constraint::Length(1))
            .chain((0..WEEKS_PER_GRID).map(|_| Constraint::Ratio(1, WEEKS_PER_GRID as u32))),
    )
    .split(inner);
    let columns = || {
        Layout::horizontal(
            (0..DAYS_PER_WEEK).map(|_| Constraint::Ratio(1, DAYS_PER_WEEK as u32)),
        )
    };

    for (name, cell) in week_start.weekday_names().iter().zip(columns().split(rows[0]).iter()) {
        let header = Paragraph::new(*name)
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(header, *cell);
    }

    for (week, row) in grid.weeks().zip(rows.iter().skip(1)) {
        for (day, cell) in week.iter().zip(columns().split(*row).iter()) {
            draw_day(f, *cell, day, day.date == cursor, marked);
        }
    }
}

fn draw_day(
    f: &mut Frame,
    area: Rect,
    day: &GridDay,
    is_cursor: bool,
    marked: &HashMap<String, Vec<String>>,
) {
    let tags = marked.get(&day.key()).map(Vec::as_slice).unwrap_or_default();
    let summary = TagSummary::of(tags);

    let mut block = Block::default()
        .borders(Borders::RIGHT | Borders::BOTTOM)
        .border_style(Style::default().fg(GRID_BORDER));
    if !summary.is_empty() {
        block = block.style(Style::default().bg(ENTRY_BG));
    }
    if day.state == DayState::Today {
        block = block
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(TODAY_COLOR));
    }
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut number_style = match day.state {
        DayState::Today => Style::default().fg(TODAY_COLOR).add_modifier(Modifier::BOLD),
        DayState::InMonth => Style::default().fg(Color::White),
        DayState::Disabled => Style::default().fg(Color::DarkGray),
    };
    if is_cursor {
        number_style = number_style.add_modifier(Modifier::REVERSED);
    }

    let width = inner.width as usize;
    let mut lines = vec![Line::from(Span::styled(
        format!("{:>2}", day.date.day()),
        number_style,
    ))
    .centered()];
    lines.extend(summary.labels(width).into_iter().map(|(label, color)| {
        Line::from(Span::styled(
            label,
            Style::default().fg(Color::Black).bg(color),
        ))
        .centered()
    }));
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_gallery(f: &mut Frame, area: Rect, app: &mut App) {
    let (photos, view) = app.gallery_parts();

    if photos.is_empty() {
        let [_, middle, _] = vertical_center(area, 3);
        let empty = Paragraph::new(vec![
            Line::from(EMPTY_ICON),
            Line::from(Span::styled(EMPTY_TITLE, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(EMPTY_HINT, Style::default().fg(Color::Gray))),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(empty, middle);
        return;
    }

    let items: Vec<ListItem> = photos
        .iter()
        .map(|entry| {
            let tags: Vec<Span> = entry
                .activities
                .iter()
                .flat_map(|tag| {
                    [
                        Span::styled(
                            format!(" {tag} "),
                            Style::default().fg(Color::Black).bg(activity_color(tag)),
                        ),
                        Span::raw(" "),
                    ]
                })
                .collect();
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!("🖼  {}", entry.photo().unwrap_or_default()),
                    Style::default().fg(Color::Cyan),
                )),
                Line::from(Span::styled(
                    entry.date.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(tags),
                Line::default(),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::TOP).title(Line::from(PHOTO_TAB).centered()))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, view.list_state());
}

fn draw_modal(f: &mut Frame, area: Rect, modal: &DiaryModal) {
    let area = centered_rect(area, 70, 80);
    f.render_widget(Clear, area);

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .title(
            Line::from(modal.title())
                .centered()
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .title(Line::from("Esc ✕").right_aligned());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(inner);

    let label = |text: &'static str| {
        Paragraph::new(text).style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD))
    };

    f.render_widget(label("활동 선택"), chunks[0]);
    draw_chips(f, chunks[1], modal);

    f.render_widget(label("사진"), chunks[2]);
    draw_input(
        f,
        chunks[3],
        modal.photo(),
        PHOTO_PLACEHOLDER,
        modal.focus() == Field::Photo,
        false,
    );

    f.render_widget(label("메모"), chunks[4]);
    draw_input(
        f,
        chunks[5],
        modal.memo(),
        MEMO_PLACEHOLDER,
        modal.focus() == Field::Memo,
        true,
    );

    let buttons = Line::from(vec![
        Span::styled("Ctrl+D 삭제", Style::default().fg(Color::Red)),
        Span::raw("    "),
        Span::styled(" Esc 취소 ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw("  "),
        Span::styled(
            " Ctrl+S 저장 ",
            Style::default().fg(Color::White).bg(Color::Black).add_modifier(Modifier::BOLD),
        ),
    ])
    .right_aligned();
    f.render_widget(Paragraph::new(buttons), chunks[6]);
}

fn draw_chips(f: &mut Frame, area: Rect, modal: &DiaryModal) {
    let focused = modal.focus() == Field::Activities;
    let spans: Vec<Span> = ALL_ACTIVITIES
        .iter()
        .enumerate()
        .flat_map(|(i, activity)| {
            let mut style = if modal.is_selected(activity) {
                Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            if focused && i == modal.chip_cursor() {
                style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
            }
            [Span::styled(format!(" {activity} "), style), Span::raw(" ")]
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(spans)).wrap(Wrap { trim: false }),
        area,
    );
}

/// The memo wraps and scrolls down with the cursor; the photo scrolls
/// sideways.
fn draw_input(
    f: &mut Frame,
    area: Rect,
    input: &TextInput,
    placeholder: &str,
    focused: bool,
    multiline: bool,
) {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let block = Block::bordered().border_style(Style::default().fg(border));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let (lines, (row, column)) = if input.text().is_empty() {
        let hint = Span::styled(placeholder, Style::default().fg(Color::DarkGray));
        (vec![Line::from(hint)], (0, 0))
    } else if multiline {
        let (rows, (row, column)) = input.wrapped(inner.width as usize);
        let top = (row + 1).saturating_sub(inner.height as usize);
        let lines = rows.into_iter().skip(top).map(Line::from).collect::<Vec<_>>();
        (lines, (row - top, column))
    } else {
        let (visible, column) = input.window(inner.width as usize);
        (vec![Line::from(visible)], (0, column))
    };
    f.render_widget(Paragraph::new(lines), inner);

    if focused {
        let x = inner.x + (column as u16).min(inner.width - 1);
        let y = inner.y + (row as u16).min(inner.height - 1);
        f.set_cursor_position((x, y));
    }
}

fn vertical_center(area: Rect, height: u16) -> [Rect; 3] {
    let chunks = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(height),
        Constraint::Min(0),
    ])
    .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekStart;
    use crate::diary_entry::{builtin_seed, DiaryEntry};
    use chrono::NaiveDate;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        // wide glyphs leave blank continuation cells, so compare without spaces
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
            .replace(' ', "")
    }

    fn app_with(entries: Vec<DiaryEntry>) -> App {
        let today = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
        App::new(entries, today, WeekStart::Sunday)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        text.chars().for_each(|c| press(app, KeyCode::Char(c)));
    }

    #[test]
    fn calendar_shows_two_tags_and_overflow() {
        let mut app = app_with(vec![DiaryEntry {
            id: "1".into(),
            date: "2025-08-15".into(),
            activities: vec!["물주기".into(), "잎정리".into(), "분갈이".into()],
            memo: None,
            photo_uri: None,
        }]);
        let screen = render(&mut app);
        assert!(screen.contains("2025년8월"), "{screen}");
        assert!(screen.contains("물주기"));
        assert!(screen.contains("잎정리"));
        assert!(screen.contains("+1"));
        assert!(!screen.contains("분갈이"));
    }

    #[test]
    fn gallery_lists_photo_entries() {
        let mut app = app_with(builtin_seed().unwrap());
        press(&mut app, KeyCode::Char('p'));
        let screen = render(&mut app);
        assert!(screen.contains("2025-08-15"));
        assert!(screen.contains("2025-08-26"));
        assert!(screen.contains("해충방제"));
    }

    #[test]
    fn empty_gallery_shows_hint() {
        let mut app = app_with(Vec::new());
        press(&mut app, KeyCode::Tab);
        let screen = render(&mut app);
        assert!(screen.contains(&EMPTY_TITLE.replace(' ', "")));
    }

    #[test]
    fn modal_renders_over_calendar() {
        let mut app = app_with(builtin_seed().unwrap());
        press(&mut app, KeyCode::Enter);
        let screen = render(&mut app);
        assert!(screen.contains("2025.08.15기록"));
        assert!(screen.contains("활동선택"));
        assert!(screen.contains("몬스테라"));
    }

    #[test]
    fn modal_shows_the_end_of_a_long_photo_link() {
        let mut app = app_with(builtin_seed().unwrap());
        press(&mut app, KeyCode::Enter);
        let screen = render(&mut app);
        assert!(screen.contains("?w=500"), "{screen}");
        assert!(screen.contains("응애가보여서약을쳤다."));
    }

    #[test]
    fn long_memo_scrolls_to_the_cursor() {
        let mut app = app_with(Vec::new());
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "첫줄");
        for _ in 0..40 {
            press(&mut app, KeyCode::Enter);
            type_text(&mut app, "잎이 났다");
        }
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, &"가".repeat(50));
        type_text(&mut app, "끝줄");

        let screen = render(&mut app);
        assert!(screen.contains("끝줄"), "{screen}");
        assert!(!screen.contains("첫줄"));
    }
}
