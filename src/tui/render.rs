use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::io::ConfigStore;
use crate::model::item::SPACES_PER_LEVEL;
use crate::view::{InsertPos, ListRow};

use super::app::App;
use super::theme::Theme;

/// Main render function. Layout: title row | outline | footer row.
pub fn render<C: ConfigStore>(frame: &mut Frame, app: &mut App<C>) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title + breadcrumbs
            Constraint::Min(1),    // outline
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_title(frame, app, chunks[0]);
    render_outline(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);

    // Help overlay (rendered on top of everything)
    if app.show_help {
        render_help_overlay(frame, app, area);
    }
}

fn render_title<C: ConfigStore>(frame: &mut Frame, app: &App<C>, area: Rect) {
    let (title, breadcrumbs) = app.vm.list_title();
    let line = Line::from(vec![
        Span::styled(breadcrumbs, Style::default().fg(app.theme.breadcrumbs)),
        Span::styled(
            title,
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_outline<C: ConfigStore>(frame: &mut Frame, app: &mut App<C>, area: Rect) {
    app.sync_window_size(area.width as usize, area.height as usize);

    let rows = app.vm.list_items();
    let inserting = app.vm.is_inserting();
    let mut lines: Vec<Line> = rows
        .iter()
        .map(|row| row_line(row, &app.theme, area.width as usize, inserting))
        .collect();

    // The inline input field takes the place the committed item will have
    if let Some(pos) = app.vm.inserting_pos() {
        let selected = rows.iter().position(|r| r.is_selected);
        let at = match (pos, selected) {
            (_, None) => lines.len(),
            (InsertPos::Before, Some(i))
                if !(rows[i].has_children && !rows[i].is_collapsed) =>
            {
                i
            }
            (_, Some(i)) => i + 1,
        };
        lines.insert(at, input_line(app, app.vm.insertion_indent()));
    } else if app.vm.is_editing()
        && let Some(i) = rows.iter().position(|r| r.is_selected)
    {
        lines[i] = input_line(app, rows[i].indent);
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_footer<C: ConfigStore>(frame: &mut Frame, app: &App<C>, area: Rect) {
    let dim = Style::default().fg(app.theme.dim).bg(app.theme.background);
    let line = if app.vm.is_searching() {
        let mut spans = vec![Span::styled("Search: ".to_string(), dim)];
        spans.extend(cursor_spans(app));
        let hint = "Enter keep  Esc cancel  Up/Down cycle";
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let width = area.width as usize;
        if used + hint.len() < width {
            spans.push(Span::styled(" ".repeat(width - used - hint.len()), dim));
            spans.push(Span::styled(hint.to_string(), dim));
        }
        Line::from(spans)
    } else {
        Line::from(Span::styled("Press ? to show help".to_string(), dim))
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// One outline row: indentation, a bullet that doubles as the collapse
/// indicator, then the item text.
fn row_line(row: &ListRow, theme: &Theme, width: usize, inserting: bool) -> Line<'static> {
    let symbol = if !row.has_children {
        "\u{2022}" // •
    } else if row.is_collapsed {
        "\u{25BA}" // ►
    } else {
        "\u{25BC}" // ▼
    };

    let mut style = Style::default().fg(theme.text).bg(theme.background);
    if row.is_completed {
        style = style
            .fg(theme.completed)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    if row.is_search_result {
        style = style.fg(theme.search_match);
    }
    if row.is_selected && !inserting {
        style = style.add_modifier(Modifier::REVERSED);
    }

    let padding = " ".repeat(row.indent * SPACES_PER_LEVEL);
    let text = truncate_to_width(&row.text, width.saturating_sub(padding.len() + 2));
    Line::from(Span::styled(format!("{padding}{symbol} {text}"), style))
}

fn input_line<C: ConfigStore>(app: &App<C>, indent: usize) -> Line<'static> {
    let prompt = format!("{}\u{2022} ", " ".repeat(indent * SPACES_PER_LEVEL));
    let mut spans = vec![Span::styled(
        prompt,
        Style::default().fg(app.theme.dim).bg(app.theme.background),
    )];
    spans.extend(cursor_spans(app));
    Line::from(spans)
}

/// The input buffer split at the cursor, with a block glyph marking the
/// cursor position.
fn cursor_spans<C: ConfigStore>(app: &App<C>) -> Vec<Span<'static>> {
    let text_style = Style::default().fg(app.theme.text).bg(app.theme.background);
    let before = app.input_buffer[..app.input_cursor].to_string();
    let after = app.input_buffer[app.input_cursor..].to_string();
    vec![
        Span::styled(before, text_style),
        Span::styled(
            "\u{258C}".to_string(),
            Style::default().fg(app.theme.cursor).bg(app.theme.background),
        ),
        Span::styled(after, text_style),
    ]
}

fn render_help_overlay<C: ConfigStore>(frame: &mut Frame, app: &App<C>, area: Rect) {
    const BINDINGS: &[(&str, &str)] = &[
        ("j / k", "select next / previous item"),
        ("H / M / L", "select top / middle / bottom of screen"),
        ("n / N", "new item after / before selection"),
        ("e", "edit item"),
        ("x", "cut item"),
        ("p / P", "paste after / before selection"),
        ("Enter", "complete / uncomplete item"),
        ("Space", "collapse / expand item"),
        ("l", "zoom in on item"),
        ("h", "zoom out one level"),
        ("c", "hide / show completed items"),
        ("/", "search"),
        ("u", "undo"),
        ("q", "quit"),
    ];

    let key_width = BINDINGS.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let lines: Vec<Line> = BINDINGS
        .iter()
        .map(|(key, help)| {
            Line::from(vec![
                Span::styled(
                    format!(" {key:>key_width$}  "),
                    Style::default().fg(app.theme.title),
                ),
                Span::styled(help.to_string(), Style::default().fg(app.theme.text)),
            ])
        })
        .collect();

    let height = (lines.len() + 2) as u16;
    let width = 50u16.min(area.width);
    let popup = centered_rect(width, height.min(area.height), area);

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Keys ")
        .style(Style::default().bg(app.theme.background));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Clip text to a display-cell budget, marking the cut with an ellipsis.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width.saturating_sub(1) {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('\u{2026}');
    out
}
