use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Mode};
use crate::columns::{Action, Widget};
use crate::domain::EntityKind;
use crate::grid::{Column, Value};
use crate::style::Style as AppStyle;

/// Cut `s` to at most `width` terminal cells, marking the cut with an ellipsis
pub fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// `Prev  2 / 5  Next`, or nothing when there is at most one page
pub fn pagination_label(current: usize, total: usize) -> Option<String> {
    (total > 1).then(|| format!("Prev  {} / {}  Next", current, total))
}

fn action_label(action: Action) -> String {
    format!("{}:{}", action.key(), action.label())
}

fn cell_line<'a>(value: &Value<Widget>, width: usize, style: &AppStyle) -> Line<'a> {
    match value {
        Value::Rendered(Widget::Badge { label, tone }) => {
            Line::from(Span::styled(truncate(label, width), style.tone(*tone)))
        }
        Value::Rendered(Widget::Actions(actions)) => {
            let text = actions.iter().map(|a| action_label(*a)).collect::<Vec<_>>().join(" ");
            Line::from(Span::styled(truncate(&text, width), style.help()))
        }
        other => Line::from(truncate(&other.text(), width)),
    }
}

fn column_constraint(column: &Column<Widget>) -> Constraint {
    match column.width {
        Some(w) => Constraint::Length(w),
        None => Constraint::Min(10),
    }
}

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    if let Some(bg) = app.style.background() {
        frame.render_widget(Block::default().style(Style::default().bg(bg)), frame.size());
    }

    render_tabs(frame, app, chunks[0]);
    render_stats(frame, app, chunks[1]);
    render_search(frame, app, chunks[2]);
    render_table(frame, app, chunks[3]);
    render_pagination(frame, app, chunks[4]);
    render_message_line(frame, app, chunks[5]);
    render_help(frame, app, chunks[6]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for kind in [EntityKind::Post, EntityKind::User] {
        spans.push(Span::styled(format!(" {} ", kind.label()), app.style.tab(kind == app.kind)));
        spans.push(Span::raw(" "));
    }
    if app.is_loading() {
        spans.push(Span::styled("loading…", app.style.help()));
    }
    if app.read_only {
        spans.push(Span::styled(" [read-only]", app.style.help()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for item in &app.stats {
        spans.push(Span::styled(format!("{} ", item.label), app.style.stat_label()));
        spans.push(Span::styled(item.value.clone(), app.style.tone(item.tone)));
        spans.push(Span::raw("   "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    if !app.grid.config().searchable {
        return;
    }
    let active = app.mode == Mode::Search;
    let term = if active { app.input.as_str() } else { app.grid.state().search_term.as_str() };
    let text = if term.is_empty() && !active {
        "Search: (press / to search)".to_string()
    } else {
        format!("Search: {}{}", term, if active { "_" } else { "" })
    };
    let line = Line::from(Span::styled(text, app.style.search(active)));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let columns = app.grid.columns();
    let snapshot = app.grid.snapshot();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style.border())
        .title(format!(" {} ({}) ", app.kind.label(), app.grid.filtered_len()));

    if snapshot.page_items.is_empty() {
        let empty = Paragraph::new("No records").style(app.style.help()).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let constraints: Vec<Constraint> = columns.iter().map(column_constraint).collect();
    let widths = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints.clone())
        .split(Rect { width: area.width.saturating_sub(2), ..area });

    let header_cells: Vec<Cell> = columns
        .iter()
        .map(|column| {
            let sorted = snapshot.sort_key == Some(column.key.as_str());
            let label = if sorted {
                format!("{} {}", column.header, snapshot.sort_direction.arrow())
            } else {
                column.header.clone()
            };
            Cell::from(label).style(app.style.header(sorted))
        })
        .collect();

    let rows: Vec<Row> = app
        .grid
        .rendered_page()
        .iter()
        .enumerate()
        .map(|(row_idx, cells)| {
            let cells: Vec<Cell> = cells
                .iter()
                .enumerate()
                .map(|(col_idx, value)| {
                    let width = widths.get(col_idx).map(|r| r.width as usize).unwrap_or(10);
                    Cell::from(cell_line(value, width, &app.style))
                })
                .collect();
            let style = if row_idx == app.cursor {
                app.style.row_cursor()
            } else {
                app.style.cell()
            };
            Row::new(cells).style(style)
        })
        .collect();

    let table = Table::new(rows, constraints)
        .header(Row::new(header_cells))
        .column_spacing(1)
        .block(block);

    frame.render_widget(table, area);
}

fn render_pagination(frame: &mut Frame, app: &App, area: Rect) {
    let label = match pagination_label(app.grid.state().current_page, app.grid.total_pages()) {
        Some(label) => label,
        None => return,
    };
    let line = Line::from(Span::styled(label, app.style.pagination()));
    frame.render_widget(Paragraph::new(line).alignment(ratatui::layout::Alignment::Center), area);
}

fn render_message_line(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(label) = app.prompt_label().filter(|_| app.mode != Mode::Search) {
        Line::from(vec![
            Span::styled(label, app.style.search(true)),
            Span::raw(format!("{}_", app.input)),
        ])
    } else if let Some(alert) = &app.alert {
        Line::from(vec![
            Span::styled(format!("{}: ", alert.title), app.style.alert(alert.kind)),
            Span::raw(alert.message.clone()),
        ])
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let text = match app.mode {
        Mode::Search => "type to filter  Enter keep  Esc clear",
        Mode::Prompt(_) => "key=value; key=value  \\; for a literal ;  Enter save  Esc cancel",
        Mode::ConfirmDelete(_) => "y confirm  any other key cancels",
        Mode::Normal if app.kind == EntityKind::Post => {
            "q quit  Tab switch  / search  1-9 sort  n/p page  c new  e edit  d delete  P/A/R publish/archive/restore"
        }
        Mode::Normal => "q quit  Tab switch  / search  1-9 sort  n/p page  c new  e edit  d delete  r reload",
    };
    frame.render_widget(Paragraph::new(Span::styled(text, app.style.help())), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_cell_width() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
        assert_eq!(truncate("hello", 0), "");
        // Wide characters take two cells
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
    }

    #[test]
    fn pagination_hidden_for_single_page() {
        assert_eq!(pagination_label(1, 0), None);
        assert_eq!(pagination_label(1, 1), None);
        assert_eq!(pagination_label(2, 5).as_deref(), Some("Prev  2 / 5  Next"));
    }

    #[test]
    fn actions_render_with_keys() {
        let value = Value::Rendered(Widget::Actions(vec![Action::Edit, Action::Publish, Action::Delete]));
        let style = AppStyle::with_theme(crate::style::Theme::light());
        let line = cell_line(&value, 40, &style);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "e:edit P:publish d:delete");
    }
}
