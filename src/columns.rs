//! Column lists for the console's entity tabs.
//!
//! Badge and action cells are produced as [`Widget`] values. The grid passes
//! them through untouched and the UI decides how to draw them.

use crate::domain::EntityKind;
use crate::grid::{Column, Record, Value};

/// Color family of a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Primary,
    Info,
    Success,
    Warning,
    Danger,
    Secondary,
}

/// Row action offered in the actions column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Publish,
    Archive,
    Restore,
    Delete,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Edit => "edit",
            Action::Publish => "publish",
            Action::Archive => "archive",
            Action::Restore => "restore",
            Action::Delete => "delete",
        }
    }

    /// Key that triggers the action from the row cursor
    pub fn key(self) -> char {
        match self {
            Action::Edit => 'e',
            Action::Publish => 'P',
            Action::Archive => 'A',
            Action::Restore => 'R',
            Action::Delete => 'd',
        }
    }
}

/// Pre-rendered cell content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    Badge { label: String, tone: Tone },
    Actions(Vec<Action>),
}

pub type Cell = Value<Widget>;

fn badge(label: &str, tone: Tone) -> Cell {
    Value::Rendered(Widget::Badge { label: label.to_string(), tone })
}

pub fn role_tone(role: &str) -> Tone {
    match role {
        "admin" => Tone::Danger,
        "moderator" => Tone::Warning,
        _ => Tone::Primary,
    }
}

pub fn user_status_tone(status: &str) -> Tone {
    match status {
        "active" => Tone::Success,
        "inactive" => Tone::Warning,
        _ => Tone::Danger,
    }
}

pub fn category_tone(category: &str) -> Tone {
    match category {
        "development" => Tone::Primary,
        "design" => Tone::Info,
        "accessibility" => Tone::Danger,
        _ => Tone::Secondary,
    }
}

pub fn post_status_tone(status: &str) -> Tone {
    match status {
        "published" => Tone::Success,
        "draft" => Tone::Warning,
        _ => Tone::Secondary,
    }
}

/// `1234567` -> `"1,234,567"`
pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Actions available on a row of the given kind
pub fn row_actions(kind: EntityKind, record: &Record<Widget>) -> Vec<Action> {
    let mut actions = vec![Action::Edit];
    if kind == EntityKind::Post {
        let status = record.get("status").map(|v| v.text().into_owned());
        match status.as_deref() {
            Some("draft") => actions.push(Action::Publish),
            Some("published") => actions.push(Action::Archive),
            Some("archived") => actions.push(Action::Restore),
            _ => {}
        }
    }
    actions.push(Action::Delete);
    actions
}

fn badge_column(key: &str, header: &str, width: u16, tone: fn(&str) -> Tone) -> Column<Widget> {
    Column::new(key, header)
        .width(width)
        .render(move |value, _, _| badge(&value.text(), tone(&value.text())))
}

fn actions_column(kind: EntityKind) -> Column<Widget> {
    Column::new("actions", "Actions")
        .width(28)
        .render(move |_, row, _| Value::Rendered(Widget::Actions(row_actions(kind, row))))
}

pub fn user_columns() -> Vec<Column<Widget>> {
    vec![
        Column::new("id", "ID").width(5),
        Column::new("username", "Username").width(14),
        Column::new("email", "Email").width(24),
        badge_column("role", "Role", 11, role_tone),
        badge_column("status", "Status", 11, user_status_tone),
        Column::new("createdAt", "Created").width(11),
        Column::new("lastLogin", "Last login").width(11).render(|value, _, _| {
            if value.text().is_empty() {
                Value::from("-")
            } else {
                value.clone()
            }
        }),
        actions_column(EntityKind::User),
    ]
}

pub fn post_columns() -> Vec<Column<Widget>> {
    vec![
        Column::new("id", "ID").width(5),
        Column::new("title", "Title"),
        Column::new("author", "Author").width(12),
        badge_column("category", "Category", 15, category_tone),
        badge_column("status", "Status", 11, post_status_tone),
        Column::new("views", "Views").width(9).render(|value, _, _| {
            let views = value.as_number().map(|n| n as i64).unwrap_or(0);
            Value::from(format_thousands(views))
        }),
        Column::new("createdAt", "Created").width(11),
        actions_column(EntityKind::Post),
    ]
}

pub fn columns_for(kind: EntityKind) -> Vec<Column<Widget>> {
    match kind {
        EntityKind::User => user_columns(),
        EntityKind::Post => post_columns(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::render_cell;

    fn post_row(status: &str, views: Option<i64>) -> Record<Widget> {
        Record::new()
            .with("id", 1)
            .with("title", "Hello")
            .with("category", "cooking")
            .with("status", status)
            .with("views", views)
    }

    fn column(columns: &[Column<Widget>], key: &str) -> Column<Widget> {
        columns.iter().find(|c| c.key == key).cloned().unwrap()
    }

    #[test]
    fn thousands_separator() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_thousands(-45000), "-45,000");
    }

    #[test]
    fn post_actions_depend_on_status() {
        let labels = |status: &str| {
            row_actions(EntityKind::Post, &post_row(status, None))
                .iter()
                .map(|a| a.label())
                .collect::<Vec<_>>()
        };
        assert_eq!(labels("draft"), vec!["edit", "publish", "delete"]);
        assert_eq!(labels("published"), vec!["edit", "archive", "delete"]);
        assert_eq!(labels("archived"), vec!["edit", "restore", "delete"]);
        assert_eq!(
            row_actions(EntityKind::User, &post_row("draft", None)),
            vec![Action::Edit, Action::Delete]
        );
    }

    #[test]
    fn post_cells_render_widgets() {
        let columns = post_columns();
        let row = post_row("draft", Some(1500));

        assert_eq!(
            render_cell(&column(&columns, "status"), &row),
            Value::Rendered(Widget::Badge { label: "draft".to_string(), tone: Tone::Warning })
        );
        assert_eq!(
            render_cell(&column(&columns, "category"), &row),
            Value::Rendered(Widget::Badge { label: "cooking".to_string(), tone: Tone::Secondary })
        );
        assert_eq!(render_cell(&column(&columns, "views"), &row), Value::from("1,500"));
        assert_eq!(
            render_cell(&column(&columns, "views"), &post_row("draft", None)),
            Value::from("0")
        );
    }

    #[test]
    fn user_cells_render_badges_and_dash() {
        let columns = user_columns();
        let row: Record<Widget> = Record::new()
            .with("id", 2)
            .with("role", "moderator")
            .with("status", "suspended")
            .with("lastLogin", Value::Null);

        assert_eq!(
            render_cell(&column(&columns, "role"), &row),
            Value::Rendered(Widget::Badge { label: "moderator".to_string(), tone: Tone::Warning })
        );
        assert_eq!(
            render_cell(&column(&columns, "status"), &row),
            Value::Rendered(Widget::Badge { label: "suspended".to_string(), tone: Tone::Danger })
        );
        assert_eq!(render_cell(&column(&columns, "lastLogin"), &row), Value::from("-"));
    }

    #[test]
    fn every_kind_ends_with_actions() {
        for kind in [EntityKind::User, EntityKind::Post] {
            let columns = columns_for(kind);
            assert_eq!(columns.last().map(|c| c.key.as_str()), Some("actions"));
            assert_eq!(columns[0].key, "id");
        }
    }
}
