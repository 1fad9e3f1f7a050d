//! Cell rendering dispatch and column resolution

use super::column::Column;
use super::record::{Record, Value};

/// Displayed value for one (column, row) pair.
///
/// A column renderer wins and its output is used verbatim. Without one the
/// raw field is returned as-is, which passes pre-rendered values through
/// untouched. A missing field reads as `Value::Null`.
pub fn render_cell<H: Clone>(column: &Column<H>, row: &Record<H>) -> Value<H> {
    let raw = row.get(&column.key);
    match &column.render {
        Some(render) => {
            let null = Value::Null;
            render(raw.unwrap_or(&null), row, &column.key)
        }
        None => raw.cloned().unwrap_or(Value::Null),
    }
}

/// Render every column of a row, in column order
pub fn render_row<H: Clone>(columns: &[Column<H>], row: &Record<H>) -> Vec<Value<H>> {
    columns.iter().map(|column| render_cell(column, row)).collect()
}

/// Columns derived from the first record's fields, in field order.
/// Headers default to the key and no renderer is attached.
pub fn infer_columns<H>(records: &[Record<H>]) -> Vec<Column<H>> {
    records
        .first()
        .map(|first| first.keys().map(Column::from_key).collect())
        .unwrap_or_default()
}

/// The explicit column list when there is one, otherwise the inferred one
pub fn resolve_columns<H>(explicit: Option<&[Column<H>]>, records: &[Record<H>]) -> Vec<Column<H>> {
    match explicit {
        Some(columns) => columns.to_vec(),
        None => infer_columns(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inferred_columns_follow_field_order() {
        let records: Vec<Record> = vec![Record::new().with("a", 1).with("b", 2)];
        let columns = infer_columns(&records);
        let pairs: Vec<(&str, &str)> = columns
            .iter()
            .map(|c| (c.key.as_str(), c.header.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "a"), ("b", "b")]);
        assert!(columns.iter().all(|c| !c.has_renderer() && c.width.is_none()));
    }

    #[test]
    fn no_records_no_columns() {
        let records: Vec<Record> = Vec::new();
        assert!(infer_columns(&records).is_empty());
    }

    #[test]
    fn renderer_takes_precedence() {
        let column: Column = Column::new("age", "Age").render(|_, _, _| Value::from("hidden"));
        let row: Record = Record::new().with("age", 30);
        assert_eq!(render_cell(&column, &row), Value::Text("hidden".to_string()));
    }

    #[test]
    fn renderer_sees_value_row_and_key() {
        let column: Column = Column::new("name", "Name").render(|value, row, key| {
            Value::from(format!("{}:{}:{}", key, value.text(), row.id().unwrap_or(0)))
        });
        let row: Record = Record::new().with("id", 4).with("name", "Ann");
        assert_eq!(render_cell(&column, &row), Value::Text("name:Ann:4".to_string()));
    }

    #[test]
    fn renderer_runs_for_missing_field() {
        let column: Column = Column::new("actions", "Actions").render(|value, _, _| {
            Value::from(value.is_null())
        });
        let row: Record = Record::new().with("id", 1);
        assert_eq!(render_cell(&column, &row), Value::Bool(true));
    }

    #[test]
    fn raw_values_and_prerendered_pass_through() {
        let row: Record<&str> = Record::new()
            .with("views", 1234)
            .with("badge", Value::Rendered("chip"));
        assert_eq!(render_cell(&Column::from_key("views"), &row), Value::Int(1234));
        assert_eq!(render_cell(&Column::from_key("badge"), &row), Value::Rendered("chip"));
        assert_eq!(render_cell(&Column::from_key("absent"), &row), Value::Null);
    }

    #[test]
    fn explicit_columns_win_over_inference() {
        let records: Vec<Record> = vec![Record::new().with("a", 1).with("b", 2)];
        let explicit = vec![Column::new("b", "Bee")];
        let resolved = resolve_columns(Some(&explicit), &records);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].header, "Bee");
        assert_eq!(resolve_columns(None, &records).len(), 2);
    }

    #[test]
    fn render_row_follows_column_order() {
        let row: Record = Record::new().with("a", 1).with("b", "x");
        let columns = vec![Column::from_key("b"), Column::from_key("a")];
        assert_eq!(render_row(&columns, &row), vec![Value::from("x"), Value::Int(1)]);
    }
}
