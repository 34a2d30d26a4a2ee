use std::fmt::{self, Display, Formatter};

use tabled::{builder::Builder, settings::Style as TableStyle};

use super::painter::Painter;

/// A structured table that renders via `Display`.
#[derive(Debug)]
pub(crate) struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates a table with column headers and data rows.
    pub(crate) fn grid(
        headers: impl IntoIterator<Item = impl Into<String>>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows,
        }
    }

    /// Creates a two-column field/value table with muted field names.
    pub(crate) fn key_value(painter: &Painter, rows: Vec<(&str, String)>) -> Self {
        let records = rows
            .into_iter()
            .map(|(field, value)| vec![painter.muted(field), value])
            .collect();
        Self::grid(["field", "value"], records)
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(&self.headers);
        for row in &self.rows {
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(TableStyle::rounded());
        write!(f, "{table}")
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn grid_table_renders_with_headers_and_rows() {
        let table = Table::grid(
            ["path", "usage"],
            vec![
                vec!["/dev/hidraw0".into(), "FF60/61".into()],
                vec!["/dev/hidraw1".into(), "0001/06".into()],
            ],
        );
        assert_snapshot!(table.to_string(), @r"
        ╭──────────────┬─────────╮
        │ path         │ usage   │
        ├──────────────┼─────────┤
        │ /dev/hidraw0 │ FF60/61 │
        │ /dev/hidraw1 │ 0001/06 │
        ╰──────────────┴─────────╯
        ");
    }

    #[test]
    fn key_value_table_uses_field_value_headers() {
        let painter = Painter::new(false);
        let table = Table::key_value(&painter, vec![("report_size", "32".into())]);
        let rendered = table.to_string();
        assert!(rendered.contains("│ field       │ value │"));
        assert!(rendered.contains("│ report_size │ 32    │"));
    }
}
