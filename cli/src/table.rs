// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt};

use colored::{Color, Colorize};
use unicode_width::UnicodeWidthStr;

/// Plain text table, padded by display width so that Hangul and CJK cells line up.
#[derive(Debug)]
pub struct Table<'a, T, C: TableColumn<T>> {
    columns: &'a [C],
    data: &'a [T],
}

const SEPARATOR: &str = "  ";

impl<'a, T, C: TableColumn<T>> Table<'a, T, C> {
    pub fn new(columns: &'a [C], data: &'a [T]) -> Self {
        Self {
            columns,
            data,
        }
    }

    fn column_widths(&self, rows: &[Vec<Cow<'_, str>>]) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .map(|col| col.name().width())
            .collect();

        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }
        widths
    }

    fn write_row<'c>(
        &self,
        f: &mut fmt::Formatter<'_>,
        cells: impl Iterator<Item = (Cow<'c, str>, Option<Color>)>,
        widths: &[usize],
    ) -> fmt::Result {
        let last = self.columns.len().saturating_sub(1);
        for (i, ((cell, color), (col, &width))) in
            cells.zip(self.columns.iter().zip(widths)).enumerate()
        {
            // Last column does not need padding if it's left-aligned
            let cell = match col.padding_direction() {
                PaddingDirection::Left if i == last => cell.into_owned(),
                PaddingDirection::Left => pad(&cell, width, PaddingDirection::Left),
                PaddingDirection::Right => pad(&cell, width, PaddingDirection::Right),
            };

            match color {
                Some(color) => write!(f, "{}", cell.color(color))?,
                None => write!(f, "{cell}")?,
            }
            if i < last {
                write!(f, "{SEPARATOR}")?;
            }
        }
        writeln!(f)
    }
}

impl<T, C: TableColumn<T>> fmt::Display for Table<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<Vec<Cow<'_, str>>> = self
            .data
            .iter()
            .map(|data| self.columns.iter().map(|col| col.format(data)).collect())
            .collect();
        let widths = self.column_widths(&rows);

        let names = self.columns.iter().map(|col| (col.name(), None));
        self.write_row(f, names, &widths)?;

        for (row, data) in rows.into_iter().zip(self.data) {
            let colors = self.columns.iter().map(|col| col.color(data));
            self.write_row(f, row.into_iter().zip(colors), &widths)?;
        }
        Ok(())
    }
}

pub trait TableColumn<T> {
    fn name(&self) -> Cow<'_, str>;

    fn format<'a>(&self, data: &'a T) -> Cow<'a, str>;

    fn padding_direction(&self) -> PaddingDirection {
        PaddingDirection::Left
    }

    fn color(&self, _data: &T) -> Option<Color> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingDirection {
    Left,
    Right,
}

fn pad(cell: &str, width: usize, direction: PaddingDirection) -> String {
    let fill = " ".repeat(width.saturating_sub(cell.width()));
    match direction {
        PaddingDirection::Left => format!("{cell}{fill}"),
        PaddingDirection::Right => format!("{fill}{cell}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Name;
    struct Count;

    impl TableColumn<(&'static str, u32)> for Name {
        fn name(&self) -> Cow<'_, str> {
            "Name".into()
        }

        fn format<'a>(&self, data: &'a (&'static str, u32)) -> Cow<'a, str> {
            data.0.into()
        }
    }

    impl TableColumn<(&'static str, u32)> for Count {
        fn name(&self) -> Cow<'_, str> {
            "N".into()
        }

        fn format<'a>(&self, data: &'a (&'static str, u32)) -> Cow<'a, str> {
            data.1.to_string().into()
        }

        fn padding_direction(&self) -> PaddingDirection {
            PaddingDirection::Right
        }
    }

    enum Col {
        Count(Count),
        Name(Name),
    }

    impl TableColumn<(&'static str, u32)> for Col {
        fn name(&self) -> Cow<'_, str> {
            match self {
                Col::Count(a) => a.name(),
                Col::Name(a) => a.name(),
            }
        }

        fn format<'a>(&self, data: &'a (&'static str, u32)) -> Cow<'a, str> {
            match self {
                Col::Count(a) => a.format(data),
                Col::Name(a) => a.format(data),
            }
        }

        fn padding_direction(&self) -> PaddingDirection {
            match self {
                Col::Count(a) => a.padding_direction(),
                Col::Name(a) => a.padding_direction(),
            }
        }
    }

    #[test]
    fn pads_by_display_width() {
        let columns = [Col::Name(Name), Col::Count(Count)];
        let data = [("생신", 1), ("birthday", 100)];

        let out = Table::new(&columns, &data).to_string();

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "Name        N");
        assert_eq!(lines[1], "생신        1");
        assert_eq!(lines[2], "birthday  100");
    }

    #[test]
    fn last_left_aligned_column_is_not_padded() {
        let columns = [Col::Count(Count), Col::Name(Name)];
        let data = [("a", 1), ("abc", 2)];

        let out = Table::new(&columns, &data).to_string();

        assert_eq!(out, "N  Name\n1  a\n2  abc\n");
    }

    #[test]
    fn empty_table_prints_header_only() {
        let columns = [Col::Name(Name)];
        let data: [(&'static str, u32); 0] = [];

        let out = Table::new(&columns, &data).to_string();

        assert_eq!(out, "Name\n");
    }
}
