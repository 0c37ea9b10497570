use anyhow::{Context, Result};

use crate::error::TableError;
use crate::html_table::Element;

/// String table with named columns. `None` marks a cell the source row never
/// filled in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl StatFrame {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column(column)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Moves `key` out of the data columns and into the row index.
    pub fn set_index(self, key: &str) -> Result<IndexedFrame, TableError> {
        let Some(key_col) = self.column(key) else {
            return Err(TableError::MissingKeyColumn(key.to_string()));
        };

        let mut columns = self.columns;
        let index_name = columns.remove(key_col);
        let mut index = Vec::with_capacity(self.rows.len());
        let mut rows = Vec::with_capacity(self.rows.len());
        for mut row in self.rows {
            let key_cell = if key_col < row.len() {
                row.remove(key_col)
            } else {
                None
            };
            index.push(key_cell);
            rows.push(row);
        }

        Ok(IndexedFrame {
            index_name,
            index,
            columns,
            rows,
        })
    }
}

/// Converts a parsed `<table>` into a [`StatFrame`].
///
/// The first `tr` supplies the column names from its `th` cells. Every later
/// `tr` contributes one row from its `td` cells, placed by position. Short
/// rows leave trailing cells unset; a row wider than the header is an error.
pub fn table_to_frame(table: &Element) -> Result<StatFrame, TableError> {
    let row_tags = table.find_all("tr");
    let Some((header, body)) = row_tags.split_first() else {
        return Err(TableError::NoRows);
    };

    let columns = header
        .find_all("th")
        .iter()
        .map(|th| th.text())
        .collect::<Vec<_>>();

    let mut rows = Vec::with_capacity(body.len());
    for (i_row, row_tag) in body.iter().enumerate() {
        let cells = row_tag.find_all("td");
        if cells.len() > columns.len() {
            return Err(TableError::ColumnOverflow {
                row: i_row,
                cells: cells.len(),
                columns: columns.len(),
            });
        }
        let mut row = vec![None; columns.len()];
        for (i_col, cell) in cells.iter().enumerate() {
            row[i_col] = Some(cell.text());
        }
        rows.push(row);
    }

    Ok(StatFrame { columns, rows })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    pub index_name: String,
    pub index: Vec<Option<String>>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl IndexedFrame {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn cell(&self, key: &str, column: &str) -> Option<&str> {
        let row = self.index.iter().position(|k| k.as_deref() == Some(key))?;
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Renders the frame as CSV: index name first in the header, index value
    /// first in each record, unset cells as empty fields.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push(self.index_name.as_str());
        header.extend(self.columns.iter().map(String::as_str));
        writer.write_record(&header).context("write csv header")?;

        for (key, row) in self.index.iter().zip(&self.rows) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(key.as_deref().unwrap_or_default());
            record.extend(row.iter().map(|cell| cell.as_deref().unwrap_or_default()));
            writer.write_record(&record).context("write csv record")?;
        }

        writer.into_inner().context("flush csv buffer")
    }
}

#[cfg(test)]
mod tests {
    use super::{IndexedFrame, StatFrame};
    use crate::error::TableError;

    fn frame() -> StatFrame {
        StatFrame {
            columns: vec!["Pts".to_string(), "Club".to_string(), "GF".to_string()],
            rows: vec![
                vec![Some("45".to_string()), Some("LA".to_string()), Some("60".to_string())],
                vec![Some("40".to_string()), Some("NYC".to_string()), None],
            ],
        }
    }

    #[test]
    fn set_index_moves_key_column_first() {
        let indexed = frame().set_index("Club").expect("key present");
        assert_eq!(indexed.index_name, "Club");
        assert_eq!(indexed.columns, vec!["Pts", "GF"]);
        assert_eq!(indexed.cell("NYC", "Pts"), Some("40"));
        assert_eq!(indexed.cell("NYC", "GF"), None);
        assert_eq!(indexed.len(), 2);
    }

    #[test]
    fn set_index_missing_key_fails() {
        let err = frame().set_index("#").unwrap_err();
        assert_eq!(err, TableError::MissingKeyColumn("#".to_string()));
    }

    #[test]
    fn csv_writes_index_and_blank_unset_cells() {
        let indexed = frame().set_index("Club").expect("key present");
        let csv = String::from_utf8(indexed.to_csv_bytes().expect("csv")).expect("utf8");
        assert_eq!(csv, "Club,Pts,GF\nLA,45,60\nNYC,40,\n");
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        let indexed = IndexedFrame {
            index_name: "Club".to_string(),
            index: vec![Some("D.C. United".to_string())],
            columns: vec!["Record".to_string()],
            rows: vec![vec![Some("10,5,3".to_string())]],
        };
        let csv = String::from_utf8(indexed.to_csv_bytes().expect("csv")).expect("utf8");
        assert_eq!(csv, "Club,Record\nD.C. United,\"10,5,3\"\n");
    }
}
