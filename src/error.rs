use thiserror::Error;

/// Structural failures while turning a page into a table.
///
/// These travel inside `anyhow::Error` and can be recovered with
/// `err.downcast_ref::<TableError>()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("no <table> element found in document")]
    NoTable,

    #[error("table has no rows")]
    NoRows,

    #[error("row {row} has {cells} data cells but the header declares {columns} columns")]
    ColumnOverflow {
        row: usize,
        cells: usize,
        columns: usize,
    },

    #[error("key column {0:?} not found in table headers")]
    MissingKeyColumn(String),
}
