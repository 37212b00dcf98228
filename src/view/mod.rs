/// Read-side views over driver results
///
/// Rows and columns come back from the driver as raw byte slices. The views
/// here keep those raw parts together with the codecs of the column family,
/// and decode them the first time a caller enumerates the columns.
///
/// ```text
/// RawRow ──→ Row { key: Value, columns: ColumnSlice }
///                                  │ first columns()
///                                  ↓
///                           Vec<Column> (cached)
/// ```
mod column;
mod row;

pub use column::{Column, ColumnSlice};
pub use row::Row;
