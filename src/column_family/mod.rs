/// Column family registrations
///
/// A column family is a named group of rows that share a key type, a column
/// name type and a column value type. Registrations are loaded once at
/// startup and never change while the process runs.
///
/// ```text
/// ColumnFamilySet
///  ├─→ "orders"          key: string  column: string     value: string
///  ├─→ "queue_messages"  key: string  column: composite  value: string
///  └─→ "stats"           key: string  column: string     value: long
/// ```
pub mod column_family_descriptor;
mod column_family_set;

pub use column_family_descriptor::ColumnFamilyDescriptor;
pub use column_family_set::{ColumnFamily, ColumnFamilySet};
