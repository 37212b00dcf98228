pub mod batch;
pub mod column_family;
pub mod composite;
pub mod config;
pub mod driver;
pub mod keyspace;
pub mod persistence;
pub mod serializer;
pub mod statistics;
pub mod util;
pub mod view;

pub use column_family::{ColumnFamily, ColumnFamilyDescriptor, ColumnFamilySet};
pub use composite::{Component, Composite};
pub use config::{ColumnFamilyConfig, PersistenceConfig};
pub use driver::{DriverError, MemoryDriver, Session, StoreDriver};
pub use keyspace::{KeyspaceHandle, KeyspaceRegistry};
pub use persistence::Persistence;
pub use serializer::{Codec, SerializerRegistry, SerializerTag, Value};
pub use statistics::{MetricName, MetricsSink, Statistics};
pub use util::{Code, Result, Slice, Status};
pub use view::{Column, ColumnSlice, Row};
