mod mutation_batch;

pub use mutation_batch::{ColumnOp, MutationBatch, RowMutation};
