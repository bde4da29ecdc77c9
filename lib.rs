mod batch;
mod columns;

pub mod backend;
pub mod column;
pub mod error;
pub mod factory;
pub mod flags;
pub mod handle;
pub mod metrics;
pub mod provider;
pub mod settings;
pub mod value;

pub use batch::WriteBatch;
pub use column::{BlobTxColumn, ColumnEnum, ColumnName, ReceiptsColumn};
pub use columns::{ColumnGroup, CrossColumnSnapshot, CrossColumnWriteBatch, InMemoryColumnGroup};
pub use error::StoreError;
pub use factory::{Factory, OwnedHandle};
pub use flags::{ReadFlags, WriteFlags};
pub use handle::{Database, DbIterator, DbSnapshot, KvBackend, SnapshotBackend};
pub use metrics::{DbMetric, DbMetricCounters};
pub use provider::{Provider, ReadOnlyMode, ReadOnlyProvider};
pub use settings::Settings;
pub use value::{BorrowedValue, Entry};
