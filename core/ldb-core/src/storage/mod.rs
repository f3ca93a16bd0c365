//! Storage module — row/key codecs and the ordered key-value store binding.
//!
//! Every table is backed by its own sled instance rooted at the table's
//! directory. Rows reach the store only through [`batch::WriteBatch`] commits;
//! reads go straight to the store.

pub mod batch;
pub mod key_codec;
pub mod store;
pub mod value_codec;

pub use batch::{BatchOp, WriteBatch};
pub use key_codec::{derive_key, strip_key_buffer};
pub use store::{KvStore, StoreOptions};
pub use value_codec::ValueCodec;
