//! Common types used across the application.

pub mod id;
pub mod pagination;

pub use id::{LOCAL_ID_PREFIX, TransactionId};
pub use pagination::{PageMeta, PageRequest};
