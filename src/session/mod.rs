//! Session handles and typed access.
//!
//! This module provides the per-request [`SessionHandle`], the materialized
//! [`Session`] accessor, and the data types a store hands back.

mod extract;
mod handle;
mod id;
mod record;
mod value;

pub use handle::{start, Session, SessionHandle};
pub use id::SessionId;
pub use record::{SessionRecord, DEFAULT_FLASH_CATEGORY};
pub use value::SessionValue;
