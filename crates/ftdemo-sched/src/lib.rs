//! Job result handling and on-disk bookkeeping.
//!
//! The [`ResultHandler`] turns each finished job into raw counts, an API
//! dump and id-list entries under a [`DataLayout`]. Jobs that time out are
//! listed and picked up later by [`refetch_pending`].

pub mod error;
pub mod handler;
pub mod idlist;
pub mod layout;
pub mod refetch;

pub use error::{SchedError, SchedResult};
pub use handler::{HandlerOutcome, ResultHandler, read_dump, write_dump};
pub use idlist::{append_id, read_ids, write_ids};
pub use layout::{COMPLETED_LIST, DataLayout, PROCESSED_LIST, TIMED_OUT_LIST, refetched_name};
pub use refetch::refetch_pending;
