pub mod batch;
pub mod failure;
pub mod notifier;
pub mod seen;

pub use batch::{
    batch, filter_new, format_listing, pack_blocks, BatchLayout, FormatOptions, MessageBatch,
};
pub use failure::{Escalation, FailureCounter, FailureKind};
pub use notifier::{CycleReport, Notifier, NotifyError};
pub use seen::{SeenStore, StoreError};
