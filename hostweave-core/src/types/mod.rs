//! Type definition module

mod entry;
mod history;
mod response;

pub use entry::{EntryKind, HostsEntry, SaveEntryRequest};
pub use history::{HistoryDeletion, HistorySnapshot};
pub use response::{ApiResponse, RefreshData};
