//! Chat conversations as seen from one client view.

pub mod merge;
pub mod pipeline;
pub mod subscription;
pub mod thread;

pub use merge::merge_snapshot;
pub use pipeline::{ChatView, Notice, PendingSend};
pub use subscription::{Snapshot, Subscription};
pub use thread::direct_thread_id;
