mod bump;
mod change;
mod check;
mod publish;
mod sync;

pub use bump::{BumpOutcome, bump};
pub use change::{ChangePrompter, ChangeRequest, create_change};
pub use check::{CheckReport, check};
pub use publish::{PublishOutcome, publish};
pub use sync::{SyncChange, sync};
