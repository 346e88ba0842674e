pub mod submissions;
pub mod users;

pub use submissions::{SubmissionStats, SubmissionStore};
pub use users::UserDirectory;
