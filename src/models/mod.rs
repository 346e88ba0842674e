pub mod submission;
pub mod user;

pub use submission::{AssessmentRequest, NewSubmission, Submission};
pub use user::UserAccount;
