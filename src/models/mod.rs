pub mod application;
pub mod job;
pub mod role;
pub mod session;
pub mod user;

pub use application::{Application, ApplicationStatus};
pub use job::Job;
pub use role::Role;
pub use session::Session;
pub use user::User;
