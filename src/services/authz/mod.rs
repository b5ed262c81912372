pub mod policy;
pub mod role;

pub use policy::{ChangeSet, Decision, check_update_permission};
pub use role::{Capability, Role};
