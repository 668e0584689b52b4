pub mod auth_guard;
pub mod deadline;
pub mod role_guard;
