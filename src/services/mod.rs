pub mod places;
pub mod reviews;
pub mod users;
