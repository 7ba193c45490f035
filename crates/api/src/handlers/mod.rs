pub mod reports;
pub mod segments;
pub mod users;
