pub mod extractors;
pub mod users;
pub mod vaccine;
