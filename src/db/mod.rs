pub mod db;
pub mod schema;
pub mod session;
pub mod userkycdb;

#[cfg(test)]
pub mod memory;
