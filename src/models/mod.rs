pub mod userkycmodel;
pub mod vaccinemodel;
