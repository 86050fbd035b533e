pub mod aggregate;
pub mod catalog;
pub mod engagement;
pub mod policy;
