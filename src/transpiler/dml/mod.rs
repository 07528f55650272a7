pub mod delete;
pub mod select;
