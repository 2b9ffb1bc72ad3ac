pub mod backup;
pub mod layout;
pub mod persistence;
