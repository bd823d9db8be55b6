pub mod postgres;
pub mod surreal;
