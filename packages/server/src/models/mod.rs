pub mod ar_model;
pub mod product;
pub mod shared;
