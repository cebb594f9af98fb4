pub mod advertisement;
pub mod shared;
