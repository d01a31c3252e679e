pub mod seed;
pub mod smoke;
