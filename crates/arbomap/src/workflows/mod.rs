pub mod noo;
pub mod pricing;
