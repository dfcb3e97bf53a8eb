pub mod address;
pub mod conf;
