pub mod admin;
pub mod subscription;
