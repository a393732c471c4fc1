pub mod customer;
pub mod incoming_requests;
pub mod service;
pub mod subscription;
