pub mod auth_service;
pub mod cart_service;
pub mod medicine_service;
