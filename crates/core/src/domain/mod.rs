pub mod cart;
pub mod notification;
pub mod product;
pub mod user;
