pub mod category;
pub mod customer;
pub mod medicine;
pub mod order;
pub mod order_detail;
pub mod payment;
pub mod user;
