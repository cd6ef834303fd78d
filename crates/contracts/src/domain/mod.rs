pub mod a001_order;
pub mod a002_payment_account;
pub mod a003_payment;
