// Dashboard handlers (d100)
pub mod d100_finance;

pub mod crm;
