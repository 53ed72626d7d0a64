pub mod advisor;
pub mod lump_payment;
