pub mod deposit;
pub mod establishment;
pub mod membership;
pub mod organization;
pub mod principal;
pub mod unit;
