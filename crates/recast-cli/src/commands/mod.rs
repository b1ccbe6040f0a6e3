pub mod loan;
pub mod recast;
pub mod scenarios;
