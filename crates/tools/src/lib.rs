pub mod common;
pub mod match_sim;
