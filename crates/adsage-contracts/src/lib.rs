pub mod analysis;
pub mod apply;
pub mod session;
pub mod strategy;
