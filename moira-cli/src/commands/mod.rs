pub mod apply;
pub mod dump;
