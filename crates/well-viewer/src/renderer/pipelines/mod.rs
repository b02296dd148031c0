pub mod pipe;
pub mod shoe;
