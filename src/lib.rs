pub mod body;
pub mod consts;
pub mod engine;
pub mod file;
pub mod forces;
pub mod frame;
pub mod sink;
