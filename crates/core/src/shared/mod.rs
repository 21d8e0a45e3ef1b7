pub mod constants;
pub mod frame;
pub mod pixel_statistics;
pub mod region;
pub mod settings;
