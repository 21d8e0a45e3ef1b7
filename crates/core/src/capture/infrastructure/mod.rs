pub mod image_file_source;
pub mod image_file_writer;
pub mod synthetic_frame_source;
