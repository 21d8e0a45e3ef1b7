pub mod analyze_frame_use_case;
pub mod analyzer_factory;
pub mod gender_analyzer;
pub mod live_session;
pub mod menu_session;
pub mod pipeline_logger;
pub mod snapshot_saver;
