pub mod face_locator;
pub mod skin_rule;
