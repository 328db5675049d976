pub mod adaptors;
pub mod email;
pub mod fields;
pub mod forms;
pub mod progress;
