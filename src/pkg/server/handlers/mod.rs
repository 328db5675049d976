pub mod forms;
pub mod probes;
pub mod progress;
