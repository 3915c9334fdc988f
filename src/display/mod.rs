//! Display module for snapshot rendering and colour management

pub mod colours;
pub mod render;

pub use colours::ColourManager;
pub use render::{OutputFormat, SnapshotRenderer};
