//! Application orchestration module

pub mod initialization;
pub mod execution;

pub use initialization::{
    load_configuration,
    configure_logging,
    configure_store,
    create_colour_manager,
    create_renderer
};
pub use execution::{
    build_toaster,
    read_script,
    run_script,
    ScriptSession,
    SnapshotPrinter
};
