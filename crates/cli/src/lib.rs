// ABOUTME: Library half of the sitescrub CLI: batch orchestration, run reports and support files.
// ABOUTME: Kept separate from main.rs so the pipelines can be driven and tested without a process.

pub mod batch;
pub mod report;
pub mod support;

pub use batch::{discover_documents, run_localize, run_sanitize, BatchOptions};
pub use report::{DocumentFailure, Pipeline, RunReport};
pub use support::{
    prepare_support_files, write_mobile_menu_script, DEFAULT_STYLESHEET_URL, MOBILE_MENU_JS,
    MOBILE_MENU_PATH, STYLESHEET_PATH,
};
