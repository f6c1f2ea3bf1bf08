/// State management module
///
/// This module is the caption curation engine:
/// - Shared data structures (data.rs)
/// - Caption log persistence (store.rs)
/// - Priority weight (weight.rs)
/// - Folder scanning (scanner.rs)
/// - Sorted, circular navigation (working_set.rs)
/// - The session facade the UI drives (session.rs)

pub mod data;
pub mod scanner;
pub mod session;
pub mod store;
pub mod weight;
pub mod working_set;

pub use data::CurrentView;
pub use session::Session;
