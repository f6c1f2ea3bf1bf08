/// User interface module
///
/// Rendering helpers only. The application shell in main.rs owns the
/// session and calls `render::render` after every state change.

pub mod render;
