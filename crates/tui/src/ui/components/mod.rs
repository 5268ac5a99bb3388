//! UI components: header, log list.

pub mod component;
pub mod header;
pub mod logs;

pub(crate) use component::Component;
pub use header::HeaderComponent;
pub use logs::LogsComponent;
