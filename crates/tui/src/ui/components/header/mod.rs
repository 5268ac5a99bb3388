//! Header strip: connection badge, counters and the server being watched.

mod header_component;

pub use header_component::HeaderComponent;
