pub mod registry;

pub use registry::{BrowserKind, SessionRegistry, WorkerId};
