//! Request sessions: the state machine, its render-ready view, and the
//! registry the HTTP binding keeps them in.

pub mod controller;
pub mod registry;
pub mod view;

pub use controller::{ProviderHandle, RequestSession};
pub use registry::SessionRegistry;
pub use view::SessionView;
