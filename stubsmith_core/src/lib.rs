// Stubsmith - interface stub generation for compiled extension modules

pub mod config;
pub mod error;
pub mod introspect;
pub mod log;
pub mod stubgen;
pub mod tooling;

// Used by the `stubsmith_log!` macro
#[doc(hidden)]
pub use chrono as __chrono;

// Re-export commonly used items for convenience
pub use config::{IntrospectionSource, StubsmithConfig};
pub use error::{Result, StubsmithError};
pub use introspect::dump::ObjectGraph;
pub use introspect::{ObjectId, RuntimeObject, Scalar};
pub use stubgen::{ModuleStub, StubGenerator, StubgenConfig};
