//! Stub generation pipeline.
//!
//! Documentation text flows through [`docstring`] (overload blocks) and
//! [`signature`] (hint recovery and cleanup) into the descriptors of
//! [`model`]. [`classify`] decides what each attribute is, [`emit`] renders
//! descriptors, and [`walker`] drives all of it over a module tree.

pub mod classify;
pub mod config;
pub mod docstring;
pub mod emit;
pub mod model;
pub mod signature;
pub mod walker;

pub use classify::{MemberKind, Scope, classify};
pub use config::{Rewrite, StubgenConfig};
pub use model::{
    Callable, ClassDescriptor, Declaration, EnumeratorDescriptor, FunctionDescriptor, ModuleStub,
    OverloadDescriptor, ParameterDescriptor, PropertyDescriptor, ScriptedFunctionDescriptor,
    Signature,
};
pub use signature::{HeuristicSignatureParser, SignatureParser, clean_signature_line};
pub use walker::{ExportedClasses, ModuleWalk, StubGenerator, VisitedModules};
