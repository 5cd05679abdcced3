use crate::introspect::RuntimeObject;
use serde::Serialize;

/// Runtime type names of functions written in the scripting language.
pub const SCRIPTED_FUNCTION_TYPES: &[&str] = &["function", "method"];

/// Runtime type names of compiled functions and methods.
pub const COMPILED_FUNCTION_TYPES: &[&str] = &[
    "builtin_function_or_method",
    "instancemethod",
    "nb_func",
    "nb_method",
];

pub const PROPERTY_TYPE: &str = "property";
pub const MODULE_TYPE: &str = "module";

/// Declaration kind of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MemberKind {
    Class,
    CompiledFunction,
    ScriptedFunction,
    Property,
    Enumerator,
    Data,
    Submodule,
    Ignored,
}

impl MemberKind {
    pub fn is_visible(self) -> bool {
        self != MemberKind::Ignored
    }
}

/// Where an attribute was found; decides which names count as private.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Module,
    Class,
}

pub fn is_private(name: &str, scope: Scope) -> bool {
    match scope {
        Scope::Module => name.starts_with('_'),
        Scope::Class => name.starts_with('_') || name.ends_with('_'),
    }
}

/// Classify an attribute. The first matching rule wins.
pub fn classify<O: RuntimeObject>(name: &str, object: &O, scope: Scope) -> MemberKind {
    if is_private(name, scope) {
        return MemberKind::Ignored;
    }

    if object.is_class() {
        return MemberKind::Class;
    }

    let type_name = object.type_name();
    if SCRIPTED_FUNCTION_TYPES.contains(&type_name.as_str()) {
        MemberKind::ScriptedFunction
    } else if COMPILED_FUNCTION_TYPES.contains(&type_name.as_str()) {
        MemberKind::CompiledFunction
    } else if type_name == PROPERTY_TYPE {
        MemberKind::Property
    } else if object.scalar().is_some() {
        MemberKind::Data
    } else if is_module(object) {
        MemberKind::Submodule
    } else if object.repr().ends_with(name) {
        MemberKind::Enumerator
    } else {
        MemberKind::Ignored
    }
}

/// Module objects, including module subclasses.
pub fn is_module<O: RuntimeObject>(object: &O) -> bool {
    object.type_name() == MODULE_TYPE
        || object
            .base_type_names()
            .first()
            .is_some_and(|base| base == MODULE_TYPE)
}
