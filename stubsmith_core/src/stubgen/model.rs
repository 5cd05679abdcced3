//! Descriptors built from the probed runtime before rendering.
//!
//! They are plain owned values rebuilt on every run; nothing here refers back
//! to a live object.

use super::docstring::split_overloads;
use super::signature::SignatureParser;
use serde::Serialize;
use tracing::trace;

/// One recovered `name: type` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDescriptor {
    pub name: String,
    /// Absent when the hint was missing or could not be expressed
    pub type_hint: Option<String>,
}

impl ParameterDescriptor {
    pub fn annotated(name: impl Into<String>, type_hint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: Some(type_hint.into()),
        }
    }

    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
        }
    }
}

/// A cleaned call signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: String,
    /// Parameters written as `name: type` in the docstring, in order. Bare
    /// parameters (`self`, `*args`) are not recorded here; they survive only
    /// in [`Signature::line`].
    pub parameters: Vec<ParameterDescriptor>,
    pub return_type: Option<String>,
    /// Cleaned text, rendered verbatim after `def `
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverloadDescriptor {
    pub signature: Signature,
    /// Documentation lines following the signature line; the first one is
    /// conventionally blank
    pub body: Vec<String>,
}

impl OverloadDescriptor {
    pub fn has_doc(&self) -> bool {
        self.body.len() > 1
    }
}

/// A compiled function with at least one recovered overload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDescriptor {
    pub name: String,
    overloads: Vec<OverloadDescriptor>,
}

impl FunctionDescriptor {
    /// Build a descriptor from overloads; `None` when the list is empty.
    pub fn new(name: impl Into<String>, overloads: Vec<OverloadDescriptor>) -> Option<Self> {
        if overloads.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            overloads,
        })
    }

    /// Recover the overloads encoded in a documentation text.
    ///
    /// Blocks whose signature line cannot be parsed are skipped.
    pub fn from_docstring<P: SignatureParser + ?Sized>(
        name: impl Into<String>,
        doc: Option<&str>,
        parser: &P,
        variant: Option<&str>,
    ) -> Option<Self> {
        let name = name.into();
        let overloads = split_overloads(doc)
            .into_iter()
            .filter_map(|block| match parser.parse(&block.signature, variant) {
                Some(signature) => Some(OverloadDescriptor {
                    signature,
                    body: block.body,
                }),
                None => {
                    trace!(function = %name, line = %block.signature, "Skipping unparsable overload");
                    None
                }
            })
            .collect();

        Self::new(name, overloads)
    }

    pub fn overloads(&self) -> &[OverloadDescriptor] {
        &self.overloads
    }
}

/// A function implemented in the scripting language itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptedFunctionDescriptor {
    pub name: String,
    /// Parameter list text, e.g. `(x, y=1) -> mitsuba.Float`
    pub signature: String,
    pub doc: Option<String>,
}

impl ScriptedFunctionDescriptor {
    /// Normalize the inspectable signature: quotes are removed and the root
    /// alias prefix is spelled with the root module name. A missing signature
    /// falls back to a catch-all parameter list.
    pub fn new(
        name: impl Into<String>,
        signature: Option<&str>,
        doc: Option<String>,
        root_module: &str,
        root_alias: Option<&str>,
    ) -> Self {
        let mut signature = signature
            .map(|s| s.replace('\'', ""))
            .unwrap_or_else(|| "(*args, **kwargs)".to_string());
        if let Some(alias) = root_alias.filter(|a| !a.is_empty() && *a != root_module) {
            signature = replace_prefix(&signature, alias, root_module);
        }

        Self {
            name: name.into(),
            signature,
            doc: doc.filter(|d| !d.is_empty()),
        }
    }
}

/// Replace `{from}.` with `{to}.` where `from` is not the tail of a longer
/// identifier or dotted path.
fn replace_prefix(text: &str, from: &str, to: &str) -> String {
    let needle = format!("{}.", from);
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(position) = rest.find(&needle) {
        let boundary = rest[..position]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_' || c == '.'));
        result.push_str(&rest[..position]);
        if boundary {
            result.push_str(to);
            result.push('.');
        } else {
            result.push_str(&needle);
        }
        rest = &rest[position + needle.len()..];
    }
    result.push_str(rest);

    result
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumeratorDescriptor {
    pub name: String,
    pub value: Option<i64>,
    /// Lines of the enum documentation describing this enumerator
    pub doc: Vec<String>,
}

impl EnumeratorDescriptor {
    /// Keep the lines of `enum_doc` that start with two spaces and the
    /// enumerator name.
    pub fn new(name: impl Into<String>, value: Option<i64>, enum_doc: Option<&str>) -> Self {
        let name = name.into();
        let prefix = format!("  {}", name);
        let doc = enum_doc
            .unwrap_or_default()
            .lines()
            .filter(|line| line.starts_with(&prefix))
            .map(str::to_string)
            .collect();

        Self { name, value, doc }
    }
}

/// A function member of a class, compiled or scripted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Callable {
    Compiled(FunctionDescriptor),
    Scripted(ScriptedFunctionDescriptor),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::Compiled(f) => &f.name,
            Callable::Scripted(f) => &f.name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassDescriptor {
    pub name: String,
    pub doc: Option<String>,
    pub init: Option<FunctionDescriptor>,
    pub call: Option<FunctionDescriptor>,
    pub properties: Vec<PropertyDescriptor>,
    pub enumerators: Vec<EnumeratorDescriptor>,
    pub methods: Vec<Callable>,
    pub classes: Vec<ClassDescriptor>,
}

/// A module member after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Declaration {
    Class(ClassDescriptor),
    Function(FunctionDescriptor),
    ScriptedFunction(ScriptedFunctionDescriptor),
    Property(PropertyDescriptor),
    Enumerator(EnumeratorDescriptor),
    Data { name: String },
    Submodule { name: String },
}

/// The generated text of one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleStub {
    /// Dotted name relative to the root; the root itself uses the root module name
    pub name: String,
    pub text: String,
}
