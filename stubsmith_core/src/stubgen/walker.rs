//! Module walker: classify the members of one module, render them, and
//! collect the submodules that need their own stub unit.

use super::classify::{MemberKind, Scope, classify};
use super::config::StubgenConfig;
use super::emit::render_declaration;
use super::model::{
    Callable, ClassDescriptor, Declaration, EnumeratorDescriptor, FunctionDescriptor,
    ModuleStub, PropertyDescriptor, ScriptedFunctionDescriptor,
};
use super::signature::{HeuristicSignatureParser, SignatureParser};
use crate::introspect::{ObjectId, RuntimeObject};
use crate::stubsmith_log;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, trace};

/// Identities of modules already walked or queued.
pub type VisitedModules = HashSet<ObjectId>;

/// Identities of the classes a module declares at its top level.
pub type ExportedClasses = HashSet<ObjectId>;

/// Result of walking one module.
#[derive(Debug, Clone)]
pub struct ModuleWalk<O> {
    /// Finished stub text, rewrites applied
    pub text: String,
    /// Emitted declarations in listing order
    pub declarations: Vec<Declaration>,
    /// Submodules referenced by this module, by attribute name
    pub submodules: Vec<(String, O)>,
}

/// Builds stub units from runtime objects.
#[derive(Debug, Clone)]
pub struct StubGenerator<P = HeuristicSignatureParser> {
    config: StubgenConfig,
    parser: P,
}

impl StubGenerator {
    pub fn new(config: StubgenConfig) -> Self {
        Self::with_parser(config, HeuristicSignatureParser)
    }
}

impl<P: SignatureParser> StubGenerator<P> {
    pub fn with_parser(config: StubgenConfig, parser: P) -> Self {
        Self { config, parser }
    }

    pub fn config(&self) -> &StubgenConfig {
        &self.config
    }

    /// Generate the stub of `root` and of every submodule reachable from it.
    ///
    /// Modules are walked breadth-first and each one at most once. The root
    /// unit is named after the root module, the others by their dotted
    /// attribute path below the root.
    pub fn generate<O: RuntimeObject>(&self, root: &O) -> Vec<ModuleStub> {
        let mut visited = VisitedModules::new();
        visited.insert(root.identity());

        let mut stubs = Vec::new();
        let mut queue: VecDeque<(Option<String>, O)> = VecDeque::new();
        queue.push_back((None, root.clone()));

        while let Some((path, module)) = queue.pop_front() {
            let walk = self.walk_module(&module, root.identity(), &mut visited);

            for (name, submodule) in walk.submodules {
                let child = match &path {
                    Some(parent) => format!("{}.{}", parent, name),
                    None => name,
                };
                queue.push_back((Some(child), submodule));
            }

            let name = path.unwrap_or_else(|| self.config.root_module.clone());
            info!(
                module = %name,
                declarations = walk.declarations.len(),
                bytes = walk.text.len(),
                "Generated module stub"
            );
            stubs.push(ModuleStub {
                name,
                text: walk.text,
            });
        }

        stubsmith_log!(
            format!(
                "generated {} stubs: {:?}",
                stubs.len(),
                stubs.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
            ),
            "generate.log",
            true
        );
        stubs
    }

    /// Walk one module without descending into its submodules.
    ///
    /// Every submodule gets a reference line unless it is excluded by name or
    /// refers back to `module` or `root`. Only those not yet in `visited` are
    /// inserted there and returned for walking.
    pub fn walk_module<O: RuntimeObject>(
        &self,
        module: &O,
        root: ObjectId,
        visited: &mut VisitedModules,
    ) -> ModuleWalk<O> {
        let mut text = self.config.preamble();
        let mut declarations = Vec::new();
        let mut submodules = Vec::new();

        let members: Vec<(String, O, MemberKind)> = module
            .member_names()
            .into_iter()
            .filter_map(|name| match module.member(&name) {
                Some(member) => {
                    let kind = classify(&name, &member, Scope::Module);
                    Some((name, member, kind))
                }
                None => {
                    trace!(member = %name, "Attribute lookup failed");
                    None
                }
            })
            .collect();

        let exported: ExportedClasses = members
            .iter()
            .filter(|(_, _, kind)| *kind == MemberKind::Class)
            .map(|(_, member, _)| member.identity())
            .collect();

        for (name, member, kind) in members {
            let declaration = match kind {
                MemberKind::Class => {
                    let mut enclosing = Vec::new();
                    Some(Declaration::Class(self.describe_class(
                        &name,
                        &member,
                        &exported,
                        &mut enclosing,
                    )))
                }
                MemberKind::CompiledFunction => self
                    .describe_function(&name, &member)
                    .map(Declaration::Function),
                MemberKind::ScriptedFunction => Some(Declaration::ScriptedFunction(
                    self.describe_scripted(&name, &member),
                )),
                MemberKind::Property => Some(Declaration::Property(PropertyDescriptor {
                    name: name.clone(),
                    doc: member.doc(),
                })),
                MemberKind::Enumerator => Some(Declaration::Enumerator(
                    EnumeratorDescriptor::new(&name, member.as_integer(), member.doc().as_deref()),
                )),
                MemberKind::Data => Some(Declaration::Data { name: name.clone() }),
                MemberKind::Submodule => {
                    let identity = member.identity();
                    if self.config.excluded_modules.contains(&name) {
                        debug!(module = %name, "Skipping excluded submodule");
                        None
                    } else if identity == module.identity() || identity == root {
                        debug!(module = %name, identity = %identity, "Skipping back-reference");
                        None
                    } else {
                        if visited.insert(identity) {
                            submodules.push((name.clone(), member.clone()));
                        } else {
                            debug!(module = %name, identity = %identity, "Submodule already walked");
                        }
                        Some(Declaration::Submodule { name: name.clone() })
                    }
                }
                MemberKind::Ignored => None,
            };

            match declaration {
                Some(declaration) => {
                    debug!(member = %name, kind = ?kind, "Emitting declaration");
                    text.push_str(&render_declaration(&declaration));
                    declarations.push(declaration);
                }
                None => trace!(member = %name, kind = ?kind, "Nothing emitted"),
            }
        }

        ModuleWalk {
            text: self.config.apply_rewrites(&text),
            declarations,
            submodules,
        }
    }

    /// Describe a class and, recursively, the classes nested in it.
    ///
    /// `enclosing` holds the identities of the classes being described, so
    /// a class that refers back to one of them is not expanded again. Class
    /// attributes that alias one of the `exported` module-level classes are
    /// declared there and not repeated.
    pub fn describe_class<O: RuntimeObject>(
        &self,
        name: &str,
        class: &O,
        exported: &ExportedClasses,
        enclosing: &mut Vec<ObjectId>,
    ) -> ClassDescriptor {
        enclosing.push(class.identity());

        let mut descriptor = ClassDescriptor {
            name: name.to_string(),
            doc: class.doc(),
            init: class
                .member("__init__")
                .and_then(|init| self.describe_function("__init__", &init)),
            call: class
                .member("__call__")
                .and_then(|call| self.describe_function("__call__", &call)),
            ..Default::default()
        };

        for member_name in class.member_names() {
            let Some(member) = class.member(&member_name) else {
                trace!(class = %name, member = %member_name, "Attribute lookup failed");
                continue;
            };

            match classify(&member_name, &member, Scope::Class) {
                MemberKind::Property => descriptor.properties.push(PropertyDescriptor {
                    name: member_name,
                    doc: member.doc(),
                }),
                MemberKind::Enumerator => descriptor.enumerators.push(EnumeratorDescriptor::new(
                    member_name,
                    member.as_integer(),
                    member.doc().as_deref(),
                )),
                MemberKind::CompiledFunction => {
                    if let Some(function) = self.describe_function(&member_name, &member) {
                        descriptor.methods.push(Callable::Compiled(function));
                    }
                }
                MemberKind::ScriptedFunction => descriptor
                    .methods
                    .push(Callable::Scripted(self.describe_scripted(&member_name, &member))),
                MemberKind::Class => {
                    let identity = member.identity();
                    if enclosing.contains(&identity) {
                        trace!(class = %name, member = %member_name, "Skipping enclosing class reference");
                    } else if exported.contains(&identity) {
                        trace!(class = %name, member = %member_name, "Skipping alias of a module-level class");
                    } else {
                        let nested = self.describe_class(&member_name, &member, exported, enclosing);
                        descriptor.classes.push(nested);
                    }
                }
                kind @ (MemberKind::Data | MemberKind::Submodule | MemberKind::Ignored) => {
                    trace!(class = %name, member = %member_name, kind = ?kind, "Class member not emitted");
                }
            }
        }

        enclosing.pop();
        descriptor
    }

    fn describe_function<O: RuntimeObject>(&self, name: &str, function: &O) -> Option<FunctionDescriptor> {
        let descriptor = FunctionDescriptor::from_docstring(
            name,
            function.doc().as_deref(),
            &self.parser,
            self.config.variant(),
        );
        if descriptor.is_none() {
            trace!(function = %name, "No overloads recovered");
        }
        descriptor
    }

    fn describe_scripted<O: RuntimeObject>(&self, name: &str, function: &O) -> ScriptedFunctionDescriptor {
        ScriptedFunctionDescriptor::new(
            name,
            function.signature().as_deref(),
            function.doc(),
            &self.config.root_module,
            self.config.root_alias.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::dump::ObjectGraph;
    use pretty_assertions::assert_eq;

    const DEMO_DUMP: &str = include_str!("../../tests/fixtures/demo_dump.json");

    fn config() -> StubgenConfig {
        let mut config = StubgenConfig::new("demo")
            .with_alias("dm")
            .with_variant("llvm")
            .with_excluded_module("dr")
            .with_rewrite("demo.Float", "demo.Float32");
        config.typing_imports = vec!["overload".to_string()];
        config
    }

    const PREAMBLE: &str = "from typing import overload\nimport demo\nimport demo as dm\n\n";

    #[test]
    fn test_walk_root_module() {
        let graph = ObjectGraph::from_json(DEMO_DUMP).unwrap();
        let generator = StubGenerator::new(config());
        let mut visited = VisitedModules::from([graph.root().identity()]);

        let walk = generator.walk_module(&graph.root(), graph.root().identity(), &mut visited);

        let expected = [
            PREAMBLE,
            "class Bitmap:\n",
            "    \"\"\"\n    A bitmap.\n    \"\"\"\n\n",
            "    def __init__(self, width: int) -> None: ...\n",
            "    width = ...\n    \"Width in pixels\"\n\n",
            "\n",
            "def load(path: str) -> demo.Scene: ...\n",
            "\nfrom . import math as math\n\n",
            "def scale(x: int) -> int: ...\n",
            "@overload\ndef scale(x: demo.Float32) -> demo.Float32: ...\n",
            "version = ...\n",
        ]
        .concat();
        assert_eq!(walk.text, expected);

        let submodules: Vec<&str> = walk.submodules.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(submodules, vec!["math"]);
        assert_eq!(walk.declarations.len(), 5);
    }

    #[test]
    fn test_generate_walks_tree_once() {
        let graph = ObjectGraph::from_json(DEMO_DUMP).unwrap();
        let stubs = StubGenerator::new(config()).generate(&graph.root());

        let names: Vec<&str> = stubs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["demo", "math", "math.linalg"]);

        assert_eq!(
            stubs[1].text,
            [
                PREAMBLE,
                "\nfrom . import linalg as linalg\n\n",
                "def sqrt(x: float) -> float:\n",
                "    \"\"\"\n    Square root.\n    \"\"\"\n    ...\n\n",
            ]
            .concat()
        );
        assert_eq!(stubs[2].text, PREAMBLE);
    }

    #[test]
    fn test_generate_is_idempotent() {
        let graph = ObjectGraph::from_json(DEMO_DUMP).unwrap();
        let generator = StubGenerator::new(config());
        assert_eq!(generator.generate(&graph.root()), generator.generate(&graph.root()));
    }

    #[test]
    fn test_already_visited_submodule_is_referenced_but_not_walked() {
        let graph = ObjectGraph::from_json(DEMO_DUMP).unwrap();
        let generator = StubGenerator::new(config());
        let math = graph.handle(4).unwrap();
        let mut visited = VisitedModules::from([graph.root().identity(), math.identity()]);

        let walk = generator.walk_module(&graph.root(), graph.root().identity(), &mut visited);
        assert!(walk.submodules.is_empty());
        assert!(walk.text.contains("\nfrom . import math as math\n\n"));
    }

    #[test]
    fn test_shared_submodule_is_referenced_by_every_parent() {
        let graph = ObjectGraph::from_json(
            r#"{ "root": 0, "objects": [
                { "type": "module", "name": "demo", "members": { "a": 1, "b": 2 } },
                { "type": "module", "name": "demo.a", "members": { "shared": 3, "top": 0 } },
                { "type": "module", "name": "demo.b", "members": { "shared": 3, "me": 2 } },
                { "type": "module", "name": "demo.shared" }
            ] }"#,
        )
        .unwrap();
        let mut config = StubgenConfig::new("demo");
        config.typing_imports.clear();
        let stubs = StubGenerator::new(config).generate(&graph.root());

        let names: Vec<&str> = stubs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["demo", "a", "b", "a.shared"]);

        let reference = "import demo\n\n\nfrom . import shared as shared\n\n";
        assert_eq!(stubs[1].text, reference);
        assert_eq!(stubs[2].text, reference);
    }

    #[test]
    fn test_numerics_prefix_follows_active_variant() {
        let graph = ObjectGraph::from_json(
            r#"{ "root": 0, "objects": [
                { "type": "module", "name": "mitsuba", "members": { "f": 1, "g": 2 } },
                { "type": "builtin_function_or_method", "name": "f",
                  "doc": "f(x: drjit.llvm.ad.Float) -> drjit.llvm.ad.Float\n" },
                { "type": "builtin_function_or_method", "name": "g",
                  "doc": "g(x: drjit.cuda.ad.Float) -> drjit.cuda.ad.Float\n" }
            ] }"#,
        )
        .unwrap();
        let mut config = StubgenConfig::new("mitsuba")
            .with_numerics_module("drjit")
            .with_variant("llvm_ad_rgb");
        config.typing_imports.clear();

        let llvm = StubGenerator::new(config.clone()).generate(&graph.root());
        assert_eq!(
            llvm[0].text,
            "import mitsuba\n\n\
             def f(x: mitsuba.Float) -> mitsuba.Float: ...\n\
             def g(x: drjit.cuda.ad.Float) -> drjit.cuda.ad.Float: ...\n"
        );

        let cuda = StubGenerator::new(config.with_variant("cuda_ad_rgb")).generate(&graph.root());
        assert_eq!(
            cuda[0].text,
            "import mitsuba\n\n\
             def f(x: drjit.llvm.ad.Float) -> drjit.llvm.ad.Float: ...\n\
             def g(x: mitsuba.Float) -> mitsuba.Float: ...\n"
        );
    }

    #[test]
    fn test_excluded_module_is_never_walked() {
        let graph = ObjectGraph::from_json(DEMO_DUMP).unwrap();
        let mut config = config();
        config.excluded_modules = vec!["dr".to_string(), "math".to_string()];
        let stubs = StubGenerator::new(config).generate(&graph.root());
        assert_eq!(stubs.len(), 1);
    }

    #[test]
    fn test_self_referencing_class_is_not_expanded_twice() {
        let graph = ObjectGraph::from_json(
            r#"{ "root": 0, "objects": [
                { "type": "module", "members": { "Node": 1 } },
                { "type": "type", "is_class": true, "name": "Node",
                  "members": { "Kind": 2, "Self": 1 } },
                { "type": "type", "is_class": true, "name": "Kind",
                  "members": { "Outer": 1 } }
            ] }"#,
        )
        .unwrap();
        let generator = StubGenerator::new(StubgenConfig::new("demo"));
        let node = graph.root().member("Node").unwrap();
        let exported = ExportedClasses::from([node.identity()]);
        let class = generator.describe_class("Node", &node, &exported, &mut Vec::new());

        assert_eq!(class.classes.len(), 1);
        assert_eq!(class.classes[0].name, "Kind");
        assert!(class.classes[0].classes.is_empty());
    }

    #[test]
    fn test_alias_of_module_class_is_not_nested() {
        let graph = ObjectGraph::from_json(
            r#"{ "root": 0, "objects": [
                { "type": "module", "name": "demo", "members": { "Scene": 1, "Shape": 2 } },
                { "type": "type", "is_class": true, "name": "Scene",
                  "members": { "Flags": 3, "ShapeType": 2 } },
                { "type": "type", "is_class": true, "name": "Shape" },
                { "type": "type", "is_class": true, "name": "Flags" }
            ] }"#,
        )
        .unwrap();
        let generator = StubGenerator::new(StubgenConfig::new("demo"));
        let mut visited = VisitedModules::from([graph.root().identity()]);
        let walk = generator.walk_module(&graph.root(), graph.root().identity(), &mut visited);

        let Declaration::Class(scene) = &walk.declarations[0] else {
            panic!("expected Scene first, got {:?}", walk.declarations[0]);
        };
        let nested: Vec<&str> = scene.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(nested, vec!["Flags"]);
        assert_eq!(walk.text.matches("class Shape").count(), 1);
    }
}
