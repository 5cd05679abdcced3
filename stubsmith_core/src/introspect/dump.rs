//! JSON introspection dumps.
//!
//! A dump is a flat arena of objects plus the index of the root module:
//!
//! ```json
//! {
//!   "root": 0,
//!   "objects": [
//!     { "type": "module", "name": "mitsuba", "members": { "Bitmap": 1, "mi": 0 } },
//!     { "type": "type", "is_class": true, "name": "Bitmap", "doc": "...", "members": {} }
//!   ]
//! }
//! ```
//!
//! Members refer to other objects by index, so aliases and cycles (a module
//! that exposes itself under a short name) are represented faithfully and the
//! object identity is simply the index.

use super::{ObjectId, RuntimeObject, Scalar};
use crate::error::{Result, StubsmithError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fs;
use std::path::Path;
use tracing::{debug, info, trace};

/// One object of a dump.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DumpedObject {
    /// Runtime type name (`module`, `property`, `builtin_function_or_method`, ...)
    #[serde(rename = "type")]
    pub type_name: String,
    /// Base type names of the runtime type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    /// Whether the object is itself a class
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_class: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// `str(obj)`; defaults to the scalar value or the name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repr: Option<String>,
    /// Parameter list of scripted callables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Scalar payload, also used as the integer value of enumerators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Scalar>,
    /// Member name to object index
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub members: BTreeMap<String, usize>,
}

/// An in-memory object graph loaded from (or captured into) the dump format.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ObjectGraph {
    pub root: usize,
    pub objects: Vec<DumpedObject>,
}

impl ObjectGraph {
    /// Load and validate a dump from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading introspection dump from {:?}", path);
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse and validate a dump from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let graph: ObjectGraph = serde_json::from_str(json)?;
        graph.validate()?;
        debug!(object_count = graph.objects.len(), "Introspection dump loaded");
        Ok(graph)
    }

    /// Serialize the graph back into the dump format.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the root and every member reference point into the arena.
    pub fn validate(&self) -> Result<()> {
        if self.root >= self.objects.len() {
            return Err(StubsmithError::invalid_dump(format!(
                "root index {} is out of range ({} objects)",
                self.root,
                self.objects.len()
            )));
        }

        for (index, object) in self.objects.iter().enumerate() {
            for (name, target) in &object.members {
                if *target >= self.objects.len() {
                    return Err(StubsmithError::invalid_dump(format!(
                        "member '{}' of object {} points at missing object {}",
                        name, index, target
                    )));
                }
            }
        }

        Ok(())
    }

    /// Handle to the root module.
    pub fn root(&self) -> DumpHandle<'_> {
        DumpHandle {
            graph: self,
            index: self.root,
        }
    }

    /// Handle to an arbitrary object of the arena.
    pub fn handle(&self, index: usize) -> Option<DumpHandle<'_>> {
        (index < self.objects.len()).then_some(DumpHandle { graph: self, index })
    }

    /// Snapshot a live object tree into a dump.
    ///
    /// Members of modules and classes are expanded breadth-first; every other
    /// object is recorded as a leaf. Member names starting with `_` are not
    /// recorded, except the `__init__`/`__call__` probes the class renderer
    /// needs. Modules reached through a name in `excluded_modules` are kept as
    /// leaves so large foreign libraries are not pulled into the dump.
    pub fn capture<O: RuntimeObject>(root: &O, excluded_modules: &[String]) -> ObjectGraph {
        let mut objects: Vec<DumpedObject> = Vec::new();
        let mut indices: HashMap<ObjectId, usize> = HashMap::new();
        // Every handle stays alive until the capture ends so a runtime cannot
        // recycle an identity for a freshly fetched member.
        let mut handles: Vec<O> = Vec::new();
        let mut queue: VecDeque<(usize, bool)> = VecDeque::new();

        indices.insert(root.identity(), 0);
        objects.push(DumpedObject::default());
        handles.push(root.clone());
        queue.push_back((0, true));

        while let Some((index, expand)) = queue.pop_front() {
            let object = handles[index].clone();
            let mut record = describe(&object);

            if expand && (record.is_class || is_module_record(&record)) {
                for name in object.member_names() {
                    if name.starts_with('_') && name != "__init__" && name != "__call__" {
                        continue;
                    }
                    let Some(member) = object.member(&name) else {
                        trace!(member = %name, "Member lookup failed during capture");
                        continue;
                    };

                    let target = match indices.get(&member.identity()) {
                        Some(existing) => *existing,
                        None => {
                            let target = objects.len();
                            indices.insert(member.identity(), target);
                            objects.push(DumpedObject::default());
                            handles.push(member);
                            queue.push_back((target, !excluded_modules.contains(&name)));
                            target
                        }
                    };
                    record.members.insert(name, target);
                }
            }

            objects[index] = record;
        }

        info!(object_count = objects.len(), "Captured object graph");
        ObjectGraph { root: 0, objects }
    }
}

fn is_module_record(record: &DumpedObject) -> bool {
    record.type_name == "module" || record.bases.first().is_some_and(|b| b == "module")
}

fn describe<O: RuntimeObject>(object: &O) -> DumpedObject {
    let scalar = object.scalar();
    let value = scalar.or_else(|| {
        // Enumerator values need their integer form; plain objects usually
        // refuse the conversion, which is fine.
        if object.is_class() {
            None
        } else {
            object.as_integer().map(Scalar::Int)
        }
    });

    DumpedObject {
        type_name: object.type_name(),
        bases: object.base_type_names(),
        is_class: object.is_class(),
        name: object.qualified_name(),
        doc: object.doc(),
        repr: Some(object.repr()),
        signature: object.signature(),
        value,
        members: BTreeMap::new(),
    }
}

/// Borrowed handle into an [`ObjectGraph`].
#[derive(Debug, Clone, Copy)]
pub struct DumpHandle<'g> {
    graph: &'g ObjectGraph,
    index: usize,
}

impl<'g> DumpHandle<'g> {
    pub fn index(&self) -> usize {
        self.index
    }

    fn object(&self) -> &'g DumpedObject {
        &self.graph.objects[self.index]
    }
}

impl RuntimeObject for DumpHandle<'_> {
    fn identity(&self) -> ObjectId {
        ObjectId(self.index as u64)
    }

    fn type_name(&self) -> String {
        self.object().type_name.clone()
    }

    fn base_type_names(&self) -> Vec<String> {
        self.object().bases.clone()
    }

    fn is_class(&self) -> bool {
        self.object().is_class
    }

    fn qualified_name(&self) -> Option<String> {
        self.object().name.clone()
    }

    fn doc(&self) -> Option<String> {
        self.object().doc.clone()
    }

    fn repr(&self) -> String {
        let object = self.object();
        object
            .repr
            .clone()
            .or_else(|| object.value.as_ref().map(|v| v.to_string()))
            .or_else(|| object.name.clone())
            .unwrap_or_default()
    }

    fn member_names(&self) -> Vec<String> {
        self.object().members.keys().cloned().collect()
    }

    fn member(&self, name: &str) -> Option<Self> {
        let index = *self.object().members.get(name)?;
        self.graph.handle(index)
    }

    fn signature(&self) -> Option<String> {
        self.object().signature.clone()
    }

    fn scalar(&self) -> Option<Scalar> {
        let object = self.object();
        let value = object.value.as_ref()?;
        (object.type_name == value.type_name()).then(|| value.clone())
    }

    fn as_integer(&self) -> Option<i64> {
        match self.object().value.as_ref()? {
            Scalar::Int(v) => Some(*v),
            Scalar::Bool(v) => Some(i64::from(*v)),
            Scalar::Float(_) | Scalar::Str(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "root": 0,
            "objects": [
                { "type": "module", "name": "demo", "members": { "Color": 1, "me": 0, "version": 3 } },
                { "type": "type", "is_class": true, "name": "Color", "members": { "Red": 2 } },
                { "type": "Color", "repr": "Color.Red", "value": 0 },
                { "type": "str", "value": "1.0.0" }
            ]
        }"#
    }

    #[test]
    fn test_from_json_resolves_members() {
        let graph = ObjectGraph::from_json(sample_json()).unwrap();
        let root = graph.root();
        assert_eq!(root.member_names(), vec!["Color", "me", "version"]);

        let color = root.member("Color").unwrap();
        assert!(color.is_class());
        assert_eq!(color.qualified_name().as_deref(), Some("Color"));

        let red = color.member("Red").unwrap();
        assert_eq!(red.repr(), "Color.Red");
        assert_eq!(red.as_integer(), Some(0));
        assert_eq!(red.scalar(), None);
    }

    #[test]
    fn test_alias_member_shares_identity() {
        let graph = ObjectGraph::from_json(sample_json()).unwrap();
        let root = graph.root();
        assert_eq!(root.member("me").unwrap().identity(), root.identity());
    }

    #[test]
    fn test_scalar_requires_exact_type() {
        let graph = ObjectGraph::from_json(sample_json()).unwrap();
        let version = graph.root().member("version").unwrap();
        assert_eq!(version.scalar(), Some(Scalar::Str("1.0.0".into())));
        assert_eq!(version.repr(), "1.0.0");
    }

    #[test]
    fn test_missing_member_lookup_is_none() {
        let graph = ObjectGraph::from_json(sample_json()).unwrap();
        assert!(graph.root().member("nope").is_none());
    }

    #[test]
    fn test_invalid_member_index_is_rejected() {
        let json = r#"{ "root": 0, "objects": [ { "type": "module", "members": { "x": 7 } } ] }"#;
        let err = ObjectGraph::from_json(json).unwrap_err();
        assert!(err.to_string().contains("missing object 7"));
    }

    #[test]
    fn test_invalid_root_is_rejected() {
        let json = r#"{ "root": 2, "objects": [] }"#;
        assert!(matches!(
            ObjectGraph::from_json(json),
            Err(StubsmithError::InvalidDump(_))
        ));
    }

    #[test]
    fn test_capture_of_a_dump_is_equivalent() {
        let graph = ObjectGraph::from_json(sample_json()).unwrap();
        let captured = ObjectGraph::capture(&graph.root(), &[]);

        let root = captured.root();
        assert_eq!(root.member_names(), vec!["Color", "me", "version"]);
        assert_eq!(root.member("me").unwrap().identity(), root.identity());
        let red = root.member("Color").unwrap().member("Red").unwrap();
        assert_eq!(red.repr(), "Color.Red");
        assert_eq!(red.as_integer(), Some(0));
    }

    #[test]
    fn test_capture_keeps_excluded_modules_as_leaves() {
        let json = r#"{
            "root": 0,
            "objects": [
                { "type": "module", "name": "demo", "members": { "dr": 1 } },
                { "type": "module", "name": "drjit", "members": { "Float": 2 } },
                { "type": "type", "is_class": true, "name": "Float" }
            ]
        }"#;
        let graph = ObjectGraph::from_json(json).unwrap();
        let captured = ObjectGraph::capture(&graph.root(), &["dr".to_string()]);
        assert_eq!(captured.objects.len(), 2);
        assert!(captured.root().member("dr").unwrap().member_names().is_empty());
    }

    #[test]
    fn test_round_trip_through_json_text() {
        let graph = ObjectGraph::from_json(sample_json()).unwrap();
        let reparsed = ObjectGraph::from_json(&graph.to_json().unwrap()).unwrap();
        assert_eq!(graph, reparsed);
    }
}
