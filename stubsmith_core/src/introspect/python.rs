//! Live CPython backend.
//!
//! Every probe is a plain attribute read or a call into `builtins`/`inspect`,
//! so walking a module never changes it. Probes that raise are treated as
//! absent information.

use super::{ObjectId, RuntimeObject, Scalar};
use crate::error::{Result, StubsmithError};
use pyo3::exceptions::PyModuleNotFoundError;
use pyo3::prelude::*;
use pyo3::types::{PyModule, PyType};
use tracing::{debug, info};

/// Handle to a live Python object.
#[derive(Debug, Clone)]
pub struct PyObjectHandle<'py> {
    object: Bound<'py, PyAny>,
}

impl<'py> PyObjectHandle<'py> {
    pub fn new(object: Bound<'py, PyAny>) -> Self {
        Self { object }
    }

    pub fn as_any(&self) -> &Bound<'py, PyAny> {
        &self.object
    }

    fn py(&self) -> Python<'py> {
        self.object.py()
    }

    fn builtin(&self, name: &str) -> PyResult<Bound<'py, PyAny>> {
        PyModule::import(self.py(), "builtins")?.getattr(name)
    }

    fn string_attr(object: &Bound<'py, PyAny>, name: &str) -> Option<String> {
        object
            .getattr(name)
            .and_then(|value| value.extract::<Option<String>>())
            .ok()
            .flatten()
    }
}

/// Import `name`, optionally selecting a variant first by calling
/// `module.<activate_with>(variant)`.
pub fn load_module<'py>(
    py: Python<'py>,
    name: &str,
    activate_with: Option<&str>,
    variant: Option<&str>,
) -> Result<PyObjectHandle<'py>> {
    info!("Importing Python module {}", name);
    let module = PyModule::import(py, name).map_err(|err| {
        if err.is_instance_of::<PyModuleNotFoundError>(py) {
            StubsmithError::module_not_found(name)
        } else {
            StubsmithError::from(err)
        }
    })?;

    if let (Some(function), Some(variant)) = (activate_with, variant.filter(|v| !v.is_empty())) {
        debug!("Activating variant {} with {}.{}", variant, name, function);
        module.getattr(function)?.call1((variant,))?;
    }

    Ok(PyObjectHandle::new(module.into_any()))
}

/// Acquire the interpreter, load `name` as [`load_module`] does and run `f`
/// against it.
pub fn with_module<T>(
    name: &str,
    activate_with: Option<&str>,
    variant: Option<&str>,
    f: impl FnOnce(&PyObjectHandle<'_>) -> Result<T>,
) -> Result<T> {
    Python::with_gil(|py| {
        let module = load_module(py, name, activate_with, variant)?;
        f(&module)
    })
}

impl RuntimeObject for PyObjectHandle<'_> {
    fn identity(&self) -> ObjectId {
        ObjectId(self.object.as_ptr() as usize as u64)
    }

    fn type_name(&self) -> String {
        Self::string_attr(self.object.get_type().as_any(), "__name__").unwrap_or_default()
    }

    fn base_type_names(&self) -> Vec<String> {
        self.object
            .get_type()
            .getattr("__bases__")
            .and_then(|bases| bases.extract::<Vec<Bound<'_, PyAny>>>())
            .map(|bases| {
                bases
                    .iter()
                    .filter_map(|base| Self::string_attr(base, "__name__"))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn is_class(&self) -> bool {
        self.object.is_instance_of::<PyType>()
    }

    fn qualified_name(&self) -> Option<String> {
        Self::string_attr(&self.object, "__name__")
    }

    fn doc(&self) -> Option<String> {
        Self::string_attr(&self.object, "__doc__")
    }

    fn repr(&self) -> String {
        self.object
            .str()
            .map(|text| text.to_string())
            .unwrap_or_default()
    }

    fn member_names(&self) -> Vec<String> {
        self.object
            .dir()
            .and_then(|names| names.extract::<Vec<String>>())
            .unwrap_or_default()
    }

    fn member(&self, name: &str) -> Option<Self> {
        self.object.getattr(name).ok().map(PyObjectHandle::new)
    }

    fn signature(&self) -> Option<String> {
        PyModule::import(self.py(), "inspect")
            .and_then(|inspect| inspect.getattr("signature"))
            .and_then(|signature| signature.call1((self.object.clone(),)))
            .map(|signature| signature.to_string())
            .ok()
    }

    fn scalar(&self) -> Option<Scalar> {
        match self.type_name().as_str() {
            "bool" => self.object.extract::<bool>().ok().map(Scalar::Bool),
            "int" => self.object.extract::<i64>().ok().map(Scalar::Int),
            "float" => self.object.extract::<f64>().ok().map(Scalar::Float),
            "str" => self.object.extract::<String>().ok().map(Scalar::Str),
            _ => None,
        }
    }

    fn as_integer(&self) -> Option<i64> {
        self.builtin("int")
            .and_then(|int| int.call1((self.object.clone(),)))
            .and_then(|value| value.extract::<i64>())
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stubgen::classify::{MemberKind, Scope, classify};

    #[test]
    fn test_probe_builtin_module() {
        Python::with_gil(|py| {
            let math = load_module(py, "math", None, None).unwrap();
            assert_eq!(math.type_name(), "module");

            let sqrt = math.member("sqrt").unwrap();
            assert_eq!(classify("sqrt", &sqrt, Scope::Module), MemberKind::CompiledFunction);

            let pi = math.member("pi").unwrap();
            assert!(matches!(pi.scalar(), Some(Scalar::Float(_))));
            assert_eq!(classify("pi", &pi, Scope::Module), MemberKind::Data);
        });
    }

    #[test]
    fn test_missing_module_maps_to_module_not_found() {
        Python::with_gil(|py| {
            let result = load_module(py, "stubsmith_no_such_module", None, None);
            assert!(matches!(result, Err(StubsmithError::ModuleNotFound { .. })));
        });
    }

    #[test]
    fn test_bool_is_not_an_int_scalar() {
        Python::with_gil(|py| {
            let builtins = load_module(py, "builtins", None, None).unwrap();
            let truth = builtins.member("True").unwrap();
            assert_eq!(truth.scalar(), Some(Scalar::Bool(true)));
            assert_eq!(truth.as_integer(), Some(1));
        });
    }
}
