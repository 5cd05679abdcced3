use crate::config::OutputConfig;
use crate::error::StubsmithError;
use crate::stubgen::ModuleStub;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Information about a generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// The path where the file was written.
    pub path: PathBuf,
    /// The number of bytes written.
    pub bytes_written: usize,
    /// Name of the module the stub describes.
    pub module: String,
}

/// Report of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub files: Vec<GeneratedFile>,
}

impl GenerationReport {
    pub fn modules_written(&self) -> usize {
        self.files.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.bytes_written).sum()
    }
}

/// Writes one `<module>.<extension>` file per stub into a directory.
#[derive(Debug, Clone)]
pub struct StubWriter {
    output_path: PathBuf,
    extension: String,
}

impl StubWriter {
    pub fn new(output_path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            output_path: output_path.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.output_path, &config.extension)
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Path a module's stub is written to.
    pub fn path_for(&self, module: &str) -> PathBuf {
        let extension = self.extension.trim_start_matches('.');
        if extension.is_empty() {
            self.output_path.join(module)
        } else {
            self.output_path.join(format!("{}.{}", module, extension))
        }
    }

    /// Writes every stub, creating the output directory first.
    pub fn write_all(&self, stubs: &[ModuleStub]) -> Result<GenerationReport, StubsmithError> {
        info!("Writing {} stubs to {:?}", stubs.len(), self.output_path);
        fs::create_dir_all(&self.output_path)?;

        let mut report = GenerationReport::default();
        for stub in stubs {
            report.files.push(self.write(stub)?);
        }

        info!(
            files = report.modules_written(),
            bytes = report.total_bytes(),
            "Generation complete"
        );
        Ok(report)
    }

    fn write(&self, stub: &ModuleStub) -> Result<GeneratedFile, StubsmithError> {
        let path = self.path_for(&stub.name);
        fs::write(&path, &stub.text)?;
        debug!("Stub for {} written to {:?}", stub.name, path);

        Ok(GeneratedFile {
            path,
            bytes_written: stub.text.len(),
            module: stub.name.clone(),
        })
    }
}
