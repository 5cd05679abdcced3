//! Init command - initializes stubsmith.toml configuration.

use crate::cli::{Cli, InitArgs};
use std::fs;
use std::path::Path;
use stubsmith_core::config::CONFIG_FILE_NAME;
use stubsmith_core::error::Result;
use tracing::{error, info};

/// Runs the init command in the current directory.
pub fn run(_cli: &Cli, args: InitArgs) -> Result<()> {
    if write_config(Path::new("."), &args)? {
        info!("Stubsmith initialized successfully!");
        info!("Next steps:");
        info!("  1. Edit {} to describe your extension module", CONFIG_FILE_NAME);
        info!("  2. Point general.dump_path at an introspection dump (or build with --features python)");
        info!("  3. Run 'stubsmith generate' to write the stubs");
    }
    Ok(())
}

/// Writes the configuration template into `dir`. Returns `false` when a
/// configuration already exists and `--force` was not given.
pub fn write_config(dir: &Path, args: &InitArgs) -> Result<bool> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !args.force {
        error!("{} already exists. Use --force to overwrite.", CONFIG_FILE_NAME);
        return Ok(false);
    }

    let content = if args.minimal {
        generate_minimal_config(&args.root_module)
    } else {
        generate_full_config(&args.root_module)
    };

    fs::write(&config_path, content)?;
    info!("Created {:?}", config_path);
    Ok(true)
}

fn generate_minimal_config(root_module: &str) -> String {
    format!(
        r#"[general]
source = "dump"
dump_path = "introspection.json"

[stubgen]
root_module = "{root_module}"

[output]
output_path = "./stubs"
"#
    )
}

fn generate_full_config(root_module: &str) -> String {
    format!(
        r#"# Stubsmith Configuration

[general]
# Where the module tree comes from: "dump" (JSON introspection dump) or
# "python" (live import, requires building with --features python)
source = "dump"
dump_path = "${{STUBSMITH_DUMP:-introspection.json}}"

# Module imported when source = "python" (defaults to stubgen.root_module)
# python_module = "{root_module}"

# Function of the root module called with the variant before walking
# activate_with = "set_variant"

[stubgen]
root_module = "{root_module}"
# root_alias = "mi"

# Variant whose ".{{variant}}" qualifier is stripped from recovered signatures
# variant = "${{STUBSMITH_VARIANT:-llvm_ad_rgb}}"

typing_imports = ["Callable", "Iterable", "Iterator", "Tuple", "List", "TypeVar", "overload"]
extra_imports = []

# Submodule attribute names that never get a stub of their own
excluded_modules = []

# Numerics library whose "<lib>.<variant prefix>.ad." qualifier becomes "{root_module}."
# numerics_module = "drjit"

# Rewrites applied to each generated module; {{variant}}, {{variant_prefix}}
# and {{root_module}} are expanded from the active configuration
# [[stubgen.rewrites]]
# from = "drjit.{{variant_prefix}}.ad."
# to = "{{root_module}}."

[output]
output_path = "./stubs"
extension = "pyi"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubsmith_core::config::StubsmithConfig;
    use tempfile::TempDir;

    fn args(minimal: bool, force: bool) -> InitArgs {
        InitArgs {
            force,
            root_module: "mitsuba".to_string(),
            minimal,
        }
    }

    #[test]
    fn test_templates_parse() {
        let minimal = StubsmithConfig::from_toml_str(&generate_minimal_config("mitsuba")).unwrap();
        assert_eq!(minimal.stubgen.root_module, "mitsuba");

        let full = StubsmithConfig::from_toml_str(&generate_full_config("mitsuba")).unwrap();
        assert_eq!(full.stubgen.root_module, "mitsuba");
        assert_eq!(full.output.extension, "pyi");
        assert!(full.general.dump_path.is_some());
    }

    #[test]
    fn test_existing_config_is_kept_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "# mine").unwrap();

        assert!(!write_config(temp_dir.path(), &args(true, false)).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        assert!(write_config(temp_dir.path(), &args(true, true)).unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains("root_module = \"mitsuba\""));
    }
}
