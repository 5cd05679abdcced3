use serde::{Deserialize, Serialize};
use tracing::trace;

/// Placeholders expanded in [`Rewrite`] patterns before they are applied.
pub const VARIANT_PLACEHOLDER: &str = "{variant}";
pub const VARIANT_PREFIX_PLACEHOLDER: &str = "{variant_prefix}";
pub const ROOT_PLACEHOLDER: &str = "{root_module}";

/// Length of the variant prefix naming the numerics backend (`llvm_ad_rgb` -> `llvm`).
const VARIANT_PREFIX_LEN: usize = 4;

/// A text substitution applied to every generated module.
///
/// `{variant}`, `{variant_prefix}` and `{root_module}` are expanded from the
/// active configuration. A rewrite naming a variant placeholder is skipped
/// while no variant is set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rewrite {
    pub from: String,
    pub to: String,
}

/// Configuration for stub generation (the `[stubgen]` section)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StubgenConfig {
    /// Name of the root module, imported by every generated unit
    pub root_module: String,
    /// Short alias of the root module (`import mitsuba as mi`)
    #[serde(default)]
    pub root_alias: Option<String>,
    /// Active variant; `.{variant}` is stripped from recovered signatures
    #[serde(default)]
    pub variant: Option<String>,
    /// Names imported from `typing` in the preamble
    #[serde(default = "default_typing_imports")]
    pub typing_imports: Vec<String>,
    /// Additional modules imported in the preamble (e.g. "numpy")
    #[serde(default)]
    pub extra_imports: Vec<String>,
    /// Submodule attribute names that are never walked
    #[serde(default)]
    pub excluded_modules: Vec<String>,
    /// Numerics library whose `{numerics}.{variant_prefix}.ad.` prefix is
    /// rewritten to the root namespace (e.g. "drjit")
    #[serde(default)]
    pub numerics_module: Option<String>,
    /// Text rewrites applied to each finished module
    #[serde(default)]
    pub rewrites: Vec<Rewrite>,
}

pub fn default_typing_imports() -> Vec<String> {
    [
        "Callable", "Iterable", "Iterator", "Tuple", "List", "TypeVar", "overload",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl StubgenConfig {
    pub fn new(root_module: impl Into<String>) -> Self {
        Self {
            root_module: root_module.into(),
            root_alias: None,
            variant: None,
            typing_imports: default_typing_imports(),
            extra_imports: Vec::new(),
            excluded_modules: Vec::new(),
            numerics_module: None,
            rewrites: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.root_alias = Some(alias.into());
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_extra_import(mut self, module: impl Into<String>) -> Self {
        self.extra_imports.push(module.into());
        self
    }

    pub fn with_excluded_module(mut self, name: impl Into<String>) -> Self {
        self.excluded_modules.push(name.into());
        self
    }

    pub fn with_numerics_module(mut self, module: impl Into<String>) -> Self {
        self.numerics_module = Some(module.into());
        self
    }

    pub fn with_rewrite(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rewrites.push(Rewrite {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// The variant as a borrowed string, if any.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref().filter(|v| !v.is_empty())
    }

    /// Leading characters of the variant, naming the numerics backend.
    pub fn variant_prefix(&self) -> Option<&str> {
        self.variant().map(|variant| {
            let end = variant
                .char_indices()
                .nth(VARIANT_PREFIX_LEN)
                .map_or(variant.len(), |(index, _)| index);
            &variant[..end]
        })
    }

    /// The fixed lines every generated unit starts with.
    pub fn preamble(&self) -> String {
        let mut output = String::new();

        if !self.typing_imports.is_empty() {
            output.push_str(&format!(
                "from typing import {}\n",
                self.typing_imports.join(", ")
            ));
        }
        for module in &self.extra_imports {
            output.push_str(&format!("import {}\n", module));
        }
        output.push_str(&format!("import {}\n", self.root_module));
        if let Some(alias) = &self.root_alias {
            output.push_str(&format!("import {} as {}\n", self.root_module, alias));
        }
        output.push('\n');

        output
    }

    /// The rewrites in effect for the current variant, placeholders expanded.
    ///
    /// The numerics prefix rewrite comes first, followed by the configured
    /// rewrites in order.
    pub fn effective_rewrites(&self) -> Vec<Rewrite> {
        let mut rewrites = Vec::new();

        if let (Some(numerics), Some(prefix)) = (&self.numerics_module, self.variant_prefix()) {
            rewrites.push(Rewrite {
                from: format!("{}.{}.ad.", numerics, prefix),
                to: format!("{}.", self.root_module),
            });
        }

        for rewrite in &self.rewrites {
            match (self.expand(&rewrite.from), self.expand(&rewrite.to)) {
                (Some(from), Some(to)) if !from.is_empty() => rewrites.push(Rewrite { from, to }),
                _ => trace!(from = %rewrite.from, "Rewrite not applicable"),
            }
        }

        rewrites
    }

    /// Apply the effective rewrites to a finished module.
    pub fn apply_rewrites(&self, text: &str) -> String {
        self.effective_rewrites()
            .iter()
            .fold(text.to_string(), |acc, r| acc.replace(&r.from, &r.to))
    }

    fn expand(&self, pattern: &str) -> Option<String> {
        let mut expanded = pattern.replace(ROOT_PLACEHOLDER, &self.root_module);
        if expanded.contains(VARIANT_PLACEHOLDER) || expanded.contains(VARIANT_PREFIX_PLACEHOLDER) {
            expanded = expanded
                .replace(VARIANT_PREFIX_PLACEHOLDER, self.variant_prefix()?)
                .replace(VARIANT_PLACEHOLDER, self.variant()?);
        }
        Some(expanded)
    }
}
