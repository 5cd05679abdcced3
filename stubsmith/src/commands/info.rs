//! Info command - displays the configuration and the classification of the
//! root module's members.

use super::{RootVisitor, load_config, visit_root};
use crate::cli::{Cli, InfoArgs, InfoFormat};
use serde_json::json;
use std::collections::BTreeMap;
use stubsmith_core::config::StubsmithConfig;
use stubsmith_core::error::Result;
use stubsmith_core::introspect::RuntimeObject;
use stubsmith_core::stubgen::{MemberKind, Scope, classify};

/// Runs the info command.
pub fn run(cli: &Cli, args: InfoArgs) -> Result<()> {
    let config = load_config(cli)?;
    let members = visit_root(&config, MemberCensus)?;

    match args.format {
        InfoFormat::Pretty => print_pretty(&config, &members, args.members),
        InfoFormat::Json => println!("{}", to_json(&config, &members, args.members)),
    }

    Ok(())
}

/// Root member names with their classification, in listing order.
pub struct MemberCensus;

impl RootVisitor for MemberCensus {
    type Output = Vec<(String, MemberKind)>;

    fn visit<O: RuntimeObject>(self, _config: &StubsmithConfig, root: &O) -> Result<Self::Output> {
        Ok(root
            .member_names()
            .into_iter()
            .filter_map(|name| {
                let member = root.member(&name)?;
                let kind = classify(&name, &member, Scope::Module);
                Some((name, kind))
            })
            .collect())
    }
}

fn counts(members: &[(String, MemberKind)]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for (_, kind) in members {
        *counts.entry(format!("{:?}", kind)).or_insert(0) += 1;
    }
    counts
}

fn print_pretty(config: &StubsmithConfig, members: &[(String, MemberKind)], list_members: bool) {
    println!("\n=== Configuration ===\n");
    println!("Root Module:  {}", config.stubgen.root_module);
    if let Some(alias) = &config.stubgen.root_alias {
        println!("Root Alias:   {}", alias);
    }
    println!("Variant:      {}", config.stubgen.variant().unwrap_or("(none)"));
    println!("Source:       {:?}", config.general.source);
    println!("Output Path:  {}", config.output.output_path);
    if !config.stubgen.excluded_modules.is_empty() {
        println!("Excluded:     {:?}", config.stubgen.excluded_modules);
    }
    for rewrite in config.stubgen.effective_rewrites() {
        println!("Rewrite:      {} -> {}", rewrite.from, rewrite.to);
    }

    println!("\n=== Root Members ===\n");
    for (kind, count) in counts(members) {
        println!("  {:<18} {}", kind, count);
    }

    if list_members {
        println!();
        for (name, kind) in members {
            println!("  {:<32} {:?}", name, kind);
        }
    }
}

fn to_json(
    config: &StubsmithConfig,
    members: &[(String, MemberKind)],
    list_members: bool,
) -> serde_json::Value {
    let mut value = json!({
        "root_module": config.stubgen.root_module,
        "root_alias": config.stubgen.root_alias,
        "variant": config.stubgen.variant(),
        "source": config.general.source,
        "output_path": config.output.output_path,
        "excluded_modules": config.stubgen.excluded_modules,
        "counts": counts(members),
    });
    if list_members {
        value["members"] = members
            .iter()
            .map(|(name, kind)| json!({ "name": name, "kind": kind }))
            .collect();
    }
    value
}
