//! Shared helpers for command handlers.

use std::collections::BTreeMap;
use std::path::Path;

use omevlan_core::{DeclarationDocument, ReconcileRequest, TaggedEntry, TemplateRef, UntaggedEntry};

use crate::cli::{ReconcileArgs, TargetArgs};
use crate::error::CliError;

/// Read a YAML or JSON declaration file.
pub fn read_declaration_file(path: &Path) -> Result<DeclarationDocument, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| CliError::DeclarationFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Apply `--template-*` / `--nic` options on top of a document.
fn apply_target(doc: &mut DeclarationDocument, target: &TargetArgs) {
    if target.template_id.is_some() || target.template_name.is_some() {
        doc.template_id = target.template_id;
        doc.template_name.clone_from(&target.template_name);
    }
    if let Some(ref nic) = target.nic {
        doc.nic_identifier = Some(nic.clone());
    }
}

/// Combine the declaration file (if any) with the inline options.
///
/// Inline tagged options for the same port are merged into one entry.
pub fn build_request(args: &ReconcileArgs) -> Result<ReconcileRequest, CliError> {
    let mut doc = match args.file {
        Some(ref path) => read_declaration_file(path)?,
        None => DeclarationDocument::default(),
    };
    apply_target(&mut doc, &args.target);

    let decl = &mut doc.declaration;
    for &(port, id) in &args.untagged {
        decl.untagged_networks.push(UntaggedEntry {
            port,
            untagged_network_id: Some(id),
            untagged_network_name: None,
        });
    }
    for (port, name) in &args.untagged_name {
        decl.untagged_networks.push(UntaggedEntry {
            port: *port,
            untagged_network_id: None,
            untagged_network_name: Some(name.clone()),
        });
    }

    let mut tagged: BTreeMap<u32, TaggedEntry> = BTreeMap::new();
    for (port, ids) in &args.tagged {
        tagged_entry(&mut tagged, *port)
            .tagged_network_ids
            .get_or_insert_with(Vec::new)
            .extend(ids.iter().copied());
    }
    for (port, names) in &args.tagged_name {
        tagged_entry(&mut tagged, *port)
            .tagged_network_names
            .get_or_insert_with(Vec::new)
            .extend(names.iter().cloned());
    }
    for &port in &args.clear_tagged {
        tagged_entry(&mut tagged, port)
            .tagged_network_ids
            .get_or_insert_with(Vec::new);
    }
    decl.tagged_networks.extend(tagged.into_values());

    Ok(doc.into_request()?)
}

fn tagged_entry(entries: &mut BTreeMap<u32, TaggedEntry>, port: u32) -> &mut TaggedEntry {
    entries.entry(port).or_insert_with(|| TaggedEntry {
        port,
        ..TaggedEntry::default()
    })
}

/// Template selection and NIC for read-only commands.
pub fn target(args: &TargetArgs) -> Result<(TemplateRef, String), CliError> {
    let template = TemplateRef::from_parts(args.template_id, args.template_name.clone())?;
    let nic = args
        .nic
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| CliError::Validation {
            field: "nic".into(),
            reason: "a NIC display name is required (--nic)".into(),
        })?;
    Ok((template, nic))
}
