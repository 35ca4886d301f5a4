//! Turning an executed run back into a document that can be submitted again.

use crate::model::resource::{ObjectMeta, Resource, LAST_APPLIED_CONFIGURATION};
use crate::yaml;

const RERUN_IDENTIFIER: &str = "-r-";

/// `generateName` prefix for a re-run of the run called `name`.
///
/// Runs that are themselves re-runs keep the prefix of their original, so
/// `build-r-x7k2p` gives `build-r-` rather than `build-r-x7k2p-r-`.
pub fn generate_name_prefix_for_rerun(name: &str) -> String {
    let root = match name.rfind(RERUN_IDENTIFIER) {
        Some(index) => &name[..index],
        None => name,
    };

    format!("{}{}", root, RERUN_IDENTIFIER)
}

/// Builds the resubmittable copy of `run`.
///
/// Only `annotations`, `labels`, `namespace` and `generateName` survive in
/// the metadata, the last-applied-configuration annotation is dropped and
/// `status` is removed. `spec` and any other top-level fields are kept.
pub fn generate_new_run(run: &Resource) -> Resource {
    let mut copy = run.clone();

    let generate_name = copy.metadata.generate_name.take()
        .filter(|prefix| !prefix.is_empty())
        .or_else(|| copy.metadata.name.as_deref().map(generate_name_prefix_for_rerun));

    if let Some(annotations) = copy.metadata.annotations.as_mut() {
        annotations.shift_remove(LAST_APPLIED_CONFIGURATION);
    }

    copy.metadata = ObjectMeta {
        annotations: copy.metadata.annotations.take(),
        labels: copy.metadata.labels.take(),
        namespace: copy.metadata.namespace.take(),
        generate_name,
        ..Default::default()
    };

    copy.status = None;

    copy
}

/// The re-run document for `run`, as YAML text ready for editing.
pub fn generate_new_run_yaml(run: &Resource) -> serde_json::Result<String> {
    yaml::to_string_from(&generate_new_run(run))
}
