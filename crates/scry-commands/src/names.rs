//! Display-name derivation for objsets by walking the ownership chain
//! upward: objset → dataset → dsl_dir parents.

use scry_core::{Fault, Image, ImageExt, TypedHandle};

/// The meta-objset has no dataset behind it and goes by this name.
pub const ROOT_OBJSET_NAME: &str = "MOS";

const UNKNOWN_SNAP_NAME: &str = "%UNKNOWN_SNAP_NAME%";

/// Parent chains longer than this are treated as corrupt (a cycle in a
/// damaged image would otherwise never terminate).
const MAX_DIR_DEPTH: usize = 64;

pub fn objset_name(image: &dyn Image, objset: &TypedHandle) -> Result<String, Fault> {
    match image.field_handle(objset, "os_dsl_dataset")? {
        None => Ok(ROOT_OBJSET_NAME.to_string()),
        Some(dataset) => dataset_name(image, &dataset),
    }
}

/// `<dir-path>` for head datasets, `<dir-path>@<snapname>` for
/// snapshots. Snapshots carry no previous-snapshot link; one whose
/// name component is empty gets a fixed placeholder.
pub fn dataset_name(image: &dyn Image, dataset: &TypedHandle) -> Result<String, Fault> {
    let dir = image
        .field_handle(dataset, "ds_dir")?
        .ok_or_else(|| Fault(format!("{dataset} belongs to no dsl_dir")))?;
    let mut name = dsl_dir_name(image, &dir)?;
    if image.field_handle(dataset, "ds_prev")?.is_none() {
        let snap = image.field_text(dataset, "ds_snapname")?;
        name.push('@');
        if snap.is_empty() {
            name.push_str(UNKNOWN_SNAP_NAME);
        } else {
            name.push_str(&snap);
        }
    }
    Ok(name)
}

/// Path segments from the root dir down, joined with `/`.
pub fn dsl_dir_name(image: &dyn Image, dir: &TypedHandle) -> Result<String, Fault> {
    let mut segments = Vec::new();
    let mut cursor = Some(dir.clone());
    while let Some(dd) = cursor {
        if segments.len() >= MAX_DIR_DEPTH {
            return Err(Fault(format!(
                "dsl_dir parent chain deeper than {MAX_DIR_DEPTH} at {dd}"
            )));
        }
        segments.push(image.field_text(&dd, "dd_myname")?);
        cursor = image.field_handle(&dd, "dd_parent")?;
    }
    segments.reverse();
    Ok(segments.join("/"))
}
