//! Best-effort mapping of source variable names onto canonical WMO names.
//!
//! Resolution only plans; applying the renames against the open file is the
//! driver's job. A canonical variable with no matching alias is simply not
//! created: not every airframe carries every sensor, and the system never
//! synthesizes data.

use std::collections::HashSet;

use crate::schema::Schema;

/// One rename to apply to the open file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// Decide, for each canonical variable missing from `present`, which source
/// variable (if any) should be renamed to it.
///
/// Canonical names are visited in registry order; each alias list is scanned
/// in order and the first name present wins. A variable already carrying its
/// canonical name is left untouched, so planning twice in a row is a no-op.
pub fn plan_renames(present: &[String], schema: &Schema) -> Vec<Rename> {
    let mut have: HashSet<&str> = present.iter().map(String::as_str).collect();
    let mut plan = Vec::new();

    for canonical in schema.canonical_names() {
        if have.contains(canonical) {
            continue;
        }
        if let Some(&alias) = schema
            .aliases_for(canonical)
            .iter()
            .find(|alias| have.contains(**alias))
        {
            plan.push(Rename { from: alias.to_string(), to: canonical.to_string() });
            have.remove(alias);
            have.insert(canonical);
        }
    }

    plan
}
