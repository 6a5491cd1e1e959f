//! Attribute rewriting against the WMO schema.
//!
//! The backing attribute store cannot rename a key in place, so both passes
//! snapshot the existing attributes, clear them, and reinsert in the defined
//! order: schema attributes first, then whatever the schema did not cover,
//! in its original order. No attribute value is lost unless its name
//! collides with a schema-written name or is exactly `standard_name`, which
//! the schema's `long_name` supersedes.

use netcdf::AttributeValue;

use crate::ncfile::{AttributeBag, FlightFile};
use crate::schema::{fill_attr_name, AttrTemplate, Schema, FILL_KEY, FILL_VALUE};

/// Replace every variable's attribute set with the schema-required set.
///
/// Canonical variables get their full template; anything else still gets the
/// fill-value sentinel so downstream readers can rely on it.
pub fn rewrite_variable_attributes(file: &mut FlightFile, schema: &Schema) {
    for (name, var) in &mut file.vars {
        let snapshot = std::mem::take(&mut var.attrs);
        var.attrs = match schema.variable_attrs(name) {
            Some(template) => canonical_bag(name, template, snapshot),
            None => passthrough_bag(name, snapshot),
        };
    }
}

fn fill_sentinel() -> AttributeValue {
    AttributeValue::Str(FILL_VALUE.to_string())
}

fn canonical_bag(name: &str, template: &AttrTemplate, snapshot: AttributeBag) -> AttributeBag {
    let mut out = AttributeBag::new();
    for (&key, &required) in template {
        if key == FILL_KEY {
            out.insert(fill_attr_name(name), fill_sentinel());
        } else if required.is_empty() {
            // contextual placeholder: keep whatever the source carried
            let value = snapshot
                .get(key)
                .cloned()
                .unwrap_or_else(|| AttributeValue::Str(String::new()));
            out.insert(key.to_string(), value);
        } else {
            out.insert(key.to_string(), AttributeValue::Str(required.to_string()));
        }
    }
    for (key, value) in snapshot {
        if key == "standard_name" {
            continue; // superseded by the schema long_name
        }
        if !out.contains_key(key.as_str()) {
            out.insert(key, value);
        }
    }
    out
}

fn passthrough_bag(name: &str, snapshot: AttributeBag) -> AttributeBag {
    let mut out = AttributeBag::new();
    out.insert(fill_attr_name(name), fill_sentinel());
    let has_long_name = snapshot.contains_key("long_name");
    for (key, value) in snapshot {
        if key == "standard_name" {
            // rename-on-copy, unless the source carries a real long_name
            if !has_long_name && !out.contains_key("long_name") {
                out.insert("long_name".to_string(), value);
            }
            continue;
        }
        // a pre-existing fill attribute must not displace the NaN sentinel
        if !out.contains_key(key.as_str()) {
            out.insert(key, value);
        }
    }
    out
}

/// Replace the file's global attributes with the schema-required set.
///
/// `platform_name` and `flight_id` keep the source's value when present
/// (`airframe_id`, when given, overrides `platform_name`); `processing_level`
/// is forced to `raw`; every other schema key takes the schema literal.
/// Leftover source attributes under non-schema names are re-appended in
/// original order. A placeholder key the source never supplied is reported
/// back as a warning, never a failure.
pub fn rewrite_global_attributes(
    file: &mut FlightFile,
    schema: &Schema,
    airframe_id: Option<&str>,
) -> Vec<String> {
    let mut warnings = Vec::new();
    let snapshot = std::mem::take(&mut file.globals);
    let mut out = AttributeBag::new();

    for (&key, &default) in schema.required_globals() {
        match key {
            "platform_name" => {
                if let Some(id) = airframe_id {
                    out.insert(key.to_string(), AttributeValue::Str(id.to_string()));
                } else if let Some(value) = snapshot.get(key) {
                    out.insert(key.to_string(), value.clone());
                } else {
                    warnings.push(
                        "required global attribute `platform_name` is missing; \
                         pass an airframe ID or set it in the source file"
                            .to_string(),
                    );
                }
            }
            "flight_id" => {
                if let Some(value) = snapshot.get(key) {
                    out.insert(key.to_string(), value.clone());
                } else {
                    warnings
                        .push("required global attribute `flight_id` is missing".to_string());
                }
            }
            "processing_level" => {
                out.insert(key.to_string(), AttributeValue::Str("raw".to_string()));
            }
            _ => {
                out.insert(key.to_string(), AttributeValue::Str(default.to_string()));
                // empty defaults are placeholders the caller or file was
                // supposed to fill in
                if default.is_empty() && !snapshot.contains_key(key) {
                    warnings.push(format!(
                        "required global attribute `{key}` is missing; wrote the empty default"
                    ));
                }
            }
        }
    }

    for (key, value) in snapshot {
        if !schema.required_globals().contains_key(key.as_str()) {
            out.insert(key, value);
        }
    }

    file.globals = out;
    warnings
}
