//! The WMO UASDC format requirements, as published at
//! <https://github.com/synoptic/wmo-uasdc/tree/main/raw_uas_to_netCDF>.
//!
//! Pure static configuration: build one [`Schema`] at process start and pass
//! it by reference into the resolver, rewriter and driver.

use indexmap::IndexMap;

/// Sentinel written as every variable's fill-value attribute.
pub const FILL_VALUE: &str = "NaN";

/// Placeholder key in the per-variable templates; the rewriter substitutes
/// the actual variable name for the `varname` prefix.
pub const FILL_KEY: &str = "varname__FillValue";

/// Attribute name of the fill-value sentinel for a given variable.
pub fn fill_attr_name(var: &str) -> String {
    format!("{var}__FillValue")
}

/// Ordered attribute-name → required-value template for one canonical
/// variable. An empty value is a contextual placeholder, not a literal.
pub type AttrTemplate = IndexMap<&'static str, &'static str>;

/// Static registry of required globals, per-variable attribute templates and
/// the canonical-name → accepted-alias mapping.
///
/// Iteration order of the variable table defines canonical processing order
/// everywhere else. No alias may map to more than one canonical name; that
/// is a configuration invariant, checked by test, not at runtime.
pub struct Schema {
    globals: IndexMap<&'static str, &'static str>,
    variables: IndexMap<&'static str, AttrTemplate>,
    aliases: IndexMap<&'static str, Vec<&'static str>>,
}

fn template(units: &'static str, long_name: &'static str) -> AttrTemplate {
    IndexMap::from([
        (FILL_KEY, FILL_VALUE),
        ("units", units),
        ("long_name", long_name),
        ("processing_level", ""),
    ])
}

impl Schema {
    /// The WMO UASDC schema in generic form. Empty global values must be
    /// supplied by the caller or the source file; their absence at
    /// normalization time is a warning, not a failure.
    pub fn wmo() -> Self {
        let globals = IndexMap::from([
            ("Conventions", "CF-1.8, WMO-CF-1.0"),
            ("wmo__cf_profile", "FM 303-2024"),
            ("featureType", "trajectory"),
            ("platform_name", ""),                 // airframeID
            ("flight_id", ""),                     // e.g. 'JBCC_1500m_VP'
            ("site_terrain_elevation_height", ""), // e.g. '3200m'
            ("processing_level", "raw"),
            ("source", ""),
        ]);

        let variables = IndexMap::from([
            ("time", template("seconds since 1970-01-01T00:00:00", "Time")),
            ("lat", template("degrees (-90 to 90)", "Latitude")),
            ("lon", template("degrees (-180 to 180)", "Longitude")),
            ("altitude", template("Meters Above Sea Level", "altitude (height)")),
            ("air_temperature", template("Kelvin", "Air Temperature")),
            ("dew_point_temperature", template("Kelvin", "Air Dewpoint Temperature")),
            ("wind_direction", template("degrees", "Wind Direction")),
            ("wind_speed", template("m/s", "Wind Speed")),
            ("relative_humidity", template("%", "Relative Humidity")),
            ("humidity_mixing_ratio", template("kg/kg", "Humidity Mixing Ratio")),
            ("turbulent_kinetic_energy", template("m2 s-2", "Turbulent Kinetic Energy")),
            (
                "eddy_dissipation_rate",
                template("m2/3 s-1", "Mean Turbulence Intensity Eddy Dissipation Rate"),
            ),
            ("air_pressure", template("Pascals", "Air Pressure")),
            ("non_coordinate_geopotential", template("m2 s-2", "Geopotential")),
            ("geopotential_height", template("geopotential meters", "Geopotential Height")),
        ]);

        // Names a UAS might have used instead; scanned in order, first match wins.
        let aliases = IndexMap::from([
            ("time", vec!["timestamp"]),
            ("lat", vec!["latitude"]),
            ("lon", vec!["longitude"]),
            ("altitude", vec!["alt"]),
            ("air_temperature", vec!["temp"]),
            ("dew_point_temperature", vec!["dew_point"]),
            ("wind_direction", vec!["wind_dir", "wdir"]),
            ("wind_speed", vec!["wind_spd", "wspd"]),
            ("relative_humidity", vec!["rel_hum", "rh"]),
            ("humidity_mixing_ratio", vec!["mixing_ratio", "mr"]),
            ("turbulent_kinetic_energy", vec!["tke"]),
            ("eddy_dissipation_rate", vec!["edr"]),
            ("air_pressure", vec!["air_press"]),
            ("non_coordinate_geopotential", vec!["gpt"]),
            ("geopotential_height", vec!["gph", "gpt_height"]),
        ]);

        Self { globals, variables, aliases }
    }

    /// Required global attributes, in write order.
    pub fn required_globals(&self) -> &IndexMap<&'static str, &'static str> {
        &self.globals
    }

    /// Canonical variable names in registry order.
    pub fn canonical_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.variables.keys().copied()
    }

    /// Required attribute template for a canonical variable, if `name` is one.
    pub fn variable_attrs(&self, name: &str) -> Option<&AttrTemplate> {
        self.variables.get(name)
    }

    pub fn is_canonical(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Accepted source names for a canonical variable, in lookup order.
    pub fn aliases_for(&self, canonical: &str) -> &[&'static str] {
        self.aliases.get(canonical).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_order_starts_with_time() {
        let schema = Schema::wmo();
        let names: Vec<_> = schema.canonical_names().collect();
        assert_eq!(names.len(), 15);
        assert_eq!(names[0], "time");
        assert_eq!(names[1], "lat");
        assert_eq!(names[14], "geopotential_height");
    }

    #[test]
    fn alias_sets_are_disjoint() {
        let schema = Schema::wmo();
        let mut seen = HashSet::new();
        for canonical in schema.canonical_names() {
            for alias in schema.aliases_for(canonical) {
                assert!(seen.insert(*alias), "alias `{alias}` maps to more than one canonical name");
                assert!(!schema.is_canonical(alias), "alias `{alias}` is itself a canonical name");
            }
        }
    }

    #[test]
    fn templates_put_fill_value_first() {
        let schema = Schema::wmo();
        for canonical in schema.canonical_names() {
            let template = schema.variable_attrs(canonical).unwrap();
            let (first, value) = template.iter().next().unwrap();
            assert_eq!(*first, FILL_KEY);
            assert_eq!(*value, FILL_VALUE);
            assert!(template.contains_key("units"));
            assert!(template.contains_key("long_name"));
        }
    }

    #[test]
    fn globals_force_raw_processing_level() {
        let schema = Schema::wmo();
        let globals = schema.required_globals();
        assert_eq!(globals.len(), 8);
        assert_eq!(globals.iter().next().unwrap().0, &"Conventions");
        assert_eq!(globals["processing_level"], "raw");
        assert_eq!(globals["platform_name"], "");
    }

    #[test]
    fn unknown_names_are_not_canonical() {
        let schema = Schema::wmo();
        assert!(!schema.is_canonical("temp"));
        assert!(schema.aliases_for("not_a_variable").is_empty());
    }
}
