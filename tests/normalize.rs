// End-to-end runs of the normalization driver against real netCDF files.

use std::path::Path;

use netcdf::AttributeValue;

use uasdc_process::driver::{self, Stage};
use uasdc_process::flighttime;
use uasdc_process::schema::Schema;
use uasdc_process::stage;

const RAW_NAME: &str = "20240501221756_Lat_47.5738578_Lon_9.0461255.nc";
const EPOCH_20240501221756: f64 = 1_714_601_876.0;

/// A four-sample flight the way a sensor pod actually writes one: alias
/// variable names, flight-relative time, stray metadata.
fn write_raw_flight(path: &Path) {
    let mut nc = netcdf::create(path).unwrap();
    nc.add_dimension("obs", 4).unwrap();

    let samples: [(&str, [f64; 4]); 6] = [
        ("timestamp", [0.0, 1.0, 2.0, 3.0]),
        ("latitude", [47.57, 47.58, 47.59, 47.60]),
        ("longitude", [9.04, 9.05, 9.06, 9.07]),
        ("alt", [400.0, 450.0, 500.0, 550.0]),
        ("temp", [288.1, 287.9, 287.6, 287.2]),
        ("wspd", [3.2, 3.4, 4.1, 3.9]),
    ];
    for (name, values) in &samples {
        let mut var = nc.add_variable::<f64>(name, &["obs"]).unwrap();
        var.put_values(values, ..).unwrap();
    }
    {
        let mut temp = nc.variable_mut("temp").unwrap();
        temp.put_attribute("units", "C").unwrap();
        temp.put_attribute("standard_name", "air temperature").unwrap();
        temp.put_attribute("sensor_serial", "A-1142").unwrap();
    }

    nc.add_attribute("platform_name", "NimbusUAS").unwrap();
    nc.add_attribute("flight_id", "JBCC_1500m_VP").unwrap();
    nc.add_attribute("processing_level", "final").unwrap();
    nc.add_attribute("pilot", "J. Doe").unwrap();
}

fn global_str(nc: &netcdf::File, name: &str) -> Option<String> {
    let attr = nc.attribute(name)?;
    match attr.value().unwrap() {
        AttributeValue::Str(s) => Some(s),
        other => panic!("global `{name}` is not a string: {other:?}"),
    }
}

fn var_attr_str(var: &netcdf::Variable, name: &str) -> Option<String> {
    let attr = var.attribute(name)?;
    match attr.value().unwrap() {
        AttributeValue::Str(s) => Some(s),
        other => panic!("attribute `{name}` is not a string: {other:?}"),
    }
}

#[test]
fn raw_flight_is_normalized_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join(RAW_NAME);
    write_raw_flight(&raw);

    let flight_time = flighttime::leading_timestamp(RAW_NAME).unwrap();
    assert_eq!(flight_time, "20240501221756");
    let reference = flighttime::flight_time_to_epoch(&flight_time).unwrap() as f64;

    let staged_name = stage::output_name("007", "NimbusUAS", &flight_time);
    assert_eq!(staged_name, "UASDC_007_NimbusUAS_20240501221756Z.nc");
    stage::stage_file(&raw, dir.path(), &staged_name).unwrap();

    let schema = Schema::wmo();
    driver::normalize(dir.path(), &staged_name, &schema, reference).unwrap();

    let nc = netcdf::open(dir.path().join(&staged_name)).unwrap();

    // aliases became canonical names and the originals are gone
    for canonical in ["time", "lat", "lon", "altitude", "air_temperature", "wind_speed"] {
        assert!(nc.variable(canonical).is_some(), "missing `{canonical}`");
    }
    for old in ["timestamp", "latitude", "longitude", "alt", "temp", "wspd"] {
        assert!(nc.variable(old).is_none(), "`{old}` should have been renamed");
    }

    // flight-relative time was shifted onto the epoch
    let time: Vec<f64> = nc.variable("time").unwrap().get_values(..).unwrap();
    assert_eq!(
        time,
        [
            EPOCH_20240501221756,
            EPOCH_20240501221756 + 1.0,
            EPOCH_20240501221756 + 2.0,
            EPOCH_20240501221756 + 3.0,
        ]
    );

    // canonical attributes, fill sentinel first, extras preserved
    let temp = nc.variable("air_temperature").unwrap();
    assert_eq!(
        var_attr_str(&temp, "air_temperature__FillValue").as_deref(),
        Some("NaN")
    );
    assert_eq!(var_attr_str(&temp, "units").as_deref(), Some("Kelvin"));
    assert_eq!(var_attr_str(&temp, "long_name").as_deref(), Some("Air Temperature"));
    assert_eq!(var_attr_str(&temp, "sensor_serial").as_deref(), Some("A-1142"));
    assert!(temp.attribute("standard_name").is_none());

    let wspd = nc.variable("wind_speed").unwrap();
    assert_eq!(var_attr_str(&wspd, "wind_speed__FillValue").as_deref(), Some("NaN"));
    assert_eq!(var_attr_str(&wspd, "units").as_deref(), Some("m/s"));

    // global pass: schema literals, forced processing_level, leftovers kept
    assert_eq!(global_str(&nc, "Conventions").as_deref(), Some("CF-1.8, WMO-CF-1.0"));
    assert_eq!(global_str(&nc, "wmo__cf_profile").as_deref(), Some("FM 303-2024"));
    assert_eq!(global_str(&nc, "featureType").as_deref(), Some("trajectory"));
    assert_eq!(global_str(&nc, "platform_name").as_deref(), Some("NimbusUAS"));
    assert_eq!(global_str(&nc, "flight_id").as_deref(), Some("JBCC_1500m_VP"));
    assert_eq!(global_str(&nc, "processing_level").as_deref(), Some("raw"));
    assert_eq!(global_str(&nc, "pilot").as_deref(), Some("J. Doe"));
}

#[test]
fn normalizing_twice_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join(RAW_NAME);
    write_raw_flight(&raw);

    let schema = Schema::wmo();
    let staged_name = stage::output_name("007", "NimbusUAS", "20240501221756");
    stage::stage_file(&raw, dir.path(), &staged_name).unwrap();

    driver::normalize(dir.path(), &staged_name, &schema, EPOCH_20240501221756).unwrap();
    driver::normalize(dir.path(), &staged_name, &schema, EPOCH_20240501221756).unwrap();

    let nc = netcdf::open(dir.path().join(&staged_name)).unwrap();
    // time was not shifted a second time
    let time: Vec<f64> = nc.variable("time").unwrap().get_values(..).unwrap();
    assert_eq!(time[0], EPOCH_20240501221756);

    // exactly one fill sentinel per variable
    let temp = nc.variable("air_temperature").unwrap();
    let fills = temp
        .attributes()
        .filter(|a| a.name().ends_with("__FillValue"))
        .count();
    assert_eq!(fills, 1);
}

#[test]
fn airframe_override_rewrites_platform_name() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join(RAW_NAME);
    write_raw_flight(&raw);

    let schema = Schema::wmo();
    let staged_name = stage::output_name("007", "AstonMartinDB5", "20240501221756");
    stage::stage_file(&raw, dir.path(), &staged_name).unwrap();

    driver::normalize_with_airframe(
        dir.path(),
        &staged_name,
        &schema,
        EPOCH_20240501221756,
        Some("AstonMartinDB5"),
    )
    .unwrap();

    let nc = netcdf::open(dir.path().join(&staged_name)).unwrap();
    assert_eq!(global_str(&nc, "platform_name").as_deref(), Some("AstonMartinDB5"));
}

#[test]
fn a_flight_without_time_fails_at_the_time_stage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("20240502023139_Lat_0_Lon_0.nc");
    {
        let mut nc = netcdf::create(&path).unwrap();
        nc.add_dimension("obs", 2).unwrap();
        let mut var = nc.add_variable::<f64>("temp", &["obs"]).unwrap();
        var.put_values(&[288.0, 289.0], ..).unwrap();
    }

    let schema = Schema::wmo();
    let err = driver::normalize(dir.path(), "20240502023139_Lat_0_Lon_0.nc", &schema, 0.0)
        .unwrap_err();
    assert_eq!(err.stage, Stage::TimeNormalized);

    // nothing was committed: the alias rename never reached the disk
    let nc = netcdf::open(&path).unwrap();
    assert!(nc.variable("temp").is_some());
    assert!(nc.variable("air_temperature").is_none());
}

#[test]
fn airframe_identity_is_read_from_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join(RAW_NAME);
    write_raw_flight(&raw);
    assert_eq!(stage::airframe_from_file(&raw).unwrap().as_deref(), Some("NimbusUAS"));

    let bare = dir.path().join("20240502023139_Lat_0_Lon_0.nc");
    {
        let _nc = netcdf::create(&bare).unwrap();
    }
    assert_eq!(stage::airframe_from_file(&bare).unwrap(), None);
}
