// USAGE cargo run --release -- -o 007 -a AstonMartinDB5 -t 19641222000000 --stage-dir stage --upload-dir upload
//
// Every *.nc dropped in the stage directory is copied to the upload
// directory under its UASDC name, normalized to the WMO schema, and pushed
// to the entry store. Files are processed strictly one at a time; the file
// format does not tolerate concurrent writers.

use anyhow::{bail, Context, Result};
use clap::Parser;
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use uasdc_process::driver;
use uasdc_process::flighttime;
use uasdc_process::schema::Schema;
use uasdc_process::stage;
use uasdc_process::upload::{DirStore, ObjectStore};

#[derive(Parser, Debug)]
#[command(name = "uasdc_process", version, about = "Normalize UAS flight files to the WMO UASDC format and stage them for upload")]
struct Args {
    /// Operator ID for the output file name
    #[arg(short = 'o', long)]
    operator_id: String,

    /// Airframe ID; read from each file's platform_name global when omitted
    #[arg(short = 'a', long)]
    airframe_id: Option<String>,

    /// Flight time as YYYYMMDDHHMMSS; parsed from each file name when omitted
    #[arg(short = 't', long)]
    flighttime: Option<String>,

    /// Directory the aircraft drops raw files into
    #[arg(long, default_value = "stage")]
    stage_dir: PathBuf,

    /// Directory holding renamed files ready for upload
    #[arg(long, default_value = "upload")]
    upload_dir: PathBuf,

    /// Entry-store root; falls back to $UASDC_ENTRY_STORE
    #[arg(long)]
    entry_store: Option<PathBuf>,

    /// Normalize and stage only, skip the upload step
    #[arg(long)]
    no_upload: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let store = if args.no_upload {
        None
    } else {
        let root = args
            .entry_store
            .clone()
            .or_else(|| std::env::var_os("UASDC_ENTRY_STORE").map(PathBuf::from))
            .context("no entry store configured; pass --entry-store, set UASDC_ENTRY_STORE, or use --no-upload")?;
        Some(DirStore::new(root))
    };

    let flights = list_flights(&args.stage_dir)?;
    if flights.is_empty() {
        bail!("no .nc files found in {}", args.stage_dir.display());
    }
    std::fs::create_dir_all(&args.upload_dir)?;

    let schema = Schema::wmo();
    let mut failures = 0usize;
    for flight in &flights {
        if let Err(err) = process_one(&args, &schema, flight, store.as_ref()) {
            error!("{}: {err:#}", flight.display());
            failures += 1;
        }
    }

    if let Some(store) = &store {
        println!("Entry store now holds:");
        for key in store.list()? {
            println!("  {key}");
        }
    }

    if failures > 0 {
        bail!("{failures} of {} files failed", flights.len());
    }
    info!(files = flights.len(), "all flights processed");
    Ok(())
}

fn list_flights(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut v: Vec<_> = glob(&format!("{}/*.nc", dir.display()))?
        .filter_map(Result::ok)
        .collect();
    v.sort();
    Ok(v)
}

fn process_one(
    args: &Args,
    schema: &Schema,
    flight: &Path,
    store: Option<&DirStore>,
) -> Result<()> {
    let fname = flight
        .file_name()
        .and_then(|s| s.to_str())
        .context("flight path has no usable file name")?;

    let flight_time = match &args.flighttime {
        Some(t) => t.clone(),
        None => flighttime::leading_timestamp(fname)
            .context("file name carries no timestamp; pass -t YYYYMMDDHHMMSS")?,
    };
    let reference_epoch = flighttime::flight_time_to_epoch(&flight_time)? as f64;

    let airframe = match &args.airframe_id {
        Some(a) => a.clone(),
        None => stage::airframe_from_file(flight)?
            .context("file carries no platform_name; pass -a <airframeID>")?,
    };

    let staged_name = stage::output_name(&args.operator_id, &airframe, &flight_time);
    stage::stage_file(flight, &args.upload_dir, &staged_name)?;
    info!(file = fname, staged = %staged_name, "staged");

    // Trust the file's own platform_name unless the operator overrode it.
    match &args.airframe_id {
        Some(a) => driver::normalize_with_airframe(
            &args.upload_dir,
            &staged_name,
            schema,
            reference_epoch,
            Some(a),
        )?,
        None => driver::normalize(&args.upload_dir, &staged_name, schema, reference_epoch)?,
    }

    if let Some(store) = store {
        store.put(&args.upload_dir.join(&staged_name), &staged_name)?;
        info!(key = %staged_name, "uploaded to entry store");
    }
    Ok(())
}
