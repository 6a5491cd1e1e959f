//! The open flight file.
//!
//! The netCDF C API offers no atomic variable rename and no attribute
//! delete, so the file is read whole into an insertion-ordered in-memory
//! model, mutated there, and written back over the staged copy on
//! [`FlightFile::commit`]. Until commit runs, the copy on disk is untouched.

use indexmap::IndexMap;
use netcdf::AttributeValue;
use std::path::{Path, PathBuf};

use crate::error::NormalizeError;

/// Insertion-ordered attribute name → value mapping, for one variable or for
/// the file itself.
pub type AttributeBag = IndexMap<String, AttributeValue>;

#[derive(Debug, Clone)]
pub(crate) struct Dim {
    pub len: usize,
    pub unlimited: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Var {
    pub dims: Vec<String>,
    /// Samples flattened in row-major order, widened to f64.
    pub values: Vec<f64>,
    pub attrs: AttributeBag,
}

/// One flight file, open for normalization.
///
/// Owned exclusively by the normalization driver for the duration of one
/// call: opened once, mutated by the resolver, time normalizer and attribute
/// rewriter in sequence, then committed (or dropped without touching disk).
#[derive(Debug)]
pub struct FlightFile {
    pub(crate) path: PathBuf,
    pub(crate) dims: IndexMap<String, Dim>,
    pub(crate) vars: IndexMap<String, Var>,
    pub(crate) globals: AttributeBag,
}

impl FlightFile {
    /// Read `path` into memory. Numeric variables of any width are widened
    /// to f64; a non-numeric variable is fatal.
    pub fn open(path: &Path) -> Result<Self, NormalizeError> {
        let nc = netcdf::open(path).map_err(|source| NormalizeError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut dims = IndexMap::new();
        for dim in nc.dimensions() {
            dims.insert(
                dim.name().to_string(),
                Dim { len: dim.len(), unlimited: dim.is_unlimited() },
            );
        }

        let mut vars = IndexMap::new();
        for var in nc.variables() {
            let name = var.name().to_string();
            let mut attrs = AttributeBag::new();
            for attr in var.attributes() {
                attrs.insert(attr.name().to_string(), attr.value()?);
            }
            let values: Vec<f64> = var
                .get_values(..)
                .map_err(|_| NormalizeError::UnsupportedVariable { name: name.clone() })?;
            let var_dims = var.dimensions().iter().map(|d| d.name().to_string()).collect();
            vars.insert(name, Var { dims: var_dims, values, attrs });
        }

        let mut globals = AttributeBag::new();
        for attr in nc.attributes() {
            globals.insert(attr.name().to_string(), attr.value()?);
        }

        Ok(Self { path: path.to_path_buf(), dims, vars, globals })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Rename a variable, keeping table order. Fails if `from` is missing or
    /// `to` already exists as a distinct variable.
    pub fn rename_variable(&mut self, from: &str, to: &str) -> Result<(), NormalizeError> {
        if !self.vars.contains_key(from) {
            return Err(NormalizeError::MissingVariable(from.to_string()));
        }
        if self.vars.contains_key(to) {
            return Err(NormalizeError::DuplicateVariable {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let old = std::mem::take(&mut self.vars);
        self.vars = old
            .into_iter()
            .map(|(name, var)| {
                if name == from {
                    (to.to_string(), var)
                } else {
                    (name, var)
                }
            })
            .collect();
        Ok(())
    }

    /// Write the in-memory state back over the file and release it.
    pub fn commit(self) -> Result<(), NormalizeError> {
        // netCDF cannot shrink an existing attribute table, so start clean.
        let _ = std::fs::remove_file(&self.path);
        let mut nc = netcdf::create(&self.path)?;

        for (name, dim) in &self.dims {
            if dim.unlimited {
                nc.add_unlimited_dimension(name)?;
            } else {
                nc.add_dimension(name, dim.len)?;
            }
        }

        for (name, var) in &self.vars {
            let dim_names: Vec<&str> = var.dims.iter().map(String::as_str).collect();
            let mut out = nc.add_variable::<f64>(name, &dim_names)?;
            for (attr, value) in &var.attrs {
                let value = if attr == "_FillValue" {
                    // must match the recreated (f64) variable type
                    coerce_to_double(value.clone())
                } else {
                    value.clone()
                };
                out.put_attribute(attr, value)?;
            }
            if var.dims.is_empty() {
                out.put_values(&var.values, ..)?;
            } else {
                let start = vec![0usize; var.dims.len()];
                let count: Vec<usize> = var
                    .dims
                    .iter()
                    .map(|d| self.dims.get(d.as_str()).map_or(0, |dim| dim.len))
                    .collect();
                out.put_values(&var.values, (start.as_slice(), count.as_slice()))?;
            }
        }

        for (name, value) in &self.globals {
            nc.add_attribute(name, value.clone())?;
        }

        Ok(())
    }
}

pub(crate) fn coerce_to_double(value: AttributeValue) -> AttributeValue {
    use netcdf::AttributeValue::{
        Double, Float, Int, Longlong, Schar, Short, Uchar, Uint, Ulonglong, Ushort,
    };
    match value {
        Uchar(x) => Double(f64::from(x)),
        Schar(x) => Double(f64::from(x)),
        Ushort(x) => Double(f64::from(x)),
        Short(x) => Double(f64::from(x)),
        Uint(x) => Double(f64::from(x)),
        Int(x) => Double(f64::from(x)),
        Ulonglong(x) => Double(x as f64),
        Longlong(x) => Double(x as f64),
        Float(x) => Double(f64::from(x)),
        other => other,
    }
}
