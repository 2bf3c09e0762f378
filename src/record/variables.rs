//! Variables records: system, user and dependent variables of one data
//! folder.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use tracing::trace;

use crate::layout::ScalarKind::{Char, Float32, Float64, Int16, Int32};
use crate::layout::{latin1, null_terminated, Count, Field, StructValue, Structure, Value};
use crate::util::{byte_order, need_to_reorder_bytes, ByteOrder, Error, NumericType, Result};

pub static VAR_HEADER_COMMON: LazyLock<Structure> = LazyLock::new(|| {
    Structure::new(
        "VarHeaderCommon",
        vec![Field::new(Int16, "version").help("Version number for this header.")],
    )
});

pub static VAR_HEADER1: LazyLock<Arc<Structure>> = LazyLock::new(|| {
    Arc::new(Structure::new(
        "VarHeader1",
        vec![
            Field::new(Int16, "version").help("Version number is 1 for this header."),
            Field::new(Int16, "numSysVars").help("Number of system variables (K0, K1, ...)."),
            Field::new(Int16, "numUserVars").help("Number of user numeric variables -- may be zero."),
            Field::new(Int16, "numUserStrs").help("Number of user string variables -- may be zero."),
        ],
    ))
});

pub static VAR_HEADER2: LazyLock<Arc<Structure>> = LazyLock::new(|| {
    Arc::new(Structure::new(
        "VarHeader2",
        vec![
            Field::new(Int16, "version").help("Version number is 2 for this header."),
            Field::new(Int16, "numSysVars"),
            Field::new(Int16, "numUserVars"),
            Field::new(Int16, "numUserStrs"),
            Field::new(Int16, "numDependentVars").help("Number of dependent numeric variables -- may be zero."),
            Field::new(Int16, "numDependentStrs").help("Number of dependent string variables -- may be zero."),
        ],
    ))
});

pub static USER_STR_VAR_REC1: LazyLock<Structure> = LazyLock::new(|| {
    Structure::new(
        "UserStrVarRec1",
        vec![
            Field::new(Char, "name").count(32).help("Name of the string variable."),
            Field::new(Int16, "strLen").help("The real size of the following array."),
            Field::new(Char, "data"),
        ],
    )
});

pub static USER_STR_VAR_REC2: LazyLock<Structure> = LazyLock::new(|| {
    Structure::new(
        "UserStrVarRec2",
        vec![
            Field::new(Char, "name").count(32),
            Field::new(Int32, "strLen"),
            Field::new(Char, "data"),
        ],
    )
});

pub static VAR_NUM_REC: LazyLock<Arc<Structure>> = LazyLock::new(|| {
    Arc::new(Structure::new(
        "VarNumRec",
        vec![
            Field::new(Int16, "numType").help("Numeric type code of the value."),
            Field::new(Float64, "realPart"),
            Field::new(Float64, "imagPart").help("The imag part if the number is complex."),
            Field::new(Int32, "reserved").default(0i32),
        ],
    ))
});

pub static USER_NUM_VAR_REC: LazyLock<Arc<Structure>> = LazyLock::new(|| {
    Arc::new(Structure::new(
        "UserNumVarRec",
        vec![
            Field::new(Char, "name").count(32),
            Field::new(Int16, "type").help("0 = string, 1 = numeric."),
            Field::new(Arc::clone(&*VAR_NUM_REC), "num")
                .help("Type and value of the variable if it is numeric. Not used for string."),
        ],
    ))
});

pub static USER_DEPENDENT_VAR_REC: LazyLock<Structure> = LazyLock::new(|| {
    Structure::new(
        "UserDependentVarRec",
        vec![
            Field::new(Char, "name").count(32),
            Field::new(Int16, "type"),
            Field::new(Arc::clone(&*VAR_NUM_REC), "num"),
            Field::new(Int16, "formulaLen").help("The length of the dependency formula."),
            Field::new(Char, "formula").help("Start of the dependency formula."),
        ],
    )
});

/// Value of a numeric variable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumericValue {
    Real(f64),
    Complex(f64, f64),
}

impl NumericValue {
    /// Normalize an unpacked `VarNumRec`.
    fn from_struct(num: &StructValue) -> Result<Self> {
        let code = num.int("numType")? as i16;
        let re = num.float("realPart")?;
        if code % 2 != 0 {
            return Ok(Self::Complex(re, num.float("imagPart")?));
        }
        let integral = NumericType::from_code(code)
            .is_some_and(|t| !matches!(t, NumericType::Float32 | NumericType::Float64));
        Ok(Self::Real(if integral { re.trunc() } else { re }))
    }

    pub fn to_json(self) -> serde_json::Value {
        match self {
            Self::Real(v) => serde_json::json!(v),
            Self::Complex(re, im) => serde_json::json!([re, im]),
        }
    }
}

impl std::fmt::Display for NumericValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(v) => write!(f, "{}", v),
            Self::Complex(re, im) => write!(f, "{}+{}j", re, im),
        }
    }
}

/// A variable bound to a dependency formula.
#[derive(Clone, Debug, PartialEq)]
pub struct DependentVariable {
    pub name: String,
    /// `None` for dependent strings
    pub value: Option<NumericValue>,
    pub formula: String,
}

/// Normalized contents of a variables record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variables {
    pub version: i16,
    /// System variables K0, K1, ...
    pub sys_vars: Vec<f32>,
    /// User numeric variables; `None` marks a string-typed slot
    pub user_vars: BTreeMap<String, Option<NumericValue>>,
    pub user_strs: BTreeMap<String, String>,
    pub dependent_vars: Vec<DependentVariable>,
    pub dependent_strs: Vec<DependentVariable>,
}

impl Variables {
    pub fn to_json(&self) -> serde_json::Value {
        let user_vars: serde_json::Map<String, serde_json::Value> = self
            .user_vars
            .iter()
            .map(|(k, v)| (k.clone(), v.map_or(serde_json::Value::Null, NumericValue::to_json)))
            .collect();
        let dependent = |vars: &[DependentVariable]| -> Vec<serde_json::Value> {
            vars.iter()
                .map(|d| {
                    serde_json::json!({
                        "name": d.name,
                        "value": d.value.map_or(serde_json::Value::Null, NumericValue::to_json),
                        "formula": d.formula,
                    })
                })
                .collect()
        };
        serde_json::json!({
            "version": self.version,
            "sys_vars": self.sys_vars,
            "user_vars": user_vars,
            "user_strs": self.user_strs,
            "dependent_vars": dependent(&self.dependent_vars),
            "dependent_strs": dependent(&self.dependent_strs),
        })
    }
}

/// Header version and effective byte order of a variables payload.
///
/// A known record byte order is used as is; otherwise the order is
/// detected from the header version.
fn detect_version(data: &[u8], order: Option<ByteOrder>) -> Result<(i16, ByteOrder)> {
    let available = data.len();
    if available < VAR_HEADER_COMMON.size() {
        return Err(Error::short(VAR_HEADER_COMMON.name(), VAR_HEADER_COMMON.size(), available));
    }
    if let Some(order) = order {
        return Ok((order.read_i16(data), order.resolve()));
    }
    let version = ByteOrder::Native.read_i16(data);
    let reorder = need_to_reorder_bytes(version);
    let order = byte_order(reorder);
    Ok((order.read_i16(data), order))
}

/// Unpack a record that ends in one inline payload byte.
///
/// The inline byte is the first byte of the payload, so it is absent
/// from the file when the payload is empty.
fn unpack_var_rec(s: &Structure, data: &[u8], offset: usize, order: ByteOrder) -> Result<StructValue> {
    let available = data.len().saturating_sub(offset);
    if available + 1 == s.size() {
        let mut padded = data[offset..].to_vec();
        padded.push(0);
        return s.unpack(&padded, order);
    }
    s.unpack_from(data, offset, order)
}

/// Payload of a variable-length record starting at `offset`. Returns the
/// payload and the offset just past it.
fn var_payload<'a>(
    s: &Structure,
    rec: &StructValue,
    len_field: &str,
    data: &'a [u8],
    offset: usize,
) -> Result<(&'a [u8], usize)> {
    let len = rec.int(len_field)?;
    let len = usize::try_from(len)
        .map_err(|_| Error::invalid(format!("{}.{} is negative: {}", s.name(), len_field, len)))?;
    let start = offset + s.size() - 1;
    let end = start + len;
    let payload = data
        .get(start..end)
        .ok_or_else(|| Error::short(s.name(), end - offset, data.len().saturating_sub(offset)))?;
    Ok((payload, end))
}

fn user_numeric(rec: &StructValue) -> Result<(String, Option<NumericValue>)> {
    let name = rec.string("name")?;
    let value = if rec.int("type")? != 0 {
        Some(NumericValue::from_struct(rec.structure("num")?)?)
    } else {
        None
    };
    Ok((name, value))
}

fn struct_items(value: Option<&Value>) -> Vec<&StructValue> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_struct).collect(),
        Some(Value::Struct(s)) => vec![s],
        _ => Vec::new(),
    }
}

/// Decode a variables record payload.
///
/// Returns the normalized variables and the byte order they were read in.
pub fn decode_variables(data: &[u8], order: Option<ByteOrder>) -> Result<(Variables, ByteOrder)> {
    let (version, order) = detect_version(data, order)?;
    let (header_struct, str_struct) = match version {
        1 => (&*VAR_HEADER1, &*USER_STR_VAR_REC1),
        2 => (&*VAR_HEADER2, &*USER_STR_VAR_REC2),
        _ => {
            return Err(Error::UnsupportedVersion {
                what: "variables record",
                version: i32::from(version),
            })
        }
    };
    let header = header_struct.unpack(data, order)?;
    let count = |name: &str| -> Result<usize> { Ok(usize::try_from(header.int(name)?).unwrap_or(0)) };
    trace!(version, %order, "variables record");

    let fixed = Structure::new(
        "variables",
        vec![
            Field::new(Arc::clone(header_struct), "header"),
            Field::new(Float32, "sysVars").count(Count::Fixed(count("numSysVars")?)),
            Field::new(Arc::clone(&*USER_NUM_VAR_REC), "userVars").count(Count::Fixed(count("numUserVars")?)),
        ],
    );
    let values = fixed.unpack(data, order)?;
    let mut offset = fixed.size();

    let mut vars = Variables {
        version,
        sys_vars: values.floats("sysVars")?.into_iter().map(|v| v as f32).collect(),
        ..Default::default()
    };
    for rec in struct_items(values.get("userVars")) {
        let (name, value) = user_numeric(rec)?;
        vars.user_vars.insert(name, value);
    }

    for _ in 0..count("numUserStrs")? {
        let rec = unpack_var_rec(str_struct, data, offset, order)?;
        let (payload, end) = var_payload(str_struct, &rec, "strLen", data, offset)?;
        vars.user_strs.insert(rec.string("name")?, latin1(payload));
        offset = end;
    }

    if version == 2 {
        for _ in 0..count("numDependentVars")? {
            let (var, end) = dependent_variable(data, offset, order)?;
            vars.dependent_vars.push(var);
            offset = end;
        }
        for _ in 0..count("numDependentStrs")? {
            let (var, end) = dependent_variable(data, offset, order)?;
            vars.dependent_strs.push(var);
            offset = end;
        }
    }

    if offset != data.len() {
        return Err(Error::TrailingData(data.len() - offset));
    }
    Ok((vars, order))
}

fn dependent_variable(data: &[u8], offset: usize, order: ByteOrder) -> Result<(DependentVariable, usize)> {
    let s = &*USER_DEPENDENT_VAR_REC;
    let rec = unpack_var_rec(s, data, offset, order)?;
    let (payload, end) = var_payload(s, &rec, "formulaLen", data, offset)?;
    let (name, value) = user_numeric(&rec)?;
    Ok((
        DependentVariable {
            name,
            value,
            formula: null_terminated(payload),
        },
        end,
    ))
}
