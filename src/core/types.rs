// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::error::{validation_error, HostResult};
use std::fmt;

/// Native WASM value types a host function signature is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    I32,
    I64,
    F32,
    F64,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// A single native WASM value crossing the host boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WasmValue {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl WasmValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            WasmValue::I32(_) => ValueType::I32,
            WasmValue::I64(_) => ValueType::I64,
            WasmValue::F32(_) => ValueType::F32,
            WasmValue::F64(_) => ValueType::F64,
        }
    }

    pub fn as_i32(&self) -> HostResult<i32> {
        match self {
            WasmValue::I32(v) => Ok(*v),
            other => Err(validation_error(format!(
                "expected i32, found {}",
                other.value_type()
            ))),
        }
    }

    pub fn as_i64(&self) -> HostResult<i64> {
        match self {
            WasmValue::I64(v) => Ok(*v),
            other => Err(validation_error(format!(
                "expected i64, found {}",
                other.value_type()
            ))),
        }
    }
}

impl From<i32> for WasmValue {
    fn from(value: i32) -> Self {
        WasmValue::I32(value)
    }
}

impl From<i64> for WasmValue {
    fn from(value: i64) -> Self {
        WasmValue::I64(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(WasmValue::I32(7).as_i32().unwrap(), 7);
        assert_eq!(WasmValue::from(9i64).as_i64().unwrap(), 9);
        assert!(WasmValue::I64(1).as_i32().is_err());
        assert_eq!(WasmValue::F64(1.5).value_type(), ValueType::F64);
        assert_eq!(ValueType::I64.to_string(), "i64");
    }
}
