// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Error Handling for the Host Runtime
//!
//! Every metered host call, memory adapter operation and genesis assembly
//! step returns [`HostResult`]. The variants map onto the failure classes the
//! call dispatcher distinguishes:
//!
//! - **OutOfGas** - fatal to the current call tree, nothing is committed
//! - **MemoryFault** - bad pointer, allocator failure, header out of bounds
//! - **DependencyResolution** - genesis assembly failures (roles, scopes, cycles)
//! - **Validation** - malformed contract entries, signatures or code payloads
//! - **Execution** - host-side failures that are not one of the above
//! - **Revert** / **Finish** - guest-requested termination
//!
//! # Usage
//!
//! ```rust
//! use wasmx_host::error::*;
//!
//! let err = memory_fault("allocator returned null", Some(0), Some(32));
//! assert_eq!(err.category(), "memory");
//! ```

use thiserror::Error;

/// Result type for host runtime operations
pub type HostResult<T> = Result<T, HostError>;

/// Errors produced by the host runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Gas limit exceeded
    #[error("out of gas in {descriptor}: limit {limit}, used {used}, requested {requested}")]
    OutOfGas {
        descriptor: String,
        limit: u64,
        used: u64,
        requested: u64,
    },
    /// Guest memory could not be read or written
    #[error("memory fault: {message}")]
    MemoryFault {
        message: String,
        offset: Option<u64>,
        length: Option<u64>,
    },
    /// Genesis or dependency graph could not be resolved
    #[error("dependency resolution failed: {message}")]
    DependencyResolution { message: String },
    /// Malformed input rejected before use
    #[error("validation failed: {message}")]
    Validation { message: String },
    /// Host-side execution failure
    #[error("[{function}] execution error: {message}")]
    Execution { message: String, function: String },
    /// Guest requested a revert with the given payload
    #[error("execution reverted ({} bytes)", data.len())]
    Revert { data: Vec<u8> },
    /// Guest stopped successfully through `finish`
    #[error("execution finished")]
    Finish,
}

/// Helper function to create an out-of-gas error
pub fn out_of_gas(descriptor: &str, limit: u64, used: u64, requested: u64) -> HostError {
    HostError::OutOfGas {
        descriptor: descriptor.to_string(),
        limit,
        used,
        requested,
    }
}

/// Helper function to create a memory fault
pub fn memory_fault(message: &str, offset: Option<u64>, length: Option<u64>) -> HostError {
    HostError::MemoryFault {
        message: message.to_string(),
        offset,
        length,
    }
}

/// Helper function to create a dependency resolution error
pub fn resolution_error(message: impl Into<String>) -> HostError {
    HostError::DependencyResolution {
        message: message.into(),
    }
}

/// Helper function to create a validation error
pub fn validation_error(message: impl Into<String>) -> HostError {
    HostError::Validation {
        message: message.into(),
    }
}

/// Helper function to create an execution error
pub fn execution_error(message: &str, function: &str) -> HostError {
    HostError::Execution {
        message: message.to_string(),
        function: function.to_string(),
    }
}

impl HostError {
    /// Get error category as string
    pub fn category(&self) -> &'static str {
        match self {
            HostError::OutOfGas { .. } => "gas",
            HostError::MemoryFault { .. } => "memory",
            HostError::DependencyResolution { .. } => "dependency",
            HostError::Validation { .. } => "validation",
            HostError::Execution { .. } => "execution",
            HostError::Revert { .. } => "revert",
            HostError::Finish => "finish",
        }
    }

    pub fn is_out_of_gas(&self) -> bool {
        matches!(self, HostError::OutOfGas { .. })
    }

    /// True for the two variants a guest raises on purpose.
    pub fn is_guest_termination(&self) -> bool {
        matches!(self, HostError::Revert { .. } | HostError::Finish)
    }
}

impl From<serde_json::Error> for HostError {
    fn from(err: serde_json::Error) -> Self {
        validation_error(format!("invalid json: {}", err))
    }
}

impl From<hex::FromHexError> for HostError {
    fn from(err: hex::FromHexError) -> Self {
        validation_error(format!("invalid hex: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_properties() {
        let err = out_of_gas("storageStore", 100, 90, 20);
        assert_eq!(err.category(), "gas");
        assert!(err.is_out_of_gas());
        assert!(!err.is_guest_termination());

        let err = memory_fault("header out of bounds", Some(65532), Some(4));
        assert_eq!(err.category(), "memory");

        assert!(HostError::Finish.is_guest_termination());
        assert!(HostError::Revert { data: vec![1] }.is_guest_termination());
    }

    #[test]
    fn test_error_display() {
        let err = execution_error("no such role", "getAddressByRole");
        assert_eq!(
            err.to_string(),
            "[getAddressByRole] execution error: no such role"
        );

        let err = out_of_gas("log", 10, 8, 5);
        assert_eq!(
            err.to_string(),
            "out of gas in log: limit 10, used 8, requested 5"
        );

        let err = HostError::Revert { data: vec![0; 3] };
        assert_eq!(err.to_string(), "execution reverted (3 bytes)");
    }

    #[test]
    fn test_error_conversions() {
        let err: HostError = hex::decode("zz").unwrap_err().into();
        assert_eq!(err.category(), "validation");

        let err: HostError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert_eq!(err.category(), "validation");
    }
}
