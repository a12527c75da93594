// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Loader and dispatcher tests
//!
//! Load plans are prepared from wat text; guests are mock instances whose
//! exports call back into the host through the linker.

#[cfg(test)]
mod tests {
    use crate::config::{CodeLimits, RuntimeConfig};
    use crate::core::HostImports;
    use crate::core::WasmValue;
    use crate::deps::{build_dep, SystemDep};
    use crate::entry_points::{EntryPoint, EntryPointRegistry};
    use crate::error::HostResult;
    use crate::gas_metering::{GasMeter, GasRegister};
    use crate::host::functions::{HOST_CALL_COST, SSTORE_COST};
    use crate::host::{CallResponse, ContractCall, ContractCallResult, HostEnvRegistry, WasmxHost};
    use crate::loader::{analyze, LoadPlan, ModuleLoader};
    use crate::memory::packed_i64::decode_ptr_i64;
    use crate::memory::registry::{
        MEMORY_ASSEMBLYSCRIPT, MEMORY_DEFAULT, MEMORY_ENTRYPOINT_ALLOC, MEMORY_ENTRYPOINT_FREE,
        MEMORY_RUST_I64,
    };
    use crate::memory::{AbiKind, AdapterRegistry, MemoryAbi, MemoryAdapter, PointerRepr};
    use crate::message::ExecutionMessage;
    use crate::runtime::{Dispatcher, ExecutionRequest};
    use crate::system::constants::*;
    use crate::system::{RoleTable, StorageScope};
    use crate::tests::mock_guest::{address, sample_env, MockGuest, MockHost};
    use num_bigint::BigUint;

    const CONTRACT_WAT: &str = r#"
        (module
          (import "wasmx" "getCallData" (func $call_data (result i64)))
          (import "wasmx" "storageStore" (func $store (param i64 i64)))
          (memory (export "memory") 1)
          (func (export "malloc") (param i32) (result i32) i32.const 0)
          (func (export "free") (param i32))
          (func (export "instantiate"))
          (func (export "execute"))
          (func (export "query")))
    "#;

    fn deps(labels: &[&str]) -> Vec<SystemDep> {
        labels.iter().map(|l| SystemDep::new(l)).collect()
    }

    fn plan() -> LoadPlan {
        ModuleLoader::default()
            .prepare(CONTRACT_WAT.as_bytes(), &deps(&[WASMX_ENV_2]), None)
            .unwrap()
    }

    /// Call a `wasmx` host function from inside a guest export.
    fn host_call(
        guest: &mut MockGuest,
        imports: &mut dyn HostImports,
        name: &str,
        inputs: &[&[u8]],
    ) -> HostResult<Vec<u8>> {
        let adapter = MemoryAdapter::packed_i64();
        let mut args = Vec::new();
        for input in inputs {
            args.extend(guest.pass(&adapter, input)?);
        }
        let out = imports.invoke(guest, WASMX_IMPORT_MODULE, name, &args)?;
        if out.is_empty() {
            Ok(Vec::new())
        } else {
            guest.take(&adapter, &out)
        }
    }

    /// Guest whose `name` export stores the call payload under `msg`, emits
    /// one event, then ends the way `tail` says.
    fn storing_guest(name: &str, tail: &'static str) -> MockGuest {
        MockGuest::packed_i64().with_export(name, move |guest, _, imports| {
            let envelope = host_call(guest, imports, "getCallData", &[])?;
            let message = ExecutionMessage::from_json_bytes(&envelope)?;
            host_call(guest, imports, "storageStore", &[b"msg", &message.data])?;
            host_call(guest, imports, "log", &[br#"{"data":"","topics":[]}"#])?;
            match tail {
                "finish" => host_call(guest, imports, "finish", &[b"done"])?,
                "revert" => host_call(guest, imports, "revert", &[b"nope"])?,
                _ => Vec::new(),
            };
            Ok(vec![])
        })
    }

    fn request(entry: EntryPoint, payload: &[u8], gas_limit: u64) -> ExecutionRequest {
        ExecutionRequest::new(entry, payload.to_vec(), sample_env(), gas_limit)
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(RuntimeConfig::default()).unwrap()
    }

    fn instance_cost(payload: &[u8]) -> u64 {
        let envelope = ExecutionMessage::new(payload.to_vec()).to_json_bytes().unwrap();
        GasRegister::new(RuntimeConfig::default().gas)
            .unwrap()
            .instance_costs(false, envelope.len())
    }

    #[test]
    fn test_analyze_lists_function_imports_and_exports() {
        let info = analyze(CONTRACT_WAT.as_bytes()).unwrap();
        assert_eq!(info.imports.len(), 2);
        assert_eq!(info.imports[0].module, "wasmx");
        assert_eq!(info.imports[1].name, "storageStore");
        assert!(info.exports.contains("execute"));
        assert!(!info.exports.contains("memory"));

        assert_eq!(analyze(b"not wasm").unwrap_err().category(), "validation");
    }

    #[test]
    fn test_adapter_selection() {
        let plan = plan();
        assert_eq!(plan.adapter_kind(), AbiKind::PackedI64);
        assert!(plan.host_module(WASMX_IMPORT_MODULE).is_some());
        assert!(plan.host_module(WASMX_CORE_IMPORT_MODULE).is_none());
        assert!(plan.has_export("query"));
        assert!(!plan.is_interpreted());
        assert!(plan.code.starts_with(b"\0asm"));

        let loader = ModuleLoader::default();
        let plan = loader
            .prepare(CONTRACT_WAT.as_bytes(), &deps(&[WASMX_ENV_I32_2]), None)
            .unwrap();
        assert_eq!(plan.adapter_kind(), AbiKind::TwoRegister);

        let plan = loader
            .prepare(
                CONTRACT_WAT.as_bytes(),
                &deps(&[MEMORY_ASSEMBLYSCRIPT, WASMX_ENV_I64_2, WASMX_CORE_ENV_I64_1]),
                None,
            )
            .unwrap();
        assert_eq!(plan.adapter_kind(), AbiKind::SelfDescribing);
        assert_eq!(plan.modules.len(), 2);
        assert_eq!(plan.host_interfaces, vec![WASMX_ENV_I64_2, WASMX_CORE_ENV_I64_1]);

        let err = loader
            .prepare(CONTRACT_WAT.as_bytes(), &deps(&["memory_unknown_9"]), None)
            .unwrap_err();
        assert_eq!(err.category(), "validation");
    }

    const RENAMED_ALLOC_WAT: &str = r#"
        (module
          (import "wasmx" "getCallData" (func $call_data (result i64)))
          (memory (export "memory") 1)
          (func (export "my_alloc") (param i32) (result i32) i32.const 0)
          (func (export "my_free") (param i32))
          (func (export "execute")))
    "#;

    #[test]
    fn test_renamed_allocator_exports() {
        let alloc_role = format!("{}my_alloc", MEMORY_ENTRYPOINT_ALLOC);
        let free_role = format!("{}my_free", MEMORY_ENTRYPOINT_FREE);
        let alloc_dep = build_dep(MEMORY_RUST_I64, &alloc_role);
        let free_dep = build_dep(MEMORY_RUST_I64, &free_role);
        let plan = ModuleLoader::default()
            .prepare(
                RENAMED_ALLOC_WAT.as_bytes(),
                &deps(&[alloc_dep.as_str(), free_dep.as_str(), WASMX_ENV_2]),
                None,
            )
            .unwrap();
        assert!(plan.libraries.is_empty());
        match &plan.adapter {
            MemoryAdapter::PackedI64(inner) => {
                assert_eq!(inner.alloc_export(), "my_alloc");
                assert_eq!(inner.free_export(), "my_free");
            }
            other => panic!("unexpected adapter {:?}", other),
        }

        // selection from exports alone, no memory label
        let plan_from_exports = ModuleLoader::default()
            .prepare(RENAMED_ALLOC_WAT.as_bytes(), &deps(&[WASMX_ENV_2]), None);
        assert_eq!(plan_from_exports.unwrap_err().category(), "validation");

        let mut guest = MockGuest::new()
            .with_export("my_alloc", |guest, args, _| {
                let size = args[0].as_i32()?;
                Ok(vec![WasmValue::I32(guest.bump(size as u32))])
            })
            .with_export("my_free", |guest, args, _| {
                guest.freed.push(args[0].as_i32()?);
                Ok(vec![])
            });
        let ptr = plan.adapter.allocate_and_write(&mut guest, b"renamed").unwrap();
        let PointerRepr::PackedI64(packed) = ptr else {
            panic!("unexpected pointer {:?}", ptr);
        };
        let data = plan.adapter.read_from_ptr(&mut guest, ptr).unwrap();
        assert_eq!(data, b"renamed");
        assert_eq!(guest.freed, vec![decode_ptr_i64(packed).0 as i32]);
    }

    #[test]
    fn test_imports_must_be_provided() {
        let loader = ModuleLoader::default();
        let unknown_function = r#"(module (import "wasmx" "selfDestruct" (func)) (func (export "alloc") (param i32) (result i32) i32.const 0))"#;
        let err = loader
            .prepare(unknown_function.as_bytes(), &deps(&[WASMX_ENV_2]), None)
            .unwrap_err();
        assert_eq!(err.category(), "validation");
        assert!(err.to_string().contains("selfDestruct"));

        let detached_module = r#"(module (import "wasmxcore" "getAddressByRole" (func (param i32 i32) (result i32))) (func (export "alloc") (param i32) (result i32) i32.const 0))"#;
        let err = loader
            .prepare(detached_module.as_bytes(), &deps(&[WASMX_ENV_2]), None)
            .unwrap_err();
        assert!(err.to_string().contains("not attached"));

        let plan = loader
            .prepare(
                detached_module.as_bytes(),
                &deps(&[WASMX_ENV_2, WASMX_CORE_ENV_I32_1]),
                None,
            )
            .unwrap();
        assert_eq!(plan.imports.len(), 1);
        assert_eq!(plan.adapter_kind(), AbiKind::TwoRegister);

        let err = loader
            .prepare(CONTRACT_WAT.as_bytes(), &deps(&["wasmx_env_9"]), None)
            .unwrap_err();
        assert!(err.to_string().contains("unsupported host interface"));
    }

    #[test]
    fn test_code_size_ceiling() {
        let limits = CodeLimits {
            max_wasm_size: 64,
            max_interpreted_code_size: 8,
            ..CodeLimits::default()
        };
        let loader = ModuleLoader::new(AdapterRegistry::default(), HostEnvRegistry::default(), limits);
        let err = loader
            .prepare(CONTRACT_WAT.as_bytes(), &deps(&[WASMX_ENV_2]), None)
            .unwrap_err();
        assert_eq!(err.category(), "validation");

        let source_deps = deps(&[INTERPRETER_PYTHON, MEMORY_DEFAULT, WASMX_ENV_2]);
        let entry = vec!["execute".to_string()];
        assert!(loader.prepare(b"x = 1", &source_deps, Some(entry.as_slice())).is_ok());
        assert!(loader.prepare(b"x = 1 + 2 + 3", &source_deps, Some(entry.as_slice())).is_err());
        assert!(loader.prepare(b"", &source_deps, Some(entry.as_slice())).is_err());
    }

    #[test]
    fn test_interpreted_source() {
        let loader = ModuleLoader::default();
        let source_deps = vec![
            SystemDep::new(INTERPRETER_PYTHON),
            SystemDep::new(MEMORY_DEFAULT),
            SystemDep::new(WASMX_ENV_2),
            SystemDep::library(ADDR_LOBBY_LIBRARY, ROLE_LIBRARY),
        ];
        let entry = vec!["instantiate".to_string(), "execute".to_string()];
        let source = b"def execute(input):\n    return input\n";

        let plan = loader.prepare(source, &source_deps, Some(entry.as_slice())).unwrap();
        assert!(plan.is_interpreted());
        assert_eq!(plan.interpreter.as_deref(), Some(INTERPRETER_PYTHON));
        assert_eq!(plan.code, source.to_vec());
        assert_eq!(plan.adapter_kind(), AbiKind::TwoRegister);
        assert_eq!(plan.libraries.len(), 1);
        assert!(plan.has_export("execute"));
        assert!(!plan.has_export("query"));

        let err = loader
            .prepare(&[0x66, 0xff, 0xfe], &source_deps, Some(entry.as_slice()))
            .unwrap_err();
        assert!(err.to_string().contains("utf8"));
    }

    #[test]
    fn test_execute_commits_storage() {
        let plan = plan();
        let mut guest = storing_guest("execute", "");
        let mut host = MockHost::new();
        let outcome = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Execute, b"hello", 1_000_000),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.data.is_empty());
        assert_eq!(host.get(&address(1), b"msg"), Some(&b"hello".to_vec()));
        assert_eq!(outcome.logs.len(), 1);
        assert_eq!(outcome.logs[0].contract_address, address(1));
        assert_eq!(outcome.logs[0].system_dependency, WASMX_ENV_2);
        assert_eq!(
            outcome.gas_used,
            instance_cost(b"hello") + 3 * HOST_CALL_COST + SSTORE_COST
        );
    }

    #[test]
    fn test_finish_commits_and_returns_data() {
        let plan = plan();
        let mut guest = storing_guest("instantiate", "finish");
        let mut host = MockHost::new();
        let outcome = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Instantiate, b"init", 1_000_000),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.data, b"done".to_vec());
        assert_eq!(outcome.logs.len(), 1);
        assert_eq!(host.get(&address(1), b"msg"), Some(&b"init".to_vec()));
    }

    #[test]
    fn test_revert_discards_writes() {
        let plan = plan();
        let mut guest = storing_guest("execute", "revert");
        let mut host = MockHost::new();
        let outcome = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Execute, b"hello", 1_000_000),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.data, b"nope".to_vec());
        assert!(outcome.logs.is_empty());
        assert!(host.storage.is_empty());
    }

    #[test]
    fn test_out_of_gas_is_fatal() {
        let plan = plan();
        let mut guest = storing_guest("execute", "");
        let mut host = MockHost::new();
        let limit = instance_cost(b"hello") + HOST_CALL_COST + 100;
        let err = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Execute, b"hello", limit),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap_err();

        assert!(err.is_out_of_gas());
        assert!(host.storage.is_empty());

        let err = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Execute, b"hello", 1),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap_err();
        assert!(err.is_out_of_gas());
    }

    #[test]
    fn test_metering_off() {
        let plan = plan();
        let mut guest = storing_guest("execute", "");
        let mut host = MockHost::new();
        let mut req = request(EntryPoint::Execute, b"hello", 0);
        req.metering_off = true;
        let outcome = dispatcher()
            .execute(&mut guest, &plan, req, &mut host, &RoleTable::default())
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.gas_used, 3 * HOST_CALL_COST + SSTORE_COST);
        assert!(host.get(&address(1), b"msg").is_some());
    }

    #[test]
    fn test_pinned_and_scoped_request() {
        let plan = plan();
        let mut guest = storing_guest("execute", "");
        let mut host = MockHost::new();
        let mut req = request(EntryPoint::Execute, b"hello", 1_000_000);
        req.pinned = true;
        req.scope = StorageScope::SingleConsensus;
        let outcome = dispatcher()
            .execute(&mut guest, &plan, req, &mut host, &RoleTable::default())
            .unwrap();

        assert!(outcome.gas_used < instance_cost(b"hello") + 3 * HOST_CALL_COST + SSTORE_COST);
        assert!(host.get(&address(1), b"msg").is_none());
        assert!(host
            .storage
            .contains_key(&(StorageScope::SingleConsensus, address(1), b"msg".to_vec())));
    }

    #[test]
    fn test_query_is_read_only() {
        let plan = plan();
        let mut guest = storing_guest("query", "");
        let mut host = MockHost::new();
        let err = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Query, b"hello", 1_000_000),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap_err();
        assert_eq!(err.category(), "execution");
        assert!(host.storage.is_empty());

        host.storage_set(StorageScope::CoreConsensus, &address(1), b"msg", b"stored");
        let mut guest = MockGuest::packed_i64().with_export("query", |guest, _, imports| {
            let value = host_call(guest, imports, "storageLoad", &[b"msg"])?;
            host_call(guest, imports, "finish", &[&value])?;
            Ok(vec![])
        });
        let outcome = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Query, b"", 1_000_000),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.data, b"stored".to_vec());
    }

    #[test]
    fn test_entry_point_checks() {
        let plan = plan();
        let mut guest = storing_guest("execute", "");
        let mut host = MockHost::new();
        let custom = EntryPoint::Custom("migrate".to_string());

        let err = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(custom.clone(), b"", 1_000_000),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap_err();
        assert_eq!(err.category(), "validation");
        assert!(err.to_string().contains("not registered"));

        let mut registry = EntryPointRegistry::new();
        assert!(registry.register("migrate"));
        let err = dispatcher()
            .with_entry_points(registry)
            .execute(
                &mut guest,
                &plan,
                request(custom, b"", 1_000_000),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("does not export"));

        let err = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Reply, b"", 1_000_000),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("does not export"));

        // exported by the module but missing from the instance
        let err = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Query, b"", 1_000_000),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap_err();
        assert_eq!(err.category(), "validation");
        assert!(host.storage.is_empty());
    }

    #[test]
    fn test_host_call_base_cost() {
        let mut config = RuntimeConfig::default();
        config.gas.host_call_base_cost = 500;
        let plan = plan();
        let mut guest = storing_guest("execute", "");
        let mut host = MockHost::new();
        let mut req = request(EntryPoint::Execute, b"hello", 0);
        req.metering_off = true;
        let outcome = Dispatcher::new(config)
            .unwrap()
            .execute(&mut guest, &plan, req, &mut host, &RoleTable::default())
            .unwrap();
        assert_eq!(outcome.gas_used, 2 * 500 + SSTORE_COST);
    }

    /// Guest whose `execute` sends 5 to `address(3)` through `call`, keeps
    /// the call response under `resp`, then ends the way `tail` says.
    fn paying_guest(tail: &'static str) -> MockGuest {
        MockGuest::packed_i64().with_export("execute", move |guest, _, imports| {
            let req = serde_json::json!({ "to": address(3), "value": "5" });
            let req = serde_json::to_vec(&req).unwrap();
            let resp = host_call(guest, imports, "call", &[&req])?;
            host_call(guest, imports, "storageStore", &[b"resp", &resp])?;
            if tail == "revert" {
                host_call(guest, imports, "revert", &[b"nope"])?;
            }
            Ok(vec![])
        })
    }

    fn funded_host() -> MockHost {
        let mut host = MockHost::new();
        host.balances.insert(address(1), BigUint::from(10u32));
        host.contracts.insert(address(3));
        host
    }

    fn call_response(host: &MockHost) -> CallResponse {
        serde_json::from_slice(host.get(&address(1), b"resp").unwrap()).unwrap()
    }

    fn balance(host: &MockHost, byte: u8) -> BigUint {
        host.balances.get(&address(byte)).cloned().unwrap_or_default()
    }

    #[test]
    fn test_call_value_moves_on_commit() {
        let plan = plan();
        let mut guest = paying_guest("");
        let mut host = funded_host();
        let outcome = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Execute, b"pay", 1_000_000),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap();

        assert!(outcome.success);
        assert_eq!(call_response(&host).success, 0);
        assert_eq!(host.calls.len(), 1);
        assert_eq!(host.calls[0].value, BigUint::from(5u32));
        assert_eq!(host.transfers.len(), 1);
        assert_eq!(balance(&host, 1), BigUint::from(5u32));
        assert_eq!(balance(&host, 3), BigUint::from(5u32));
    }

    #[test]
    fn test_revert_keeps_call_value() {
        let plan = plan();
        let mut guest = paying_guest("revert");
        let mut host = funded_host();
        let outcome = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Execute, b"pay", 1_000_000),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(host.calls.len(), 1);
        assert!(host.transfers.is_empty());
        assert_eq!(balance(&host, 1), BigUint::from(10u32));
        assert_eq!(balance(&host, 3), BigUint::default());
    }

    #[test]
    fn test_depth_limit_keeps_call_value() {
        let plan = plan();
        let mut guest = paying_guest("");
        let mut host = funded_host();
        let mut req = request(EntryPoint::Execute, b"pay", 1_000_000);
        req.depth = RuntimeConfig::default().max_call_depth;
        let outcome = dispatcher()
            .execute(&mut guest, &plan, req, &mut host, &RoleTable::default())
            .unwrap();

        assert!(outcome.success);
        assert_eq!(call_response(&host).success, 1);
        assert!(host.calls.is_empty());
        assert!(host.transfers.is_empty());
        assert_eq!(balance(&host, 1), BigUint::from(10u32));
    }

    #[test]
    fn test_failed_nested_call_keeps_value() {
        let plan = plan();
        let mut guest = paying_guest("");
        let mut host = funded_host();
        host.call_handler = Some(Box::new(|_: &ContractCall, _: &mut GasMeter| {
            Ok(ContractCallResult::failure(b"no".to_vec()))
        }));
        let outcome = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Execute, b"pay", 1_000_000),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap();

        assert!(outcome.success);
        let response = call_response(&host);
        assert_eq!(response.success, 1);
        assert_eq!(response.data, b"no".to_vec());
        assert_eq!(host.calls.len(), 1);
        assert!(host.transfers.is_empty());
        assert_eq!(balance(&host, 1), BigUint::from(10u32));
    }

    #[test]
    fn test_out_of_gas_keeps_call_value() {
        let plan = plan();
        let mut guest = paying_guest("");
        let mut host = funded_host();
        let limit = instance_cost(b"pay") + 2_000;
        let err = dispatcher()
            .execute(
                &mut guest,
                &plan,
                request(EntryPoint::Execute, b"pay", limit),
                &mut host,
                &RoleTable::default(),
            )
            .unwrap_err();

        assert!(err.is_out_of_gas());
        assert!(host.transfers.is_empty());
        assert_eq!(balance(&host, 1), BigUint::from(10u32));
    }
}
