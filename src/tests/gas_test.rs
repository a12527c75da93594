// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::core::HostImports;
    use crate::error::{out_of_gas, HostResult};
    use crate::gas_metering::{ExternalMeter, GasConfig, GasMeter, GasRegister};
    use crate::host::{CallContext, HostModule, Linker};
    use crate::system::RoleTable;
    use crate::tests::mock_guest::{codec, sample_env, MockHost};
    use proptest::prelude::*;

    /// Framework meter that records what it was asked to charge.
    struct RecordingMeter {
        charged: Rc<RefCell<Vec<u64>>>,
    }

    impl ExternalMeter for RecordingMeter {
        fn consume_gas(&mut self, amount: u64, descriptor: &str) -> HostResult<()> {
            self.charged.borrow_mut().push(amount);
            Err(out_of_gas(descriptor, 0, 0, amount))
        }
    }

    proptest! {
        #[test]
        fn prop_consumed_is_sum_before_breach(
            limit in 0u64..10_000,
            amounts in proptest::collection::vec(0u64..2_000, 0..32),
        ) {
            let mut meter = GasMeter::new(limit);
            let mut applied = 0u64;
            let mut breached = false;
            for amount in amounts {
                let result = meter.consume(amount, "step");
                if breached {
                    prop_assert!(result.is_err());
                    continue;
                }
                if applied + amount > limit {
                    prop_assert!(result.unwrap_err().is_out_of_gas());
                    breached = true;
                } else {
                    prop_assert!(result.is_ok());
                    applied += amount;
                }
                prop_assert_eq!(meter.consumed(), applied);
            }
            prop_assert_eq!(meter.consumed(), applied);
            prop_assert_eq!(meter.is_exhausted(), breached);
        }
    }

    #[test]
    fn test_breach_leaves_state_untouched() {
        let mut meter = GasMeter::new(100);
        meter.consume(60, "a").unwrap();
        let err = meter.consume(41, "b").unwrap_err();
        assert_eq!(err, out_of_gas("b", 100, 60, 41));
        assert_eq!(meter.consumed(), 60);
        assert_eq!(meter.remaining(), 40);

        // exhausted meters refuse even amounts that would fit
        assert!(meter.consume(1, "c").is_err());
        assert_eq!(meter.consumed(), 60);

        let mut meter = GasMeter::new(10);
        assert!(meter.consume(u64::MAX, "overflow").is_err());
        assert_eq!(meter.consumed(), 0);
    }

    #[test]
    fn test_delegate_is_consulted_once() {
        let charged = Rc::new(RefCell::new(Vec::new()));
        let mut meter = GasMeter::with_delegate(
            50,
            Box::new(RecordingMeter {
                charged: charged.clone(),
            }),
        );
        meter.consume(50, "fill").unwrap();
        assert!(meter.consume(5, "breach").is_err());
        assert!(meter.consume(5, "again").is_err());
        assert_eq!(*charged.borrow(), vec![5]);
    }

    #[test]
    fn test_nested_meters() {
        let mut parent = GasMeter::new(1_000);
        parent.consume(400, "setup").unwrap();

        let mut child = parent.nested(5_000);
        assert_eq!(child.limit(), 600);
        child.consume(250, "inner").unwrap();
        parent.absorb(&child, "call").unwrap();
        assert_eq!(parent.consumed(), 650);

        let mut child = parent.nested(100);
        assert!(child.consume(101, "inner").is_err());
        assert_eq!(child.consumed(), 0);
        parent.absorb(&child, "call").unwrap();
        assert_eq!(parent.consumed(), 750);
    }

    #[test]
    fn test_unmetered() {
        let mut meter = GasMeter::unmetered();
        meter.consume(u64::MAX / 2, "big").unwrap();
        assert!(!meter.is_exhausted());
    }

    #[test]
    fn test_register_conversion() {
        let register = GasRegister::default();
        assert_eq!(register.multiplier(), 140_000_000);
        assert_eq!(register.to_native(3).unwrap(), 420_000_000);
        assert_eq!(register.from_native(420_000_000 + 139_999_999), 3);
        assert!(register.to_native(u64::MAX).is_err());

        assert_eq!(register.instance_costs(true, 10), 10);
        assert_eq!(register.instance_costs(false, 10), 60_010);
        assert_eq!(register.compile_costs(100), 300);

        let zero = GasConfig {
            gas_multiplier: 0,
            ..GasConfig::default()
        };
        assert!(GasRegister::new(zero).is_err());
    }

    #[test]
    fn test_linker_carries_native_remainder() {
        let mut host = MockHost::new();
        let roles = RoleTable::default();
        let register = GasRegister::new(GasConfig {
            gas_multiplier: 100,
            ..GasConfig::default()
        })
        .unwrap();
        let mut ctx = CallContext::new(&mut host, &roles, sample_env(), codec(), GasMeter::new(10))
            .with_register(register);
        let modules: Vec<HostModule> = Vec::new();
        {
            let mut linker = Linker::new(&mut ctx, &modules);
            linker.consume_gas(60).unwrap();
            assert_eq!(linker.context().gas.consumed(), 0);
            linker.consume_gas(60).unwrap();
            assert_eq!(linker.context().gas.consumed(), 1);
            assert_eq!(linker.native_remainder(), 20);
            linker.consume_gas(880).unwrap();
            assert_eq!(linker.context().gas.consumed(), 10);
            let err = linker.consume_gas(100).unwrap_err();
            assert!(err.is_out_of_gas());
        }
        assert!(ctx.gas.is_exhausted());
    }
}
