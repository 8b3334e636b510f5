//! Shared test instances.

use crate::models::{Instance, MachineRow, OperationRow};

/// Job 0: O0 (5/2) then O1 (3/1); job 1: O2 (4/3). Everything on M1,
/// setup 1/1, teardown 1/1, no idle power, horizon 20.
pub(crate) fn single_machine_instance() -> Instance {
    let ops = [
        OperationRow::new(0, 0, 1, 5, 2),
        OperationRow::new(0, 1, 1, 3, 1),
        OperationRow::new(1, 0, 1, 4, 3),
    ];
    let machines = [MachineRow::new(1, 20)
        .with_setup(1, 1)
        .with_teardown(1, 1)];
    Instance::from_rows("single", &ops, &machines).expect("valid fixture")
}

/// Job 0: O0 (M0 3/4, M1 2/6) then O1 (M0 2/2); job 1: O2 (M0 4/1,
/// M1 5/2). Both machines: setup 1/2, teardown 1/1, idle power 1,
/// horizon 50.
pub(crate) fn flexible_instance() -> Instance {
    let ops = [
        OperationRow::new(0, 0, 0, 3, 4),
        OperationRow::new(0, 0, 1, 2, 6),
        OperationRow::new(0, 1, 0, 2, 2),
        OperationRow::new(1, 0, 0, 4, 1),
        OperationRow::new(1, 0, 1, 5, 2),
    ];
    let machines = [
        MachineRow::new(0, 50)
            .with_setup(1, 2)
            .with_teardown(1, 1)
            .with_idle_power(1),
        MachineRow::new(1, 50)
            .with_setup(1, 2)
            .with_teardown(1, 1)
            .with_idle_power(1),
    ];
    Instance::from_rows("flexible", &ops, &machines).expect("valid fixture")
}

/// One job of two operations, both only on M0.
pub(crate) fn rigid_chain_instance() -> Instance {
    let ops = [
        OperationRow::new(0, 0, 0, 2, 1),
        OperationRow::new(0, 1, 0, 3, 1),
    ];
    let machines = [MachineRow::new(0, 30).with_setup(1, 1).with_teardown(1, 1)];
    Instance::from_rows("rigid", &ops, &machines).expect("valid fixture")
}

/// Three jobs competing for two machines with different speed/energy
/// trade-offs.
pub(crate) fn three_job_instance() -> Instance {
    let ops = [
        OperationRow::new(0, 0, 0, 4, 8),
        OperationRow::new(0, 0, 1, 6, 3),
        OperationRow::new(0, 1, 1, 2, 2),
        OperationRow::new(1, 0, 0, 3, 3),
        OperationRow::new(1, 0, 1, 2, 5),
        OperationRow::new(1, 1, 0, 5, 4),
        OperationRow::new(1, 1, 1, 4, 6),
        OperationRow::new(2, 0, 1, 1, 1),
        OperationRow::new(2, 0, 0, 2, 1),
    ];
    let machines = [
        MachineRow::new(0, 60)
            .with_setup(2, 3)
            .with_teardown(1, 2)
            .with_idle_power(1),
        MachineRow::new(1, 60)
            .with_setup(1, 1)
            .with_teardown(1, 1)
            .with_idle_power(2),
    ];
    Instance::from_rows("three", &ops, &machines).expect("valid fixture")
}
