mod ledger;
mod simulator;

pub use self::{
    ledger::LedgerEntry,
    simulator::{Simulator, StorageParameters},
};
