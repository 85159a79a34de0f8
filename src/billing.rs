mod accumulator;
mod settlement;

pub use self::{
    accumulator::{ZoneAccumulator, ZoneUsage},
    settlement::{Settlement, SettlementStrategy, ZoneStatement, months_spanned, settle},
};
