mod rule;
mod table;

pub use self::{
    rule::{DayType, TariffRule},
    table::{TariffTable, ZonePrice},
};
