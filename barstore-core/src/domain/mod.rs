//! Domain types for barstore

pub mod bar;
pub mod ids;
pub mod symbol;

pub use bar::StockBar;
pub use ids::BarId;
pub use symbol::SymbolInfo;
