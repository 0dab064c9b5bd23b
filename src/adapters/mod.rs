// Adapters layer: concrete implementations for external systems.

pub mod avatax;
pub mod csv_codec;
pub mod storage;
