// Domain layer: row and service models plus the ports the pipeline depends on.

pub mod model;
pub mod ports;
