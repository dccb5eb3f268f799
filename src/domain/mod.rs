// Domain layer: metadata value objects, the contents container and ports (interfaces).

pub mod contents;
pub mod model;
pub mod ports;
