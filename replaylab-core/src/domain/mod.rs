//! Domain value types shared across the engine.

pub mod bar;
pub mod fill;
pub mod position;
pub mod signal;
pub mod snapshot;

pub use bar::Bar;
pub use fill::{Fill, Side};
pub use position::Position;
pub use signal::{Direction, Signal};
pub use snapshot::EquitySnapshot;
