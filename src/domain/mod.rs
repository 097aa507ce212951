pub mod events;
pub mod geo;
pub mod order;
pub mod ports;
pub mod state_machine;

pub use order::DeliveryOrder;
pub use state_machine::Phase;
