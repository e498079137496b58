pub mod bus;
pub mod messages;

pub use bus::EventBus;
pub use messages::Event;
