pub mod backend;
pub mod destination;
pub mod sim;

pub use backend::{
    AudioStream, DestinationResolver, MediaCapture, RecorderControl, RecorderRegistry,
    RecordingFormat, RecordingSettings,
};
pub use destination::{FixedDestination, SoundsDirectory};
pub use sim::{CallLog, HardwareCall, RecorderBehavior, SimulatedCapture, SimulatedRecorder, SimulatedRegistry};
