pub mod driver;
pub mod mock;
pub mod renderer;

pub use driver::{run_headless, run_realtime};
pub use mock::{HostCommand, MockRendererHost};
pub use renderer::{AltitudeMode, CameraPose, HostResult, MotionMode, RendererHost, TickSubscription};
