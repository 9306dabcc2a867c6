pub mod error;
pub mod event;
pub mod reader;
pub mod session;

pub use error::LogError;
pub use event::{END_SCREEN, START_SCREEN, VisitEvent};
pub use reader::LogReader;
pub use session::{SessionMap, to_sessions};
