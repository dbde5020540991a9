pub mod config;
pub mod error;
pub mod frontend;
pub mod message;
pub mod services;
pub mod state;

pub use config::ClientConfig;
pub use error::{ClientError, ExportError};
pub use frontend::{Frontend, Navigation, View};
pub use services::controller::{DeleteOutcome, SessionController, SubmitOutcome};
