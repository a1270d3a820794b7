pub mod error;
pub mod intent;
pub mod registry;
pub mod resolver;
pub mod launcher;
pub mod script;
pub mod opener;
pub mod dispatcher;

pub use crate::dispatcher::{DispatchRecord, Dispatcher, Outcome, Reporter, UrlOpener};
pub use crate::error::{CoreError, CoreResult};
pub use crate::intent::Intent;
pub use crate::launcher::{LaunchFailure, LaunchOutcome, Launcher};
pub use crate::registry::{Action, Registry};
pub use crate::resolver::ResolutionResult;
pub use crate::script::{ScriptFailure, ScriptOutcome, ScriptRunner};
