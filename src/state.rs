use std::sync::Arc;

use crate::config::Config;
use crate::submission::pipeline::Dispatcher;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,
}
