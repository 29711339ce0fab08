pub mod alerts;
pub mod orchestrator;
pub mod timeseries;
pub mod validator;
