pub mod calendar;
pub mod error;
pub mod event;
pub mod model;
pub mod series;
pub mod store;

pub use error::{ModelError, ModelResult};
pub use model::SchedulingModel;
