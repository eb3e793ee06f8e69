pub mod ensemble;
pub mod predictors;

pub use ensemble::{Ensemble, Prediction, MIN_HISTORY};
pub use predictors::{Candidate, PredictError, Predictor};
