use std::sync::Arc;

use crate::services::{Predictor, Recommender};

/// Shared application state
///
/// Built once before the listener binds and never mutated afterwards, so
/// requests read it concurrently without locking.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<dyn Recommender>,
}

impl AppState {
    pub fn new(recommender: Arc<dyn Recommender>) -> Self {
        Self { recommender }
    }

    pub fn from_predictor(predictor: Predictor) -> Self {
        Self::new(Arc::new(predictor))
    }
}
