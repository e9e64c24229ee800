pub mod bootstrap;
pub mod feature_builder;
pub mod insights;
pub mod ml;
pub mod prediction_service;
pub mod search;
pub mod upcoming;
