pub mod model_set;
pub mod onnx_model;
pub mod predictor;

pub use model_set::ModelSet;
pub use onnx_model::OnnxDiscountModel;
pub use predictor::DiscountModel;
