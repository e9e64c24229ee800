/// Interface for discount classifiers
pub trait DiscountModel: Send + Sync {
    /// Probability (0.0 to 1.0) that the game is discounted within the
    /// model's horizon. `features` is ordered by [`DiscountModel::feature_names`].
    fn predict_proba(&self, features: &[f64]) -> Result<f64, String>;

    /// Input order the model was trained with
    fn feature_names(&self) -> &[String];

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
