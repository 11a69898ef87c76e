// Predictive model: scaling, regression strategies, training
pub mod predictor;
pub mod scaler;
pub mod smartcore_predictor;
pub mod trainer;

pub use predictor::{FittedRegressor, RegressionStrategy};
pub use scaler::FeatureScaler;
pub use smartcore_predictor::RidgeRegressionStrategy;
pub use trainer::{
    ModelTrainer, RegressionMetrics, SessionModel, TrainingOutcome, TrainingReport, TrainingSet,
    TrainingSkip,
};
