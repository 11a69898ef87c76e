pub mod feature_registry;

pub use feature_registry::{FEATURE_NAMES, features_to_vector};
