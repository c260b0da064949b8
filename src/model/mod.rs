//! Price Forecast Model Module
//!
//! Feature scaling, least-squares regression and the trained model they produce.

pub mod forecast;
pub mod regression;
pub mod scaler;

pub use forecast::{feature_matrix, FittedModel, PriceForecastModel, PRICE_FLOOR};
pub use regression::LinearRegression;
pub use scaler::FeatureScaler;
