//! Linear contextual bandit with upper confidence bound exploration (LinUCB).
mod base;
mod config;
mod regression;
pub use base::LinearBandit;
pub use config::LinearBanditConfig;
pub use regression::LinearRegression;
