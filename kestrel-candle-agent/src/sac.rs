//! Soft actor-critic for continuous action spaces.
mod actor;
mod base;
mod config;
mod ent_coef;
pub use actor::{Actor, ActorConfig};
pub use base::SoftActorCritic;
pub use config::SacConfig;
pub use ent_coef::{EntCoef, EntCoefMode};
