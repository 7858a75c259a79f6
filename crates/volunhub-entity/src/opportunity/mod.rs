//! Opportunity domain entities.

pub mod filter;
pub mod model;

pub use filter::OpportunityFilter;
pub use model::{NewOpportunity, Opportunity, UpdateOpportunity};
