pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod messaging;
pub mod phone;
pub mod recommendation;
pub mod validation;

pub use catalog::{Catalog, CatalogError};
pub use domain::category::{CategoryId, ProductCategory};
pub use domain::lead::{ConsultationRecord, LeadContact, LeadId, LeadSubmission};
pub use domain::profile::{PosturalProfile, UserProfile};
pub use domain::recommendation::{
    PriorityTier, Recommendation, RecommendationSet, RecommendationSummary,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use messaging::Branding;
pub use recommendation::{generate_recommendations, RecommendationEngine};
pub use validation::{validate_submission, FieldError, ValidationReport};
