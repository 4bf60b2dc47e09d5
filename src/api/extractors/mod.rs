//! Custom request extractors.

mod composite_form;
mod validated_json;

pub use composite_form::CompositeForm;
pub use validated_json::ValidatedJson;
