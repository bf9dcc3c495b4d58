pub mod normalize;
pub mod template;

pub use normalize::normalize;
pub use template::{Template, TemplateError, DEFAULT_FORMAT};
