/// Template JSON model, defaults and validation.
pub mod template;
