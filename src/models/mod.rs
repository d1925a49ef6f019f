pub mod document;
pub mod email;
pub mod health;
pub mod payload;
pub mod response;
pub mod status;
pub mod template;
pub mod validation;
