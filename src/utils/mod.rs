pub mod error;
pub mod logger;
pub mod namespaces;
pub mod validation;
pub mod xml;
