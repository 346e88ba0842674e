pub mod extractor;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod resolver;
pub mod roles;

pub use principal::Principal;
pub use roles::Role;
