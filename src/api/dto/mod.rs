//! Data Transfer Objects for REST request/response serialization.
//!
//! Request fields are all optional at the serde level so that a missing
//! field is reported as a relay validation error (400) rather than a
//! deserialization rejection.

pub mod common_dto;
pub mod publish_dto;
pub mod subscription_dto;

pub use common_dto::*;
pub use publish_dto::*;
pub use subscription_dto::*;
