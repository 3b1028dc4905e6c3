//! Client-side state for the Edutage admin tools.
//!
//! This crate owns everything between the HTTP layer and the surfaces that
//! render data:
//!
//! - [`cache`]: the tag-indexed query cache with subscriber notification,
//!   stale-while-revalidate, and request deduplication
//! - [`mutation`]: the dispatcher that runs writes and invalidates tags on
//!   success
//! - [`session`]: the durable session store (credential + identity)
//! - [`resources`]: typed operations over the endpoint catalog
//!
//! The HTTP layer is reached through the [`transport::ResourceTransport`]
//! trait so every component here can be exercised against an in-memory
//! backend.

pub mod cache;
pub mod mutation;
pub mod resources;
pub mod session;
pub mod transport;

pub use cache::{QueryCache, QueryHandle, QuerySnapshot, QueryStatus};
pub use mutation::{MutationDescriptor, MutationDispatcher};
pub use resources::SchoolApi;
pub use session::{Session, SessionStore, SessionStoreError};
pub use transport::{HttpTransport, ResourceTransport};
