// Service exports
pub mod appwrite;
pub mod memory;
pub mod store;
pub mod verification;

pub use appwrite::{AppwriteCollections, AppwriteStore};
pub use memory::MemoryStore;
pub use store::{BlobStore, DocumentStore, StoreError};
pub use verification::{
    GatewayConfigError, PhotoVerificationGateway, RetryPolicy, VerificationFailure,
    VerificationVerdict,
};
