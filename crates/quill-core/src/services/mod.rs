//! Application services built on top of the ports.

mod credentials;
mod persister_chain;
mod user_persister;

pub use credentials::CredentialNormalizer;
pub use persister_chain::PersisterChain;
pub use user_persister::UserDataPersister;
