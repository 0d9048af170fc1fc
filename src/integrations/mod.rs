//! External service integrations.

pub mod crm_client {
    pub use crate::crm_client::*;
}

pub mod identity_client {
    pub use crate::identity_client::*;
}

pub mod firestore {
    pub use crate::db::*;
    pub use crate::db_storage::*;
    pub use crate::documents::*;
}
