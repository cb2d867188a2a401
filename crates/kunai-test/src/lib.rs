//! Kunai task management server - integration test support.
//!
//! This crate re-exports the workspace crates to support integration tests
//! that use `kunai::` paths.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    // Re-export core and service modules at the component level
    pub use kunai_core::*;
    pub use kunai_service::*;

    // Re-export db crate with all its public modules
    pub mod db {
        pub use kunai_db::db::*;

        // Additional db handlers from app
        pub mod connection {
            pub use kunai_app::db_handler::DbProviderHandler;
            pub use kunai_db::db::connection::*;
        }
    }

    // Re-export models
    pub mod model {
        pub use kunai_db::model::*;
    }

    // Re-export app middleware and handlers
    pub mod middleware {
        pub use kunai_app::middleware::*;
    }

    // Re-export config from both core and app
    pub mod config {
        pub use kunai_app::config::ConfigHandler;
        pub use kunai_core::config::*;
    }
}

// Re-export top-level modules for convenience
pub mod app {
    pub use kunai_app::*;

    pub mod api {
        pub use kunai_app::app::api::*;
    }
}
