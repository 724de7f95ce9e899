//! Yew bindings for the session

pub mod context;

pub use context::{
    SessionContext, SessionProvider, SessionProviderProps, use_current_admin,
    use_is_authenticated, use_session,
};
