mod basic;

pub(crate) use basic::{require_basic_auth, AuthError};
