//! Input contracts and response records of the ServiceNow tools.

pub(crate) mod case;
pub(crate) mod catalog_item;
pub(crate) mod change;
pub(crate) mod incident;
pub(crate) mod user;

pub(crate) fn default_limit() -> u32 {
    10
}

pub(crate) fn default_true() -> bool {
    true
}
