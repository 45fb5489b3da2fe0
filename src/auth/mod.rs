//! User accounts, passwords and cookie based sessions.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register_user;
mod token;
mod user;

pub(crate) use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::post_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub(crate) use redirect::normalize_redirect_url;
pub use register_user::{get_register_page, register_user};
pub use user::{
    Email, User, UserID, create_user, create_user_table, get_user_by_email, update_password,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
