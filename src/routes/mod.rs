mod admin;
mod auth;
mod chirps;
mod health_check;
mod users;
mod webhooks;

pub use admin::{metrics_page, reset};
pub use auth::{login, refresh, revoke};
pub use chirps::{
    create_chirp, delete_chirp, get_all_chirps, get_chirp_by_id, ChirpPolicy,
};
pub use health_check::health_check;
pub use users::{create_user, update_user};
pub use webhooks::polka_webhook;
