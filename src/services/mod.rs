pub mod assignments;
pub mod auth;
pub mod clock;
pub mod events;
pub mod http;
pub mod projects;
pub mod rate_limit;
pub mod resources;
pub mod retry;
pub mod session;
pub mod submissions;
pub mod transport;
pub mod users;
