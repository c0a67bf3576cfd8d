// handlers/auth/mod.rs - Authentication handlers
//
// Each endpoint is a single pass: validate the body, delegate to the auth
// provider (and the profile store where needed), then write cookies and the
// response. No handler keeps state between requests or retries anything.
//
// The same handlers serve `/api/auth` and `/api/v01`; the route set injects
// an `Envelope` extension that decides the response shape.

pub mod login;    // POST /login    - verify credentials, issue session cookies
pub mod logout;   // POST /logout   - end provider session, clear cookies
pub mod profile;  // POST /profile  - resolve current user from access cookie
pub mod refresh;  // POST /refresh  - rotate both cookies
pub mod register; // POST /register - create provider account + local profile
pub mod utils;

pub use login::login_post;
pub use logout::logout_post;
pub use profile::profile_post;
pub use refresh::refresh_post;
pub use register::register_post;
