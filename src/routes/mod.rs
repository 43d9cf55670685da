/// Router Module Index
///
/// Routes are split by access level so the gate is applied once per group
/// as a layer in `create_router`, never per handler.

/// Open to anyone: health, user listing, registration and login.
pub mod public;

/// Behind Authenticate + Authorize(Supervisor).
pub mod movies;
