//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Authentication & Security
// =============================================================================

/// Default access token lifetime in seconds (1 hour)
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// Default refresh token lifetime in seconds (2 hours)
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 7200;

/// Upper bound on either token lifetime in seconds (10 years)
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Minimum signing secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Authorization scheme expected in the `Authorization` header
pub const BEARER_SCHEME: &str = "Bearer";

/// Token type reported to clients
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Claim value for access tokens
pub const TOKEN_KIND_ACCESS: &str = "access";

/// Claim value for refresh tokens
pub const TOKEN_KIND_REFRESH: &str = "refresh";

// =============================================================================
// Password hashing (Argon2id cost, fixed at build time)
// =============================================================================

/// Memory cost in KiB
pub const HASH_MEMORY_KIB: u32 = 19_456;

/// Number of passes
pub const HASH_ITERATIONS: u32 = 2;

/// Degree of parallelism
pub const HASH_PARALLELISM: u32 = 1;

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default per-request deadline in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Database
// =============================================================================

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_DB_NAME: &str = "golerplate";

/// Upper bound of pooled connections
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Connections kept open while idle
pub const DEFAULT_DB_MIN_CONNECTIONS: u32 = 1;

/// Seconds to wait for a pooled connection before failing
pub const DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Age bounds accepted by the domain
pub const MIN_AGE: i32 = 0;
pub const MAX_AGE: i32 = 150;

/// Number of digits in a CPF
pub const CPF_LENGTH: usize = 11;

// =============================================================================
// Client-facing messages
// =============================================================================

pub const ERR_MSG_INVALID_CREDENTIALS: &str = "invalid email or password";
pub const ERR_MSG_USER_NOT_FOUND: &str = "user not found";
pub const ERR_MSG_EMAIL_IN_USE: &str = "email is already in use";
pub const ERR_MSG_CPF_IN_USE: &str = "CPF is already in use";
pub const ERR_MSG_INVALID_EMAIL: &str = "invalid email";
pub const ERR_MSG_INVALID_CPF: &str = "invalid CPF";
pub const ERR_MSG_INVALID_AGE: &str = "invalid age: must be between 0 and 150";
pub const ERR_MSG_MISSING_HEADER: &str = "missing authorization header";
pub const ERR_MSG_INVALID_TOKEN: &str = "invalid or expired token";
pub const ERR_MSG_INVALID_TOKEN_TYPE: &str = "invalid token type";
