// =============================================================================
// COLLECTION NAMES
// =============================================================================

/// Seed collection populated from the bootstrap CSV
pub const COLLECTION_SAMPLE: &str = "sample_data";

/// Records submitted by users and awaiting review
pub const COLLECTION_PENDING: &str = "pending_data";

/// Records approved by a reviewer
pub const COLLECTION_REVIEWED: &str = "reviewed_data";

// =============================================================================
// DOCUMENT KEYS
// =============================================================================

/// Server-assigned identifier, exposed in the string encoding
pub const KEY_ID: &str = "_id";

pub const KEY_CREATED_AT: &str = "createdAt";

pub const KEY_UPDATED_AT: &str = "updatedAt";

/// Keys owned by the server and never accepted from request bodies
pub const SERVER_OWNED_KEYS: [&str; 3] = [KEY_ID, KEY_CREATED_AT, KEY_UPDATED_AT];

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

pub const ROLE_ADMIN: &str = "admin";

pub const ROLE_USER: &str = "user";
