//! Authentication: the identity service seam, password hashing, bearer sessions
//! and the request extractor that turns an `Authorization` header into an account.

mod extract;
mod identity;
mod password;
mod session;

pub use extract::{bearer_token, CurrentUser};
pub use identity::{
    Credential, IdentityError, IdentityService, LocalIdentity, MAX_TOKEN_TTL_DAYS, MIN_PASSWORD_LEN,
};
pub use password::{hash_password, verify_password};
pub use session::{generate_token, is_well_formed_token, SessionRecord, SignIn};
