//! Login name of the invoking user, for experimental package paths.

use std::env;

use crate::{GenError, Result};

const USER_ENV_VARS: [&str; 4] = ["LOGNAME", "USER", "LNAME", "USERNAME"];

/// Checks the usual login environment variables, then the password database.
pub(crate) fn current_user() -> Result<String> {
    for var in USER_ENV_VARS {
        if let Ok(value) = env::var(var) {
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }
    passwd_user()
}

#[cfg(unix)]
fn passwd_user() -> Result<String> {
    // SAFETY: getpwuid returns either null or a pointer into static storage
    // that stays valid until the next getpw* call; pw_name is copied out
    // before returning.
    let name = unsafe {
        let entry = libc::getpwuid(libc::getuid());
        if entry.is_null() || (*entry).pw_name.is_null() {
            None
        } else {
            Some(
                std::ffi::CStr::from_ptr((*entry).pw_name)
                    .to_string_lossy()
                    .into_owned(),
            )
        }
    };
    name.filter(|name| !name.is_empty())
        .ok_or(GenError::UserLookup {
            reason: "no password database entry for the current uid".into(),
        })
}

#[cfg(not(unix))]
fn passwd_user() -> Result<String> {
    Err(GenError::UserLookup {
        reason: "no login name in LOGNAME, USER, LNAME or USERNAME".into(),
    })
}
