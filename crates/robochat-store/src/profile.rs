//! The singleton user profile.

use robochat_core::{Profile, Record};

use crate::engine::{ReadTx, WriteTx};
use crate::error::Result;
use crate::schema::{Tree, TreeMut, USER_NAME_KEY};

/// Stored profile, or the empty default if none was ever written.
pub fn load_profile(tx: &ReadTx<'_>) -> Result<Profile> {
    let tree = Tree::read(tx)?;
    match tree.profile.get(USER_NAME_KEY)? {
        Some(bytes) => Ok(Profile::decode(&bytes)?),
        None => Ok(Profile::default()),
    }
}

pub fn set_user_name(tx: &WriteTx<'_>, user_name: &str) -> Result<()> {
    let tree = TreeMut::write(tx)?;
    let profile = Profile {
        user_name: user_name.to_string(),
    };
    tree.profile.put(USER_NAME_KEY, &profile.encode()?)
}
