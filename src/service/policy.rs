use snafu::{ensure, Location, Snafu};

use crate::database::Record;
use crate::model::{Comment, Tweet, User, Video};

/// An entity that belongs to exactly one user, the only actor allowed to
/// mutate or delete it.
pub trait Owned {
    /// What to call the entity in error messages.
    const KIND: &'static str;

    fn owner(&self) -> &Record<User>;
}

impl Owned for Video {
    const KIND: &'static str = "video";

    fn owner(&self) -> &Record<User> {
        &self.owner
    }
}

impl Owned for Comment {
    const KIND: &'static str = "comment";

    fn owner(&self) -> &Record<User> {
        &self.owner
    }
}

impl Owned for Tweet {
    const KIND: &'static str = "tweet";

    fn owner(&self) -> &Record<User> {
        &self.owner
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("you are not the owner of this {entity}"))]
pub struct Forbidden {
    entity: &'static str,
    #[snafu(implicit)]
    location: Location,
}

/// Every mutation of an owned entity goes through here before the write.
pub fn ensure_owner<T: Owned>(actor: &Record<User>, entity: &T) -> Result<(), Forbidden> {
    ensure!(entity.owner() == actor, ForbiddenSnafu { entity: T::KIND });
    Ok(())
}
