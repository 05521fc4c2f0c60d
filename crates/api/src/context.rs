use cashbook_core::UserId;

/// Acting user for a request, taken from the `x-actor-id` header.
///
/// Absent when the caller did not identify itself; movements are then recorded
/// without an actor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ActorContext {
    actor: Option<UserId>,
}

impl ActorContext {
    pub fn new(actor: Option<UserId>) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> Option<UserId> {
        self.actor
    }
}
