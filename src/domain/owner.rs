use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the marketplace an account belongs to.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Client,
    Company,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Client => "client",
            OwnerKind::Company => "company",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a balance account: who owns it and on which side.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
pub struct OwnerRef {
    pub kind: OwnerKind,
    pub id: u32,
}

impl OwnerRef {
    pub fn client(id: u32) -> Self {
        Self {
            kind: OwnerKind::Client,
            id,
        }
    }

    pub fn company(id: u32) -> Self {
        Self {
            kind: OwnerKind::Company,
            id,
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A resolved caller identity.
///
/// Credential parsing happens upstream; the engine only ever sees which side
/// the caller is on and their id.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Actor {
    Client(u32),
    Company(u32),
}

impl Actor {
    pub fn new(kind: OwnerKind, id: u32) -> Self {
        match kind {
            OwnerKind::Client => Actor::Client(id),
            OwnerKind::Company => Actor::Company(id),
        }
    }

    pub fn owner_ref(&self) -> OwnerRef {
        match *self {
            Actor::Client(id) => OwnerRef::client(id),
            Actor::Company(id) => OwnerRef::company(id),
        }
    }

    pub fn kind(&self) -> OwnerKind {
        match self {
            Actor::Client(_) => OwnerKind::Client,
            Actor::Company(_) => OwnerKind::Company,
        }
    }

    pub fn id(&self) -> u32 {
        match *self {
            Actor::Client(id) | Actor::Company(id) => id,
        }
    }
}
