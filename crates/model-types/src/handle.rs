use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh, never-before-used handle.
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

uuid_handle!(
    /// Stable identifier of a group (one step in construction history).
    GroupId,
    "g"
);
uuid_handle!(
    /// Stable identifier of a user-authored request.
    RequestId,
    "r"
);
uuid_handle!(
    /// Stable identifier of a constraint.
    ConstraintId,
    "c"
);

impl GroupId {
    /// The group holding the three reference workplanes. Always history position zero.
    pub const REFERENCES: GroupId = GroupId(Uuid::from_u128(0x1));
}

impl RequestId {
    pub const REFERENCE_XY: RequestId = RequestId(Uuid::from_u128(0x1));
    pub const REFERENCE_YZ: RequestId = RequestId(Uuid::from_u128(0x2));
    pub const REFERENCE_ZX: RequestId = RequestId(Uuid::from_u128(0x3));

    /// True for the three built-in reference workplane requests.
    pub fn is_reference(self) -> bool {
        self == Self::REFERENCE_XY || self == Self::REFERENCE_YZ || self == Self::REFERENCE_ZX
    }

    /// Handle of the `index`-th entity generated by this request.
    pub fn entity(self, index: u16) -> EntityId {
        EntityId::Request {
            request: self,
            index,
        }
    }

    /// Handle of the `index`-th param generated by this request.
    pub fn param(self, index: u16) -> ParamId {
        ParamId::Request {
            request: self,
            index,
        }
    }
}

impl GroupId {
    /// Handle of the `index`-th entity generated by the group itself.
    pub fn entity(self, index: u16) -> EntityId {
        EntityId::Group { group: self, index }
    }

    /// Handle of the `index`-th param generated by the group itself.
    pub fn param(self, index: u16) -> ParamId {
        ParamId::Group { group: self, index }
    }
}

/// Handle of a derived entity.
///
/// Entities are rebuilt every regeneration pass, but their handles are derived
/// from the request or group that generates them, so they stay valid across
/// passes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(tag = "type")]
pub enum EntityId {
    /// The "no entity" sentinel. As a workplane reference it means free in 3D.
    /// It always resolves.
    #[default]
    None,
    Request { request: RequestId, index: u16 },
    Group { group: GroupId, index: u16 },
}

impl EntityId {
    pub fn is_none(self) -> bool {
        matches!(self, EntityId::None)
    }

    pub fn is_from_request(self) -> bool {
        matches!(self, EntityId::Request { .. })
    }

    /// The request that generated this entity, if it is request-derived.
    pub fn request(self) -> Option<RequestId> {
        match self {
            EntityId::Request { request, .. } => Some(request),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::None => write!(f, "e:none"),
            EntityId::Request { request, index } => write!(f, "e:{}/{}", request, index),
            EntityId::Group { group, index } => write!(f, "e:{}/{}", group, index),
        }
    }
}

/// Handle of a scalar solver parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParamId {
    Request { request: RequestId, index: u16 },
    Group { group: GroupId, index: u16 },
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamId::Request { request, index } => write!(f, "p:{}/{}", request, index),
            ParamId::Group { group, index } => write!(f, "p:{}/{}", group, index),
        }
    }
}
