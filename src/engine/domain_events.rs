use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

/// A bound change on an integer variable's domain.
#[derive(EnumSetType, Debug)]
pub enum IntDomainEvent {
    /// The lower bound was tightened.
    LowerBound,
    /// The upper bound was tightened.
    UpperBound,
}

/// The set of domain events a propagator subscribes to on a watched variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainEvents {
    int_events: EnumSet<IntDomainEvent>,
}

impl DomainEvents {
    /// Both bound events.
    pub const BOUNDS: DomainEvents = DomainEvents {
        int_events: enum_set!(IntDomainEvent::LowerBound | IntDomainEvent::UpperBound),
    };
    /// Only lower bound events.
    pub const LOWER_BOUND: DomainEvents = DomainEvents {
        int_events: enum_set!(IntDomainEvent::LowerBound),
    };
    /// Only upper bound events.
    pub const UPPER_BOUND: DomainEvents = DomainEvents {
        int_events: enum_set!(IntDomainEvent::UpperBound),
    };

    pub fn get_int_events(&self) -> EnumSet<IntDomainEvent> {
        self.int_events
    }
}
