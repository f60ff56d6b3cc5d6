use time::UtcOffset;
use time::macros::offset;

/// Timezone tags recognized by the recipient store. All three are fixed
/// UTC offsets with no daylight saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Wib,
    Wita,
    Wit,
}

/// All scheduling arithmetic is expressed against WIB (Asia/Jakarta).
pub const REFERENCE_OFFSET: UtcOffset = offset!(+7);

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Wib, Zone::Wita, Zone::Wit];

    pub fn tag(&self) -> &'static str {
        match self {
            Zone::Wib => "WIB",
            Zone::Wita => "WITA",
            Zone::Wit => "WIT",
        }
    }

    pub fn utc_offset(&self) -> UtcOffset {
        match self {
            Zone::Wib => offset!(+7),
            Zone::Wita => offset!(+8),
            Zone::Wit => offset!(+9),
        }
    }
}

/// The three daily broadcast sessions, each pinned to a local wall-clock hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Session {
    Morning,
    Midday,
    Evening,
}

impl Session {
    pub const ALL: [Session; 3] = [Session::Morning, Session::Midday, Session::Evening];

    pub fn label(&self) -> &'static str {
        match self {
            Session::Morning => "morning",
            Session::Midday => "midday",
            Session::Evening => "evening",
        }
    }

    pub fn local_hour(&self) -> u8 {
        match self {
            Session::Morning => 8,
            Session::Midday => 12,
            Session::Evening => 19,
        }
    }
}

/// One recurring firing time, expressed in the reference zone's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub session: Session,
    pub zone: Zone,
    pub hour: u8,
    pub minute: u8,
}

impl Slot {
    /// Builds the slot that fires at the session's local hour in `zone`,
    /// converted into the reference zone's clock.
    pub fn local(session: Session, zone: Zone) -> Slot {
        let shift = zone.utc_offset().whole_hours() - REFERENCE_OFFSET.whole_hours();
        let hour = (i16::from(session.local_hour()) - i16::from(shift)).rem_euclid(24) as u8;
        Slot {
            session,
            zone,
            hour,
            minute: 0,
        }
    }

    /// The full 3x3 broadcast table: every session in every zone, once.
    pub fn daily_table() -> Vec<Slot> {
        let mut slots = Vec::new();
        for session in Session::ALL {
            for zone in Zone::ALL {
                slots.push(Slot::local(session, zone));
            }
        }
        slots
    }
}

/// Per-recipient outcome counts from one multicast call. Consumed for
/// logging only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastSummary {
    pub success_count: u32,
    pub failure_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The caller handed over an empty recipient set; the provider was
    /// never contacted.
    EmptyRecipients,
    /// The provider call itself failed (network, auth, malformed payload).
    Provider(String),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::EmptyRecipients => f.write_str("empty recipient set"),
            DispatchError::Provider(message) => write!(f, "provider error: {message}"),
        }
    }
}

impl std::error::Error for DispatchError {}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn daily_table__should_contain_one_slot_per_session_zone_pair() {
        // Given / When
        let slots = Slot::daily_table();

        // Then
        assert_eq!(slots.len(), 9);
        for session in Session::ALL {
            for zone in Zone::ALL {
                let matching = slots
                    .iter()
                    .filter(|slot| slot.session == session && slot.zone == zone)
                    .count();
                assert_eq!(matching, 1, "{} {}", session.label(), zone.tag());
            }
        }
    }

    #[test]
    fn slot_local__should_shift_hours_by_zone_offset() {
        // WITA is one hour ahead of the reference zone, so its 08:00 local
        // morning fires at 07:00 on the reference clock.
        let slot = Slot::local(Session::Morning, Zone::Wita);
        assert_eq!(slot.hour, 7);
        assert_eq!(slot.minute, 0);

        let slot = Slot::local(Session::Morning, Zone::Wit);
        assert_eq!(slot.hour, 6);

        let slot = Slot::local(Session::Evening, Zone::Wib);
        assert_eq!(slot.hour, 19);

        let slot = Slot::local(Session::Evening, Zone::Wit);
        assert_eq!(slot.hour, 17);
    }

    #[test]
    fn slot_local__should_fire_at_local_hour_in_reference_zone() {
        let slot = Slot::local(Session::Midday, Zone::Wib);
        assert_eq!(slot.hour, Session::Midday.local_hour());
    }

    #[test]
    fn dispatch_error__should_render_provider_message() {
        let err = DispatchError::Provider("auth failed".to_string());
        assert_eq!(err.to_string(), "provider error: auth failed");
        assert_eq!(
            DispatchError::EmptyRecipients.to_string(),
            "empty recipient set"
        );
    }
}
