//! Fan-out of one frame to every member of a room.

use easel_protocol::{Frame, RoomId};

use crate::roster::Roster;

/// What happened to one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Members whose outbox accepted the frame.
    pub delivered: usize,
    /// Members whose outbox was already closed.
    pub failed: usize,
}

/// Pushes `frame` into every member's outbox.
///
/// Each send is independent: a member whose connection is already gone is
/// logged and skipped, and everyone else still gets the frame. Frames reach
/// a given member in the order fan-outs happen, since each outbox is FIFO.
pub(crate) fn fan_out(room_id: &RoomId, roster: &Roster, frame: &Frame) -> Delivery {
    let mut delivery = Delivery::default();
    for member in roster.iter() {
        match member.outbox().send(frame.clone()) {
            Ok(()) => delivery.delivered += 1,
            Err(_) => {
                delivery.failed += 1;
                tracing::warn!(
                    %room_id,
                    client_id = %member.id(),
                    kind = %frame.kind(),
                    "delivery failed, recipient outbox closed"
                );
            }
        }
    }
    tracing::trace!(
        %room_id,
        kind = %frame.kind(),
        delivered = delivery.delivered,
        failed = delivery.failed,
        "fan-out"
    );
    delivery
}

#[cfg(test)]
mod tests {
    use easel_protocol::{ClientId, Event, JsonCodec};
    use tokio::sync::mpsc;

    use super::*;
    use crate::Member;

    fn frame() -> Frame {
        Frame::encode(&JsonCodec, Event::new("chat").with_message("hi")).unwrap()
    }

    #[test]
    fn test_fan_out_reaches_every_member() {
        let mut roster = Roster::default();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        roster.insert(Member::new(ClientId(1), "a", tx1));
        roster.insert(Member::new(ClientId(2), "b", tx2));

        let delivery = fan_out(&RoomId::new("r"), &roster, &frame());

        assert_eq!(delivery, Delivery { delivered: 2, failed: 0 });
        assert_eq!(rx1.try_recv().unwrap().text(), frame().text());
        assert_eq!(rx2.try_recv().unwrap().text(), frame().text());
    }

    #[test]
    fn test_fan_out_survives_dead_recipient() {
        let mut roster = Roster::default();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();
        roster.insert(Member::new(ClientId(1), "a", tx1));
        roster.insert(Member::new(ClientId(2), "b", tx2));
        roster.insert(Member::new(ClientId(3), "c", tx3));
        drop(rx2); // b's connection is gone

        let delivery = fan_out(&RoomId::new("r"), &roster, &frame());

        assert_eq!(delivery, Delivery { delivered: 2, failed: 1 });
        assert!(rx1.try_recv().is_ok());
        assert!(rx3.try_recv().is_ok(), "member after the dead one still served");
    }

    #[test]
    fn test_fan_out_empty_roster() {
        let delivery = fan_out(&RoomId::new("r"), &Roster::default(), &frame());
        assert_eq!(delivery, Delivery::default());
    }
}
