use crate::draw::snapshot::Snapshot;
use crate::draw::surface::Surface;
use image::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RedrawTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRedraw {
    pub ticket: RedrawTicket,
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawOutcome {
    Applied,
    Stale,
}

/// Orders snapshot decodes targeting one surface.
///
/// Every request gets an increasing ticket; a completion is drawn only if no
/// newer request was issued in the meantime.
#[derive(Debug, Default)]
pub struct RedrawQueue {
    issued: u64,
    applied: Option<RedrawTicket>,
}

impl RedrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, snapshot: Snapshot) -> PendingRedraw {
        self.issued += 1;
        PendingRedraw {
            ticket: RedrawTicket(self.issued),
            snapshot,
        }
    }

    pub fn is_latest(&self, ticket: RedrawTicket) -> bool {
        ticket.0 == self.issued
    }

    pub fn last_applied(&self) -> Option<RedrawTicket> {
        self.applied
    }

    /// Invalidates every outstanding request, e.g. when the surface is
    /// painted directly.
    pub fn supersede(&mut self) {
        self.issued += 1;
    }

    pub fn complete(
        &mut self,
        ticket: RedrawTicket,
        decoded: &RgbaImage,
        surface: &mut Surface,
    ) -> RedrawOutcome {
        if !self.is_latest(ticket) {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.issued,
                "discarding stale snapshot redraw"
            );
            return RedrawOutcome::Stale;
        }
        surface.draw_image_fitted(decoded);
        self.applied = Some(ticket);
        RedrawOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(value: u8) -> RgbaImage {
        RgbaImage::from_pixel(2, 2, Rgba([value, value, value, 255]))
    }

    #[test]
    fn in_order_completion_applies() {
        let mut queue = RedrawQueue::new();
        let mut surface = Surface::new(2, 2);
        let pending = queue.request(Snapshot::from_encoded("a"));

        assert_eq!(
            queue.complete(pending.ticket, &solid(10), &mut surface),
            RedrawOutcome::Applied
        );
        assert_eq!(surface.pixel(1, 1), Some([10, 10, 10, 255]));
        assert_eq!(queue.last_applied(), Some(pending.ticket));
    }

    #[test]
    fn stale_completion_does_not_overwrite_newer_request() {
        let mut queue = RedrawQueue::new();
        let mut surface = Surface::new(2, 2);
        let older = queue.request(Snapshot::from_encoded("older"));
        let newer = queue.request(Snapshot::from_encoded("newer"));

        assert_eq!(
            queue.complete(newer.ticket, &solid(20), &mut surface),
            RedrawOutcome::Applied
        );
        assert_eq!(
            queue.complete(older.ticket, &solid(99), &mut surface),
            RedrawOutcome::Stale
        );
        assert_eq!(surface.pixel(0, 0), Some([20, 20, 20, 255]));
    }

    #[test]
    fn superseded_requests_are_discarded() {
        let mut queue = RedrawQueue::new();
        let mut surface = Surface::new(2, 2);
        let pending = queue.request(Snapshot::from_encoded("a"));
        queue.supersede();

        assert_eq!(
            queue.complete(pending.ticket, &solid(1), &mut surface),
            RedrawOutcome::Stale
        );
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
    }
}
