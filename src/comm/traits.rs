//! Communication substrate contract
//!
//! The coordination layer never talks to a transport directly; it consumes
//! the [`Communicator`] trait defined here. Collective operations (broadcast,
//! barrier, gather) block the calling rank until every rank in the group has
//! issued the matching call, so every public operation built on top of this
//! trait must issue the same sequence of collective calls, unconditionally,
//! on every rank.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CommResult;

/// A worker process's fixed identity within the group
pub type Rank = usize;

/// Message class for point-to-point traffic
///
/// Tags keep unrelated protocol phases from consuming each other's messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Fire-and-forget generational-age reports sent to the aggregator
    AgeReport,
    /// Population and index traffic of the pairwise exchange protocol
    Migration,
}

/// Anything that can cross a rank boundary
///
/// Payloads are serialized at the sending endpoint and rebuilt at the
/// receiving one, so the substrate stays agnostic of the message type.
pub trait Message: Serialize + DeserializeOwned + Send + 'static {}

impl<T> Message for T where T: Serialize + DeserializeOwned + Send + 'static {}

/// Completion handle for a non-blocking send
///
/// The send itself does not block the caller's progress, but the handle must
/// be observed before the message buffer is reused.
#[must_use = "the completion of a non-blocking send must be observed"]
#[derive(Debug)]
pub struct SendTicket {
    _sealed: (),
}

impl SendTicket {
    pub(crate) fn delivered() -> Self {
        Self { _sealed: () }
    }

    /// Observe completion of the send
    pub fn wait(self) -> CommResult<()> {
        Ok(())
    }
}

/// Group-wide communication primitives
///
/// The contract mirrors a fixed-size, fail-stop message-passing group: no
/// timeouts, no cancellation, no membership changes. A stalled rank stalls
/// the group.
pub trait Communicator {
    /// This endpoint's identity, in `[0, size)`
    fn rank(&self) -> Rank;

    /// Number of ranks in the group
    fn size(&self) -> usize;

    /// Block until every rank in the group has entered the barrier
    fn barrier(&self) -> CommResult<()>;

    /// Distribute `root`'s value to every rank
    ///
    /// The root passes `Some(value)` and every other rank passes `None`; all
    /// ranks return the root's value. Calling as root without a value is a
    /// [`CommError::MissingBroadcastValue`](crate::error::CommError).
    fn broadcast<T>(&self, value: Option<T>, root: Rank) -> CommResult<T>
    where
        T: Message + Clone;

    /// Collect one value per rank at `root`, ordered by rank
    ///
    /// Returns `Some(values)` at the root and `None` everywhere else.
    fn gather<T>(&self, value: T, root: Rank) -> CommResult<Option<Vec<T>>>
    where
        T: Message + Clone;

    /// Blocking point-to-point send
    fn send<T>(&self, value: &T, dest: Rank, tag: Tag) -> CommResult<()>
    where
        T: Message;

    /// Blocking point-to-point receive matching `(source, tag)`
    ///
    /// Messages from other sources or with other tags are buffered, not
    /// discarded.
    fn recv<T>(&self, source: Rank, tag: Tag) -> CommResult<T>
    where
        T: Message;

    /// Non-blocking send; the returned ticket must be observed
    fn send_nonblocking<T>(&self, value: &T, dest: Rank, tag: Tag) -> CommResult<SendTicket>
    where
        T: Message;

    /// Non-blocking check for an available message with `tag` from any source
    ///
    /// Returns the source rank of a matching message if one has already
    /// arrived; never waits.
    fn probe(&self, tag: Tag) -> CommResult<Option<Rank>>;

    /// Paired synchronous swap with `partner`
    ///
    /// Sends `value` and receives the partner's message with the same tag;
    /// both sides of a pair must call this exactly once.
    fn send_receive<S, R>(&self, value: &S, partner: Rank, tag: Tag) -> CommResult<R>
    where
        S: Message,
        R: Message;
}
