//! In-process communication substrate
//!
//! [`LocalCommunicator`] gives every rank of a group an endpoint backed by
//! channels, so a whole archipelago can run inside one process with one
//! thread per rank. Point-to-point traffic goes through a per-rank mailbox
//! with out-of-order `(source, tag)` matching; collectives use dedicated
//! per-pair channels so they can never consume point-to-point messages.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Barrier};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::comm::traits::{Communicator, Message, Rank, SendTicket, Tag};
use crate::error::{CommError, CommResult};

/// A point-to-point message in flight
#[derive(Debug)]
struct Envelope {
    source: Rank,
    tag: Tag,
    payload: Vec<u8>,
}

/// One rank's endpoint into an in-process group
///
/// Endpoints are created as a set by [`LocalGroup::endpoints`] and each one
/// is moved onto the thread that plays its rank. An endpoint is single-owner
/// state; it is `Send` but deliberately not `Sync`.
pub struct LocalCommunicator {
    rank: Rank,
    size: usize,
    barrier: Arc<Barrier>,
    /// Senders into every rank's mailbox, indexed by destination
    mailbox_out: Vec<Sender<Envelope>>,
    /// This rank's mailbox
    mailbox_in: Receiver<Envelope>,
    /// Messages received while matching for a different `(source, tag)`
    pending: RefCell<VecDeque<Envelope>>,
    /// Collective channels to every rank, indexed by destination
    collective_out: Vec<Sender<Vec<u8>>>,
    /// Collective channels from every rank, indexed by source
    collective_in: Vec<Receiver<Vec<u8>>>,
}

/// Builder for in-process groups
pub struct LocalGroup;

impl LocalGroup {
    /// Create the endpoints of a group of `size` ranks
    ///
    /// The endpoint at index `r` is the one for rank `r`. The group is fixed
    /// for its lifetime; dropping an endpoint while peers are still
    /// communicating surfaces as [`CommError::Disconnected`] on their side.
    pub fn endpoints(size: usize) -> CommResult<Vec<LocalCommunicator>> {
        if size == 0 {
            return Err(CommError::EmptyGroup);
        }

        let barrier = Arc::new(Barrier::new(size));

        let mut mailbox_txs = Vec::with_capacity(size);
        let mut mailbox_rxs = Vec::with_capacity(size);
        for _ in 0..size {
            let (tx, rx) = unbounded::<Envelope>();
            mailbox_txs.push(tx);
            mailbox_rxs.push(rx);
        }

        // One dedicated channel per ordered pair keeps successive collectives
        // in program order without cross-talk between senders.
        let mut pair_txs: Vec<Vec<Sender<Vec<u8>>>> = Vec::with_capacity(size);
        let mut pair_rxs: Vec<Vec<Receiver<Vec<u8>>>> = Vec::with_capacity(size);
        for _ in 0..size {
            let mut row_tx = Vec::with_capacity(size);
            let mut row_rx = Vec::with_capacity(size);
            for _ in 0..size {
                let (tx, rx) = unbounded::<Vec<u8>>();
                row_tx.push(tx);
                row_rx.push(rx);
            }
            pair_txs.push(row_tx);
            pair_rxs.push(row_rx);
        }

        let mut endpoints = Vec::with_capacity(size);
        for (rank, mailbox_in) in mailbox_rxs.into_iter().enumerate() {
            let collective_in = (0..size)
                .map(|source| pair_rxs[source][rank].clone())
                .collect();
            endpoints.push(LocalCommunicator {
                rank,
                size,
                barrier: Arc::clone(&barrier),
                mailbox_out: mailbox_txs.clone(),
                mailbox_in,
                pending: RefCell::new(VecDeque::new()),
                collective_out: pair_txs[rank].clone(),
                collective_in,
            });
        }
        Ok(endpoints)
    }
}

impl LocalCommunicator {
    fn check_rank(&self, rank: Rank) -> CommResult<()> {
        if rank >= self.size {
            return Err(CommError::InvalidRank {
                rank,
                size: self.size,
            });
        }
        Ok(())
    }

    fn encode<T: Message>(value: &T) -> CommResult<Vec<u8>> {
        bincode::serialize(value).map_err(|e| CommError::Codec(e.to_string()))
    }

    fn decode<T: Message>(payload: &[u8]) -> CommResult<T> {
        bincode::deserialize(payload).map_err(|e| CommError::Codec(e.to_string()))
    }

    fn deposit(&self, value_bytes: Vec<u8>, dest: Rank, tag: Tag) -> CommResult<()> {
        self.mailbox_out[dest]
            .send(Envelope {
                source: self.rank,
                tag,
                payload: value_bytes,
            })
            .map_err(|_| CommError::Disconnected { rank: dest })
    }

    /// Pull everything that has already arrived into the pending buffer
    fn drain_mailbox(&self) {
        let mut pending = self.pending.borrow_mut();
        while let Ok(envelope) = self.mailbox_in.try_recv() {
            pending.push_back(envelope);
        }
    }

    fn take_pending(&self, source: Rank, tag: Tag) -> Option<Envelope> {
        let mut pending = self.pending.borrow_mut();
        let position = pending
            .iter()
            .position(|e| e.source == source && e.tag == tag)?;
        pending.remove(position)
    }
}

impl Communicator for LocalCommunicator {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> CommResult<()> {
        self.barrier.wait();
        Ok(())
    }

    fn broadcast<T>(&self, value: Option<T>, root: Rank) -> CommResult<T>
    where
        T: Message + Clone,
    {
        self.check_rank(root)?;
        if self.rank == root {
            let value = value.ok_or(CommError::MissingBroadcastValue { root })?;
            let payload = Self::encode(&value)?;
            for dest in 0..self.size {
                if dest == self.rank {
                    continue;
                }
                self.collective_out[dest]
                    .send(payload.clone())
                    .map_err(|_| CommError::Disconnected { rank: dest })?;
            }
            Ok(value)
        } else {
            let payload = self.collective_in[root]
                .recv()
                .map_err(|_| CommError::Disconnected { rank: root })?;
            Self::decode(&payload)
        }
    }

    fn gather<T>(&self, value: T, root: Rank) -> CommResult<Option<Vec<T>>>
    where
        T: Message + Clone,
    {
        self.check_rank(root)?;
        if self.rank == root {
            let mut gathered = Vec::with_capacity(self.size);
            for source in 0..self.size {
                if source == self.rank {
                    gathered.push(value.clone());
                } else {
                    let payload = self.collective_in[source]
                        .recv()
                        .map_err(|_| CommError::Disconnected { rank: source })?;
                    gathered.push(Self::decode(&payload)?);
                }
            }
            Ok(Some(gathered))
        } else {
            let payload = Self::encode(&value)?;
            self.collective_out[root]
                .send(payload)
                .map_err(|_| CommError::Disconnected { rank: root })?;
            Ok(None)
        }
    }

    fn send<T>(&self, value: &T, dest: Rank, tag: Tag) -> CommResult<()>
    where
        T: Message,
    {
        self.check_rank(dest)?;
        self.deposit(Self::encode(value)?, dest, tag)
    }

    fn recv<T>(&self, source: Rank, tag: Tag) -> CommResult<T>
    where
        T: Message,
    {
        self.check_rank(source)?;
        if let Some(envelope) = self.take_pending(source, tag) {
            return Self::decode(&envelope.payload);
        }
        loop {
            let envelope = self
                .mailbox_in
                .recv()
                .map_err(|_| CommError::Disconnected { rank: source })?;
            if envelope.source == source && envelope.tag == tag {
                return Self::decode(&envelope.payload);
            }
            self.pending.borrow_mut().push_back(envelope);
        }
    }

    fn send_nonblocking<T>(&self, value: &T, dest: Rank, tag: Tag) -> CommResult<SendTicket>
    where
        T: Message,
    {
        self.send(value, dest, tag)?;
        Ok(SendTicket::delivered())
    }

    fn probe(&self, tag: Tag) -> CommResult<Option<Rank>> {
        self.drain_mailbox();
        Ok(self
            .pending
            .borrow()
            .iter()
            .find(|e| e.tag == tag)
            .map(|e| e.source))
    }

    fn send_receive<S, R>(&self, value: &S, partner: Rank, tag: Tag) -> CommResult<R>
    where
        S: Message,
        R: Message,
    {
        self.send(value, partner, tag)?;
        self.recv(partner, tag)
    }
}
