// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Round-robin drain over the topic queues.

use std::time::Duration;

use crossbeam_channel::{Receiver, Select, TryRecvError};
use tracing::trace;

use super::{MessageSink, TopicMessage};
use crate::core::Result;

/// Upper bound on one idle wait. Wakes early when any queue becomes ready.
const IDLE_WAIT: Duration = Duration::from_millis(10);

/// Forward every message from `queues` to `sink` until all queues are closed
/// and empty. Returns the number of messages forwarded.
///
/// Each pass pops everything ready from every open queue in order. A queue
/// leaves the rotation only once it reports disconnected, which crossbeam
/// does only after its buffer is empty, so no message is dropped. When a pass
/// finds nothing, the loop blocks on readiness of any open queue for at most
/// [`IDLE_WAIT`].
///
/// The payload header is stamped with the message frame id and stamp before
/// it reaches the sink. On a sink error the queues are dropped, which makes
/// the producers' next send fail so they stop.
pub fn drain_queues<S: MessageSink + ?Sized>(
    queues: Vec<Receiver<TopicMessage>>,
    sink: &mut S,
) -> Result<u64> {
    let mut open = queues;
    let mut forwarded = 0u64;

    while !open.is_empty() {
        let mut progressed = false;
        let mut i = 0;
        while i < open.len() {
            match open[i].try_recv() {
                Ok(mut message) => {
                    message.payload.set_header(&message.frame_id, message.stamp_us);
                    sink.write_message(&message)?;
                    forwarded += 1;
                    progressed = true;
                }
                Err(TryRecvError::Empty) => i += 1,
                Err(TryRecvError::Disconnected) => {
                    open.remove(i);
                    progressed = true;
                }
            }
        }

        if !progressed && !open.is_empty() {
            let mut select = Select::new();
            for queue in &open {
                select.recv(queue);
            }
            if select.ready_timeout(IDLE_WAIT).is_err() {
                trace!(open = open.len(), "Drain idle");
            }
        }
    }

    Ok(forwarded)
}
