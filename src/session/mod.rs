//! The protocol/session engine (spec §4.7).
//!
//! Owns session lifecycle (`OpenSession`/`CloseSession`, one-shot
//! `SessionAlreadyOpen` recovery) and transaction bookkeeping (monotonic,
//! wrapping, sentinel-skipping transaction IDs) on top of the raw
//! [`Container`] framing in `transport::container`. Event fan-out to
//! per-event subscribers plus a bounded poll queue is grounded in the
//! teacher's `InterruptPoller` callback design, generalized from "one
//! callback for everything" to "subscribers keyed by event name".

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::{PtpError, SessionError, TransportError};
use crate::registry::Registry;
use crate::transport::container::{Container, ContainerKind};
use crate::transport::device_handle::DeviceHandle;
use crate::transport::interrupt::{Cancellable, EventFrame, InterruptLoop};
use crate::transport::usb::{PtpTransport, UsbTransport};

/// How long `Connection::wait_for_event`'s pump blocks on the interrupt
/// channel between queue checks; bounds how quickly a cooperative stop
/// (session closing, background thread dying) is noticed.
const INTERRUPT_CHANNEL_POLL: Duration = Duration::from_millis(500);

/// Interrupt-endpoint reads read in 64-byte USB full-speed interrupt
/// packets (spec §4.6); PTP Event containers are always exactly 12 bytes
/// (header) + up to 12 bytes of parameters, well under one packet.
const EVENT_BUFFER_LEN: usize = 64;

const SENTINEL_TRANSACTION_ID: u32 = 0xFFFF_FFFF;
const EVENT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    Closed,
    Open { session_id: u32 },
}

/// The outcome of a single command/data/response exchange (spec §4.7
/// "Send operation").
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub response_code: u16,
    pub response_params: Vec<u32>,
    pub data: Option<Vec<u8>>,
}

/// An event delivered over the interrupt endpoint, queued for poll-style
/// consumers and fanned out to subscribers keyed by event code.
#[derive(Debug, Clone)]
pub struct QueuedEvent {
    pub code: u16,
    pub transaction_id: u32,
    pub parameters: Vec<u32>,
}

type EventHandler = Box<dyn FnMut(&QueuedEvent) + Send>;

/// PTP session state plus the monotonic transaction counter, layered over a
/// connected [`UsbTransport`].
pub struct Session {
    state: SessionState,
    next_transaction_id: u32,
    event_queue: VecDeque<QueuedEvent>,
    subscribers: HashMap<u16, Vec<EventHandler>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Closed,
            next_transaction_id: 0,
            event_queue: VecDeque::new(),
            subscribers: HashMap::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open { .. })
    }

    pub fn session_id(&self) -> Option<u32> {
        match self.state {
            SessionState::Open { session_id } => Some(session_id),
            SessionState::Closed => None,
        }
    }

    /// Allocates the next transaction ID, wrapping as u32 and never handing
    /// out the reserved sentinel (spec §4.4/§4.7).
    fn allocate_transaction_id(&mut self) -> u32 {
        let id = self.next_transaction_id;
        self.next_transaction_id = self.next_transaction_id.wrapping_add(1);
        if self.next_transaction_id == SENTINEL_TRANSACTION_ID {
            self.next_transaction_id = 0;
        }
        id
    }

    /// Sends a bare operation (no data phase either direction) and returns
    /// its response. Used internally for `OpenSession`/`CloseSession`, which
    /// happen before a `Registry` data-direction lookup is meaningful.
    fn exchange_bare<T: PtpTransport>(
        &mut self,
        transport: &mut T,
        code: u16,
        params: &[u32],
    ) -> Result<OperationOutcome, TransportError> {
        let transaction_id = self.allocate_transaction_id();
        let command = Container::command(code, transaction_id, params);
        transport.send(&command.to_bytes())?;

        let raw = transport.receive(transport.interrupt_packet_len().max(512))?;
        let response = Container::parse(&raw).map_err(|_| TransportError::NotConnected)?;
        let response_params = response.params().unwrap_or_default();

        Ok(OperationOutcome {
            response_code: response.code,
            response_params,
            data: None,
        })
    }

    /// Opens a session with the given ID (spec §4.7 "Open session"):
    /// resets the transaction counter, sends `OpenSession`, and on
    /// `SessionAlreadyOpen` performs exactly one `CloseSession`/reopen cycle.
    pub fn open<T: PtpTransport>(
        &mut self,
        transport: &mut T,
        open_code: u16,
        close_code: u16,
        session_id: u32,
        ok_code: u16,
        session_already_open_code: u16,
    ) -> Result<(), SessionError> {
        self.open_with_params(
            transport,
            open_code,
            close_code,
            session_id,
            &[session_id],
            ok_code,
            session_already_open_code,
        )
    }

    /// Like [`Session::open`], but lets the caller supply the full
    /// `OpenSession`-style command payload (e.g. Sony's
    /// `SDIO_OpenSession{sessionId, FunctionMode}`) while still tracking
    /// `session_id` for state purposes.
    pub fn open_with_params<T: PtpTransport>(
        &mut self,
        transport: &mut T,
        open_code: u16,
        close_code: u16,
        session_id: u32,
        open_params: &[u32],
        ok_code: u16,
        session_already_open_code: u16,
    ) -> Result<(), SessionError> {
        self.next_transaction_id = 0;

        let outcome = self
            .exchange_bare(transport, open_code, open_params)
            .map_err(|_| SessionError::SessionOpenFailed { code: 0 })?;

        if outcome.response_code == ok_code {
            self.state = SessionState::Open { session_id };
            return Ok(());
        }

        if outcome.response_code == session_already_open_code {
            debug!("session already open, recovering with CloseSession/reopen");
            let _ = self.exchange_bare(transport, close_code, &[]);
            self.next_transaction_id = 0;

            let retry = self
                .exchange_bare(transport, open_code, open_params)
                .map_err(|_| SessionError::SessionOpenFailed { code: 0 })?;

            if retry.response_code == ok_code {
                self.state = SessionState::Open { session_id };
                return Ok(());
            }

            return Err(SessionError::SessionOpenFailed {
                code: retry.response_code,
            });
        }

        Err(SessionError::SessionOpenFailed {
            code: outcome.response_code,
        })
    }

    /// Closes the session (spec §4.7 "Close session"): best-effort, treats
    /// `SessionNotOpen` as success, and always transitions to closed.
    pub fn close<T: PtpTransport>(
        &mut self,
        transport: &mut T,
        close_code: u16,
        session_not_open_code: u16,
    ) {
        if !self.is_open() {
            return;
        }

        match self.exchange_bare(transport, close_code, &[]) {
            Ok(outcome)
                if outcome.response_code == 0x2001 || outcome.response_code == session_not_open_code => {}
            Ok(outcome) => warn!(
                "CloseSession returned non-OK response 0x{:04X}; closing locally anyway",
                outcome.response_code
            ),
            Err(e) => warn!("CloseSession transport error, closing locally anyway: {e}"),
        }

        self.state = SessionState::Closed;
    }

    /// Sends an operation with up to five u32 parameters and an optional
    /// data phase in either direction (spec §4.7 "Send operation").
    pub fn send_operation<T: PtpTransport>(
        &mut self,
        transport: &mut T,
        code: u16,
        params: &[u32],
        data_in: Option<&[u8]>,
        data_out_expected: bool,
        max_data_length: usize,
    ) -> Result<OperationOutcome, SessionError> {
        if !self.is_open() {
            return Err(SessionError::NotOpen);
        }

        let transaction_id = self.allocate_transaction_id();
        let command = Container::command(code, transaction_id, params);

        transport
            .send(&command.to_bytes())
            .map_err(|_| SessionError::NotOpen)?;

        if let Some(bytes) = data_in {
            let data_container = Container::data(code, transaction_id, bytes.to_vec());
            transport
                .send(&data_container.to_bytes())
                .map_err(|_| SessionError::NotOpen)?;
        }

        let mut data = None;
        if data_out_expected {
            let raw = transport
                .receive(max_data_length)
                .map_err(|_| SessionError::NotOpen)?;
            let container = Container::parse(&raw).map_err(|_| SessionError::NotOpen)?;
            if container.kind == ContainerKind::Data {
                data = Some(container.payload);
            } else {
                return Ok(OperationOutcome {
                    response_code: container.code,
                    response_params: container.params().unwrap_or_default(),
                    data: None,
                });
            }
        }

        let raw = transport
            .receive(512)
            .map_err(|_| SessionError::NotOpen)?;
        let response = Container::parse(&raw).map_err(|_| SessionError::NotOpen)?;

        Ok(OperationOutcome {
            response_code: response.code,
            response_params: response.params().unwrap_or_default(),
            data,
        })
    }

    /// Raises `Ok(())` for `OK`, a [`PtpError`] otherwise (spec §4.7 "Error
    /// policy").
    pub fn check_ok(
        outcome: &OperationOutcome,
        ok_code: u16,
        operation: &'static str,
        registry: &Registry,
    ) -> Result<(), PtpError> {
        if outcome.response_code == ok_code {
            return Ok(());
        }
        let message = registry
            .response_name(outcome.response_code)
            .unwrap_or("unknown response")
            .to_string();
        Err(PtpError::new(outcome.response_code, operation, message))
    }

    /// Records an interrupt-delivered event: pushes to the poll queue
    /// (dropping the oldest entry past capacity) and fans out to any
    /// subscribers registered for its code.
    pub fn deliver_event(&mut self, event: QueuedEvent) {
        if let Some(handlers) = self.subscribers.get_mut(&event.code) {
            for handler in handlers.iter_mut() {
                handler(&event);
            }
        }

        if self.event_queue.len() == EVENT_QUEUE_CAPACITY {
            self.event_queue.pop_front();
        }
        self.event_queue.push_back(event);
    }

    /// Subscribes a handler to an event code (spec §4.8 `on`).
    pub fn on(&mut self, event_code: u16, handler: EventHandler) {
        self.subscribers.entry(event_code).or_default().push(handler);
    }

    /// Removes every handler registered for an event code (spec §4.8 `off`).
    pub fn off(&mut self, event_code: u16) {
        self.subscribers.remove(&event_code);
    }

    /// Pops the oldest still-queued event, if any (poll-style consumption).
    pub fn poll_event(&mut self) -> Option<QueuedEvent> {
        self.event_queue.pop_front()
    }

    /// Blocks, invoking `pump` to drain the interrupt loop, until a queued
    /// event matching `predicate` appears or `pump` returns `false`.
    pub fn wait_for_event(
        &mut self,
        mut predicate: impl FnMut(&QueuedEvent) -> bool,
        mut pump: impl FnMut(&mut Self) -> bool,
    ) -> Option<QueuedEvent> {
        loop {
            if let Some(pos) = self.event_queue.iter().position(|e| predicate(e)) {
                return self.event_queue.remove(pos);
            }
            if !pump(self) {
                return None;
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// The background interrupt-loop thread plus its cooperative stop switch,
/// owned by the [`Connection`] it feeds events into.
struct InterruptRuntime {
    cancellable: Cancellable,
    thread: thread::JoinHandle<()>,
}

/// Bundles a [`Session`] with the transport and owning device handle so
/// higher layers (camera implementations) only need one handle to drive a
/// connection. Also owns the interrupt loop's background thread, when the
/// device exposes an interrupt endpoint (spec §4.6).
pub struct Connection {
    pub session: Session,
    pub transport: UsbTransport,
    event_rx: Option<mpsc::Receiver<EventFrame>>,
    interrupt: Option<InterruptRuntime>,
}

impl Connection {
    pub fn new(transport: UsbTransport) -> Self {
        Self {
            session: Session::new(),
            transport,
            event_rx: None,
            interrupt: None,
        }
    }

    pub fn device_handle(&self) -> &DeviceHandle {
        self.transport.handle()
    }

    /// Spawns the interrupt loop on a background thread if the device has
    /// an interrupt endpoint; a no-op otherwise (spec §4.6: not every
    /// still-image device exposes one). Events are handed back over a
    /// channel rather than delivered to the session directly, since
    /// `Session::deliver_event` needs `&mut Session` and the session lives
    /// on whichever thread is driving the camera, not the interrupt thread.
    pub fn start_interrupt_loop(&mut self) {
        let Some(ep_int) = self.transport.interrupt_endpoint() else {
            return;
        };
        if self.interrupt.is_some() {
            return;
        }

        let (ep_bulk_in, ep_bulk_out) = self.transport.bulk_endpoints();
        let interrupt_loop = InterruptLoop::new(ep_int, ep_bulk_in, ep_bulk_out, EVENT_BUFFER_LEN);
        let cancellable = interrupt_loop.handle();
        let handle = self.transport.handle_arc();
        let (tx, rx) = mpsc::channel();

        let thread = thread::spawn(move || {
            let _ = interrupt_loop.run(handle.as_ref(), |frame| {
                let _ = tx.send(frame);
            });
        });

        self.event_rx = Some(rx);
        self.interrupt = Some(InterruptRuntime { cancellable, thread });
    }

    /// Cancels the interrupt loop and joins its thread, if one is running.
    /// Must run before the transport releases the interface.
    pub fn stop_interrupt_loop(&mut self) {
        if let Some(runtime) = self.interrupt.take() {
            runtime.cancellable.cancel();
            let _ = runtime.thread.join();
        }
        self.event_rx = None;
    }

    /// Drains every currently-available frame from the interrupt channel
    /// into the session's queue/subscribers, without blocking. Used by
    /// `Camera::pump_events` so interrupt-delivered events reach
    /// subscribers even when nothing is actively waiting via
    /// `wait_for_event`.
    pub fn drain_interrupt_channel(&mut self) {
        let Some(rx) = self.event_rx.as_ref() else {
            return;
        };
        while let Ok(frame) = rx.try_recv() {
            self.session.deliver_event(QueuedEvent {
                code: frame.code,
                transaction_id: frame.transaction_id,
                parameters: frame.parameters,
            });
        }
    }

    /// Blocks until a queued event matches `predicate`, pumping the
    /// interrupt channel (if the device has one) as the source of new
    /// events. Returns `None` once the channel is closed (the background
    /// thread exited) or the device never had an interrupt endpoint to
    /// begin with, matching `Session::wait_for_event`'s `pump -> false`
    /// contract.
    pub fn wait_for_event(
        &mut self,
        predicate: impl FnMut(&QueuedEvent) -> bool,
    ) -> Option<QueuedEvent> {
        let event_rx = self.event_rx.take();
        let result = match &event_rx {
            Some(rx) => self.session.wait_for_event(predicate, |session| {
                match rx.recv_timeout(INTERRUPT_CHANNEL_POLL) {
                    Ok(frame) => {
                        session.deliver_event(QueuedEvent {
                            code: frame.code,
                            transaction_id: frame.transaction_id,
                            parameters: frame.parameters,
                        });
                        true
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => true,
                    Err(mpsc::RecvTimeoutError::Disconnected) => false,
                }
            }),
            None => self.session.wait_for_event(predicate, |_| false),
        };
        self.event_rx = event_rx;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::container::Container;
    use crate::transport::mock::MockPtpTransport;

    const OPEN_SESSION: u16 = 0x1002;
    const CLOSE_SESSION: u16 = 0x1003;
    const GET_OBJECT_INFO: u16 = 0x1008;
    const RESPONSE_OK: u16 = 0x2001;
    const RESPONSE_SESSION_ALREADY_OPEN: u16 = 0x201E;

    #[test]
    fn send_operation_reads_back_data_then_response() {
        let mut session = Session::new();
        session.state = SessionState::Open { session_id: 1 };

        let data = Container::data(GET_OBJECT_INFO, 0, vec![1, 2, 3, 4]).to_bytes();
        let response = Container::response(GET_OBJECT_INFO, 0, &[]).to_bytes();
        let mut transport = MockPtpTransport::new(vec![Ok(data), Ok(response)]);

        let outcome = session
            .send_operation(&mut transport, GET_OBJECT_INFO, &[0xDEAD], None, true, 512)
            .unwrap();

        assert_eq!(outcome.response_code, RESPONSE_OK);
        assert_eq!(outcome.data, Some(vec![1, 2, 3, 4]));

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        let sent_command = Container::parse(&sent[0]).unwrap();
        assert_eq!(sent_command.code, GET_OBJECT_INFO);
        assert_eq!(sent_command.params().unwrap(), vec![0xDEAD]);
    }

    #[test]
    fn send_operation_short_circuits_on_response_in_place_of_data() {
        let mut session = Session::new();
        session.state = SessionState::Open { session_id: 1 };

        let response = Container::response(GET_OBJECT_INFO, 0, &[]).to_bytes();
        let mut transport = MockPtpTransport::new(vec![Ok(response)]);

        let outcome = session
            .send_operation(&mut transport, GET_OBJECT_INFO, &[0xDEAD], None, true, 512)
            .unwrap();

        assert_eq!(outcome.response_code, RESPONSE_OK);
        assert_eq!(outcome.data, None);
    }

    #[test]
    fn open_recovers_from_session_already_open() {
        let mut session = Session::new();

        let already_open = Container::response(OPEN_SESSION, 0, &[]).to_bytes();
        let close_ack = Container::response(CLOSE_SESSION, 0, &[]).to_bytes();
        let opened = Container::response(OPEN_SESSION, 0, &[]).to_bytes();
        let mut already_open_container = Container::parse(&already_open).unwrap();
        already_open_container.code = RESPONSE_SESSION_ALREADY_OPEN;
        let already_open = already_open_container.to_bytes();

        let mut transport = MockPtpTransport::new(vec![Ok(already_open), Ok(close_ack), Ok(opened)]);

        session
            .open(
                &mut transport,
                OPEN_SESSION,
                CLOSE_SESSION,
                7,
                RESPONSE_OK,
                RESPONSE_SESSION_ALREADY_OPEN,
            )
            .unwrap();

        assert!(session.is_open());
        assert_eq!(session.session_id(), Some(7));
        assert_eq!(transport.sent().len(), 3);
    }

    #[test]
    fn transaction_ids_are_monotonic_and_skip_sentinel() {
        let mut session = Session::new();
        session.next_transaction_id = SENTINEL_TRANSACTION_ID - 1;

        let first = session.allocate_transaction_id();
        let second = session.allocate_transaction_id();
        let third = session.allocate_transaction_id();

        assert_eq!(first, SENTINEL_TRANSACTION_ID - 1);
        assert_ne!(second, SENTINEL_TRANSACTION_ID);
        assert_eq!(second, 0);
        assert_eq!(third, 1);
    }

    #[test]
    fn reset_on_open_starts_counter_at_zero() {
        let mut session = Session::new();
        session.next_transaction_id = 42;
        session.next_transaction_id = 0;
        assert_eq!(session.allocate_transaction_id(), 0);
    }

    #[test]
    fn deliver_event_fans_out_and_queues() {
        let mut session = Session::new();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        session.on(
            0x4002,
            Box::new(move |event: &QueuedEvent| {
                seen_clone.lock().unwrap().push(event.transaction_id);
            }),
        );

        session.deliver_event(QueuedEvent {
            code: 0x4002,
            transaction_id: 7,
            parameters: vec![0xABCD],
        });

        assert_eq!(*seen.lock().unwrap(), vec![7]);
        let queued = session.poll_event().unwrap();
        assert_eq!(queued.parameters, vec![0xABCD]);
    }

    #[test]
    fn off_removes_subscribers() {
        let mut session = Session::new();
        session.on(0x4002, Box::new(|_| panic!("should not fire")));
        session.off(0x4002);
        session.deliver_event(QueuedEvent {
            code: 0x4002,
            transaction_id: 1,
            parameters: vec![],
        });
    }
}
