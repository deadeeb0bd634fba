// Copyright (c) 2024 Mike Tsao

//! Traits used by services.

use crossbeam::channel::{Receiver, RecvError, SelectedOperation, Sender};

/// Service methods.
///
/// A service is something that usually runs in its own thread as a daemon and
/// that communicates with clients by crossbeam channels. It accepts Inputs and
/// produces Events.
pub trait ProvidesService<I: core::fmt::Debug, E: core::fmt::Debug> {
    /// The sender side of the Input channel. Use this to send commands to the
    /// service.
    fn sender(&self) -> &Sender<I>;

    /// A convenience method to send Inputs to the service.
    fn send_input(&self, input: I) {
        if let Err(e) = self.sender().try_send(input) {
            log::warn!("While sending: {e:?}");
        }
    }

    /// The receiver side of the Event channel. Integrate this into a listener
    /// loop to respond to events.
    fn receiver(&self) -> &Receiver<E>;

    /// Receives the result of a crossbeam [Select](crossbeam::channel::Select)
    /// operation, logging any failure.
    fn recv_operation<T>(oper: SelectedOperation, r: &Receiver<T>) -> Result<T, RecvError> {
        let input_result = oper.recv(r);
        if let Err(e) = input_result {
            log::debug!("ProvidesService: While attempting to receive from {r:?}: {e}");
        }
        input_result
    }
}
