//! Defines the state machine for a single power-on attempt.
//!
//! 1. Send a Wake-on-LAN packet.
//! 2. Wait for the TV's network stack to come up after leaving standby.
//! 3. Probe the TV.
//! 4. Report the TV as confirmed on, or fail with a wake timeout.
//!
//! A fresh machine is used for every attempt; nothing carries over between calls.

use std::fmt;

use log::{debug, error};
use rust_fsm::*;

// ------------------------------------------------------------------------------------------------
// States, Inputs, Outputs

/// Power-on attempt status.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum State {
    /// Nothing has been sent yet.
    Idle,
    /// The Wake-on-LAN packet has been sent.
    PacketSent,
    /// Waiting out the post-wake grace period.
    Waiting,
    /// Checking whether the TV is reachable.
    Probing,
    /// The TV responded after waking.
    Confirmed,
    /// The wake signal could not be sent, or the TV did not respond.
    Failed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// State machine transition inputs.
#[derive(Debug, Clone)]
pub(crate) enum Input {
    WakeSent,
    WakeFailed,
    StartGracePeriod,
    GracePeriodElapsed,
    ProbeSucceeded,
    ProbeFailed,
}

/// State machine transition outputs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Output {
    Confirmed,
    WakeTimeout,
}

// Mermaid format:
//
// stateDiagram-v2
// [*] --> Idle
// Idle --> PacketSent: WakeSent
// Idle --> Failed: WakeFailed
// PacketSent --> Waiting: StartGracePeriod
// Waiting --> Probing: GracePeriodElapsed
// Probing --> Confirmed: ProbeSucceeded
// Probing --> Failed: ProbeFailed

// ================================================================================================
// PowerOnMachine

#[derive(Debug)]
pub(crate) struct PowerOnMachine;

impl StateMachineImpl for PowerOnMachine {
    type Input = Input;
    type State = State;
    type Output = Output;

    const INITIAL_STATE: Self::State = State::Idle;

    fn transition(state: &Self::State, input: &Self::Input) -> Option<Self::State> {
        match (state, input) {
            (State::Idle, Input::WakeSent) => Some(State::PacketSent),
            (State::Idle, Input::WakeFailed) => Some(State::Failed),
            (State::PacketSent, Input::StartGracePeriod) => Some(State::Waiting),
            (State::Waiting, Input::GracePeriodElapsed) => Some(State::Probing),
            (State::Probing, Input::ProbeSucceeded) => Some(State::Confirmed),
            (State::Probing, Input::ProbeFailed) => Some(State::Failed),

            _ => None,
        }
    }

    fn output(state: &Self::State, input: &Self::Input) -> Option<Self::Output> {
        match (state, input) {
            (State::Probing, Input::ProbeSucceeded) => Some(Output::Confirmed),
            (State::Probing, Input::ProbeFailed) => Some(Output::WakeTimeout),

            _ => None,
        }
    }
}

/// Feed `input` to the machine, logging the transition.
///
/// Impossible transitions are logged and leave the machine unchanged.
pub(crate) fn advance(fsm: &mut StateMachine<PowerOnMachine>, input: Input) -> Option<Output> {
    let entry_state = fsm.state().clone();

    match fsm.consume(&input) {
        Ok(output) => {
            debug!(
                "Power-on FSM acting on input [{:?}]: {} -> {}, with output [{}]",
                &input,
                entry_state,
                fsm.state(),
                match &output {
                    Some(o) => format!("{:?}", o),
                    None => "none".into(),
                }
            );

            output
        }
        Err(e) => {
            error!(
                "Power-on FSM transition error with Input [{:?}] while in State '{}': {:?}",
                &input, entry_state, e
            );

            None
        }
    }
}

// ================================================================================================
// Tests
