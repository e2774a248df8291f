//! Structural contract for message transitions

use crate::error::{ContractError, ContractResult};
use crate::predicate::require;
use shared_types::{Command, Transition};

pub const SEND_NO_INPUTS: &str = "No inputs should be consumed when sending a message.";
pub const SEND_ONE_OUTPUT: &str = "Only one output state should be created when sending a message.";
pub const REPLY_ONE_INPUT: &str = "One input should be consumed when replying to a message.";
pub const REPLY_ONE_OUTPUT: &str =
    "Only one output state should be created when replying to a message.";
pub const REPLY_UNCHAINED: &str = "A reply must reference the message it consumes.";
pub const REPLY_PARTIES_SWAPPED: &str =
    "A reply must swap the sender and recipient of the message it consumes.";

/// Pure rule-checker for transition shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractVerifier;

impl ContractVerifier {
    /// Check the consumed/produced shape against the command.
    ///
    /// | Command | consumed | produced |
    /// |---------|----------|----------|
    /// | `Send`  | 0        | 1        |
    /// | `Reply` | 1        | 1        |
    ///
    /// A `Reply` output must also point back at the consumed record and
    /// reverse its sender and recipient.
    pub fn verify(transition: &Transition) -> ContractResult<()> {
        let inputs = transition.consumed.len();
        let outputs = transition.produced.len();

        let checked = match transition.command {
            Command::Send => require(inputs == 0, SEND_NO_INPUTS)
                .and_then(|()| require(outputs == 1, SEND_ONE_OUTPUT)),
            Command::Reply => require(inputs == 1, REPLY_ONE_INPUT)
                .and_then(|()| require(outputs == 1, REPLY_ONE_OUTPUT))
                .and_then(|()| Self::check_chain(transition)),
        };

        checked.map_err(|reason| ContractError::InvalidTransition { reason })
    }

    /// A reply answers exactly the record it consumes, between the same two
    /// parties with the roles reversed.
    fn check_chain(transition: &Transition) -> Result<(), String> {
        let (Some(prior), Some(answer)) = (transition.single_input(), transition.single_output())
        else {
            return Ok(());
        };
        require(answer.in_reply_to() == Some(prior.id()), REPLY_UNCHAINED)?;
        require(
            answer.sender() == prior.recipient() && answer.recipient() == prior.sender(),
            REPLY_PARTIES_SWAPPED,
        )
    }
}
