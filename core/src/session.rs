//! Payment session state machine.
//!
//! States: Drafting -> AwaitingOtp -> Confirming -> {Succeeded | Failed | Expired}.
//!
//! A session is an explicitly owned object with an explicit lifecycle —
//! create one per user-initiated movement, drop it or `reset()` when done.
//! The OTP countdown is observed, not scheduled: the host drives a
//! one-second ticker that calls `expire_if_elapsed()` while the session is
//! awaiting confirmation, and stops ticking once the session leaves those
//! states. Cancelling the ticker never reverses a committed movement.

use crate::{
    bill::BillDirectory,
    clock::Clock,
    config::EngineConfig,
    error::{EngineError, EngineResult},
    model::{MovementKind, MovementRequest, Transaction},
    otp::{Challenge, OtpManager, Verification},
    single_sided_engine::SingleSidedEngine,
    store::LedgerStore,
    transfer_engine::TransferEngine,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Drafting,
    AwaitingOtp,
    Confirming,
    Succeeded,
    Failed,
    Expired,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Expired)
    }
}

pub struct PaymentSession {
    otp: OtpManager,
    transfer: TransferEngine,
    single_sided: SingleSidedEngine,
    draft: Option<MovementRequest>,
    challenge: Option<Challenge>,
    entered: String,
    state: SessionState,
    /// Last surfaced error: terminal reason on Failed/Expired, or the
    /// rejection shown while still Confirming after an invalid code.
    error: Option<EngineError>,
    receipt: Option<Transaction>,
}

impl PaymentSession {
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let otp = OtpManager::new(config.otp.clone(), clock.clone());
        Self::build(config, clock, otp)
    }

    /// Deterministic OTP stream for tests.
    pub fn with_seed(config: EngineConfig, clock: Arc<dyn Clock>, seed: u64) -> Self {
        let otp = OtpManager::with_seed(config.otp.clone(), clock.clone(), seed);
        Self::build(config, clock, otp)
    }

    fn build(config: EngineConfig, clock: Arc<dyn Clock>, otp: OtpManager) -> Self {
        Self {
            otp,
            transfer: TransferEngine::new(config, clock.clone()),
            single_sided: SingleSidedEngine::new(clock),
            draft: None,
            challenge: None,
            entered: String::new(),
            state: SessionState::Drafting,
            error: None,
            receipt: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn error(&self) -> Option<&EngineError> {
        self.error.as_ref()
    }

    /// The ledger entry written by a succeeded session.
    pub fn receipt(&self) -> Option<&Transaction> {
        self.receipt.as_ref()
    }

    /// The code of the outstanding challenge. Hosts surface it to the user
    /// for entry; tests and the demo runner read it here.
    pub fn issued_code(&self) -> Option<&str> {
        self.challenge.as_ref().map(|c| c.code.as_str())
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.challenge
            .as_ref()
            .map(|c| self.otp.remaining_seconds(c))
            .unwrap_or(0)
    }

    /// Validate the draft locally and issue the challenge.
    ///
    /// `known_balance` is the caller's last-seen balance for the debited
    /// account, used for an optimistic pre-check only — the authoritative
    /// check is re-run inside the store commit.
    pub fn submit_draft(
        &mut self,
        request: MovementRequest,
        known_balance: Option<f64>,
    ) -> EngineResult<()> {
        if self.state != SessionState::Drafting {
            return Err(EngineError::Validation(
                "session already has a movement in flight; reset first".to_string(),
            ));
        }
        if !(request.amount > 0.0) {
            return Err(EngineError::Validation(format!(
                "movement amount must be positive, got {}",
                request.amount
            )));
        }
        if let (Some(balance), Some(debited)) = (known_balance, request.kind.debit_account()) {
            if request.amount > balance {
                return Err(EngineError::InsufficientFunds {
                    account_id: debited.clone(),
                    balance,
                    requested: request.amount,
                });
            }
        }

        self.draft = Some(request);
        self.challenge = Some(self.otp.issue());
        self.entered.clear();
        self.error = None;
        self.state = SessionState::AwaitingOtp;
        Ok(())
    }

    /// Record the user's entry and move to Confirming.
    pub fn enter_code(&mut self, code: &str) -> EngineResult<()> {
        match self.state {
            SessionState::AwaitingOtp | SessionState::Confirming => {
                self.entered = code.trim().to_string();
                self.state = SessionState::Confirming;
                Ok(())
            }
            _ => Err(EngineError::Validation(
                "no challenge outstanding for this session".to_string(),
            )),
        }
    }

    /// Countdown observer: transition to Expired once the TTL elapses.
    /// Returns true when the transition happened on this call.
    pub fn expire_if_elapsed(&mut self) -> bool {
        let live = matches!(
            self.state,
            SessionState::AwaitingOtp | SessionState::Confirming
        );
        if !live {
            return false;
        }
        let expired = self
            .challenge
            .as_ref()
            .is_some_and(|c| self.otp.is_expired(c));
        if expired {
            self.enter_expired();
        }
        expired
    }

    fn enter_expired(&mut self) {
        self.challenge = None;
        self.entered.clear();
        self.error = Some(EngineError::OtpExpired);
        self.state = SessionState::Expired;
    }

    /// Verify the entered code and, when valid, execute the movement.
    ///
    /// Expected movement rejections become the terminal Failed state; only
    /// faults like an unreachable store propagate as `Err`. A terminal
    /// session ignores further confirmations and just reports its state,
    /// so a duplicate tap is harmless in every outcome.
    pub fn confirm(
        &mut self,
        store: &mut LedgerStore,
        bills: Option<&mut dyn BillDirectory>,
    ) -> EngineResult<SessionState> {
        match self.state {
            SessionState::Succeeded => return Ok(SessionState::Succeeded),
            SessionState::Failed => return Ok(SessionState::Failed),
            SessionState::Expired => return Ok(SessionState::Expired),
            SessionState::Confirming => {}
            _ => {
                return Err(EngineError::Validation(
                    "no confirmation pending for this session".to_string(),
                ))
            }
        }

        let challenge = match self.challenge.as_ref() {
            Some(c) => c,
            None => {
                self.enter_expired();
                return Ok(SessionState::Expired);
            }
        };

        match self.otp.verify(challenge, &self.entered) {
            Verification::Expired => {
                self.enter_expired();
                Ok(SessionState::Expired)
            }
            Verification::Invalid => {
                // Re-entry is allowed within the same countdown window.
                self.error = Some(EngineError::OtpInvalid);
                Ok(SessionState::Confirming)
            }
            Verification::Valid => {
                let request = match self.draft.clone() {
                    Some(r) => r,
                    None => {
                        return Err(EngineError::Validation(
                            "session has no drafted movement".to_string(),
                        ))
                    }
                };
                match self.execute(store, bills, &request) {
                    Ok(entry) => {
                        // Challenge consumed: a duplicate confirm tap can
                        // never trigger a second commit.
                        self.challenge = None;
                        self.entered.clear();
                        self.error = None;
                        self.receipt = Some(entry);
                        self.state = SessionState::Succeeded;
                        Ok(SessionState::Succeeded)
                    }
                    Err(e) if e.is_movement_rejection() => {
                        self.error = Some(e);
                        self.state = SessionState::Failed;
                        Ok(SessionState::Failed)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    fn execute(
        &self,
        store: &mut LedgerStore,
        bills: Option<&mut dyn BillDirectory>,
        request: &MovementRequest,
    ) -> EngineResult<Transaction> {
        match &request.kind {
            MovementKind::Transfer { sender, receiver } => self.transfer.transfer(
                store,
                sender,
                receiver,
                request.amount,
                &request.memo,
            ),
            MovementKind::Deposit { account } => {
                self.single_sided
                    .deposit(store, account, request.amount, &request.memo)
            }
            MovementKind::Withdrawal { account } => {
                self.single_sided
                    .withdraw(store, account, request.amount, &request.memo)
            }
            MovementKind::BillPayment {
                account,
                provider,
                customer_code,
                bill_id,
            } => self.single_sided.pay_utility(
                store,
                bills,
                account,
                request.amount,
                provider,
                customer_code,
                bill_id.as_deref(),
                &request.memo,
            ),
        }
    }

    /// Back to a fresh Drafting state, discarding the OTP and entered code.
    pub fn reset(&mut self) {
        self.draft = None;
        self.challenge = None;
        self.entered.clear();
        self.error = None;
        self.receipt = None;
        self.state = SessionState::Drafting;
    }
}
