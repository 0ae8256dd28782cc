//! Message dispatch: one inbound text in, zero or more replies out.
//!
//! Each message is processed to completion before the next one — the whole
//! pipeline is synchronous and single-threaded. The handler owns the
//! session-scoped state (confirmation gate, duplicate suppression); durable
//! state lives behind [`FinanceStore`].

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use bolso_core::category::match_category;
use bolso_core::command::{CommandKind, ParsedCommand};
use bolso_core::confirm::{ConfirmationGate, GateRequest, GateStatus, ResetScope};
use bolso_core::dedupe::RecentMessages;
use bolso_core::intent::{Intent, classify};
use bolso_core::money::is_valid_amount;
use bolso_core::schedule::{build_schedule, first_due_date};
use bolso_core::time::today_br;

use crate::error::ChatError;
use crate::reports::{self, ReportPeriod};
use crate::store::{FinanceStore, User};

/// Transport-agnostic inbound message.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub sender: String,
    pub message_id: String,
    /// Display name pushed by the transport, if any.
    pub push_name: Option<String>,
    pub text: String,
}

pub struct MessageHandler<S: FinanceStore> {
    store: S,
    gate: ConfirmationGate,
    recent: RecentMessages,
}

impl<S: FinanceStore> MessageHandler<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            gate: ConfirmationGate::default(),
            recent: RecentMessages::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process one inbound message and return the replies to send.
    pub fn handle(&mut self, msg: &IncomingMessage, now: DateTime<Utc>) -> Vec<String> {
        let text = msg.text.trim();
        if text.is_empty() {
            return vec![];
        }

        let dedupe_key = format!("{}-{}", msg.sender, msg.message_id);
        if self.recent.observe(&dedupe_key, now) {
            debug!(sender = %msg.sender, message_id = %msg.message_id, "duplicate message dropped");
            return vec![];
        }
        self.recent.purge(now);

        let user = match self.store.user_by_contact(&msg.sender) {
            Some(user) => user,
            None => {
                let name = msg
                    .push_name
                    .clone()
                    .unwrap_or_else(|| msg.sender.split('@').next().unwrap_or(&msg.sender).to_string());
                let user = self.store.upsert_user(&msg.sender, &name);
                info!(user = %user.name, contact = %msg.sender, "new user registered");
                return vec![reports::welcome(&user.name)];
            }
        };

        match classify(text) {
            Intent::Command(command) => self.handle_command(&command, &user, now),
            Intent::Expense { amount, description, .. } => {
                self.handle_expense(&user, amount, &description, now)
            }
            Intent::Installment { total_amount, installments, installment_amount, description, .. } => {
                self.handle_installment(&user, total_amount, installments, installment_amount, &description, now)
            }
            Intent::Unknown { .. } => {
                // Unrecognized slash input earns the command help; plain chatter
                // is left alone.
                if text.starts_with('/') {
                    vec![ChatError::UnknownCommand.reply()]
                } else {
                    debug!(%text, "unclassified message ignored");
                    vec![]
                }
            }
        }
    }

    fn refreshed(&self, user: &User) -> User {
        self.store.user_by_id(user.id).unwrap_or_else(|| user.clone())
    }

    fn handle_command(&mut self, command: &ParsedCommand, user: &User, now: DateTime<Utc>) -> Vec<String> {
        use CommandKind::*;

        match command.kind {
            SetBalance => match command.amount {
                Some(amount) if is_valid_amount(amount) => {
                    self.store.set_initial_balance(user.id, amount);
                    info!(user = %user.name, amount, "initial balance set");
                    vec![reports::balance_set_confirmation(amount, now)]
                }
                _ => vec![ChatError::InvalidValue.reply()],
            },

            AddBalance => match command.amount {
                Some(amount) if is_valid_amount(amount) => {
                    if self.store.add_balance(user.id, amount) {
                        self.store.set_low_balance_warned(user.id, false);
                        let updated = self.refreshed(user);
                        info!(user = %user.name, amount, "balance added");
                        vec![reports::balance_added_confirmation(amount, &updated, now)]
                    } else {
                        vec![ChatError::OperationNotAllowed.reply()]
                    }
                }
                _ => vec![ChatError::InvalidValue.reply()],
            },

            GetBalance => vec![reports::balance_report(&self.refreshed(user), now)],

            GetSavings => vec![reports::savings_report(&self.refreshed(user))],

            DepositSavings => self.pocket_move(user, command.amount, PocketOp::SavingsDeposit, now),
            WithdrawSavings => self.pocket_move(user, command.amount, PocketOp::SavingsWithdrawal, now),

            GetEmergency => vec![reports::emergency_report(&self.refreshed(user))],

            DepositEmergency => self.pocket_move(user, command.amount, PocketOp::EmergencyDeposit, now),
            WithdrawEmergency => self.pocket_move(user, command.amount, PocketOp::EmergencyWithdrawal, now),

            ReportDaily => vec![reports::period_report(&self.store, &self.refreshed(user), ReportPeriod::Daily, now)],
            ReportWeekly => {
                vec![reports::period_report(&self.store, &self.refreshed(user), ReportPeriod::Weekly, now)]
            }
            ReportMonthly => {
                vec![reports::period_report(&self.store, &self.refreshed(user), ReportPeriod::Monthly, now)]
            }

            GetInstallments => vec![reports::installments_list(&self.store, user.id)],

            PayInstallment => self.pay_installment(user, command.description.as_deref(), now),

            GetReminders | GetDuePayments => vec![reports::reminders_list(&self.store, user.id, now)],

            ResetBalance => self.direct_reset(user, ResetScope::Balance, now),
            ResetSavings => self.direct_reset(user, ResetScope::Savings, now),
            ResetEmergency => self.direct_reset(user, ResetScope::Emergency, now),
            ResetInstallments => self.direct_reset(user, ResetScope::Installments, now),

            ResetEverything => {
                match self.gate.check(&user.contact_id, GateRequest::Arm(ResetScope::Everything), now) {
                    GateStatus::Pending => vec![reports::reset_warning(ResetScope::Everything)],
                    GateStatus::Executed => self.execute_full_reset(user, now),
                    GateStatus::Rejected => vec![ChatError::ConfirmationFailed.reply()],
                }
            }

            ConfirmReset => match self.gate.check(&user.contact_id, GateRequest::Confirm, now) {
                GateStatus::Executed => self.execute_full_reset(user, now),
                _ => vec![ChatError::ConfirmationFailed.reply()],
            },

            Help => vec![reports::help_text()],
            Start => vec![reports::welcome(&user.name)],
        }
    }

    fn pocket_move(
        &mut self,
        user: &User,
        amount: Option<f64>,
        op: PocketOp,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let Some(amount) = amount.filter(|a| is_valid_amount(*a)) else {
            return vec![ChatError::InvalidValue.reply()];
        };

        let (ok, insufficient) = match op {
            PocketOp::SavingsDeposit => (self.store.deposit_savings(user.id, amount, now), "Saldo"),
            PocketOp::SavingsWithdrawal => (self.store.withdraw_savings(user.id, amount, now), "Poupança"),
            PocketOp::EmergencyDeposit => (self.store.deposit_emergency(user.id, amount, now), "Saldo"),
            PocketOp::EmergencyWithdrawal => (self.store.withdraw_emergency(user.id, amount, now), "Reserva"),
        };

        if !ok {
            return vec![ChatError::InsufficientBalance(insufficient.to_string()).reply()];
        }

        let updated = self.refreshed(user);
        info!(user = %user.name, amount, op = ?op, "pocket transfer");
        match op {
            PocketOp::SavingsDeposit => vec![reports::savings_confirmation(true, amount, &updated)],
            PocketOp::SavingsWithdrawal => vec![reports::savings_confirmation(false, amount, &updated)],
            PocketOp::EmergencyDeposit => vec![reports::emergency_confirmation(true, amount, &updated)],
            PocketOp::EmergencyWithdrawal => vec![reports::emergency_confirmation(false, amount, &updated)],
        }
    }

    fn pay_installment(&mut self, user: &User, description: Option<&str>, now: DateTime<Utc>) -> Vec<String> {
        let Some(description) = description.filter(|d| !d.trim().is_empty()) else {
            return vec![ChatError::InvalidValue.reply()];
        };

        let Some(installment) = self.store.find_installment(user.id, description) else {
            return vec![ChatError::NotFound("parcelamento com este nome".to_string()).reply()];
        };

        let Some(next) = self.store.next_pending_payment(installment.id) else {
            return vec![reports::installment_fully_paid()];
        };

        if !self.store.pay_installment(next.id, user.id, now) {
            return vec![ChatError::InsufficientBalance("Saldo".to_string()).reply()];
        }

        let updated = self.refreshed(user);
        let paid = self
            .store
            .payments_for(installment.id)
            .into_iter()
            .find(|p| p.id == next.id)
            .unwrap_or(next);
        info!(
            user = %user.name,
            installment = %installment.description,
            number = paid.payment.number,
            "installment payment"
        );
        vec![reports::payment_confirmation(&installment, &paid, &updated)]
    }

    fn direct_reset(&mut self, user: &User, scope: ResetScope, now: DateTime<Utc>) -> Vec<String> {
        let ok = match scope {
            ResetScope::Balance => self.store.reset_balance(user.id, now),
            ResetScope::Savings => self.store.reset_savings(user.id, now),
            ResetScope::Emergency => self.store.reset_emergency(user.id, now),
            ResetScope::Installments => self.store.reset_installments(user.id, now),
            ResetScope::Everything => self.store.reset_everything(user.id, now),
        };

        if ok {
            info!(user = %user.name, scope = ?scope, "reset executed");
            vec![reports::reset_confirmation(scope, now)]
        } else {
            let reply = match scope {
                ResetScope::Balance | ResetScope::Everything => ChatError::OperationNotAllowed.reply(),
                ResetScope::Savings => ChatError::NotFound("poupança".to_string()).reply(),
                ResetScope::Emergency => {
                    ChatError::NotFound("reserva de emergência".to_string()).reply()
                }
                ResetScope::Installments => ChatError::NotFound("parcelamentos".to_string()).reply(),
            };
            vec![reply]
        }
    }

    fn execute_full_reset(&mut self, user: &User, now: DateTime<Utc>) -> Vec<String> {
        if self.store.reset_everything(user.id, now) {
            info!(user = %user.name, "full system reset");
            vec![reports::reset_confirmation(ResetScope::Everything, now)]
        } else {
            vec![ChatError::OperationNotAllowed.reply()]
        }
    }

    fn handle_expense(
        &mut self,
        user: &User,
        amount: f64,
        description: &str,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        if !is_valid_amount(amount) {
            return vec![ChatError::InvalidValue.reply()];
        }
        if user.initial_balance == 0.0 {
            return vec![ChatError::InitialBalanceRequired.reply()];
        }

        let categories = self.store.list_categories();
        let Some(category_id) = match_category(description, &categories) else {
            return vec![ChatError::OperationNotAllowed.reply()];
        };

        let Some(entry) = self.store.record_expense(user.id, amount, description, category_id, now) else {
            return vec![ChatError::OperationNotAllowed.reply()];
        };
        let Some(category) = self.store.category_by_id(category_id) else {
            return vec![ChatError::OperationNotAllowed.reply()];
        };

        let updated = self.refreshed(user);
        info!(
            user = %user.name,
            amount,
            category = %category.name,
            description = %entry.description,
            "expense recorded"
        );

        let mut replies = vec![reports::expense_confirmation(&entry, &updated, &category)];
        replies.extend(self.balance_warnings(&updated));
        replies
    }

    /// Negative-balance alert, or the one-shot low-balance warning at ≤30%
    /// of total money remaining.
    fn balance_warnings(&mut self, user: &User) -> Vec<String> {
        if user.current_balance < 0.0 {
            return vec![reports::negative_balance_alert()];
        }

        let percentage_remaining = if user.initial_balance > 0.0 {
            (user.total_money() / user.initial_balance) * 100.0
        } else {
            100.0
        };

        if percentage_remaining <= 30.0 && !user.low_balance_warned {
            self.store.set_low_balance_warned(user.id, true);
            return vec![reports::low_balance_warning(percentage_remaining)];
        }

        vec![]
    }

    fn handle_installment(
        &mut self,
        user: &User,
        total_amount: f64,
        installments: u32,
        installment_amount: f64,
        description: &str,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        if !is_valid_amount(total_amount) {
            return vec![ChatError::InvalidValue.reply()];
        }
        if user.initial_balance == 0.0 {
            return vec![ChatError::InitialBalanceRequired.reply()];
        }

        let categories = self.store.list_categories();
        let Some(category_id) = match_category(description, &categories) else {
            return vec![ChatError::OperationNotAllowed.reply()];
        };

        let schedule = build_schedule(installments, installment_amount, first_due_date(today_br(now)));
        let installment = self.store.create_installment(
            user.id,
            description,
            total_amount,
            installment_amount,
            category_id,
            schedule,
            now,
        );
        let Some(category) = self.store.category_by_id(category_id) else {
            return vec![ChatError::OperationNotAllowed.reply()];
        };

        info!(
            user = %user.name,
            total_amount,
            installments,
            description = %installment.description,
            "installment purchase recorded"
        );
        vec![reports::installment_confirmation(&installment, &category)]
    }
}

#[derive(Debug, Clone, Copy)]
enum PocketOp {
    SavingsDeposit,
    SavingsWithdrawal,
    EmergencyDeposit,
    EmergencyWithdrawal,
}
