//! bolso-core: intent-and-category resolution engine for the Bolso
//! personal-finance chat assistant.
//!
//! Pure computation only: free-form Portuguese text in, typed [`Intent`]
//! out, plus the category matcher, the installment scheduler and the
//! per-user confirmation gate. Storage and transport live in collaborator
//! crates.

pub mod category;
pub mod command;
pub mod confirm;
pub mod dedupe;
pub mod describe;
pub mod intent;
pub mod money;
pub mod schedule;
pub mod time;

pub use category::{Category, RESERVED_CATEGORIES, match_category};
pub use command::{CommandKind, ParsedCommand, parse_command};
pub use confirm::{ConfirmationGate, GateRequest, GateState, GateStatus, ResetScope, transition};
pub use dedupe::RecentMessages;
pub use describe::{expense_description, installment_description};
pub use intent::{Intent, InstallmentInfo, classify, extract_installment_info, looks_like_expense};
pub use money::{extract_amount, is_valid_amount, parse_decimal, round2};
pub use schedule::{InstallmentPayment, PaymentStatus, build_schedule, first_due_date};
pub use time::{br_day_start_utc, format_date_br, format_datetime_br, format_naive_date_br, today_br};
